// ==========================================
// 物料库存报表系统 - 引擎层
// ==========================================
// 职责: 分区、透视、滚动均值、对齐拼接
// 红线: Engine 不拼 SQL、不做 I/O（pipeline 只通过 trait 调用数据源/导出器）
// ==========================================

pub mod matrix_builder;
pub mod partitioner;
pub mod pipeline;
pub mod report_assembler;

// 重导出核心引擎
pub use matrix_builder::{append_trailing_means, trailing_mean, MatrixBuilder};
pub use partitioner::{Partition, Partitioner};
pub use pipeline::{PipelineOutput, ReportPipeline, RunSummary};
pub use report_assembler::{concat_aligned, supplementary_matrix, ReportAssembler, SiteReports};
