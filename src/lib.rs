// ==========================================
// 物料库存报表系统 - 核心库
// ==========================================
// 输入: 库存移动 (zmb51) / 库存快照 (zstok) / 采购在途 (fup)
// 输出: 判别工厂报表 + 其余工厂报表（物料 × 月份/工厂 宽表）
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与宽表
pub mod domain;

// 引擎层 - 分区/透视/组装
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 报表文件
pub mod exporter;

// 配置层 - 报表参数
pub mod config;

// 数据库基础设施（连接初始化/源表结构）
pub mod db;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::ReportConfig;
pub use domain::{
    Aggregator, Cell, ColumnKey, ForecastRecord, MovementRecord, SourceSnapshot, StockRecord,
    WideMatrix, YearMonth,
};
pub use engine::{
    MatrixBuilder, Partitioner, ReportAssembler, ReportPipeline, RunSummary, SiteReports,
};
pub use error::{ReportError, ReportResult};
pub use exporter::{CsvExporter, JsonExporter, ReportExporter};
pub use importer::{CsvRecordSource, RecordSource, SqliteRecordSource};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物料库存报表系统";
