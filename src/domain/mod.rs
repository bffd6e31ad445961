// ==========================================
// 物料库存报表系统 - 领域模型层
// ==========================================
// 职责: 定义源记录、时间桶、宽表
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod matrix;
pub mod records;
pub mod types;

// 重导出核心类型
pub use matrix::{Cell, WideMatrix};
pub use records::{ForecastRecord, MovementRecord, SourceSnapshot, StockRecord};
pub use types::{Aggregator, ColumnKey, YearMonth};
