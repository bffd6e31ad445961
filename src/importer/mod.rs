// ==========================================
// 物料库存报表系统 - 导入层
// ==========================================
// 职责: 外部数据读取，生成类型化长表记录
// 支持: SQLite 数据库, CSV 目录
// ==========================================

// 模块声明
pub mod csv_source;
pub mod field_mapper;
pub mod file_parser;
pub mod record_source;
pub mod sqlite_source;

// 重导出核心类型
pub use csv_source::CsvRecordSource;
pub use field_mapper::{FieldMapper, RawRecord};
pub use file_parser::CsvParser;
pub use record_source::RecordSource;
pub use sqlite_source::SqliteRecordSource;

use crate::config::SourceConfig;
use crate::error::ReportResult;

/// 按配置打开数据源
pub fn open_record_source(config: &SourceConfig) -> ReportResult<Box<dyn RecordSource>> {
    Ok(match config {
        SourceConfig::Sqlite { path } => Box::new(SqliteRecordSource::open(path)?),
        SourceConfig::CsvDir { path } => Box::new(CsvRecordSource::open(path)?),
    })
}
