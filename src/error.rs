// ==========================================
// 物料库存报表系统 - 错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 所有失败均终止本次运行，不存在部分成功
// ==========================================

use thiserror::Error;

/// 报表流水线错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    // ===== 数据源错误 =====
    #[error("数据源不可用: {0}")]
    SourceUnavailable(String),

    #[error("记录格式错误 ({dataset} 第 {row} 行, 字段 {field}): {message}")]
    MalformedRecord {
        dataset: String,
        row: usize,
        field: String,
        message: String,
    },

    // ===== 宽表结构错误 =====
    #[error("缺少预期列: {column} (矩阵: {matrix})")]
    MissingExpectedColumn { matrix: String, column: String },

    #[error("列名冲突: {column}")]
    ColumnCollision { column: String },

    // ===== 导出错误 =====
    #[error("导出失败 ({destination}): {message}")]
    ExportFailure {
        destination: String,
        message: String,
    },

    // ===== 配置错误 =====
    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl ReportError {
    /// 构造 MalformedRecord（调用处提供数据集名与行号）
    pub fn malformed(
        dataset: &str,
        row: usize,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        ReportError::MalformedRecord {
            dataset: dataset.to_string(),
            row,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn export_failure(destination: impl Into<String>, message: impl ToString) -> Self {
        ReportError::ExportFailure {
            destination: destination.into(),
            message: message.to_string(),
        }
    }
}

// 实现 From<rusqlite::Error>
// 行解码阶段的类型错误由 importer 显式转换为 MalformedRecord，这里只剩连接/查询类错误
impl From<rusqlite::Error> for ReportError {
    fn from(err: rusqlite::Error) -> Self {
        ReportError::SourceUnavailable(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::SourceUnavailable(format!("CSV 读取失败: {}", err))
    }
}

// 实现 From<serde_json::Error>（仅配置加载路径使用）
impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ReportResult<T> = Result<T, ReportError>;
