// ==========================================
// 物料库存报表系统 - 配置层
// ==========================================
// 职责: 报表参数加载、环境变量覆写、校验
// 存储: JSON 配置文件（可选）
// ==========================================

pub mod report_config;

// 重导出核心配置
pub use report_config::{
    env_keys, get_default_db_path, OutputFormat, ReportConfig, SourceConfig,
};
