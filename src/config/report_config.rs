// ==========================================
// 物料库存报表系统 - 报表配置
// ==========================================
// 职责: 汇集全部可调参数（物料白名单、判别工厂、窗口、削减量表、输出）
// 加载顺序: 默认值 → JSON 配置文件 → 环境变量覆写 → 校验
// ==========================================

use crate::domain::types::{Aggregator, ColumnKey};
use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// ==========================================
// 环境变量键
// ==========================================
pub mod env_keys {
    pub const CONFIG_PATH: &str = "MATERIAL_STOCK_REPORT_CONFIG";
    pub const DB_PATH: &str = "MATERIAL_STOCK_REPORT_DB_PATH";
    pub const OUTPUT_DIR: &str = "MATERIAL_STOCK_REPORT_OUTPUT_DIR";
}

/// 数据源配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Sqlite { path: String },
    CsvDir { path: String },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Sqlite {
            path: get_default_db_path(),
        }
    }
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

// ==========================================
// ReportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub source: SourceConfig,
    /// 物料白名单
    pub materials: Vec<String>,
    /// 判别工厂（单独成表）
    pub discriminant_site: String,
    /// 库存移动回溯月数
    pub movement_window_months: u32,
    /// 滚动均值窗口（月数）
    pub rolling_windows: Vec<usize>,
    pub reduction_column: String,
    /// 人工维护的可能削减量
    pub reduction_table: BTreeMap<String, f64>,
    pub movement_aggregator: Aggregator,
    pub stock_aggregator: Aggregator,
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    pub site_report_name: String,
    pub other_sites_report_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let materials = ["A8K3430", "A8K3230", "AAV8230", "AAV8330", "T671600"];
        let reductions = [11.0, 4.0, 50.0, 30.0, 2.0];

        Self {
            source: SourceConfig::default(),
            materials: materials.iter().map(|m| m.to_string()).collect(),
            discriminant_site: "CE07".to_string(),
            movement_window_months: 12,
            rolling_windows: vec![3, 6],
            reduction_column: "possivel_reducao".to_string(),
            reduction_table: materials
                .iter()
                .zip(reductions)
                .map(|(m, r)| (m.to_string(), r))
                .collect(),
            movement_aggregator: Aggregator::Sum,
            stock_aggregator: Aggregator::Mean,
            output_dir: PathBuf::from("output"),
            output_format: OutputFormat::Json,
            site_report_name: "zmb51_estoque_ce07".to_string(),
            other_sites_report_name: "zmb51_estoque_sem_ce07".to_string(),
        }
    }
}

impl ReportConfig {
    /// 加载配置
    ///
    /// # 参数
    /// - path: JSON 配置文件（None 则使用默认值）
    pub fn load(path: Option<&Path>) -> ReportResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        info!(
            source = ?config.source,
            materials = config.materials.len(),
            site = %config.discriminant_site,
            "配置加载完成"
        );
        Ok(config)
    }

    /// 从 JSON 文件读取（缺省字段取默认值）
    pub fn from_json_file(path: &Path) -> ReportResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ReportError::ConfigError(format!("配置文件读取失败 {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// 应用环境变量覆写（lookup 便于测试注入）
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = non_empty(env_keys::DB_PATH) {
            self.source = SourceConfig::Sqlite { path };
        }
        if let Some(dir) = non_empty(env_keys::OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// 配置校验
    pub fn validate(&self) -> ReportResult<()> {
        let fail = |msg: String| Err(ReportError::ConfigError(msg));

        if self.materials.is_empty() {
            return fail("物料白名单为空".to_string());
        }
        if self.materials.iter().any(|m| m.trim().is_empty()) {
            return fail("物料白名单包含空物料号".to_string());
        }
        if self.discriminant_site.trim().is_empty() {
            return fail("判别工厂为空".to_string());
        }
        if self.movement_window_months == 0 {
            return fail("movement_window_months 必须大于 0".to_string());
        }
        if self.rolling_windows.iter().any(|w| *w == 0) {
            return fail("rolling_windows 不能包含 0".to_string());
        }
        let unique: HashSet<usize> = self.rolling_windows.iter().copied().collect();
        if unique.len() != self.rolling_windows.len() {
            return fail(format!("rolling_windows 重复: {:?}", self.rolling_windows));
        }
        if self.reduction_column.trim().is_empty() {
            return fail("reduction_column 为空".to_string());
        }
        // 削减量列与滚动均值列/判别工厂列同名会在拼接时冲突，提前拦截
        let collides = self
            .rolling_windows
            .iter()
            .map(|w| ColumnKey::TrailingMean(*w).name())
            .chain(std::iter::once(self.discriminant_site.clone()))
            .any(|name| name == self.reduction_column);
        if collides {
            return fail(format!("reduction_column 与其他列重名: {}", self.reduction_column));
        }
        if self.reduction_table.values().any(|v| !v.is_finite()) {
            return fail("reduction_table 包含非法数值".to_string());
        }
        if self.site_report_name.trim().is_empty() || self.other_sites_report_name.trim().is_empty() {
            return fail("报表输出名为空".to_string());
        }
        if self.site_report_name == self.other_sites_report_name {
            return fail(format!("两张报表输出名相同: {}", self.site_report_name));
        }
        Ok(())
    }
}

/// 默认数据源路径
///
/// 优先 MATERIAL_STOCK_REPORT_DB_PATH；否则使用用户数据目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(env_keys::DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir
            .join("material-stock-report")
            .join("power_bi.db")
            .to_string_lossy()
            .to_string(),
        None => "./power_bi.db".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ReportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reduction_table.get("AAV8230"), Some(&50.0));
        assert_eq!(config.reduction_table.len(), 5);
        assert_eq!(config.stock_aggregator, Aggregator::Mean);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "discriminant_site": "CE01",
                "rolling_windows": [2],
                "source": {{ "kind": "csv_dir", "path": "data" }},
                "output_format": "csv"
            }}"#
        )
        .unwrap();

        let config = ReportConfig::from_json_file(file.path()).unwrap();

        assert_eq!(config.discriminant_site, "CE01");
        assert_eq!(config.rolling_windows, vec![2]);
        assert_eq!(config.source, SourceConfig::CsvDir { path: "data".to_string() });
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.materials.len(), 5);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = ReportConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ReportError::ConfigError(_)));
    }

    #[test]
    fn test_overrides() {
        let mut config = ReportConfig::default();
        config.apply_overrides(|key| match key {
            env_keys::DB_PATH => Some(" /tmp/source.db ".to_string()),
            env_keys::OUTPUT_DIR => Some("".to_string()),
            _ => None,
        });

        assert_eq!(config.source, SourceConfig::Sqlite { path: "/tmp/source.db".to_string() });
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_validate_rejects_reduction_column_collision() {
        let config = ReportConfig {
            reduction_column: "media_3m".to_string(),
            ..ReportConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReportError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = vec![
            ReportConfig { materials: vec![], ..ReportConfig::default() },
            ReportConfig { rolling_windows: vec![3, 3], ..ReportConfig::default() },
            ReportConfig { rolling_windows: vec![0], ..ReportConfig::default() },
            ReportConfig { movement_window_months: 0, ..ReportConfig::default() },
            ReportConfig {
                other_sites_report_name: "zmb51_estoque_ce07".to_string(),
                ..ReportConfig::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }
}
