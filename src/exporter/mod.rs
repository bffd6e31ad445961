// ==========================================
// 物料库存报表系统 - 导出层
// ==========================================
// 职责: 宽表 → 记录式文件（行键还原为显式字段 material）
// 支持: JSON（records, 4 空格缩进）, CSV
// 红线: 先写临时文件再改名，失败时不留下半截文件
// ==========================================

pub mod csv_exporter;
pub mod json_exporter;

pub use csv_exporter::CsvExporter;
pub use json_exporter::JsonExporter;

use crate::config::OutputFormat;
use crate::domain::matrix::WideMatrix;
use crate::error::{ReportError, ReportResult};
use std::fs;
use std::path::{Path, PathBuf};

/// 导出时行键字段名
pub const ROW_KEY_FIELD: &str = "material";

pub trait ReportExporter {
    /// 导出宽表
    ///
    /// # 参数
    /// - matrix: 待导出宽表
    /// - destination: 目标名（不含扩展名）
    ///
    /// # 返回
    /// - Ok(PathBuf): 实际写入的文件路径
    /// - Err(ExportFailure)
    fn export(&self, matrix: &WideMatrix, destination: &str) -> ReportResult<PathBuf>;
}

/// 按配置构造导出器
pub fn exporter_for(format: OutputFormat, output_dir: &Path) -> Box<dyn ReportExporter> {
    match format {
        OutputFormat::Json => Box::new(JsonExporter::new(output_dir)),
        OutputFormat::Csv => Box::new(CsvExporter::new(output_dir)),
    }
}

/// 写入文件：目录不存在则创建，先写临时文件再原子改名
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> ReportResult<()> {
    let destination = path.display().to_string();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ReportError::export_failure(destination.clone(), e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ReportError::export_failure(destination.clone(), "目标路径缺少文件名"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp, bytes).map_err(|e| ReportError::export_failure(destination.clone(), e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        ReportError::export_failure(destination, e)
    })
}
