// ==========================================
// 物料库存报表系统 - CSV 导出器
// ==========================================
// 表头: material + 宽表列名；无值写空串
// ==========================================

use crate::config::OutputFormat;
use crate::domain::matrix::WideMatrix;
use crate::error::{ReportError, ReportResult};
use crate::exporter::{write_atomically, ReportExporter, ROW_KEY_FIELD};
use csv::Writer;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn render(matrix: &WideMatrix) -> Result<Vec<u8>, csv::Error> {
        let mut writer = Writer::from_writer(Vec::new());

        let mut header = vec![ROW_KEY_FIELD.to_string()];
        header.extend(matrix.column_names());
        writer.write_record(&header)?;

        for (material, cells) in matrix.rows() {
            let mut record = Vec::with_capacity(cells.len() + 1);
            record.push(material.to_string());
            record.extend(cells.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()));
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

impl ReportExporter for CsvExporter {
    fn export(&self, matrix: &WideMatrix, destination: &str) -> ReportResult<PathBuf> {
        let path = self.output_dir.join(format!("{}.{}", destination, OutputFormat::Csv.extension()));
        let bytes = Self::render(matrix)
            .map_err(|e| ReportError::export_failure(path.display().to_string(), e))?;
        write_atomically(&path, &bytes)?;

        info!(path = %path.display(), rows = matrix.row_count(), "文件已导出");
        Ok(path)
    }
}
