// ==========================================
// 物料库存报表系统 - CSV 文件解析器
// ==========================================
// 职责: CSV 文件 → 原始行记录（行号取自文件实际行）
// ==========================================

use crate::error::{ReportError, ReportResult};
use crate::importer::field_mapper::RawRecord;
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 为原始行记录
    ///
    /// # 返回
    /// - Err(SourceUnavailable): 文件不存在 / 扩展名不是 .csv / 读取失败
    pub fn parse_to_raw_records(&self, path: &Path) -> ReportResult<Vec<RawRecord>> {
        // 检查文件存在
        if !path.exists() {
            return Err(ReportError::SourceUnavailable(format!(
                "文件不存在: {}",
                path.display()
            )));
        }

        // 检查扩展名
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("csv") {
            return Err(ReportError::SourceUnavailable(format!(
                "文件格式不支持: {}（仅支持 .csv）",
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| {
            ReportError::SourceUnavailable(format!("文件读取失败 {}: {}", path.display(), e))
        })?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let mut row = RawRecord::new(line);

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header, value);
                }
            }

            // 跳过完全空白的行
            if row.fields.is_empty() {
                continue;
            }

            records.push(row);
        }

        Ok(records)
    }
}
