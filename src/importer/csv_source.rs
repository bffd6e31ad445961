// ==========================================
// 物料库存报表系统 - CSV 目录数据源
// ==========================================
// 目录结构: zmb51.csv / zstok.csv / fup.csv（列名与源表一致）
// 白名单与日期窗口在内存中过滤
// ==========================================

use crate::domain::records::{ForecastRecord, MovementRecord, StockRecord};
use crate::error::{ReportError, ReportResult};
use crate::importer::field_mapper::{FieldMapper, RawRecord};
use crate::importer::file_parser::CsvParser;
use crate::importer::record_source::{retain_since, RecordSource};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const MOVEMENTS_FILE: &str = "zmb51.csv";
pub const STOCK_FILE: &str = "zstok.csv";
pub const FORECAST_FILE: &str = "fup.csv";

pub struct CsvRecordSource {
    dir: PathBuf,
}

impl CsvRecordSource {
    /// # 返回
    /// - Err(SourceUnavailable): 目录不存在
    pub fn open<P: AsRef<Path>>(dir: P) -> ReportResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ReportError::SourceUnavailable(format!(
                "数据目录不存在: {}",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// 读取文件并按物料白名单过滤原始行
    fn read_allowed(&self, file: &str, materials: &[String]) -> ReportResult<Vec<RawRecord>> {
        let allowed: HashSet<&str> = materials.iter().map(String::as_str).collect();
        let rows = CsvParser.parse_to_raw_records(&self.dir.join(file))?;

        // material 缺失的行保留下来，交给字段映射报 MalformedRecord
        Ok(rows
            .into_iter()
            .filter(|row| {
                row.fields
                    .get("material")
                    .map_or(true, |m| allowed.contains(m.as_str()))
            })
            .collect())
    }
}

impl RecordSource for CsvRecordSource {
    fn describe(&self) -> String {
        format!("csv_dir:{}", self.dir.display())
    }

    fn movements(
        &self,
        materials: &[String],
        since: NaiveDate,
    ) -> ReportResult<Vec<MovementRecord>> {
        let raw = self.read_allowed(MOVEMENTS_FILE, materials)?;
        let mut records = FieldMapper.map_all(&raw, FieldMapper::map_movement)?;
        retain_since(&mut records, since);
        Ok(records)
    }

    fn stock(&self, materials: &[String]) -> ReportResult<Vec<StockRecord>> {
        let raw = self.read_allowed(STOCK_FILE, materials)?;
        FieldMapper.map_all(&raw, FieldMapper::map_stock)
    }

    fn forecast(&self, materials: &[String]) -> ReportResult<Vec<ForecastRecord>> {
        let raw = self.read_allowed(FORECAST_FILE, materials)?;
        FieldMapper.map_all(&raw, FieldMapper::map_forecast)
    }
}
