// ==========================================
// 物料库存报表系统 - 字段映射器
// ==========================================
// 职责: 原始行（列名 → 文本）→ 类型化记录
// 红线: 必填字段缺失或无法解析时立即失败（MalformedRecord），不填默认值
// ==========================================

use crate::domain::records::{ForecastRecord, MovementRecord, StockRecord};
use crate::error::{ReportError, ReportResult};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// 数据集名（用于错误定位）
pub const DATASET_MOVEMENTS: &str = "zmb51";
pub const DATASET_STOCK: &str = "zstok";
pub const DATASET_FORECAST: &str = "fup";

// ==========================================
// RawRecord - 解析阶段中间结构
// ==========================================
// NULL / 空白单元格不进入 fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            fields: HashMap::new(),
        }
    }

    /// 插入字段（自动 TRIM，空白视为 NULL）
    pub fn insert(&mut self, key: &str, value: &str) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.fields.insert(key.trim().to_string(), trimmed.to_string());
        }
    }
}

pub struct FieldMapper;

impl FieldMapper {
    pub fn map_movement(&self, row: &RawRecord) -> ReportResult<MovementRecord> {
        let ds = DATASET_MOVEMENTS;
        Ok(MovementRecord {
            material: self.require_string(ds, row, "material")?,
            site: self.require_string(ds, row, "centro")?,
            quantity: self.require_f64(ds, row, "qtd_um_registro")?,
            channel: self.require_string(ds, row, "canal")?,
            date: self.require_date(ds, row, "data_de_lancamento")?,
        })
    }

    pub fn map_stock(&self, row: &RawRecord) -> ReportResult<StockRecord> {
        let ds = DATASET_STOCK;
        Ok(StockRecord {
            material: self.require_string(ds, row, "material")?,
            site: self.require_string(ds, row, "centro")?,
            quantity_on_hand: self.require_f64(ds, row, "estoque_total")?,
        })
    }

    pub fn map_forecast(&self, row: &RawRecord) -> ReportResult<ForecastRecord> {
        let ds = DATASET_FORECAST;
        Ok(ForecastRecord {
            material: self.require_string(ds, row, "material")?,
            quantity_ordered: self.require_f64(ds, row, "qtde_pedido")?,
            expected_arrival_date: self.require_date(ds, row, "data_prev_entrada")?,
            shipment_date: self.require_date(ds, row, "data_de_remessa")?,
        })
    }

    /// 批量映射，遇到第一条坏记录即失败
    pub fn map_all<T, F>(&self, rows: &[RawRecord], map: F) -> ReportResult<Vec<T>>
    where
        F: Fn(&Self, &RawRecord) -> ReportResult<T>,
    {
        rows.iter().map(|row| map(self, row)).collect()
    }

    /// 提取字符串字段，支持多个可能的列名（别名）
    fn get_string<'a>(&self, row: &'a RawRecord, key: &str) -> Option<&'a str> {
        let aliases: &[&str] = match key {
            // zstok 源表中工厂列名为 cen
            "centro" => &["centro", "cen"],
            _ => &[],
        };

        row.fields
            .get(key)
            .or_else(|| aliases.iter().find_map(|alias| row.fields.get(*alias)))
            .map(String::as_str)
    }

    fn require_string(&self, dataset: &str, row: &RawRecord, key: &str) -> ReportResult<String> {
        self.get_string(row, key)
            .map(str::to_string)
            .ok_or_else(|| ReportError::malformed(dataset, row.row_number, key, "必填字段缺失"))
    }

    /// 解析浮点数（拒绝 NaN / inf）
    fn require_f64(&self, dataset: &str, row: &RawRecord, key: &str) -> ReportResult<f64> {
        let value = self.require_string(dataset, row, key)?;
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ReportError::malformed(
                dataset,
                row.row_number,
                key,
                format!("无法解析为数值: {}", value),
            )),
        }
    }

    /// 解析日期（YYYY-MM-DD / YYYYMMDD / 带时间部分）
    fn require_date(&self, dataset: &str, row: &RawRecord, key: &str) -> ReportResult<NaiveDate> {
        let value = self.require_string(dataset, row, key)?;
        parse_date(&value).ok_or_else(|| {
            ReportError::malformed(
                dataset,
                row.row_number,
                key,
                format!("日期格式错误: {}", value),
            )
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}
