// ==========================================
// 物料库存报表系统 - SQLite 数据源
// ==========================================
// 职责: 以参数化 SQL 读取 zmb51 / zstok / fup
// 红线: 物料白名单与日期下限一律走绑定参数，不拼接值
// ==========================================

use crate::db::{missing_source_tables, open_readonly_connection};
use crate::domain::records::{ForecastRecord, MovementRecord, StockRecord};
use crate::error::{ReportError, ReportResult};
use crate::importer::field_mapper::{
    FieldMapper, RawRecord, DATASET_FORECAST, DATASET_MOVEMENTS, DATASET_STOCK,
};
use crate::importer::record_source::{retain_since, RecordSource};
use chrono::NaiveDate;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

pub struct SqliteRecordSource {
    conn: Connection,
    db_path: String,
}

impl SqliteRecordSource {
    /// 只读打开数据源并检查源表
    ///
    /// # 返回
    /// - Err(SourceUnavailable): 文件不存在 / 无法打开 / 源表缺失
    pub fn open(db_path: &str) -> ReportResult<Self> {
        let conn = open_readonly_connection(db_path).map_err(|e| {
            ReportError::SourceUnavailable(format!("无法打开数据库 {}: {}", db_path, e))
        })?;
        Self::from_connection(conn, db_path)
    }

    /// 从已有连接创建数据源
    pub fn from_connection(conn: Connection, db_path: &str) -> ReportResult<Self> {
        let missing = missing_source_tables(&conn)?;
        if !missing.is_empty() {
            return Err(ReportError::SourceUnavailable(format!(
                "数据库 {} 缺少源表: {}",
                db_path,
                missing.join(", ")
            )));
        }

        Ok(Self {
            conn,
            db_path: db_path.to_string(),
        })
    }

    /// 执行查询并按列名收集为原始行
    fn query_raw(&self, dataset: &str, sql: &str, params: &[Value]) -> ReportResult<Vec<RawRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut raw = RawRecord::new(records.len() + 1);
            for (idx, name) in names.iter().enumerate() {
                let text = value_to_text(row.get_ref(idx)?)
                    .map_err(|msg| ReportError::malformed(dataset, raw.row_number, name, msg))?;
                if let Some(text) = text {
                    raw.insert(name, &text);
                }
            }
            records.push(raw);
        }

        debug!(dataset, rows = records.len(), "查询完成");
        Ok(records)
    }
}

impl RecordSource for SqliteRecordSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.db_path)
    }

    fn movements(
        &self,
        materials: &[String],
        since: NaiveDate,
    ) -> ReportResult<Vec<MovementRecord>> {
        if materials.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT material, centro, qtd_um_registro, canal, data_de_lancamento
            FROM zmb51
            WHERE material IN ({})
              AND data_de_lancamento >= ?{}
            "#,
            placeholders(materials.len()),
            materials.len() + 1
        );
        let mut params = material_params(materials);
        params.push(Value::Text(since.format("%Y-%m-%d").to_string()));

        let raw = self.query_raw(DATASET_MOVEMENTS, &sql, &params)?;
        let mut records = FieldMapper.map_all(&raw, FieldMapper::map_movement)?;
        // 文本比较对 YYYYMMDD 形式的日期只会多取不会漏取，这里按解析后的日期再收紧一次
        retain_since(&mut records, since);
        Ok(records)
    }

    fn stock(&self, materials: &[String]) -> ReportResult<Vec<StockRecord>> {
        if materials.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT material, estoque_total, cen AS centro
            FROM zstok
            WHERE material IN ({})
            "#,
            placeholders(materials.len())
        );

        let raw = self.query_raw(DATASET_STOCK, &sql, &material_params(materials))?;
        FieldMapper.map_all(&raw, FieldMapper::map_stock)
    }

    fn forecast(&self, materials: &[String]) -> ReportResult<Vec<ForecastRecord>> {
        if materials.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT material, qtde_pedido, data_prev_entrada, data_de_remessa
            FROM fup
            WHERE material IN ({})
            "#,
            placeholders(materials.len())
        );

        let raw = self.query_raw(DATASET_FORECAST, &sql, &material_params(materials))?;
        FieldMapper.map_all(&raw, FieldMapper::map_forecast)
    }
}

/// "?1, ?2, ..., ?n"
fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn material_params(materials: &[String]) -> Vec<Value> {
    materials.iter().map(|m| Value::Text(m.clone())).collect()
}

/// SQLite 单元格 → 文本（NULL → None）
fn value_to_text(value: ValueRef<'_>) -> Result<Option<String>, String> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(i.to_string())),
        ValueRef::Real(f) => Ok(Some(f.to_string())),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Some(s.to_string()))
            .map_err(|e| format!("非 UTF-8 文本: {}", e)),
        ValueRef::Blob(_) => Err("不支持二进制字段".to_string()),
    }
}
