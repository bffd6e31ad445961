// ==========================================
// 物料库存报表系统 - 数据源 Trait
// ==========================================
// 职责: 定义三类长表记录的读取接口（不包含实现）
// 实现者: SqliteRecordSource, CsvRecordSource
// ==========================================

use crate::domain::records::{ForecastRecord, MovementRecord, StockRecord};
use crate::error::ReportResult;
use chrono::NaiveDate;

pub trait RecordSource {
    /// 数据源描述（日志用）
    fn describe(&self) -> String;

    /// 读取库存移动
    ///
    /// # 参数
    /// - materials: 物料白名单
    /// - since: 过账日期下限（包含）
    ///
    /// # 返回
    /// - Ok(Vec<MovementRecord>): 可能为空
    /// - Err(SourceUnavailable / MalformedRecord)
    fn movements(&self, materials: &[String], since: NaiveDate)
        -> ReportResult<Vec<MovementRecord>>;

    /// 读取当前库存快照
    fn stock(&self, materials: &[String]) -> ReportResult<Vec<StockRecord>>;

    /// 读取采购在途预测
    fn forecast(&self, materials: &[String]) -> ReportResult<Vec<ForecastRecord>>;
}

/// 按过账日期窗口过滤（保持顺序）
pub(crate) fn retain_since(records: &mut Vec<MovementRecord>, since: NaiveDate) {
    records.retain(|r| r.date >= since);
}
