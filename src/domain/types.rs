// ==========================================
// 物料库存报表系统 - 领域类型定义
// ==========================================
// 职责: 时间桶 / 列键 / 聚合算子
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 年月时间桶 (TimeKey)
// ==========================================
// 排序: 先年后月，即时间先后
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 日期 → 所在自然月
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ==========================================
// 列键 (Column Key)
// ==========================================
// 宽表中每一列的来源：月份聚合 / 工厂聚合 / 滚动均值 / 补充固定值
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnKey {
    Month(YearMonth),
    Site(String),
    TrailingMean(usize),
    Supplementary(String),
}

impl ColumnKey {
    /// 导出时使用的列名
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn is_month(&self) -> bool {
        matches!(self, ColumnKey::Month(_))
    }

    pub fn is_site(&self, code: &str) -> bool {
        matches!(self, ColumnKey::Site(s) if s == code)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Month(ym) => write!(f, "{}", ym),
            ColumnKey::Site(code) => write!(f, "{}", code),
            ColumnKey::TrailingMean(months) => write!(f, "media_{}m", months),
            ColumnKey::Supplementary(name) => write!(f, "{}", name),
        }
    }
}

// ==========================================
// 聚合算子 (Aggregator)
// ==========================================
// First/Last 非交换，按记录输入顺序折叠
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    #[default]
    Sum,
    Mean,
    First,
    Last,
}

impl Aggregator {
    /// 折叠单元格内的全部取值（按输入顺序）；空序列 → None
    pub fn fold(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Aggregator::Sum => Some(values.iter().sum()),
            Aggregator::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
            Aggregator::First => values.first().copied(),
            Aggregator::Last => values.last().copied(),
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregator::Sum => write!(f, "sum"),
            Aggregator::Mean => write!(f, "mean"),
            Aggregator::First => write!(f, "first"),
            Aggregator::Last => write!(f, "last"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_display_and_order() {
        let jan = YearMonth::new(2024, 1).unwrap();
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(jan.to_string(), "2024-01");
        assert!(dec < jan);
        assert!(YearMonth::new(2024, 13).is_none());
    }

    #[test]
    fn test_year_month_from_date() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(YearMonth::from_date(d), YearMonth::new(2024, 2).unwrap());
    }

    #[test]
    fn test_column_key_names() {
        assert_eq!(ColumnKey::TrailingMean(3).name(), "media_3m");
        assert_eq!(ColumnKey::Site("CE07".into()).name(), "CE07");
        assert_eq!(
            ColumnKey::Supplementary("possivel_reducao".into()).name(),
            "possivel_reducao"
        );
    }

    #[test]
    fn test_aggregator_fold() {
        let values = [4.0, 1.0, 7.0];
        assert_eq!(Aggregator::Sum.fold(&values), Some(12.0));
        assert_eq!(Aggregator::Mean.fold(&values), Some(4.0));
        assert_eq!(Aggregator::First.fold(&values), Some(4.0));
        assert_eq!(Aggregator::Last.fold(&values), Some(7.0));
        assert_eq!(Aggregator::Sum.fold(&[]), None);
    }
}
