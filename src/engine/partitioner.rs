// ==========================================
// 物料库存报表系统 - 分区引擎
// ==========================================
// 职责: 按判别字段（工厂代码）将长表记录拆为两个不相交子序列
// 红线: 不丢不重，子序列内保持输入顺序
// ==========================================

use crate::domain::records::MovementRecord;

/// 分区结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Partition<R> {
    /// 判别字段 == 判别值
    pub matching: Vec<R>,
    /// 判别字段 != 判别值
    pub others: Vec<R>,
}

impl<R> Partition<R> {
    pub fn len(&self) -> usize {
        self.matching.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Partitioner;

impl Partitioner {
    /// 通用拆分
    ///
    /// # 参数
    /// - records: 长表记录（所有权转移）
    /// - discriminant: 判别字段提取
    /// - value: 判别值
    pub fn split_by<R, F>(records: Vec<R>, discriminant: F, value: &str) -> Partition<R>
    where
        F: Fn(&R) -> &str,
    {
        let (matching, others) = records
            .into_iter()
            .partition(|record| discriminant(record) == value);
        Partition { matching, others }
    }

    /// 按工厂代码拆分库存移动
    pub fn split_movements_by_site(
        records: Vec<MovementRecord>,
        site: &str,
    ) -> Partition<MovementRecord> {
        Self::split_by(records, |r| r.site.as_str(), site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn movement(material: &str, site: &str, quantity: f64) -> MovementRecord {
        MovementRecord {
            material: material.to_string(),
            site: site.to_string(),
            quantity,
            channel: "01".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_split_is_complete_and_disjoint() {
        let records = vec![
            movement("A", "CE07", 1.0),
            movement("B", "CE01", 2.0),
            movement("C", "CE07", 3.0),
            movement("D", "CE03", 4.0),
        ];
        let input = records.clone();

        let part = Partitioner::split_movements_by_site(records, "CE07");

        assert_eq!(part.len(), input.len());
        assert!(part.matching.iter().all(|r| r.site == "CE07"));
        assert!(part.others.iter().all(|r| r.site != "CE07"));
        for record in &input {
            let hits = part.matching.iter().chain(part.others.iter()).filter(|r| *r == record).count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_split_preserves_input_order() {
        let records = vec![
            movement("Z", "CE07", 1.0),
            movement("Y", "CE01", 2.0),
            movement("X", "CE07", 3.0),
            movement("W", "CE02", 4.0),
        ];

        let part = Partitioner::split_movements_by_site(records, "CE07");

        let matching: Vec<&str> = part.matching.iter().map(|r| r.material.as_str()).collect();
        let others: Vec<&str> = part.others.iter().map(|r| r.material.as_str()).collect();
        assert_eq!(matching, vec!["Z", "X"]);
        assert_eq!(others, vec!["Y", "W"]);
    }

    #[test]
    fn test_split_keeps_duplicates() {
        let records = vec![movement("A", "CE07", 1.0), movement("A", "CE07", 1.0)];
        let part = Partitioner::split_movements_by_site(records, "CE07");
        assert_eq!(part.matching.len(), 2);
        assert!(part.others.is_empty());
    }

    #[test]
    fn test_split_empty_input() {
        let part = Partitioner::split_movements_by_site(Vec::new(), "CE07");
        assert!(part.is_empty());
    }
}
