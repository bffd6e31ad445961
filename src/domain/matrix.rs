// ==========================================
// 物料库存报表系统 - 宽表模型
// ==========================================
// 结构: 物料号(行键, 唯一, 升序) → 有序列序列
// 红线: 缺失单元格为 None（"无值"），不得写成 0
// ==========================================

use crate::domain::types::ColumnKey;
use crate::error::{ReportError, ReportResult};
use std::collections::{BTreeMap, HashSet};

/// 单元格：None 表示无值
pub type Cell = Option<f64>;

// ==========================================
// WideMatrix - 物料 × 列 宽表
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct WideMatrix {
    /// 矩阵名（用于日志与错误信息）
    name: String,
    columns: Vec<ColumnKey>,
    rows: BTreeMap<String, Vec<Cell>>,
}

impl WideMatrix {
    /// 创建空矩阵（无行）
    ///
    /// # 返回
    /// - Err(ColumnCollision): 列名重复
    pub fn new(name: impl Into<String>, columns: Vec<ColumnKey>) -> ReportResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(ReportError::ColumnCollision {
                    column: column.name(),
                });
            }
        }

        Ok(Self {
            name: name.into(),
            columns,
            rows: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(ColumnKey::name).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// 无任何行
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_row(&self, material: &str) -> bool {
        self.rows.contains_key(material)
    }

    /// 行键（升序）
    pub fn row_keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// 按行遍历（升序）
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn row(&self, material: &str) -> Option<&[Cell]> {
        self.rows.get(material).map(Vec::as_slice)
    }

    /// 读取单元格；行或列不存在时同样返回 None
    pub fn get(&self, material: &str, column: &str) -> Cell {
        let idx = self.column_index(column)?;
        self.rows.get(material).and_then(|row| row[idx])
    }

    /// 确保行存在（新行全部为无值），返回该行可变引用
    pub fn ensure_row(&mut self, material: &str) -> &mut [Cell] {
        let width = self.columns.len();
        self.rows
            .entry(material.to_string())
            .or_insert_with(|| vec![None; width])
            .as_mut_slice()
    }

    /// 写入单元格
    ///
    /// # 返回
    /// - Err(MissingExpectedColumn): 列不存在
    pub fn set(&mut self, material: &str, column: &str, value: Cell) -> ReportResult<()> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| self.missing_column(column))?;
        self.ensure_row(material)[idx] = value;
        Ok(())
    }

    /// 追加派生列，每行的值由当前行已有单元格计算
    ///
    /// # 返回
    /// - Err(ColumnCollision): 列名已存在
    pub fn append_column<F>(&mut self, key: ColumnKey, mut derive: F) -> ReportResult<()>
    where
        F: FnMut(&[Cell]) -> Cell,
    {
        if self.has_column(&key.name()) {
            return Err(ReportError::ColumnCollision { column: key.name() });
        }

        for values in self.rows.values_mut() {
            let derived = derive(values);
            values.push(derived);
        }
        self.columns.push(key);
        Ok(())
    }

    /// 按谓词选取列，保留全部行
    pub fn select_columns<P>(&self, name: impl Into<String>, keep: P) -> WideMatrix
    where
        P: Fn(&ColumnKey) -> bool,
    {
        let picked: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| keep(c))
            .map(|(i, _)| i)
            .collect();

        WideMatrix {
            name: name.into(),
            columns: picked.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|(k, row)| (k.clone(), picked.iter().map(|&i| row[i]).collect()))
                .collect(),
        }
    }

    /// 构造本矩阵的 MissingExpectedColumn 错误
    pub fn missing_column(&self, column: &str) -> ReportError {
        ReportError::MissingExpectedColumn {
            matrix: self.name.clone(),
            column: column.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::YearMonth;

    fn month(m: u32) -> ColumnKey {
        ColumnKey::Month(YearMonth::new(2024, m).unwrap())
    }

    #[test]
    fn test_new_rejects_duplicate_column_names() {
        let result = WideMatrix::new("m", vec![month(1), month(1)]);
        assert!(matches!(result, Err(ReportError::ColumnCollision { .. })));
    }

    #[test]
    fn test_set_and_get_keep_missing_as_none() {
        let mut m = WideMatrix::new("m", vec![month(1), month(2)]).unwrap();
        m.set("A", "2024-02", Some(3.0)).unwrap();

        assert_eq!(m.get("A", "2024-02"), Some(3.0));
        assert_eq!(m.get("A", "2024-01"), None);
        assert_eq!(m.get("B", "2024-01"), None);
        assert_eq!(m.row("A"), Some(&[None, Some(3.0)][..]));
    }

    #[test]
    fn test_set_unknown_column_is_missing_expected_column() {
        let mut m = WideMatrix::new("zstok", vec![ColumnKey::Site("CE01".into())]).unwrap();
        let err = m.set("A", "CE07", Some(1.0)).unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingExpectedColumn { ref column, ref matrix }
                if column == "CE07" && matrix == "zstok"
        ));
    }

    #[test]
    fn test_rows_are_sorted_by_material() {
        let mut m = WideMatrix::new("m", vec![month(1)]).unwrap();
        m.set("T671600", "2024-01", Some(1.0)).unwrap();
        m.set("A8K3430", "2024-01", Some(2.0)).unwrap();

        let keys: Vec<&str> = m.row_keys().collect();
        assert_eq!(keys, vec!["A8K3430", "T671600"]);
    }

    #[test]
    fn test_append_column_rejects_collision() {
        let mut m = WideMatrix::new("m", vec![ColumnKey::TrailingMean(3)]).unwrap();
        let err = m.append_column(ColumnKey::TrailingMean(3), |_| None).unwrap_err();
        assert!(matches!(err, ReportError::ColumnCollision { .. }));
    }

    #[test]
    fn test_select_columns_keeps_all_rows() {
        let mut m = WideMatrix::new(
            "zstok",
            vec![ColumnKey::Site("CE01".into()), ColumnKey::Site("CE07".into())],
        )
        .unwrap();
        m.set("A", "CE07", Some(100.0)).unwrap();
        m.set("B", "CE01", Some(5.0)).unwrap();

        let only = m.select_columns("zstok_ce07", |c| c.is_site("CE07"));
        assert_eq!(only.column_names(), vec!["CE07"]);
        assert_eq!(only.row_count(), 2);
        assert_eq!(only.get("A", "CE07"), Some(100.0));
        assert_eq!(only.get("B", "CE07"), None);
    }
}
