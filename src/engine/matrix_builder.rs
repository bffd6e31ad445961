// ==========================================
// 物料库存报表系统 - 宽表构建引擎
// ==========================================
// 职责: 长表记录 → 物料 × 列 宽表（透视 + 聚合），追加滚动均值列
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 缺失组合保持无值，滚动均值分母不计无值单元格
// ==========================================

use crate::domain::matrix::{Cell, WideMatrix};
use crate::domain::records::{MovementRecord, StockRecord};
use crate::domain::types::{Aggregator, ColumnKey, YearMonth};
use crate::error::ReportResult;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

// ==========================================
// MatrixBuilder - 透视构建器
// ==========================================
pub struct MatrixBuilder {
    aggregator: Aggregator,
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self::new(Aggregator::Sum)
    }
}

impl MatrixBuilder {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    /// 将长表记录透视为宽表
    ///
    /// # 参数
    /// - name: 结果矩阵名
    /// - records: 长表记录（输入顺序即单元格内折叠顺序）
    /// - row_key: 行键提取（物料号）
    /// - column_key: 列键派生（月份 / 工厂）
    /// - value: 数值字段
    ///
    /// # 返回
    /// - 行键为全部出现过的物料；列键去重后按自然顺序升序
    /// - 无记录命中的 (行, 列) 为无值
    pub fn pivot<R, K, C, V>(
        &self,
        name: &str,
        records: &[R],
        row_key: K,
        column_key: C,
        value: V,
    ) -> ReportResult<WideMatrix>
    where
        K: Fn(&R) -> &str,
        C: Fn(&R) -> ColumnKey,
        V: Fn(&R) -> f64,
    {
        let mut columns: BTreeSet<ColumnKey> = BTreeSet::new();
        let mut cells: HashMap<(&str, ColumnKey), Vec<f64>> = HashMap::new();

        for record in records {
            let row = row_key(record);
            let column = column_key(record);
            columns.insert(column.clone());
            cells.entry((row, column)).or_default().push(value(record));
        }

        let mut matrix = WideMatrix::new(name, columns.into_iter().collect())?;
        for ((row, column), values) in &cells {
            matrix.set(row, &column.name(), self.aggregator.fold(values))?;
        }

        debug!(
            matrix = name,
            rows = matrix.row_count(),
            columns = matrix.column_count(),
            aggregator = %self.aggregator,
            "透视完成"
        );
        Ok(matrix)
    }

    /// 库存移动 → 物料 × 月份 宽表，并追加滚动均值列
    ///
    /// # 参数
    /// - windows: 滚动窗口（月数），如 [3, 6] → media_3m / media_6m
    pub fn build_movement_matrix(
        &self,
        name: &str,
        records: &[MovementRecord],
        windows: &[usize],
    ) -> ReportResult<WideMatrix> {
        let mut matrix = self.pivot(
            name,
            records,
            |r| r.material.as_str(),
            |r| ColumnKey::Month(YearMonth::from_date(r.date)),
            |r| r.quantity,
        )?;
        append_trailing_means(&mut matrix, windows)?;
        Ok(matrix)
    }

    /// 库存快照 → 物料 × 工厂 宽表
    pub fn build_stock_matrix(
        &self,
        name: &str,
        records: &[StockRecord],
    ) -> ReportResult<WideMatrix> {
        self.pivot(
            name,
            records,
            |r| r.material.as_str(),
            |r| ColumnKey::Site(r.site.clone()),
            |r| r.quantity_on_hand,
        )
    }
}

/// 追加滚动均值列
///
/// 每个窗口只在月份列上计算（已追加的均值列不参与后续窗口）。
/// 窗口取最后 K 个月份列；月份列不足 K 个时取全部。
pub fn append_trailing_means(matrix: &mut WideMatrix, windows: &[usize]) -> ReportResult<()> {
    let month_indices: Vec<usize> = matrix
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_month())
        .map(|(i, _)| i)
        .collect();

    for &window in windows {
        let start = month_indices.len().saturating_sub(window);
        let trailing = &month_indices[start..];
        matrix.append_column(ColumnKey::TrailingMean(window), |row| {
            let cells: Vec<Cell> = trailing.iter().map(|&i| row[i]).collect();
            trailing_mean(&cells, window)
        })?;
    }
    Ok(())
}

/// 对有序单元格取最后 `window` 个，按存在值求均值
///
/// 无值不计入分母；窗口内全部无值时结果为无值。
pub fn trailing_mean(cells: &[Cell], window: usize) -> Cell {
    let start = cells.len().saturating_sub(window);
    let present: Vec<f64> = cells[start..].iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}
