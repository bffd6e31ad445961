// ==========================================
// 物料库存报表系统 - 报表组装引擎
// ==========================================
// 职责: 按物料对齐横向拼接多个宽表，注入固定补充表（可能削减量）
// 输出: 判别工厂报表 / 其余工厂报表
// 红线: 列名冲突直接报错，不得静默覆盖
// 红线: 判别工厂库存列缺失必须显式报错
// ==========================================

use crate::domain::matrix::WideMatrix;
use crate::domain::types::ColumnKey;
use crate::error::ReportResult;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 按行键对齐的横向拼接
///
/// 输出行键 = 全部输入行键的并集；某输入缺失的行在该输入的列上为无值。
///
/// # 返回
/// - Err(ColumnCollision): 不同输入提供了同名列
pub fn concat_aligned(name: &str, inputs: Vec<WideMatrix>) -> ReportResult<WideMatrix> {
    let columns: Vec<ColumnKey> = inputs
        .iter()
        .flat_map(|m| m.columns().iter().cloned())
        .collect();
    let mut output = WideMatrix::new(name, columns)?;

    let mut offset = 0;
    for input in &inputs {
        for (material, cells) in input.rows() {
            let row = output.ensure_row(material);
            row[offset..offset + cells.len()].copy_from_slice(cells);
        }
        offset += input.column_count();
    }

    debug!(
        matrix = name,
        inputs = inputs.len(),
        rows = output.row_count(),
        columns = output.column_count(),
        "对齐拼接完成"
    );
    Ok(output)
}

/// 固定映射 → 单列宽表
pub fn supplementary_matrix(
    name: &str,
    column: &str,
    table: &BTreeMap<String, f64>,
) -> ReportResult<WideMatrix> {
    let mut matrix = WideMatrix::new(name, vec![ColumnKey::Supplementary(column.to_string())])?;
    for (material, value) in table {
        matrix.set(material, column, Some(*value))?;
    }
    Ok(matrix)
}

/// 组装结果
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReports {
    /// 判别工厂报表（如 CE07）
    pub site_report: WideMatrix,
    /// 其余工厂报表
    pub other_sites_report: WideMatrix,
}

// ==========================================
// ReportAssembler - 报表组装器
// ==========================================
pub struct ReportAssembler {
    discriminant_site: String,
    reduction_column: String,
    reduction_table: BTreeMap<String, f64>,
    site_report_name: String,
    other_sites_report_name: String,
}

impl ReportAssembler {
    pub fn new(
        discriminant_site: impl Into<String>,
        reduction_column: impl Into<String>,
        reduction_table: BTreeMap<String, f64>,
    ) -> Self {
        let discriminant_site = discriminant_site.into();
        Self {
            site_report_name: format!("report_{}", discriminant_site),
            other_sites_report_name: format!("report_sem_{}", discriminant_site),
            discriminant_site,
            reduction_column: reduction_column.into(),
            reduction_table,
        }
    }

    /// 指定两张报表的矩阵名
    pub fn with_report_names(
        mut self,
        site_report_name: impl Into<String>,
        other_sites_report_name: impl Into<String>,
    ) -> Self {
        self.site_report_name = site_report_name.into();
        self.other_sites_report_name = other_sites_report_name.into();
        self
    }

    /// 组装两张报表
    ///
    /// # 参数
    /// - site_movements: 判别工厂的移动宽表（月份 + 滚动均值）
    /// - other_movements: 其余工厂的移动宽表
    /// - stock: 库存宽表（物料 × 工厂）
    ///
    /// # 列顺序
    /// - 判别工厂报表: 移动列, 判别工厂库存列
    /// - 其余工厂报表: 移动列, 其余工厂库存列, 补充表列
    ///
    /// # 返回
    /// - Err(MissingExpectedColumn): 库存宽表有数据但缺少判别工厂列
    /// - Err(ColumnCollision): 补充表列名与其他列重名
    pub fn assemble(
        &self,
        site_movements: WideMatrix,
        other_movements: WideMatrix,
        stock: WideMatrix,
    ) -> ReportResult<SiteReports> {
        let site = self.discriminant_site.as_str();
        let stock = self.require_site_column(stock)?;

        let site_stock = stock.select_columns(format!("{}_{}", stock.name(), site), |c| {
            c.is_site(site)
        });
        let other_stock = stock.select_columns(format!("{}_sem_{}", stock.name(), site), |c| {
            !c.is_site(site)
        });
        let reduction = supplementary_matrix(
            "dados_reducao",
            &self.reduction_column,
            &self.reduction_table,
        )?;

        let site_report = concat_aligned(&self.site_report_name, vec![site_movements, site_stock])?;
        let other_sites_report = concat_aligned(
            &self.other_sites_report_name,
            vec![other_movements, other_stock, reduction],
        )?;

        Ok(SiteReports {
            site_report,
            other_sites_report,
        })
    }

    /// 校验库存宽表包含判别工厂列
    ///
    /// 空库存（无任何行）不是数据错配：补一列全无值的判别工厂列。
    fn require_site_column(&self, stock: WideMatrix) -> ReportResult<WideMatrix> {
        let site = self.discriminant_site.as_str();
        if stock.has_column(site) {
            return Ok(stock);
        }
        if !stock.is_empty() {
            return Err(stock.missing_column(site));
        }

        warn!(site, "库存数据为空，判别工厂库存列全部为无值");
        let mut stock = stock;
        stock.append_column(ColumnKey::Site(site.to_string()), |_| None)?;
        Ok(stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::YearMonth;
    use crate::error::ReportError;

    fn month(m: u32) -> ColumnKey {
        ColumnKey::Month(YearMonth::new(2024, m).unwrap())
    }

    fn site(code: &str) -> ColumnKey {
        ColumnKey::Site(code.to_string())
    }

    fn reduction_table() -> BTreeMap<String, f64> {
        [("A8K3430", 11.0), ("A8K3230", 4.0), ("AAV8230", 50.0), ("AAV8330", 30.0), ("T671600", 2.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn stock_matrix(entries: &[(&str, &str, f64)], sites: &[&str]) -> WideMatrix {
        let mut m = WideMatrix::new("zstok", sites.iter().map(|s| site(s)).collect()).unwrap();
        for (material, code, qty) in entries {
            m.set(material, code, Some(*qty)).unwrap();
        }
        m
    }

    #[test]
    fn test_concat_aligned_row_union() {
        let mut left = WideMatrix::new("l", vec![month(1)]).unwrap();
        left.set("A", "2024-01", Some(1.0)).unwrap();
        let mut right = WideMatrix::new("r", vec![site("CE07")]).unwrap();
        right.set("B", "CE07", Some(2.0)).unwrap();

        let out = concat_aligned("out", vec![left, right]).unwrap();

        assert_eq!(out.row_keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(out.column_names(), vec!["2024-01", "CE07"]);
        assert_eq!(out.get("A", "CE07"), None);
        assert_eq!(out.get("B", "2024-01"), None);
        assert_eq!(out.get("B", "CE07"), Some(2.0));
    }

    #[test]
    fn test_concat_rejects_column_collision() {
        let a = WideMatrix::new("a", vec![ColumnKey::Supplementary("possivel_reducao".into())]).unwrap();
        let b = WideMatrix::new("b", vec![ColumnKey::Supplementary("possivel_reducao".into())]).unwrap();

        let err = concat_aligned("out", vec![a, b]).unwrap_err();
        assert!(matches!(err, ReportError::ColumnCollision { ref column } if column == "possivel_reducao"));
    }

    #[test]
    fn test_supplementary_column_is_none_outside_table() {
        let reduction = supplementary_matrix("r", "possivel_reducao", &reduction_table()).unwrap();
        let mut movements = WideMatrix::new("m", vec![month(1)]).unwrap();
        movements.set("ZZZ0001", "2024-01", Some(3.0)).unwrap();

        let out = concat_aligned("out", vec![movements, reduction]).unwrap();

        assert!(out.has_column("possivel_reducao"));
        assert_eq!(out.get("ZZZ0001", "possivel_reducao"), None);
        assert_eq!(out.get("AAV8230", "possivel_reducao"), Some(50.0));
        assert_eq!(out.row_count(), 6);
    }

    #[test]
    fn test_assemble_splits_stock_columns_by_site() {
        let assembler = ReportAssembler::new("CE07", "possivel_reducao", reduction_table());
        let mut site_mov = WideMatrix::new("mov_ce07", vec![month(1)]).unwrap();
        site_mov.set("A8K3430", "2024-01", Some(5.0)).unwrap();
        let other_mov = WideMatrix::new("mov_sem_ce07", vec![month(1)]).unwrap();
        let stock = stock_matrix(
            &[("A8K3430", "CE07", 100.0), ("T671600", "CE01", 8.0)],
            &["CE01", "CE07"],
        );

        let reports = assembler.assemble(site_mov, other_mov, stock).unwrap();

        assert_eq!(reports.site_report.column_names(), vec!["2024-01", "CE07"]);
        assert_eq!(reports.site_report.get("A8K3430", "CE07"), Some(100.0));
        // 仅有其他工厂库存的物料仍保留在判别工厂报表中
        assert!(reports.site_report.has_row("T671600"));
        assert_eq!(reports.site_report.get("T671600", "CE07"), None);

        assert_eq!(
            reports.other_sites_report.column_names(),
            vec!["2024-01", "CE01", "possivel_reducao"]
        );
        assert!(!reports.other_sites_report.has_column("CE07"));
        assert_eq!(reports.other_sites_report.get("T671600", "CE01"), Some(8.0));
        assert_eq!(reports.other_sites_report.get("T671600", "possivel_reducao"), Some(2.0));
    }

    #[test]
    fn test_assemble_missing_site_column_fails_loudly() {
        let assembler = ReportAssembler::new("CE07", "possivel_reducao", reduction_table());
        let stock = stock_matrix(&[("A8K3430", "CE01", 1.0)], &["CE01"]);
        let empty = || WideMatrix::new("m", vec![]).unwrap();

        let err = assembler.assemble(empty(), empty(), stock).unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingExpectedColumn { ref column, .. } if column == "CE07"
        ));
    }

    #[test]
    fn test_assemble_empty_stock_yields_empty_site_column() {
        let assembler = ReportAssembler::new("CE07", "possivel_reducao", reduction_table());
        let stock = WideMatrix::new("zstok", vec![]).unwrap();
        let empty = || WideMatrix::new("m", vec![]).unwrap();

        let reports = assembler.assemble(empty(), empty(), stock).unwrap();

        assert_eq!(reports.site_report.column_names(), vec!["CE07"]);
        assert!(reports.site_report.is_empty());
        assert_eq!(reports.other_sites_report.column_names(), vec!["possivel_reducao"]);
        assert_eq!(reports.other_sites_report.row_count(), 5);
    }
}
