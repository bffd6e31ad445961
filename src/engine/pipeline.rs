// ==========================================
// 物料库存报表系统 - 报表流水线
// ==========================================
// 流程: 数据源读取 → 分区 → 宽表构建 ×3 → 报表组装 → 导出 ×2
// 红线: 单线程线性执行；任何失败终止本次运行，不重试
// 红线: 读取阶段失败时不产生任何输出文件
// ==========================================

use crate::config::ReportConfig;
use crate::domain::records::{ForecastRecord, SourceSnapshot};
use crate::engine::matrix_builder::MatrixBuilder;
use crate::engine::partitioner::Partitioner;
use crate::engine::report_assembler::{ReportAssembler, SiteReports};
use crate::error::{ReportError, ReportResult};
use crate::exporter::ReportExporter;
use crate::importer::RecordSource;
use chrono::{Months, NaiveDate};
use std::path::PathBuf;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// 纯变换阶段的输出
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub reports: SiteReports,
    /// 透传，不参与计算
    pub forecast: Vec<ForecastRecord>,
}

/// 一次运行的结果摘要
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub site_report_path: PathBuf,
    pub other_sites_report_path: PathBuf,
    pub site_report_rows: usize,
    pub other_sites_report_rows: usize,
    pub forecast_rows: usize,
}

// ==========================================
// ReportPipeline
// ==========================================
pub struct ReportPipeline {
    config: ReportConfig,
}

impl ReportPipeline {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// 库存移动的过账日期下限：today 往前 movement_window_months 个月
    pub fn movement_since(&self, today: NaiveDate) -> ReportResult<NaiveDate> {
        today
            .checked_sub_months(Months::new(self.config.movement_window_months))
            .ok_or_else(|| {
                ReportError::ConfigError(format!(
                    "无法计算回溯窗口: {} - {} 个月",
                    today, self.config.movement_window_months
                ))
            })
    }

    /// 读取三组源记录
    pub fn fetch(&self, source: &dyn RecordSource, today: NaiveDate) -> ReportResult<SourceSnapshot> {
        let materials = &self.config.materials;
        let since = self.movement_since(today)?;

        let movements = source.movements(materials, since)?;
        let stock = source.stock(materials)?;
        let forecast = source.forecast(materials)?;

        info!(
            source = %source.describe(),
            since = %since,
            movements = movements.len(),
            stock = stock.len(),
            forecast = forecast.len(),
            "源数据读取完成"
        );
        for (dataset, len) in [("zmb51", movements.len()), ("zstok", stock.len()), ("fup", forecast.len())] {
            if len == 0 {
                warn!(dataset, "源数据为空");
            }
        }

        Ok(SourceSnapshot {
            movements,
            stock,
            forecast,
        })
    }

    /// 纯变换：源记录 → 两张报表
    pub fn transform(&self, snapshot: SourceSnapshot) -> ReportResult<PipelineOutput> {
        let cfg = &self.config;
        let site = cfg.discriminant_site.as_str();

        let partition = Partitioner::split_movements_by_site(snapshot.movements, site);
        info!(
            site,
            matching = partition.matching.len(),
            others = partition.others.len(),
            "库存移动分区完成"
        );

        let movement_builder = MatrixBuilder::new(cfg.movement_aggregator);
        let site_movements = movement_builder.build_movement_matrix(
            &format!("zmb51_{}", site),
            &partition.matching,
            &cfg.rolling_windows,
        )?;
        let other_movements = movement_builder.build_movement_matrix(
            &format!("zmb51_sem_{}", site),
            &partition.others,
            &cfg.rolling_windows,
        )?;
        let stock = MatrixBuilder::new(cfg.stock_aggregator).build_stock_matrix("zstok", &snapshot.stock)?;

        let reports = ReportAssembler::new(site, cfg.reduction_column.as_str(), cfg.reduction_table.clone())
            .with_report_names(cfg.site_report_name.as_str(), cfg.other_sites_report_name.as_str())
            .assemble(site_movements, other_movements, stock)?;

        info!(
            site_rows = reports.site_report.row_count(),
            site_columns = reports.site_report.column_count(),
            other_rows = reports.other_sites_report.row_count(),
            other_columns = reports.other_sites_report.column_count(),
            "报表组装完成"
        );

        Ok(PipelineOutput {
            reports,
            forecast: snapshot.forecast,
        })
    }

    /// 完整运行：读取 → 变换 → 导出
    pub fn run(
        &self,
        source: &dyn RecordSource,
        exporter: &dyn ReportExporter,
        today: NaiveDate,
    ) -> ReportResult<RunSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("report_run", run_id = %run_id);
        let _guard = span.enter();

        let snapshot = self.fetch(source, today)?;
        let output = self.transform(snapshot)?;
        let reports = &output.reports;

        let site_report_path = exporter.export(&reports.site_report, &self.config.site_report_name)?;
        let other_sites_report_path =
            exporter.export(&reports.other_sites_report, &self.config.other_sites_report_name)?;

        info!(forecast = output.forecast.len(), "运行完成");
        Ok(RunSummary {
            run_id,
            site_report_path,
            other_sites_report_path,
            site_report_rows: reports.site_report.row_count(),
            other_sites_report_rows: reports.other_sites_report.row_count(),
            forecast_rows: output.forecast.len(),
        })
    }
}
