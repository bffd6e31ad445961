// ==========================================
// 物料库存报表系统 - 批处理入口
// ==========================================
// 用法:
//   material-stock-report [config.json]
// 配置文件也可通过 MATERIAL_STOCK_REPORT_CONFIG 指定
// ==========================================

use anyhow::Context;
use material_stock_report::config::{env_keys, ReportConfig};
use material_stock_report::engine::ReportPipeline;
use material_stock_report::exporter::exporter_for;
use material_stock_report::importer::open_record_source;
use material_stock_report::logging;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", material_stock_report::APP_NAME);
    tracing::info!("系统版本: {}", material_stock_report::VERSION);
    tracing::info!("==================================================");

    let config_path: Option<PathBuf> = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(env_keys::CONFIG_PATH).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let config = ReportConfig::load(config_path.as_deref()).context("加载配置失败")?;

    let source = open_record_source(&config.source).context("打开数据源失败")?;
    let exporter = exporter_for(config.output_format, &config.output_dir);
    let today = chrono::Local::now().date_naive();

    let pipeline = ReportPipeline::new(config);
    let summary = pipeline
        .run(source.as_ref(), exporter.as_ref(), today)
        .context("报表生成失败")?;

    tracing::info!(
        "✅ 文件已导出: {} ({} 行)",
        summary.site_report_path.display(),
        summary.site_report_rows
    );
    tracing::info!(
        "✅ 文件已导出: {} ({} 行)",
        summary.other_sites_report_path.display(),
        summary.other_sites_report_rows
    );
    Ok(())
}
