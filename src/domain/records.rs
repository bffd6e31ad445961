// ==========================================
// 物料库存报表系统 - 源记录模型
// ==========================================
// 用途: 数据源读取后的类型化长表记录，每次运行新建、流水线消费后丢弃
// 对齐: zmb51 / zstok / fup 三张源表
// ==========================================

use chrono::NaiveDate;

// ==========================================
// MovementRecord - 库存移动明细 (zmb51)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRecord {
    pub material: String, // 物料号
    pub site: String,     // 工厂代码（centro）
    pub quantity: f64,    // 登记数量（qtd_um_registro）
    pub channel: String,  // 渠道（canal）
    pub date: NaiveDate,  // 过账日期（data_de_lancamento）
}

// ==========================================
// StockRecord - 当前库存快照 (zstok)
// ==========================================
// 每个 (物料, 工厂) 一行，非时间序列
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub material: String,
    pub site: String,
    pub quantity_on_hand: f64, // estoque_total
}

// ==========================================
// ForecastRecord - 采购在途预测 (fup)
// ==========================================
// 原样透传，不参与计算
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub material: String,
    pub quantity_ordered: f64,            // qtde_pedido
    pub expected_arrival_date: NaiveDate, // data_prev_entrada
    pub shipment_date: NaiveDate,         // data_de_remessa
}

// ==========================================
// SourceSnapshot - 一次运行读取到的三组记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSnapshot {
    pub movements: Vec<MovementRecord>,
    pub stock: Vec<StockRecord>,
    pub forecast: Vec<ForecastRecord>,
}
