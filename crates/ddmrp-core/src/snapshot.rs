//! 需求快照：單據彙總與可用量視圖
//!
//! 快照輸入是「未結單據」的列集合。已結案、取消或停止的單據
//! 應由呼叫端的儲存層過濾，不在此處判斷單據狀態。
//! 彙總時逐列先夾零再加總，避免超交、超收的單據沖銷其他
//! 仍未結的量。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::options::PlanningOptions;

/// 庫存列（倉位層級的現有量）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRow {
    /// 物料代碼
    pub item_code: String,
    /// 倉位
    pub location: String,
    /// 現有量（允許負值，照實加總）
    pub on_hand_qty: Decimal,
}

impl StockRow {
    pub fn new(item_code: String, location: String, on_hand_qty: Decimal) -> Self {
        Self {
            item_code,
            location,
            on_hand_qty,
        }
    }
}

/// 未結生產工單列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrderRow {
    /// 物料代碼
    pub item_code: String,
    /// 工單數量
    pub ordered_qty: Decimal,
    /// 已生產數量
    pub produced_qty: Decimal,
}

impl ProductionOrderRow {
    pub fn new(item_code: String, ordered_qty: Decimal, produced_qty: Decimal) -> Self {
        Self {
            item_code,
            ordered_qty,
            produced_qty,
        }
    }

    /// 在製量貢獻：max(0, 工單量 - 已生產量)
    pub fn open_qty(&self) -> Decimal {
        (self.ordered_qty - self.produced_qty).max(Decimal::ZERO)
    }
}

/// 未結採購單列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderRow {
    /// 物料代碼
    pub item_code: String,
    /// 採購數量
    pub ordered_qty: Decimal,
    /// 已收貨數量
    pub received_qty: Decimal,
}

impl PurchaseOrderRow {
    pub fn new(item_code: String, ordered_qty: Decimal, received_qty: Decimal) -> Self {
        Self {
            item_code,
            ordered_qty,
            received_qty,
        }
    }

    /// 未結採購量貢獻：max(0, 採購量 - 已收量)
    pub fn open_qty(&self) -> Decimal {
        (self.ordered_qty - self.received_qty).max(Decimal::ZERO)
    }
}

/// 未結銷售單列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrderRow {
    /// 物料代碼
    pub item_code: String,
    /// 訂購數量
    pub ordered_qty: Decimal,
    /// 已交貨數量
    pub fulfilled_qty: Decimal,
    /// 交期（缺漏時視為即期，仍計入合格需求）
    pub due_date: Option<NaiveDate>,
}

impl SalesOrderRow {
    pub fn new(item_code: String, ordered_qty: Decimal, fulfilled_qty: Decimal) -> Self {
        Self {
            item_code,
            ordered_qty,
            fulfilled_qty,
            due_date: None,
        }
    }

    /// 建構器模式：設置交期
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// 未交量貢獻：max(0, 訂購量 - 已交量)
    pub fn open_qty(&self) -> Decimal {
        (self.ordered_qty - self.fulfilled_qty).max(Decimal::ZERO)
    }

    /// 是否計入合格需求（交期不晚於基準日，或無交期）
    pub fn is_qualified(&self, as_of: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due <= as_of,
            None => true,
        }
    }
}

/// 物料需求單列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequestRow {
    /// 物料代碼
    pub item_code: String,
    /// 請購數量
    pub requested_qty: Decimal,
    /// 已轉單數量
    pub ordered_qty: Decimal,
}

impl MaterialRequestRow {
    pub fn new(item_code: String, requested_qty: Decimal, ordered_qty: Decimal) -> Self {
        Self {
            item_code,
            requested_qty,
            ordered_qty,
        }
    }

    /// 未轉單量貢獻：max(0, 請購量 - 已轉量)
    pub fn open_qty(&self) -> Decimal {
        (self.requested_qty - self.ordered_qty).max(Decimal::ZERO)
    }
}

/// 快照輸入（各類未結單據的列集合）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotInput {
    pub stock_rows: Vec<StockRow>,
    pub production_orders: Vec<ProductionOrderRow>,
    pub purchase_orders: Vec<PurchaseOrderRow>,
    pub sales_orders: Vec<SalesOrderRow>,
    pub material_requests: Vec<MaterialRequestRow>,
}

impl SnapshotInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置庫存列
    pub fn with_stock_rows(mut self, rows: Vec<StockRow>) -> Self {
        self.stock_rows = rows;
        self
    }

    /// 建構器模式：設置生產工單列
    pub fn with_production_orders(mut self, rows: Vec<ProductionOrderRow>) -> Self {
        self.production_orders = rows;
        self
    }

    /// 建構器模式：設置採購單列
    pub fn with_purchase_orders(mut self, rows: Vec<PurchaseOrderRow>) -> Self {
        self.purchase_orders = rows;
        self
    }

    /// 建構器模式：設置銷售單列
    pub fn with_sales_orders(mut self, rows: Vec<SalesOrderRow>) -> Self {
        self.sales_orders = rows;
        self
    }

    /// 建構器模式：設置物料需求單列
    pub fn with_material_requests(mut self, rows: Vec<MaterialRequestRow>) -> Self {
        self.material_requests = rows;
        self
    }
}

/// 單一物料的可用量彙總
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAvailability {
    /// 庫存現有量（排除指定倉位後的加總）
    pub stock: Decimal,
    /// 在製量
    pub wip: Decimal,
    /// 未結採購量
    pub open_po: Decimal,
    /// 未結銷售量（不分交期）
    pub open_so: Decimal,
    /// 合格需求（交期不晚於基準日的未結銷售量）
    pub qualified_demand: Decimal,
    /// 物料需求單未轉單量
    pub mrq: Decimal,
}

/// 需求快照
///
/// 一次計算的凍結輸入。同一份快照餵入計算引擎任意次，
/// 結果必定相同。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandSnapshot {
    /// 快照 ID
    pub snapshot_id: Uuid,
    /// 合格需求的基準日
    pub as_of: NaiveDate,
    availability: BTreeMap<String, ItemAvailability>,
}

impl DemandSnapshot {
    /// 從單據列建立快照
    pub fn build(input: &SnapshotInput, options: &PlanningOptions) -> Self {
        let mut availability: BTreeMap<String, ItemAvailability> = BTreeMap::new();

        for row in &input.stock_rows {
            if options.is_location_excluded(&row.location) {
                continue;
            }
            let entry = availability.entry(row.item_code.clone()).or_default();
            entry.stock += row.on_hand_qty;
        }

        for row in &input.production_orders {
            let entry = availability.entry(row.item_code.clone()).or_default();
            entry.wip += row.open_qty();
        }

        for row in &input.purchase_orders {
            let entry = availability.entry(row.item_code.clone()).or_default();
            entry.open_po += row.open_qty();
        }

        for row in &input.sales_orders {
            let entry = availability.entry(row.item_code.clone()).or_default();
            let open = row.open_qty();
            entry.open_so += open;
            if row.is_qualified(options.as_of) {
                entry.qualified_demand += open;
            }
        }

        for row in &input.material_requests {
            let entry = availability.entry(row.item_code.clone()).or_default();
            entry.mrq += row.open_qty();
        }

        Self {
            snapshot_id: Uuid::new_v4(),
            as_of: options.as_of,
            availability,
        }
    }

    /// 查詢物料可用量，無資料時回傳全零
    pub fn availability(&self, item_code: &str) -> ItemAvailability {
        self.availability
            .get(item_code)
            .copied()
            .unwrap_or_default()
    }

    /// 快照內有單據資料的物料數
    pub fn len(&self) -> usize {
        self.availability.len()
    }

    /// 快照是否無任何單據資料
    pub fn is_empty(&self) -> bool {
        self.availability.is_empty()
    }

    /// 按代碼升冪遍歷有資料的物料
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemAvailability)> {
        self.availability
            .iter()
            .map(|(code, avail)| (code.as_str(), avail))
    }
}
