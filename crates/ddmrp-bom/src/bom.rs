//! BOM 版本與用量邊

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// BOM 用量邊（父項對子項的單位用量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEdge {
    /// 父項物料代碼
    pub parent_item: String,
    /// 子項物料代碼
    pub child_item: String,
    /// 表身用量（相對於表頭基準量）
    pub qty_per_parent_unit: Decimal,
    /// 表頭基準量（表身用量除以此值才是每單位用量）
    pub bom_normalizing_qty: Decimal,
}

impl BomEdge {
    /// 創建基準量為 1 的用量邊
    pub fn new(parent_item: String, child_item: String, qty_per_parent_unit: Decimal) -> Self {
        Self {
            parent_item,
            child_item,
            qty_per_parent_unit,
            bom_normalizing_qty: Decimal::ONE,
        }
    }

    /// 建構器模式：設置表頭基準量
    pub fn with_normalizing_qty(mut self, normalizing_qty: Decimal) -> Self {
        self.bom_normalizing_qty = normalizing_qty;
        self
    }

    /// 每單位父項的有效子項用量
    ///
    /// 基準量不為正時視為 1，避免除以零或翻轉正負號。
    pub fn effective_qty_per_unit(&self) -> Decimal {
        if self.bom_normalizing_qty > Decimal::ZERO {
            self.qty_per_parent_unit / self.bom_normalizing_qty
        } else {
            self.qty_per_parent_unit
        }
    }
}

/// BOM 版本（表頭與表身）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomVersion {
    /// BOM 編號
    pub bom_no: String,
    /// 表頭物料代碼（此 BOM 生產的物料）
    pub item_code: String,
    /// 是否啟用
    pub active: bool,
    /// 是否為預設 BOM
    pub default_bom: bool,
    /// 是否已審核定案
    pub finalized: bool,
    /// 建立時間（版本擇優的決勝條件）
    pub created_at: DateTime<Utc>,
    /// 表身用量邊
    pub edges: Vec<BomEdge>,
}

impl BomVersion {
    /// 創建啟用中、未定案、非預設的空版本
    pub fn new(bom_no: String, item_code: String, created_at: DateTime<Utc>) -> Self {
        Self {
            bom_no,
            item_code,
            active: true,
            default_bom: false,
            finalized: false,
            created_at,
            edges: Vec::new(),
        }
    }

    /// 建構器模式：加入一條用量邊
    pub fn add_edge(mut self, edge: BomEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// 建構器模式：標記為預設 BOM
    pub fn as_default(mut self) -> Self {
        self.default_bom = true;
        self
    }

    /// 建構器模式：標記為已審核定案
    pub fn as_finalized(mut self) -> Self {
        self.finalized = true;
        self
    }

    /// 建構器模式：標記為停用
    pub fn as_inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
