//! 物料主檔模型與 SKU 分類

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 緩衝旗標（解耦點標記）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BufferFlag {
    /// 緩衝件（解耦點，以 TOG 補貨）
    Buffer,
    /// 非緩衝件（需求向上傳遞）
    #[default]
    NonBuffer,
}

/// 品項類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// Black Bar
    BB,
    /// Round Bar
    RB,
    /// Bought Out（外購件）
    BO,
    /// Raw Material（原料）
    RM,
    /// 貿易件
    Traded,
}

/// 物料群組
///
/// 系統行為只區分「原物料」與其他群組：原物料為 BOM 終端，
/// 不再往下展開。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ItemGroup {
    /// 原物料（BOM 終端）
    RawMaterial,
    /// 一般群組
    #[default]
    Standard,
}

/// SKU 分類（緩衝旗標 × 品項類型）
///
/// A 結尾為緩衝件（Make/Procure to Availability），
/// O 結尾為非緩衝件（Make/Procure to Order）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkuType {
    BBMTA,
    BBMTO,
    RBMTA,
    RBMTO,
    BOTA,
    BOTO,
    PTA,
    PTO,
    TRMTA,
    TRMTO,
}

impl SkuType {
    /// 由緩衝旗標與品項類型推導 SKU 分類
    ///
    /// 品項類型缺漏時無法分類，回傳 `None`（此類物料仍參與計算，
    /// 但一律使用非採購型公式）。
    pub fn classify(buffer_flag: BufferFlag, item_type: Option<ItemType>) -> Option<Self> {
        let is_buffer = buffer_flag == BufferFlag::Buffer;

        item_type.map(|item_type| match item_type {
            ItemType::BB => {
                if is_buffer {
                    SkuType::BBMTA
                } else {
                    SkuType::BBMTO
                }
            }
            ItemType::RB => {
                if is_buffer {
                    SkuType::RBMTA
                } else {
                    SkuType::RBMTO
                }
            }
            ItemType::BO => {
                if is_buffer {
                    SkuType::BOTA
                } else {
                    SkuType::BOTO
                }
            }
            ItemType::RM => {
                if is_buffer {
                    SkuType::PTA
                } else {
                    SkuType::PTO
                }
            }
            ItemType::Traded => {
                if is_buffer {
                    SkuType::TRMTA
                } else {
                    SkuType::TRMTO
                }
            }
        })
    }

    /// 是否為採購型 SKU（基準公式需扣除未結採購單量）
    pub fn is_purchase_type(&self) -> bool {
        matches!(
            self,
            SkuType::BOTA | SkuType::BOTO | SkuType::PTA | SkuType::PTO
        )
    }

    /// 是否為緩衝型 SKU（A 結尾）
    pub fn is_availability_type(&self) -> bool {
        matches!(
            self,
            SkuType::BBMTA | SkuType::RBMTA | SkuType::BOTA | SkuType::PTA | SkuType::TRMTA
        )
    }
}

/// 物料主檔
///
/// 計劃核心讀取的物料屬性完整集合。所有數量欄位皆有零值預設，
/// 零代表「功能未啟用」（例如 MOQ 為 0 即不套用 MOQ）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMaster {
    /// 物料代碼
    pub code: String,

    /// 緩衝旗標
    pub buffer_flag: BufferFlag,

    /// 品項類型（可能缺漏，缺漏時 SKU 無法分類）
    pub item_type: Option<ItemType>,

    /// 物料群組（原物料為 BOM 終端）
    pub item_group: ItemGroup,

    /// 自身前置時間（天）
    pub lead_time_days: u32,

    /// 最小訂購量（0 表示不套用）
    pub moq: Decimal,

    /// 批量大小（0 表示不套用；與 MOQ 互斥，同時設定時 MOQ 優先）
    pub batch_size: Decimal,

    /// 緩衝水位：綠頂（Top of Green）
    pub tog: Decimal,

    /// 緩衝水位：黃頂（Top of Yellow）
    pub toy: Decimal,

    /// 緩衝水位：紅頂（Top of Red）
    pub tor: Decimal,

    /// 等級（篩選用）
    pub grade: Option<String>,

    /// 類別（篩選用）
    pub category: Option<String>,

    /// 是否為採購件
    pub is_purchase_item: bool,

    /// 是否為銷售件
    pub is_sales_item: bool,

    /// 是否停用（停用物料不納入工作集）
    pub disabled: bool,
}

impl ItemMaster {
    /// 創建新的物料主檔
    pub fn new(code: String, buffer_flag: BufferFlag) -> Self {
        Self {
            code,
            buffer_flag,
            item_type: None,
            item_group: ItemGroup::Standard,
            lead_time_days: 0,
            moq: Decimal::ZERO,
            batch_size: Decimal::ZERO,
            tog: Decimal::ZERO,
            toy: Decimal::ZERO,
            tor: Decimal::ZERO,
            grade: None,
            category: None,
            is_purchase_item: false,
            is_sales_item: false,
            disabled: false,
        }
    }

    /// 建構器模式：設置品項類型
    pub fn with_item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }

    /// 建構器模式：設置物料群組
    pub fn with_item_group(mut self, item_group: ItemGroup) -> Self {
        self.item_group = item_group;
        self
    }

    /// 建構器模式：設置前置時間（天）
    pub fn with_lead_time_days(mut self, days: u32) -> Self {
        self.lead_time_days = days;
        self
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_moq(mut self, moq: Decimal) -> Self {
        self.moq = moq;
        self
    }

    /// 建構器模式：設置批量大小
    pub fn with_batch_size(mut self, batch_size: Decimal) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// 建構器模式：設置緩衝水位（TOG / TOY / TOR）
    pub fn with_buffer_zones(mut self, tog: Decimal, toy: Decimal, tor: Decimal) -> Self {
        self.tog = tog;
        self.toy = toy;
        self.tor = tor;
        self
    }

    /// 建構器模式：設置等級
    pub fn with_grade(mut self, grade: String) -> Self {
        self.grade = Some(grade);
        self
    }

    /// 建構器模式：設置類別
    pub fn with_category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    /// 建構器模式：標記為採購件
    pub fn with_purchase_item(mut self, flag: bool) -> Self {
        self.is_purchase_item = flag;
        self
    }

    /// 建構器模式：標記為銷售件
    pub fn with_sales_item(mut self, flag: bool) -> Self {
        self.is_sales_item = flag;
        self
    }

    /// 建構器模式：標記為停用
    pub fn as_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// 是否為緩衝件
    pub fn is_buffer(&self) -> bool {
        self.buffer_flag == BufferFlag::Buffer
    }

    /// 是否為原物料（BOM 終端）
    pub fn is_raw_material(&self) -> bool {
        self.item_group == ItemGroup::RawMaterial
    }

    /// 推導 SKU 分類
    pub fn sku_type(&self) -> Option<SkuType> {
        SkuType::classify(self.buffer_flag, self.item_type)
    }

    /// 是否為採購型 SKU（分類缺漏視為否）
    pub fn is_purchase_sku(&self) -> bool {
        self.sku_type().is_some_and(|sku| sku.is_purchase_type())
    }
}
