//! DDMRP 計劃核心的資料模型與類型定義
//!
//! 這個 crate 提供計劃引擎共用的基礎結構：物料主檔與 SKU 分類、
//! 物料目錄與篩選、未結單據的需求快照，以及計算選項。
//! 不含任何計算邏輯，演算法實作在 `ddmrp-calc`。

pub mod catalog;
pub mod item;
pub mod options;
pub mod snapshot;

pub use catalog::{ItemCatalog, ItemFilter};
pub use item::{BufferFlag, ItemGroup, ItemMaster, ItemType, SkuType};
pub use options::PlanningOptions;
pub use snapshot::{
    DemandSnapshot, ItemAvailability, MaterialRequestRow, ProductionOrderRow, PurchaseOrderRow,
    SalesOrderRow, SnapshotInput, StockRow,
};

use thiserror::Error;

/// 計劃核心錯誤類型
#[derive(Error, Debug)]
pub enum PlanningError {
    /// 找不到物料主檔
    #[error("找不到物料主檔: {0}")]
    ItemNotFound(String),

    /// 找不到可用的 BOM 版本
    #[error("物料 {0} 沒有可用的 BOM 版本")]
    BomNotFound(String),

    /// 輸入資料不合法
    #[error("輸入資料不合法: {0}")]
    InvalidInput(String),

    /// 計算過程錯誤
    #[error("計算錯誤: {0}")]
    CalculationError(String),

    /// 序列化錯誤
    #[error("序列化錯誤: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 計劃核心 Result 類型別名
pub type Result<T> = std::result::Result<T, PlanningError>;
