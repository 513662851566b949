//! BOM 版本管理與展開結構
//!
//! 提供用量邊、BOM 版本擇優與可達閉包。這個 crate 只處理結構，
//! 不碰數量計算：前置時間與訂單建議的展開邏輯在 `ddmrp-calc`。

pub mod bom;
pub mod store;

pub use bom::{BomEdge, BomVersion};
pub use store::BomStore;

use rust_decimal::Decimal;
use thiserror::Error;

/// BOM 結構錯誤類型
#[derive(Error, Debug)]
pub enum BomError {
    /// 表身父項與表頭物料不一致
    #[error("BOM {bom_no} 的表身父項 {parent} 與表頭物料 {item} 不一致")]
    ParentMismatch {
        bom_no: String,
        parent: String,
        item: String,
    },

    /// 表身用量為負
    #[error("BOM {bom_no} 的子項 {child} 用量為負: {qty}")]
    NegativeQuantity {
        bom_no: String,
        child: String,
        qty: Decimal,
    },
}

/// BOM 結構 Result 類型別名
pub type Result<T> = std::result::Result<T, BomError>;
