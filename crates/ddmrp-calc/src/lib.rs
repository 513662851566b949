//! DDMRP 計算引擎
//!
//! 這個 crate 實作計劃核心的演算法：解耦前置時間、兩輪 BOM 展開的
//! 訂單建議、MOQ 與批量圓整、FIFO 物料分配，以及庫存狀態顏色分級。
//! 所有計算都只讀 `ddmrp-core` 的目錄與快照，不寫回任何狀態，
//! 同一份輸入重算任意次結果相同。

pub mod allocation;
pub mod engine;
pub mod lead_time;
pub mod netting;
pub mod status;

pub use allocation::{
    AllocationReport, AllocationRow, AllocationSummary, FifoAllocator, FullKitStatus,
};
pub use engine::{OrderRecommendation, RecommendationEngine, RecommendationReport};
pub use lead_time::{LeadTimeBatchOutcome, LeadTimeCalculator, LeadTimeOutcome, LeadTimeTrace};
pub use netting::NettingCalculator;
pub use status::{
    ColourTally, DailyOnHandRow, OnHandColour, OnHandStatus, OnHandStatusCalculator,
};

use serde::{Deserialize, Serialize};

/// 警告嚴重度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningSeverity {
    /// 提示訊息
    Info,
    /// 警告（結果可用，但輸入資料有瑕疵）
    Warning,
    /// 錯誤（該物料的結果缺漏）
    Error,
}

/// 計算途中收集的警告
///
/// 循環 BOM、缺主檔子項這類資料瑕疵不會中斷計算，
/// 以警告形式隨結果帶回。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningWarning {
    /// 嚴重度
    pub severity: WarningSeverity,
    /// 相關物料代碼
    pub item_code: String,
    /// 警告內容
    pub message: String,
}

impl PlanningWarning {
    /// 創建提示級警告
    pub fn info(item_code: String, message: String) -> Self {
        Self {
            severity: WarningSeverity::Info,
            item_code,
            message,
        }
    }

    /// 創建警告級警告
    pub fn warning(item_code: String, message: String) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            item_code,
            message,
        }
    }

    /// 創建錯誤級警告
    pub fn error(item_code: String, message: String) -> Self {
        Self {
            severity: WarningSeverity::Error,
            item_code,
            message,
        }
    }
}
