//! 計算選項

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 計算選項
///
/// 控制快照彙總與訂單建議計算的共用參數。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningOptions {
    /// 合格需求的基準日（交期不晚於此日的銷售量才算合格需求）
    pub as_of: NaiveDate,
    /// 排除的倉位（報廢倉、退貨倉等不可用庫存）
    pub excluded_locations: Vec<String>,
}

impl PlanningOptions {
    /// 創建指定基準日的選項，預設不排除任何倉位
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            excluded_locations: Vec::new(),
        }
    }

    /// 建構器模式：設置排除倉位
    pub fn with_excluded_locations(mut self, locations: Vec<String>) -> Self {
        self.excluded_locations = locations;
        self
    }

    /// 判斷倉位是否被排除
    pub fn is_location_excluded(&self, location: &str) -> bool {
        self.excluded_locations.iter().any(|l| l == location)
    }
}
