//! 庫存狀態顏色分級
//!
//! 以「庫存 ÷（綠頂 + 合格需求）」的百分比把物料分進五個顏色帶，
//! 供緩衝看板與每日留存使用。百分比無條件進位成整數再分帶。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ddmrp_core::{DemandSnapshot, ItemAvailability, ItemCatalog, ItemFilter, ItemMaster, SkuType};

/// 庫存狀態顏色帶
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OnHandColour {
    /// 0% 以下：斷料
    Black,
    /// 1% 到 34%：告急
    Red,
    /// 35% 到 67%：注意
    Yellow,
    /// 68% 到 100%：健康
    Green,
    /// 超過 100%：過量
    White,
}

/// 單一物料的庫存狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnHandStatus {
    /// 緩衝滲透百分比（無條件進位）
    pub percent: i64,
    /// 顏色帶
    pub colour: OnHandColour,
}

/// 每日庫存顏色留存列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyOnHandRow {
    /// 物料代碼
    pub item_code: String,
    /// SKU 分類
    pub sku_type: Option<SkuType>,
    /// 緩衝滲透百分比（分母不為正時無法判定）
    pub on_hand_percent: Option<i64>,
    /// 顏色帶（分母不為正時無法判定）
    pub on_hand_colour: Option<OnHandColour>,
    /// 留存日期
    pub captured_on: NaiveDate,
}

/// 顏色帶計數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourTally {
    pub black: usize,
    pub red: usize,
    pub yellow: usize,
    pub green: usize,
    pub white: usize,
    /// 分母不為正，無法判定
    pub undefined: usize,
}

impl ColourTally {
    fn record(&mut self, colour: Option<OnHandColour>) {
        match colour {
            Some(OnHandColour::Black) => self.black += 1,
            Some(OnHandColour::Red) => self.red += 1,
            Some(OnHandColour::Yellow) => self.yellow += 1,
            Some(OnHandColour::Green) => self.green += 1,
            Some(OnHandColour::White) => self.white += 1,
            None => self.undefined += 1,
        }
    }

    /// 計入的物料總數
    pub fn total(&self) -> usize {
        self.black + self.red + self.yellow + self.green + self.white + self.undefined
    }
}

/// 庫存狀態計算器
pub struct OnHandStatusCalculator;

impl OnHandStatusCalculator {
    /// 緩衝滲透百分比
    ///
    /// 分母為「綠頂 + 合格需求」，不為正時回傳 `None`。
    /// 比率乘以 100 後無條件進位成整數，負庫存得到負百分比。
    pub fn percent(item: &ItemMaster, avail: &ItemAvailability) -> Option<i64> {
        let denominator = item.tog + avail.qualified_demand;
        if denominator <= Decimal::ZERO {
            return None;
        }
        let ratio = avail.stock / denominator;
        (ratio * Decimal::ONE_HUNDRED).ceil().to_i64()
    }

    /// 百分比對應的顏色帶
    pub fn colour_of_percent(percent: i64) -> OnHandColour {
        if percent <= 0 {
            OnHandColour::Black
        } else if percent <= 34 {
            OnHandColour::Red
        } else if percent <= 67 {
            OnHandColour::Yellow
        } else if percent <= 100 {
            OnHandColour::Green
        } else {
            OnHandColour::White
        }
    }

    /// 計算物料的庫存狀態，分母不為正時回傳 `None`
    pub fn status(item: &ItemMaster, avail: &ItemAvailability) -> Option<OnHandStatus> {
        let percent = Self::percent(item, avail)?;
        Some(OnHandStatus {
            percent,
            colour: Self::colour_of_percent(percent),
        })
    }

    /// 對篩選出的物料做每日顏色留存
    pub fn capture_daily(
        catalog: &ItemCatalog,
        filter: &ItemFilter,
        snapshot: &DemandSnapshot,
        captured_on: NaiveDate,
    ) -> Vec<DailyOnHandRow> {
        catalog
            .select(filter)
            .into_iter()
            .map(|item| {
                let avail = snapshot.availability(&item.code);
                let status = Self::status(item, &avail);
                DailyOnHandRow {
                    item_code: item.code.clone(),
                    sku_type: item.sku_type(),
                    on_hand_percent: status.map(|s| s.percent),
                    on_hand_colour: status.map(|s| s.colour),
                    captured_on,
                }
            })
            .collect()
    }

    /// 按 SKU 分類統計顏色帶分布
    pub fn colour_distribution(
        rows: &[DailyOnHandRow],
    ) -> BTreeMap<Option<SkuType>, ColourTally> {
        let mut distribution: BTreeMap<Option<SkuType>, ColourTally> = BTreeMap::new();
        for row in rows {
            distribution
                .entry(row.sku_type)
                .or_default()
                .record(row.on_hand_colour);
        }
        distribution
    }
}
