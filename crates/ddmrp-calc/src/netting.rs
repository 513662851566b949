//! MOQ 與批量圓整

use rust_decimal::Decimal;

/// 訂購量圓整計算器
///
/// 把淨需求量套上最小訂購量（MOQ）與批量規則，得到實際建議量。
/// 兩者同時設定時 MOQ 優先，批量規則不再套用。
pub struct NettingCalculator;

impl NettingCalculator {
    /// 套用 MOQ 與批量規則
    ///
    /// # 規則
    ///
    /// 1. 淨需求不為正，直接回傳 0（不會只因 MOQ 就產生訂購量）
    /// 2. MOQ > 0：低於 MOQ 補到 MOQ，高於 MOQ 照原量
    /// 3. 否則批量 > 0：向上圓整到批量的整數倍
    /// 4. 都未設定：照原量
    pub fn apply(net_qty: Decimal, moq: Decimal, batch_size: Decimal) -> Decimal {
        if net_qty <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let rounded = if moq > Decimal::ZERO {
            if moq < net_qty {
                net_qty
            } else {
                moq
            }
        } else if batch_size > Decimal::ZERO {
            (net_qty / batch_size).ceil() * batch_size
        } else {
            net_qty
        };

        rounded.max(Decimal::ZERO)
    }

    /// 自基準量扣除物料需求單已涵蓋量，夾零得到淨需求
    pub fn net_of(base_qty: Decimal, mrq: Decimal) -> Decimal {
        (base_qty - mrq).max(Decimal::ZERO)
    }
}
