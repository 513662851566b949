//! FIFO 物料分配
//!
//! 把建議訂購量為正的父項，按「庫存狀態百分比升冪」排隊，
//! 依序從子項的共用庫存池、再從在製加未結採購池裡搶料。
//! 狀態越差的父項越先拿料；同一子項的池子被前面的父項扣完，
//! 後面的父項就只能列入短缺。

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use ddmrp_bom::BomStore;
use ddmrp_core::{DemandSnapshot, ItemCatalog};

use crate::engine::RecommendationReport;
use crate::status::OnHandStatusCalculator;

/// 父項的齊料狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FullKitStatus {
    /// 全部子項需求都有著落
    FullKit,
    /// 部分子項需求有著落
    Partial,
    /// 完全沒分到料
    Pending,
}

/// 一條 BOM 邊的分配結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    /// 父項物料代碼
    pub parent_item: String,
    /// 子項物料代碼
    pub child_item: String,
    /// 子項需求量（父項建議量 × 每單位用量）
    pub required_qty: Decimal,
    /// 自庫存池分到的量
    pub stock_allocated: Decimal,
    /// 庫存池扣完後尚缺的量
    pub stock_shortfall: Decimal,
    /// 自在製加未結採購池分到的量
    pub wip_po_allocated: Decimal,
    /// 兩段池都扣完後仍未滿足的量
    pub wip_po_shortfall: Decimal,
    /// 父項的庫存狀態百分比（排隊依據，無法判定者排最後）
    pub parent_on_hand_percent: Option<i64>,
    /// 父項的齊料狀態（同父項的每一列相同）
    pub full_kit_status: FullKitStatus,
}

/// 齊料狀態統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub full_kit_parents: usize,
    pub partial_parents: usize,
    pub pending_parents: usize,
}

/// 分配結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReport {
    /// 分配列（依父項排隊順序，同父項內依 BOM 表身順序）
    pub rows: Vec<AllocationRow>,
    /// 各父項的齊料狀態
    pub parent_status: BTreeMap<String, FullKitStatus>,
    /// 統計
    pub summary: AllocationSummary,
}

impl AllocationReport {
    /// 查詢父項的齊料狀態
    ///
    /// 建議量為零或沒有 BOM 的父項不參與分配，回傳 `None`。
    pub fn status_of(&self, parent_item: &str) -> Option<FullKitStatus> {
        self.parent_status.get(parent_item).copied()
    }

    /// 某父項的全部分配列
    pub fn rows_for_parent<'b>(
        &'b self,
        parent_item: &'b str,
    ) -> impl Iterator<Item = &'b AllocationRow> {
        self.rows
            .iter()
            .filter(move |row| row.parent_item == parent_item)
    }
}

/// 子項的兩段式共用池
struct ChildPool {
    stock: Decimal,
    wip_po: Decimal,
}

/// FIFO 物料分配器
pub struct FifoAllocator<'a> {
    catalog: &'a ItemCatalog,
    boms: &'a BomStore,
    snapshot: &'a DemandSnapshot,
}

impl<'a> FifoAllocator<'a> {
    /// 創建分配器
    pub fn new(
        catalog: &'a ItemCatalog,
        boms: &'a BomStore,
        snapshot: &'a DemandSnapshot,
    ) -> Self {
        Self {
            catalog,
            boms,
            snapshot,
        }
    }

    /// 對一份建議結果做 FIFO 分配
    pub fn allocate(&self, report: &RecommendationReport) -> AllocationReport {
        // 參與分配的父項:建議量為正且有 BOM 表身
        let mut parents: Vec<(Option<i64>, String, Decimal)> = report
            .recommendations
            .values()
            .filter(|rec| rec.rounded_qty > Decimal::ZERO)
            .filter(|rec| !self.boms.edges_for(&rec.item_code).is_empty())
            .map(|rec| {
                let percent = self.catalog.get(&rec.item_code).and_then(|item| {
                    OnHandStatusCalculator::percent(
                        item,
                        &self.snapshot.availability(&rec.item_code),
                    )
                });
                (percent, rec.item_code.clone(), rec.rounded_qty)
            })
            .collect();

        // 狀態百分比升冪,無法判定者最後,同分以代碼決勝
        parents.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.cmp(&b.1)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });

        info!("開始 FIFO 物料分配，{} 個父項排隊", parents.len());

        let mut pools: BTreeMap<String, ChildPool> = BTreeMap::new();
        let mut rows: Vec<AllocationRow> = Vec::new();
        let mut parent_status: BTreeMap<String, FullKitStatus> = BTreeMap::new();
        let mut summary = AllocationSummary::default();

        for (percent, parent, rounded_qty) in parents {
            let mut parent_rows: Vec<AllocationRow> = Vec::new();
            let mut total_allocated = Decimal::ZERO;
            let mut total_shortfall = Decimal::ZERO;

            for edge in self.boms.edges_for(&parent) {
                let pool = pools
                    .entry(edge.child_item.clone())
                    .or_insert_with(|| {
                        let avail = self.snapshot.availability(&edge.child_item);
                        ChildPool {
                            stock: avail.stock.max(Decimal::ZERO),
                            wip_po: (avail.wip + avail.open_po).max(Decimal::ZERO),
                        }
                    });

                let required_qty = rounded_qty * edge.effective_qty_per_unit();
                let stock_allocated = required_qty.min(pool.stock);
                pool.stock -= stock_allocated;

                let stock_shortfall = required_qty - stock_allocated;
                let wip_po_allocated = stock_shortfall.min(pool.wip_po);
                pool.wip_po -= wip_po_allocated;

                let wip_po_shortfall = stock_shortfall - wip_po_allocated;
                total_allocated += stock_allocated + wip_po_allocated;
                total_shortfall += wip_po_shortfall;

                parent_rows.push(AllocationRow {
                    parent_item: parent.clone(),
                    child_item: edge.child_item.clone(),
                    required_qty,
                    stock_allocated,
                    stock_shortfall,
                    wip_po_allocated,
                    wip_po_shortfall,
                    parent_on_hand_percent: percent,
                    full_kit_status: FullKitStatus::Pending,
                });
            }

            let status = if total_shortfall == Decimal::ZERO {
                FullKitStatus::FullKit
            } else if total_allocated == Decimal::ZERO {
                FullKitStatus::Pending
            } else {
                FullKitStatus::Partial
            };
            for row in &mut parent_rows {
                row.full_kit_status = status;
            }

            match status {
                FullKitStatus::FullKit => summary.full_kit_parents += 1,
                FullKitStatus::Partial => summary.partial_parents += 1,
                FullKitStatus::Pending => summary.pending_parents += 1,
            }
            parent_status.insert(parent, status);
            rows.extend(parent_rows);
        }

        info!(
            "FIFO 分配完成: 齊料 {} / 部分 {} / 未分配 {}",
            summary.full_kit_parents, summary.partial_parents, summary.pending_parents
        );

        AllocationReport {
            rows,
            parent_status,
            summary,
        }
    }
}
