//! BOM 儲存庫：版本擇優與展開閉包

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::bom::{BomEdge, BomVersion};
use crate::{BomError, Result};

/// BOM 儲存庫
///
/// 以表頭物料代碼分組的版本集合。展開一律走 [`resolve_default`]
/// 擇優出的單一版本，同一物料掛多版 BOM 時結果仍是確定的。
///
/// [`resolve_default`]: BomStore::resolve_default
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomStore {
    versions: BTreeMap<String, Vec<BomVersion>>,
}

impl BomStore {
    /// 創建空儲存庫
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一個 BOM 版本
    ///
    /// 表身父項必須與表頭物料一致，且用量不得為負。
    pub fn add_version(&mut self, version: BomVersion) -> Result<()> {
        for edge in &version.edges {
            if edge.parent_item != version.item_code {
                return Err(BomError::ParentMismatch {
                    bom_no: version.bom_no.clone(),
                    parent: edge.parent_item.clone(),
                    item: version.item_code.clone(),
                });
            }
            if edge.qty_per_parent_unit < rust_decimal::Decimal::ZERO {
                return Err(BomError::NegativeQuantity {
                    bom_no: version.bom_no.clone(),
                    child: edge.child_item.clone(),
                    qty: edge.qty_per_parent_unit,
                });
            }
        }

        self.versions
            .entry(version.item_code.clone())
            .or_default()
            .push(version);
        Ok(())
    }

    /// 擇優出物料的預設 BOM 版本
    ///
    /// 三段擇優，取不到才往下一段：
    /// 1. 啟用 且 預設 且 已定案
    /// 2. 啟用 且 已定案
    /// 3. 任一啟用版本
    ///
    /// 同段多版時取建立時間最新者。全部停用或無版本回傳 `None`。
    pub fn resolve_default(&self, item_code: &str) -> Option<&BomVersion> {
        let versions = self.versions.get(item_code)?;
        let active: Vec<&BomVersion> = versions.iter().filter(|v| v.active).collect();

        active
            .iter()
            .copied()
            .filter(|v| v.default_bom && v.finalized)
            .max_by_key(|v| v.created_at)
            .or_else(|| {
                active
                    .iter()
                    .copied()
                    .filter(|v| v.finalized)
                    .max_by_key(|v| v.created_at)
            })
            .or_else(|| active.iter().copied().max_by_key(|v| v.created_at))
    }

    /// 取得物料預設 BOM 的用量邊，無可用版本時回傳空切片
    pub fn edges_for(&self, item_code: &str) -> &[BomEdge] {
        self.resolve_default(item_code)
            .map(|v| v.edges.as_slice())
            .unwrap_or(&[])
    }

    /// 物料是否有可用（啟用中）的 BOM
    pub fn has_bom(&self, item_code: &str) -> bool {
        self.resolve_default(item_code).is_some()
    }

    /// 根集合沿預設 BOM 可達的全部物料代碼（含根自身）
    ///
    /// 廣度優先走訪，重複節點只展開一次，循環結構不會卡死。
    pub fn closure(&self, roots: &[String]) -> BTreeSet<String> {
        let mut reached: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for root in roots {
            if reached.insert(root.clone()) {
                queue.push_back(root);
            }
        }

        while let Some(code) = queue.pop_front() {
            for edge in self.edges_for(code) {
                if reached.insert(edge.child_item.clone()) {
                    queue.push_back(&edge.child_item);
                }
            }
        }

        reached
    }
}
