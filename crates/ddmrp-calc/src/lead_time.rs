//! 解耦前置時間計算
//!
//! 沿預設 BOM 往下走，累計「自身前置時間 + 最長子項貢獻」。
//! 緩衝子項是解耦點，貢獻一律為 0 且不再往下展開；
//! 原物料群組與無 BOM 的物料只算自身前置時間。

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ddmrp_bom::BomStore;
use ddmrp_core::{ItemCatalog, ItemMaster, PlanningError, Result};

use crate::{PlanningWarning, WarningSeverity};

/// 單一物料的解耦前置時間結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeOutcome {
    /// 解耦前置時間（天）
    pub days: u32,
    /// 走訪途中收集的警告（循環、缺主檔子項）
    pub warnings: Vec<PlanningWarning>,
}

/// 批次計算結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeBatchOutcome {
    /// 各物料的解耦前置時間（代碼升冪）
    pub days: BTreeMap<String, u32>,
    /// 全部物料的警告彙總
    pub warnings: Vec<PlanningWarning>,
}

/// 解耦前置時間的展開軌跡（除錯與報表用）
///
/// `total_days` 是節點作為子項時對父項的貢獻：緩衝子項固定為 0，
/// 其餘節點為「自身 + 最長子項貢獻」。根節點的 `total_days`
/// 就是解耦前置時間本身。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeTrace {
    /// 物料代碼
    pub item_code: String,
    /// 自身前置時間（天）
    pub own_days: u32,
    /// 對父項的貢獻（天）
    pub total_days: u32,
    /// 是否為緩衝件
    pub is_buffer: bool,
    /// 此邊是否構成循環（循環邊貢獻 0，不再展開）
    pub cycle: bool,
    /// 子項軌跡
    pub children: Vec<LeadTimeTrace>,
}

/// 走訪狀態：路徑以 push/pop 維護，備忘錄只收錄無循環的子樹
#[derive(Default)]
struct LeadTimeContext {
    memo: BTreeMap<String, u32>,
    path: Vec<String>,
    warnings: Vec<PlanningWarning>,
}

/// 解耦前置時間計算器
pub struct LeadTimeCalculator<'a> {
    catalog: &'a ItemCatalog,
    boms: &'a BomStore,
}

impl<'a> LeadTimeCalculator<'a> {
    /// 創建計算器
    pub fn new(catalog: &'a ItemCatalog, boms: &'a BomStore) -> Self {
        Self { catalog, boms }
    }

    /// 計算單一物料的解耦前置時間
    ///
    /// 根物料必須存在於目錄；子項缺主檔只略過並記警告。
    pub fn compute(&self, item_code: &str) -> Result<LeadTimeOutcome> {
        let item = self
            .catalog
            .get(item_code)
            .ok_or_else(|| PlanningError::ItemNotFound(item_code.to_string()))?;

        debug!("計算 {} 的解耦前置時間", item_code);

        let mut ctx = LeadTimeContext::default();
        let (days, _clean) = self.walk(item, &mut ctx);

        debug!("{} 的解耦前置時間 = {} 天", item_code, days);

        Ok(LeadTimeOutcome {
            days,
            warnings: ctx.warnings,
        })
    }

    /// 批次計算多個物料的解耦前置時間
    ///
    /// 各物料平行計算，互不共用備忘錄。缺主檔的物料不會出現在
    /// 結果中，只留下一筆錯誤級警告。
    pub fn compute_batch(&self, item_codes: &[String]) -> LeadTimeBatchOutcome {
        let computed: Vec<(String, Result<LeadTimeOutcome>)> = item_codes
            .par_iter()
            .map(|code| (code.clone(), self.compute(code)))
            .collect();

        let mut days = BTreeMap::new();
        let mut warnings = Vec::new();
        for (code, outcome) in computed {
            match outcome {
                Ok(outcome) => {
                    days.insert(code, outcome.days);
                    warnings.extend(outcome.warnings);
                }
                Err(err) => {
                    warnings.push(PlanningWarning::error(code, err.to_string()));
                }
            }
        }

        LeadTimeBatchOutcome { days, warnings }
    }

    /// 展開完整軌跡樹（不使用備忘錄，樹是完整的）
    pub fn explain(&self, item_code: &str) -> Result<LeadTimeTrace> {
        let item = self
            .catalog
            .get(item_code)
            .ok_or_else(|| PlanningError::ItemNotFound(item_code.to_string()))?;

        let mut path = Vec::new();
        Ok(self.trace(item, &mut path))
    }

    fn walk(&self, item: &ItemMaster, ctx: &mut LeadTimeContext) -> (u32, bool) {
        if let Some(&days) = ctx.memo.get(&item.code) {
            return (days, true);
        }

        // 原物料是 BOM 終端，即使掛有 BOM 也不往下走
        if item.is_raw_material() {
            ctx.memo.insert(item.code.clone(), item.lead_time_days);
            return (item.lead_time_days, true);
        }

        let edges = self.boms.edges_for(&item.code);
        if edges.is_empty() {
            ctx.memo.insert(item.code.clone(), item.lead_time_days);
            return (item.lead_time_days, true);
        }

        ctx.path.push(item.code.clone());

        let mut max_child: u32 = 0;
        let mut clean = true;
        for edge in edges {
            let child_code = edge.child_item.as_str();

            if ctx.path.iter().any(|p| p == child_code) {
                ctx.warnings.push(PlanningWarning::warning(
                    child_code.to_string(),
                    format!("BOM 出現循環: {} -> {}，此邊貢獻以 0 計", item.code, child_code),
                ));
                clean = false;
                continue;
            }

            let child = match self.catalog.get(child_code) {
                Some(child) => child,
                None => {
                    ctx.warnings.push(PlanningWarning::warning(
                        child_code.to_string(),
                        format!("BOM 子項 {} 缺少物料主檔，已略過", child_code),
                    ));
                    continue;
                }
            };

            // 緩衝子項是解耦點，貢獻 0
            if child.is_buffer() {
                continue;
            }

            let (child_days, child_clean) = self.walk(child, ctx);
            clean &= child_clean;
            max_child = max_child.max(child_days);
        }

        ctx.path.pop();

        let total = item.lead_time_days + max_child;
        // 子樹碰到循環時結果依路徑而定，不可寫入備忘錄
        if clean {
            ctx.memo.insert(item.code.clone(), total);
        }
        (total, clean)
    }

    fn trace(&self, item: &ItemMaster, path: &mut Vec<String>) -> LeadTimeTrace {
        let mut node = LeadTimeTrace {
            item_code: item.code.clone(),
            own_days: item.lead_time_days,
            total_days: item.lead_time_days,
            is_buffer: item.is_buffer(),
            cycle: false,
            children: Vec::new(),
        };

        if item.is_raw_material() {
            return node;
        }

        let edges = self.boms.edges_for(&item.code);
        if edges.is_empty() {
            return node;
        }

        path.push(item.code.clone());

        let mut max_child: u32 = 0;
        for edge in edges {
            let child_code = edge.child_item.as_str();

            if path.iter().any(|p| p == child_code) {
                node.children.push(LeadTimeTrace {
                    item_code: child_code.to_string(),
                    own_days: 0,
                    total_days: 0,
                    is_buffer: false,
                    cycle: true,
                    children: Vec::new(),
                });
                continue;
            }

            let child = match self.catalog.get(child_code) {
                Some(child) => child,
                None => continue,
            };

            if child.is_buffer() {
                node.children.push(LeadTimeTrace {
                    item_code: child.code.clone(),
                    own_days: child.lead_time_days,
                    total_days: 0,
                    is_buffer: true,
                    cycle: false,
                    children: Vec::new(),
                });
                continue;
            }

            let child_trace = self.trace(child, path);
            max_child = max_child.max(child_trace.total_days);
            node.children.push(child_trace);
        }

        path.pop();

        node.total_days = item.lead_time_days + max_child;
        node
    }
}

/// 內部輔助：彙總批次警告中的最高嚴重度
pub(crate) fn max_severity(warnings: &[PlanningWarning]) -> Option<WarningSeverity> {
    warnings.iter().map(|w| w.severity).max()
}
