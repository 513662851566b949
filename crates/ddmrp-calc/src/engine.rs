//! 訂單建議引擎
//!
//! 兩輪 BOM 展開的訂單建議計算。每一輪都從凍結的種子建議出發，
//! 沿 BOM 把父項建議量攤成子項需求，子項再以完整管線
//! （基準量 → 扣 MRQ → MOQ/批量圓整）重算。第一輪摸清需求分布，
//! 第二輪以第一輪的需求重新凍結種子再展開，最後對輸出集合
//! 整批重算收斂。
//!
//! 緩衝子項是解耦點：父項需求不往下累積，但緩衝件自身的補貨
//! 建議若為正，仍繼續往下展開。

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ddmrp_bom::BomStore;
use ddmrp_core::{DemandSnapshot, ItemCatalog, ItemMaster, PlanningError, Result, SkuType};

use crate::lead_time::max_severity;
use crate::netting::NettingCalculator;
use crate::PlanningWarning;

/// 單一物料的訂單建議
///
/// 保留管線每一階段的數量：`base_qty` 是公式原始值（可為負，
/// 負值代表可用量有富餘），`net_qty` 扣除 MRQ 後夾零，
/// `rounded_qty` 是套用 MOQ 與批量後的最終建議量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecommendation {
    /// 物料代碼
    pub item_code: String,
    /// SKU 分類（品項類型缺漏時為 None）
    pub sku_type: Option<SkuType>,
    /// 公式基準量（未夾零）
    pub base_qty: Decimal,
    /// 扣除 MRQ 後的淨需求
    pub net_qty: Decimal,
    /// 圓整後的建議訂購量
    pub rounded_qty: Decimal,
}

/// 一次計算的完整結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    /// 本次計算 ID
    pub run_id: Uuid,
    /// 來源快照 ID
    pub snapshot_id: Uuid,
    /// 合格需求基準日
    pub as_of: NaiveDate,
    /// 各物料的最終建議（輸入集合與展開所及的全部物料）
    pub recommendations: BTreeMap<String, OrderRecommendation>,
    /// 第二輪展開累積的父項需求
    pub parent_demand: BTreeMap<String, Decimal>,
    /// 計算途中收集的警告
    pub warnings: Vec<PlanningWarning>,
    /// 計算耗時（毫秒）
    pub elapsed_ms: u64,
}

impl RecommendationReport {
    /// 查詢單一物料的建議
    pub fn recommendation(&self, item_code: &str) -> Option<&OrderRecommendation> {
        self.recommendations.get(item_code)
    }

    /// 建議量為正的建議（代碼升冪）
    pub fn positive_recommendations(&self) -> impl Iterator<Item = &OrderRecommendation> {
        self.recommendations
            .values()
            .filter(|rec| rec.rounded_qty > Decimal::ZERO)
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// 展開時的重入控制
///
/// 第一輪以路徑防循環，同一物料可經不同分支重複展開；
/// 第二輪全程共用一個集合，每個物料整輪只展開一次。
enum Visited {
    Path(Vec<String>),
    Shared(BTreeSet<String>),
}

impl Visited {
    fn try_enter(&mut self, code: &str) -> bool {
        match self {
            Visited::Path(path) => {
                if path.iter().any(|p| p == code) {
                    false
                } else {
                    path.push(code.to_string());
                    true
                }
            }
            Visited::Shared(set) => set.insert(code.to_string()),
        }
    }

    fn leave(&mut self) {
        if let Visited::Path(path) = self {
            path.pop();
        }
    }

    fn warns_on_reenter(&self) -> bool {
        matches!(self, Visited::Path(_))
    }
}

/// 訂單建議引擎
pub struct RecommendationEngine<'a> {
    catalog: &'a ItemCatalog,
    boms: &'a BomStore,
    snapshot: &'a DemandSnapshot,
}

impl<'a> RecommendationEngine<'a> {
    /// 創建引擎
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

    /// 對輸入物料集合計算訂單建議
    ///
    /// 輸入物料必須都有主檔；展開所及的子項缺主檔只記警告。
    /// 同一份快照與輸入重跑任意次，結果完全相同。
    pub fn run(&self, item_codes: &[String]) -> Result<RecommendationReport> {
        let started = Instant::now();
        info!("開始計算訂單建議，輸入 {} 項物料", item_codes.len());

        // 輸入去重、升冪，並確認主檔齊全
        let input_set: BTreeSet<&str> = item_codes.iter().map(String::as_str).collect();
        let mut seeds: Vec<&ItemMaster> = Vec::with_capacity(input_set.len());
        for code in &input_set {
            match self.catalog.get(code) {
                Some(item) => seeds.push(item),
                None => return Err(PlanningError::ItemNotFound((*code).to_string())),
            }
        }

        let mut warnings: Vec<PlanningWarning> = Vec::new();

        // 步驟 1:以空父項需求凍結種子建議
        debug!("步驟 1: 凍結種子初始建議");
        let empty: BTreeMap<String, Decimal> = BTreeMap::new();
        let initial: BTreeMap<&str, OrderRecommendation> = seeds
            .iter()
            .map(|item| (item.code.as_str(), self.recommend(item, &empty)))
            .collect();

        // 步驟 2:第一輪展開,路徑防循環,邊累積邊重算
        debug!("步驟 2: 第一輪 BOM 展開");
        let mut pass1_demand: BTreeMap<String, Decimal> = BTreeMap::new();
        for item in &seeds {
            let frozen = &initial[item.code.as_str()];
            if frozen.rounded_qty > Decimal::ZERO {
                let mut visited = Visited::Path(Vec::new());
                self.explode(
                    item,
                    frozen.rounded_qty,
                    &mut pass1_demand,
                    &mut visited,
                    &mut warnings,
                );
            }
        }

        // 步驟 3:以第一輪需求重新凍結種子建議
        debug!("步驟 3: 以第一輪需求凍結種子建議");
        let refrozen: BTreeMap<&str, OrderRecommendation> = seeds
            .iter()
            .map(|item| (item.code.as_str(), self.recommend(item, &pass1_demand)))
            .collect();

        // 步驟 4:第二輪展開,全輪共用一個重入集合,需求累進全新的累積器
        debug!("步驟 4: 第二輪 BOM 展開");
        let mut pass2_demand: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut visited = Visited::Shared(BTreeSet::new());
        for item in &seeds {
            let frozen = &refrozen[item.code.as_str()];
            if frozen.rounded_qty > Decimal::ZERO {
                self.explode(
                    item,
                    frozen.rounded_qty,
                    &mut pass2_demand,
                    &mut visited,
                    &mut warnings,
                );
            }
        }

        // 步驟 5:輸出集合(輸入 ∪ 第二輪所及)整批重算
        debug!("步驟 5: 輸出集合整批重算");
        let mut output_codes: BTreeSet<&str> = input_set.clone();
        output_codes.extend(pass2_demand.keys().map(String::as_str));

        let mut recommendations: BTreeMap<String, OrderRecommendation> = BTreeMap::new();
        for code in output_codes {
            // 需求只會累積在有主檔的物料上,輸入集合已驗證過
            if let Some(item) = self.catalog.get(code) {
                recommendations.insert(code.to_string(), self.recommend(item, &pass2_demand));
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if let Some(severity) = max_severity(&warnings) {
            warn!(
                "計算產生 {} 筆警告，最高嚴重度 {:?}",
                warnings.len(),
                severity
            );
        }
        info!(
            "訂單建議計算完成: {} 筆建議，耗時 {} ms",
            recommendations.len(),
            elapsed_ms
        );

        Ok(RecommendationReport {
            run_id: Uuid::new_v4(),
            snapshot_id: self.snapshot.snapshot_id,
            as_of: self.snapshot.as_of,
            recommendations,
            parent_demand: pass2_demand,
            warnings,
            elapsed_ms,
        })
    }

    /// 以完整管線計算單一物料的建議
    ///
    /// 基準量公式依 SKU 分類分四型：緩衝件補到綠頂，非緩衝件
    /// 追合格需求加父項需求；採購型另扣未結採購量。
    fn recommend(
        &self,
        item: &ItemMaster,
        parent_demand: &BTreeMap<String, Decimal>,
    ) -> OrderRecommendation {
        let avail = self.snapshot.availability(&item.code);
        let demand_from_parents = parent_demand
            .get(&item.code)
            .copied()
            .unwrap_or(Decimal::ZERO);

        let sku_type = item.sku_type();
        let is_purchase = sku_type.is_some_and(|sku| sku.is_purchase_type());

        let mut base_qty = if item.is_buffer() {
            item.tog + avail.qualified_demand - avail.stock - avail.wip
        } else {
            avail.qualified_demand + demand_from_parents - avail.stock - avail.wip
        };
        if is_purchase {
            base_qty -= avail.open_po;
        }

        let net_qty = NettingCalculator::net_of(base_qty, avail.mrq);
        let rounded_qty = NettingCalculator::apply(net_qty, item.moq, item.batch_size);

        OrderRecommendation {
            item_code: item.code.clone(),
            sku_type,
            base_qty,
            net_qty,
            rounded_qty,
        }
    }

    /// 把父項建議量沿 BOM 攤給子項
    ///
    /// 子項需求 = 父項建議量 × 每單位用量。非緩衝子項先累積需求
    /// 再以進行中的累積器重算；緩衝子項吸收需求不累積。
    /// 兩者重算後建議量為正都會繼續往下。
    fn explode(
        &self,
        item: &ItemMaster,
        rounded_qty: Decimal,
        demand: &mut BTreeMap<String, Decimal>,
        visited: &mut Visited,
        warnings: &mut Vec<PlanningWarning>,
    ) {
        if !visited.try_enter(&item.code) {
            if visited.warns_on_reenter() {
                warnings.push(PlanningWarning::warning(
                    item.code.clone(),
                    format!("BOM 出現循環，{} 已在展開路徑上，此邊略過", item.code),
                ));
            }
            return;
        }

        for edge in self.boms.edges_for(&item.code) {
            let child = match self.catalog.get(&edge.child_item) {
                Some(child) => child,
                None => {
                    warnings.push(PlanningWarning::warning(
                        edge.child_item.clone(),
                        format!("BOM 子項 {} 缺少物料主檔，已略過", edge.child_item),
                    ));
                    continue;
                }
            };

            let required = rounded_qty * edge.effective_qty_per_unit();

            if !child.is_buffer() {
                let entry = demand.entry(child.code.clone()).or_insert(Decimal::ZERO);
                *entry += required;
            }

            let child_rec = self.recommend(child, demand);
            if child_rec.rounded_qty > Decimal::ZERO {
                self.explode(child, child_rec.rounded_qty, demand, visited, warnings);
            }
        }

        visited.leave();
    }
}
