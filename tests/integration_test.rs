//! 集成測試

use chrono::NaiveDate;
use chrono::Utc;
use ddmrp_bom::{BomEdge, BomStore, BomVersion};
use ddmrp_calc::{
    FifoAllocator, FullKitStatus, LeadTimeCalculator, OnHandColour, OnHandStatusCalculator,
    RecommendationEngine,
};
use ddmrp_core::*;
use rust_decimal::Decimal;

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[test]
fn test_full_planning_cycle() {
    // 測試完整計劃循環:快照 → 前置時間 → 訂單建議 → 分配 → 顏色分級
    // 場景(棒鋼廠):
    //   RB-EN8-25MM (圓棒成品,緩衝件)
    //     └── BB-EN8-32MM (黑棒半成品) x1
    //           └── BILLET-EN8 (鋼胚原料,採購) x2

    // 1. 物料主檔
    let catalog: ItemCatalog = [
        ItemMaster::new("RB-EN8-25MM".to_string(), BufferFlag::Buffer)
            .with_item_type(ItemType::RB)
            .with_item_group(ItemGroup::Standard)
            .with_lead_time_days(2)
            .with_buffer_zones(dec(500), dec(300), dec(100))
            .with_grade("EN8".to_string())
            .with_sales_item(true),
        ItemMaster::new("BB-EN8-32MM".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(3)
            .with_batch_size(dec(50)),
        ItemMaster::new("BILLET-EN8".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_item_group(ItemGroup::RawMaterial)
            .with_lead_time_days(20)
            .with_moq(dec(1000))
            .with_purchase_item(true),
    ]
    .into_iter()
    .collect();

    // 2. BOM
    let mut boms = BomStore::new();
    boms.add_version(
        BomVersion::new("BOM-RB-001".to_string(), "RB-EN8-25MM".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "RB-EN8-25MM".to_string(),
                "BB-EN8-32MM".to_string(),
                dec(1),
            )),
    )
    .unwrap();
    boms.add_version(
        BomVersion::new("BOM-BB-001".to_string(), "BB-EN8-32MM".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "BB-EN8-32MM".to_string(),
                "BILLET-EN8".to_string(),
                dec(2),
            )),
    )
    .unwrap();

    // 3. 解耦前置時間:整條非緩衝鏈累加
    let lead_time = LeadTimeCalculator::new(&catalog, &boms);
    assert_eq!(lead_time.compute("RB-EN8-25MM").unwrap().days, 25); // 2 + 3 + 20
    assert_eq!(lead_time.compute("BB-EN8-32MM").unwrap().days, 23); // 3 + 20
    assert_eq!(lead_time.compute("BILLET-EN8").unwrap().days, 20); // 原物料只算自身

    // 4. 需求快照
    let input = SnapshotInput::new()
        .with_stock_rows(vec![
            StockRow::new("RB-EN8-25MM".to_string(), "WH-FG".to_string(), dec(120)),
            StockRow::new("BB-EN8-32MM".to_string(), "WH-SEMI".to_string(), dec(40)),
            StockRow::new("BILLET-EN8".to_string(), "WH-RM".to_string(), dec(300)),
        ])
        .with_production_orders(vec![ProductionOrderRow::new(
            "RB-EN8-25MM".to_string(),
            dec(30),
            dec(0),
        )])
        .with_purchase_orders(vec![PurchaseOrderRow::new(
            "BILLET-EN8".to_string(),
            dec(400),
            dec(0),
        )])
        .with_sales_orders(vec![
            // 交期在基準日前:合格需求
            SalesOrderRow::new("RB-EN8-25MM".to_string(), dec(250), dec(0))
                .with_due_date(NaiveDate::from_ymd_opt(2025, 5, 25).unwrap()),
            // 交期在基準日後:只計入未結銷售量
            SalesOrderRow::new("RB-EN8-25MM".to_string(), dec(100), dec(0))
                .with_due_date(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()),
        ])
        .with_material_requests(vec![MaterialRequestRow::new(
            "BILLET-EN8".to_string(),
            dec(150),
            dec(0),
        )]);
    let snapshot = DemandSnapshot::build(&input, &PlanningOptions::new(as_of()));

    let rb = snapshot.availability("RB-EN8-25MM");
    assert_eq!(rb.qualified_demand, dec(250));
    assert_eq!(rb.open_so, dec(350));

    // 5. 訂單建議
    let engine = RecommendationEngine::new(&catalog, &boms, &snapshot);
    let report = engine.run(&["RB-EN8-25MM".to_string()]).unwrap();

    // RBMTA: 500 + 250 - 120 - 30 = 600
    assert_eq!(
        report.recommendation("RB-EN8-25MM").unwrap().rounded_qty,
        dec(600)
    );
    // BBMTO: 600 - 40 = 560,批量 50 圓整到 600
    let bb = report.recommendation("BB-EN8-32MM").unwrap();
    assert_eq!(bb.base_qty, dec(560));
    assert_eq!(bb.rounded_qty, dec(600));
    // PTO: 600x2 - 300 - 400 = 500,扣 MRQ 150 → 350,MOQ 補到 1000
    let billet = report.recommendation("BILLET-EN8").unwrap();
    assert_eq!(billet.base_qty, dec(500));
    assert_eq!(billet.net_qty, dec(350));
    assert_eq!(billet.rounded_qty, dec(1000));

    assert_eq!(report.parent_demand.get("BB-EN8-32MM"), Some(&dec(600)));
    assert_eq!(report.parent_demand.get("BILLET-EN8"), Some(&dec(1200)));
    assert!(!report.has_warnings());

    // 6. FIFO 分配
    let allocation = FifoAllocator::new(&catalog, &boms, &snapshot).allocate(&report);

    // RB 狀態 120/750 = 16% 排最前;BB 無綠頂排最後
    assert_eq!(allocation.rows[0].parent_item, "RB-EN8-25MM");
    assert_eq!(allocation.rows[0].parent_on_hand_percent, Some(16));
    // RB 要 600 個 BB:庫存池只有 40,缺 560 且無在製可補
    assert_eq!(allocation.rows[0].stock_allocated, dec(40));
    assert_eq!(allocation.rows[0].stock_shortfall, dec(560));
    assert_eq!(allocation.rows[0].wip_po_shortfall, dec(560));
    assert_eq!(
        allocation.status_of("RB-EN8-25MM"),
        Some(FullKitStatus::Partial)
    );
    // BB 要 1200 個鋼胚:庫存 300 + 在製採購 400,短缺 500
    let bb_row = allocation
        .rows_for_parent("BB-EN8-32MM")
        .next()
        .unwrap();
    assert_eq!(bb_row.stock_allocated, dec(300));
    assert_eq!(bb_row.stock_shortfall, dec(900));
    assert_eq!(bb_row.wip_po_allocated, dec(400));
    assert_eq!(bb_row.wip_po_shortfall, dec(500));

    // 7. 顏色分級留存
    let rows = OnHandStatusCalculator::capture_daily(
        &catalog,
        &ItemFilter::new().buffer_only(),
        &snapshot,
        as_of(),
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item_code, "RB-EN8-25MM");
    assert_eq!(rows[0].on_hand_percent, Some(16));
    assert_eq!(rows[0].on_hand_colour, Some(OnHandColour::Red));
}

#[test]
fn test_moq_amplification_cascades_downstream() {
    // 測試 MOQ 放大沿 BOM 往下傳遞
    // 場景:成品只要 10 個,半成品 MOQ 100,原料必須按 100 的量備料

    let catalog: ItemCatalog = [
        ItemMaster::new("FG".to_string(), BufferFlag::NonBuffer).with_item_type(ItemType::BB),
        ItemMaster::new("SF".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_moq(dec(100)),
        ItemMaster::new("RM".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_item_group(ItemGroup::RawMaterial),
    ]
    .into_iter()
    .collect();

    let mut boms = BomStore::new();
    boms.add_version(
        BomVersion::new("BOM-FG".to_string(), "FG".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new("FG".to_string(), "SF".to_string(), dec(1))),
    )
    .unwrap();
    boms.add_version(
        BomVersion::new("BOM-SF".to_string(), "SF".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new("SF".to_string(), "RM".to_string(), dec(2))),
    )
    .unwrap();

    let input = SnapshotInput::new().with_sales_orders(vec![SalesOrderRow::new(
        "FG".to_string(),
        dec(10),
        dec(0),
    )]);
    let snapshot = DemandSnapshot::build(&input, &PlanningOptions::new(as_of()));

    let report = RecommendationEngine::new(&catalog, &boms, &snapshot)
        .run(&["FG".to_string()])
        .unwrap();

    assert_eq!(report.recommendation("FG").unwrap().rounded_qty, dec(10));
    // SF: 需求 10,MOQ 補到 100
    assert_eq!(report.recommendation("SF").unwrap().rounded_qty, dec(100));
    // RM 看到的是圓整後的 100 x 2
    assert_eq!(report.parent_demand.get("RM"), Some(&dec(200)));
    assert_eq!(report.recommendation("RM").unwrap().rounded_qty, dec(200));
}

#[test]
fn test_buffer_decoupling_isolates_downstream() {
    // 測試緩衝件的解耦效果
    // 場景:半成品是緩衝件且庫存高於綠頂,下游需求到它為止,
    //       原料不產生任何建議,前置時間也在它斷開

    let catalog: ItemCatalog = [
        ItemMaster::new("FG".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(2),
        ItemMaster::new("BUF-SF".to_string(), BufferFlag::Buffer)
            .with_item_type(ItemType::RB)
            .with_lead_time_days(5)
            .with_buffer_zones(dec(100), dec(60), dec(20)),
        ItemMaster::new("RM".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_lead_time_days(30),
    ]
    .into_iter()
    .collect();

    let mut boms = BomStore::new();
    boms.add_version(
        BomVersion::new("BOM-FG".to_string(), "FG".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new("FG".to_string(), "BUF-SF".to_string(), dec(1))),
    )
    .unwrap();
    boms.add_version(
        BomVersion::new("BOM-BUF".to_string(), "BUF-SF".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new("BUF-SF".to_string(), "RM".to_string(), dec(1))),
    )
    .unwrap();

    // 緩衝件庫存 500,遠高於綠頂 100
    let input = SnapshotInput::new()
        .with_stock_rows(vec![StockRow::new(
            "BUF-SF".to_string(),
            "WH".to_string(),
            dec(500),
        )])
        .with_sales_orders(vec![SalesOrderRow::new("FG".to_string(), dec(50), dec(0))]);
    let snapshot = DemandSnapshot::build(&input, &PlanningOptions::new(as_of()));

    // 前置時間:FG 在緩衝件處斷開
    let lead_time = LeadTimeCalculator::new(&catalog, &boms);
    assert_eq!(lead_time.compute("FG").unwrap().days, 2);
    // 緩衝件自己往下仍是完整鏈
    assert_eq!(lead_time.compute("BUF-SF").unwrap().days, 35);

    // 訂單建議:FG 有需求,緩衝件吸收後不再往下
    let report = RecommendationEngine::new(&catalog, &boms, &snapshot)
        .run(&["FG".to_string(), "BUF-SF".to_string()])
        .unwrap();

    assert_eq!(report.recommendation("FG").unwrap().rounded_qty, dec(50));
    // 緩衝件庫存富餘:建議 0,也不往原料展開
    assert_eq!(
        report.recommendation("BUF-SF").unwrap().rounded_qty,
        Decimal::ZERO
    );
    assert_eq!(report.parent_demand.get("BUF-SF"), None);
    assert_eq!(report.parent_demand.get("RM"), None);
    assert!(report.recommendation("RM").is_none());
}

#[test]
fn test_dirty_bom_data_still_completes() {
    // 測試髒資料的韌性:循環 BOM 與缺主檔子項都只記警告,計算照常完成

    let catalog: ItemCatalog = [
        ItemMaster::new("A".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(2),
        ItemMaster::new("B".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(3),
    ]
    .into_iter()
    .collect();

    let mut boms = BomStore::new();
    boms.add_version(
        BomVersion::new("BOM-A".to_string(), "A".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new("A".to_string(), "B".to_string(), dec(1)))
            .add_edge(BomEdge::new("A".to_string(), "GHOST".to_string(), dec(1))),
    )
    .unwrap();
    boms.add_version(
        BomVersion::new("BOM-B".to_string(), "B".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new("B".to_string(), "A".to_string(), dec(1))),
    )
    .unwrap();

    // 前置時間:循環邊以 0 計,缺主檔子項略過
    let lead_time = LeadTimeCalculator::new(&catalog, &boms);
    let outcome = lead_time.compute("A").unwrap();
    assert_eq!(outcome.days, 5); // 2 + (3 + 循環 0)
    assert_eq!(outcome.warnings.len(), 2);

    // 批次計算同樣完成
    let batch = lead_time.compute_batch(&["A".to_string(), "B".to_string()]);
    assert_eq!(batch.days.len(), 2);

    // 訂單建議同樣完成且帶警告
    let input = SnapshotInput::new().with_sales_orders(vec![SalesOrderRow::new(
        "A".to_string(),
        dec(10),
        dec(0),
    )]);
    let snapshot = DemandSnapshot::build(&input, &PlanningOptions::new(as_of()));
    let report = RecommendationEngine::new(&catalog, &boms, &snapshot)
        .run(&["A".to_string()])
        .unwrap();

    assert!(report.has_warnings());
    assert!(report.recommendation("A").is_some());
    assert!(report.recommendation("B").is_some());
    assert!(report.recommendation("GHOST").is_none());
}
