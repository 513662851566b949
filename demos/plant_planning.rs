//! 棒鋼廠計劃完整示例
//!
//! 從物料主檔、BOM、需求快照一路走到訂單建議、FIFO 分配與
//! 庫存顏色看板，展示整條計劃管線的用法。
//!
//! 場景：兩種螺紋鋼成品（緩衝件），各自經黑棒半成品
//! 軋延而來，黑棒共用同一種採購鋼胚。

use chrono::{NaiveDate, Utc};
use ddmrp_bom::{BomEdge, BomStore, BomVersion};
use ddmrp_calc::{
    FifoAllocator, LeadTimeCalculator, OnHandStatusCalculator, RecommendationEngine,
};
use ddmrp_core::{
    BufferFlag, DemandSnapshot, ItemCatalog, ItemFilter, ItemGroup, ItemMaster, ItemType,
    MaterialRequestRow, PlanningOptions, PurchaseOrderRow, SalesOrderRow, SnapshotInput, StockRow,
};
use rust_decimal::Decimal;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    println!("===== 棒鋼廠計劃示例 =====\n");

    // 步驟 1: 建立物料主檔
    println!("[1] 建立物料主檔...");
    let catalog = build_catalog();
    println!("    共 {} 項物料\n", catalog.len());

    // 步驟 2: 建立 BOM
    println!("[2] 建立 BOM...");
    let boms = build_boms()?;
    let reachable = boms.closure(&["REBAR-10MM".to_string(), "REBAR-12MM".to_string()]);
    println!("    REBAR-10MM ── BB-20MM ──┐");
    println!("    REBAR-12MM ── BB-25MM ──┴── BILLET-MS");
    println!("    兩支成品沿 BOM 共可達 {} 項物料\n", reachable.len());

    // 步驟 3: 解耦前置時間
    println!("[3] 計算解耦前置時間...");
    let lead_time = LeadTimeCalculator::new(&catalog, &boms);
    let batch = lead_time.compute_batch(&[
        "REBAR-10MM".to_string(),
        "REBAR-12MM".to_string(),
        "BILLET-MS".to_string(),
    ]);
    for (code, days) in &batch.days {
        println!("    {code}: {days} 天");
    }
    println!();

    // 步驟 4: 凍結需求快照
    println!("[4] 凍結需求快照...");
    let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let options =
        PlanningOptions::new(as_of).with_excluded_locations(vec!["SCRAP".to_string()]);
    let snapshot = DemandSnapshot::build(&build_snapshot_input(), &options);
    println!("    快照 {} @ {}", snapshot.snapshot_id, snapshot.as_of);
    let rebar10 = snapshot.availability("REBAR-10MM");
    println!(
        "    REBAR-10MM: 庫存 {} / 合格需求 {} (廢料區庫存已排除)\n",
        rebar10.stock, rebar10.qualified_demand
    );

    // 步驟 5: 計算訂單建議
    println!("[5] 計算訂單建議...");
    let engine = RecommendationEngine::new(&catalog, &boms, &snapshot);
    let report = engine.run(&[
        "REBAR-10MM".to_string(),
        "REBAR-12MM".to_string(),
    ])?;
    println!("    {:<12} {:>10} {:>10} {:>10}", "物料", "基準量", "淨需求", "建議量");
    for rec in report.positive_recommendations() {
        println!(
            "    {:<12} {:>10} {:>10} {:>10}",
            rec.item_code, rec.base_qty, rec.net_qty, rec.rounded_qty
        );
    }
    println!();

    // 步驟 6: FIFO 物料分配
    println!("[6] FIFO 物料分配(庫存狀態越差的父項越先拿料)...");
    let allocation = FifoAllocator::new(&catalog, &boms, &snapshot).allocate(&report);
    for row in &allocation.rows {
        println!(
            "    {} ← {}: 需求 {}, 庫存分得 {}, 在製/採購分得 {}, 短缺 {} [{:?}]",
            row.parent_item,
            row.child_item,
            row.required_qty,
            row.stock_allocated,
            row.wip_po_allocated,
            row.wip_po_shortfall,
            row.full_kit_status
        );
    }
    println!(
        "    齊料 {} / 部分 {} / 未分配 {}\n",
        allocation.summary.full_kit_parents,
        allocation.summary.partial_parents,
        allocation.summary.pending_parents
    );

    // 步驟 7: 緩衝件顏色看板
    println!("[7] 緩衝件顏色看板...");
    let board = OnHandStatusCalculator::capture_daily(
        &catalog,
        &ItemFilter::new().buffer_only(),
        &snapshot,
        as_of,
    );
    for row in &board {
        match (row.on_hand_percent, row.on_hand_colour) {
            (Some(percent), Some(colour)) => {
                println!("    {}: {}% {:?}", row.item_code, percent, colour)
            }
            _ => println!("    {}: 無法判定", row.item_code),
        }
    }

    println!("\n===== 計劃完成 =====");
    Ok(())
}

/// 建立示例物料主檔
fn build_catalog() -> ItemCatalog {
    [
        ItemMaster::new("REBAR-10MM".to_string(), BufferFlag::Buffer)
            .with_item_type(ItemType::RB)
            .with_lead_time_days(2)
            .with_buffer_zones(Decimal::from(800), Decimal::from(500), Decimal::from(200))
            .with_grade("MS-500".to_string())
            .with_sales_item(true),
        ItemMaster::new("REBAR-12MM".to_string(), BufferFlag::Buffer)
            .with_item_type(ItemType::RB)
            .with_lead_time_days(2)
            .with_buffer_zones(Decimal::from(600), Decimal::from(380), Decimal::from(150))
            .with_grade("MS-500".to_string())
            .with_sales_item(true),
        ItemMaster::new("BB-20MM".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(3)
            .with_batch_size(Decimal::from(50)),
        ItemMaster::new("BB-25MM".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(4)
            .with_moq(Decimal::from(300)),
        ItemMaster::new("BILLET-MS".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_item_group(ItemGroup::RawMaterial)
            .with_lead_time_days(25)
            .with_moq(Decimal::from(500))
            .with_purchase_item(true),
    ]
    .into_iter()
    .collect()
}

/// 建立兩層 BOM：成品 → 黑棒 → 鋼胚
fn build_boms() -> std::result::Result<BomStore, Box<dyn std::error::Error>> {
    let mut store = BomStore::new();
    store.add_version(
        BomVersion::new("BOM-R10".to_string(), "REBAR-10MM".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "REBAR-10MM".to_string(),
                "BB-20MM".to_string(),
                Decimal::from(1),
            )),
    )?;
    store.add_version(
        BomVersion::new("BOM-R12".to_string(), "REBAR-12MM".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "REBAR-12MM".to_string(),
                "BB-25MM".to_string(),
                Decimal::from(1),
            )),
    )?;
    store.add_version(
        BomVersion::new("BOM-BB20".to_string(), "BB-20MM".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "BB-20MM".to_string(),
                "BILLET-MS".to_string(),
                Decimal::from(2),
            )),
    )?;
    store.add_version(
        BomVersion::new("BOM-BB25".to_string(), "BB-25MM".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "BB-25MM".to_string(),
                "BILLET-MS".to_string(),
                Decimal::from(3),
            )),
    )?;
    Ok(store)
}

/// 建立交易資料：庫存、未結採購、銷售訂單與領料需求
fn build_snapshot_input() -> SnapshotInput {
    SnapshotInput::new()
        .with_stock_rows(vec![
            StockRow::new(
                "REBAR-10MM".to_string(),
                "WH-FG".to_string(),
                Decimal::from(100),
            ),
            StockRow::new(
                "REBAR-10MM".to_string(),
                "WH-YARD".to_string(),
                Decimal::from(50),
            ),
            // 廢料區的貨不算可用庫存
            StockRow::new(
                "REBAR-10MM".to_string(),
                "SCRAP".to_string(),
                Decimal::from(30),
            ),
            StockRow::new(
                "REBAR-12MM".to_string(),
                "WH-FG".to_string(),
                Decimal::from(420),
            ),
            StockRow::new(
                "BB-20MM".to_string(),
                "WH-SEMI".to_string(),
                Decimal::from(100),
            ),
            StockRow::new(
                "BILLET-MS".to_string(),
                "WH-RM".to_string(),
                Decimal::from(600),
            ),
        ])
        .with_purchase_orders(vec![PurchaseOrderRow::new(
            "BILLET-MS".to_string(),
            Decimal::from(250),
            Decimal::ZERO,
        )])
        .with_sales_orders(vec![
            SalesOrderRow::new("REBAR-10MM".to_string(), Decimal::from(400), Decimal::ZERO)
                .with_due_date(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()),
            // 交期在基準日之後,不列入合格需求
            SalesOrderRow::new("REBAR-10MM".to_string(), Decimal::from(200), Decimal::ZERO)
                .with_due_date(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()),
            SalesOrderRow::new("REBAR-12MM".to_string(), Decimal::from(80), Decimal::ZERO)
                .with_due_date(NaiveDate::from_ymd_opt(2025, 5, 28).unwrap()),
        ])
        .with_material_requests(vec![MaterialRequestRow::new(
            "BILLET-MS".to_string(),
            Decimal::from(100),
            Decimal::ZERO,
        )])
}
