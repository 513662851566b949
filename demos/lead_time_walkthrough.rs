//! 解耦前置時間走查
//!
//! 展示單項計算、完整追蹤樹與批次計算三種用法，
//! 並示範緩衝件解耦與原料群組截斷兩條規則。

use chrono::Utc;
use ddmrp_bom::{BomEdge, BomStore, BomVersion};
use ddmrp_calc::{LeadTimeCalculator, LeadTimeTrace};
use ddmrp_core::{BufferFlag, ItemCatalog, ItemGroup, ItemMaster, ItemType};
use rust_decimal::Decimal;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    println!("===== 解耦前置時間走查 =====\n");

    // 步驟 1: 建立物料主檔與 BOM
    println!("[1] 建立物料主檔與 BOM...");
    println!("    GEARBOX(3 天)");
    println!("     ├── SHAFT(4 天)─── BILLET-40CR(30 天,原料群組)");
    println!("     ├── GEAR-SET(6 天,緩衝件)─── FORGING(20 天)");
    println!("     └── HOUSING(5 天)─── CASTING(18 天)\n");
    let catalog = build_catalog();
    let boms = build_boms()?;
    let calculator = LeadTimeCalculator::new(&catalog, &boms);

    // 步驟 2: 單項計算
    println!("[2] 單項計算...");
    // 最長路徑經 SHAFT:3 + 4 + 30 = 37,GEAR-SET 被解耦不參賽
    let gearbox = calculator.compute("GEARBOX")?;
    println!("    GEARBOX 解耦前置時間: {} 天", gearbox.days);
    // 緩衝件自己仍照完整鏈計算:6 + 20 = 26
    let gear_set = calculator.compute("GEAR-SET")?;
    println!("    GEAR-SET 自身補貨前置時間: {} 天", gear_set.days);
    // 原料群組在 BOM 之前截斷,掛在下面的 SCRAP-STEEL 不計
    let billet = calculator.compute("BILLET-40CR")?;
    println!("    BILLET-40CR: {} 天\n", billet.days);

    // 步驟 3: 完整追蹤樹
    println!("[3] GEARBOX 的完整追蹤樹...");
    let trace = calculator.explain("GEARBOX")?;
    print_trace(&trace, 0);
    println!();

    // 步驟 4: 批次計算
    println!("[4] 批次計算(含一筆缺主檔的代碼)...");
    let batch = calculator.compute_batch(&[
        "GEARBOX".to_string(),
        "SHAFT".to_string(),
        "HOUSING".to_string(),
        "NOT-A-REAL-ITEM".to_string(),
    ]);
    for (code, days) in &batch.days {
        println!("    {code}: {days} 天");
    }
    for warning in &batch.warnings {
        println!("    警告[{:?}] {}: {}", warning.severity, warning.item_code, warning.message);
    }

    println!("\n===== 走查完成 =====");
    Ok(())
}

/// 逐層縮排列印追蹤樹
fn print_trace(trace: &LeadTimeTrace, depth: usize) {
    let indent = "  ".repeat(depth);
    let note = if trace.cycle {
        "(循環邊,以 0 計)"
    } else if trace.is_buffer && depth > 0 {
        "(緩衝解耦,不往上貢獻)"
    } else {
        ""
    };
    println!(
        "    {}{}: 自身 {} 天,小計 {} 天 {}",
        indent, trace.item_code, trace.own_days, trace.total_days, note
    );
    for child in &trace.children {
        print_trace(child, depth + 1);
    }
}

fn build_catalog() -> ItemCatalog {
    [
        ItemMaster::new("GEARBOX".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(3),
        ItemMaster::new("SHAFT".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(4),
        ItemMaster::new("GEAR-SET".to_string(), BufferFlag::Buffer)
            .with_item_type(ItemType::RB)
            .with_lead_time_days(6)
            .with_buffer_zones(Decimal::from(200), Decimal::from(120), Decimal::from(50)),
        ItemMaster::new("HOUSING".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::BB)
            .with_lead_time_days(5),
        ItemMaster::new("BILLET-40CR".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_item_group(ItemGroup::RawMaterial)
            .with_lead_time_days(30)
            .with_purchase_item(true),
        ItemMaster::new("FORGING".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_lead_time_days(20),
        ItemMaster::new("CASTING".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_lead_time_days(18),
        ItemMaster::new("SCRAP-STEEL".to_string(), BufferFlag::NonBuffer)
            .with_item_type(ItemType::RM)
            .with_lead_time_days(99),
    ]
    .into_iter()
    .collect()
}

fn build_boms() -> std::result::Result<BomStore, Box<dyn std::error::Error>> {
    let mut store = BomStore::new();
    store.add_version(
        BomVersion::new("BOM-GEARBOX".to_string(), "GEARBOX".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "GEARBOX".to_string(),
                "SHAFT".to_string(),
                Decimal::from(2),
            ))
            .add_edge(BomEdge::new(
                "GEARBOX".to_string(),
                "GEAR-SET".to_string(),
                Decimal::from(1),
            ))
            .add_edge(BomEdge::new(
                "GEARBOX".to_string(),
                "HOUSING".to_string(),
                Decimal::from(1),
            )),
    )?;
    store.add_version(
        BomVersion::new("BOM-SHAFT".to_string(), "SHAFT".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "SHAFT".to_string(),
                "BILLET-40CR".to_string(),
                Decimal::from(1),
            )),
    )?;
    store.add_version(
        BomVersion::new("BOM-GEARSET".to_string(), "GEAR-SET".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "GEAR-SET".to_string(),
                "FORGING".to_string(),
                Decimal::from(1),
            )),
    )?;
    store.add_version(
        BomVersion::new("BOM-HOUSING".to_string(), "HOUSING".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "HOUSING".to_string(),
                "CASTING".to_string(),
                Decimal::from(1),
            )),
    )?;
    // 原料群組的物料就算掛了 BOM,前置時間也不往下看
    store.add_version(
        BomVersion::new("BOM-BILLET".to_string(), "BILLET-40CR".to_string(), Utc::now())
            .as_default()
            .as_finalized()
            .add_edge(BomEdge::new(
                "BILLET-40CR".to_string(),
                "SCRAP-STEEL".to_string(),
                Decimal::from(1),
            )),
    )?;
    Ok(store)
}
