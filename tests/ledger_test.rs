mod common;

use anyhow::Result;
use biashara::application::{ImportMode, LedgerService, RankKey, ValidationError};
use biashara::application::reporting::{filter_by_range, rank_by_frequency, total_revenue};
use biashara::domain::{merge_records, Category};
use common::{at, parse_date, ShopDay};

#[test]
fn test_record_appends_exactly_one() -> Result<()> {
    let mut service = LedgerService::new();
    let inputs = [
        ("a10s", "screen", Category::SpareGood, 15000),
        ("", "unlock", Category::JobService, 1),
        ("IPHONE 7", "  back glass ", Category::SpareGood, 25000),
    ];

    for (i, (model, item, category, price)) in inputs.into_iter().enumerate() {
        service.record_transaction(model, item, category, price, at("2024-05-02"))?;
        assert_eq!(service.len(), i + 1);
    }

    let last = service.records().last().unwrap();
    assert_eq!(last.model, "IPHONE 7");
    assert_eq!(last.item, "Back Glass");
    Ok(())
}

#[test]
fn test_invalid_record_leaves_ledger_unchanged() -> Result<()> {
    let mut service = LedgerService::new();
    ShopDay::record(&mut service, "2024-05-02")?;
    let before = service.export_snapshot();

    let cases = [("", 1000), (" \t ", 1000), ("screen", 0), ("screen", -1)];
    for (item, price) in cases {
        let result =
            service.record_transaction("A10S", item, Category::SpareGood, price, at("2024-05-02"));
        assert_eq!(result, Err(ValidationError::MissingFields));
    }

    assert_eq!(service.export_snapshot(), before);
    Ok(())
}

#[test]
fn test_delete_last() -> Result<()> {
    let mut service = LedgerService::new();
    assert!(service.delete_last().is_none());
    assert!(service.is_empty());

    ShopDay::record(&mut service, "2024-05-02")?;
    let removed = service.delete_last().unwrap();

    assert_eq!(removed.item, "Charging Port");
    assert_eq!(service.len(), 4);
    assert_eq!(service.records().last().unwrap().item, "Flashing");
    Ok(())
}

#[test]
fn test_merge_is_idempotent() -> Result<()> {
    let mut service = LedgerService::new();
    ShopDay::record(&mut service, "2024-05-02")?;
    ShopDay::record(&mut service, "2024-05-03")?;
    let a = service.export_snapshot();

    let aa = merge_records(a.clone(), a.clone());
    assert_eq!(aa, a);
    assert_eq!(merge_records(a.clone(), aa.clone()), aa);

    service.import_snapshot(a.clone(), ImportMode::Merge);
    assert_eq!(service.export_snapshot(), a);
    Ok(())
}

#[test]
fn test_duplicate_sale_survives_self_merge() -> Result<()> {
    let mut service = LedgerService::new();
    service.record_transaction("A10S", "screen", Category::SpareGood, 15000, at("2024-05-02"))?;
    service.record_transaction("A10S", "screen", Category::SpareGood, 15000, at("2024-05-02"))?;

    let added = service.import_snapshot(service.export_snapshot(), ImportMode::Merge);

    assert_eq!(added, 0);
    assert_eq!(service.len(), 2);

    let ranking = rank_by_frequency(service.records(), RankKey::ItemModel);
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].item, "Screen");
    assert_eq!(ranking[0].model, "A10S");
    assert_eq!(ranking[0].count, 2);
    Ok(())
}

#[test]
fn test_merge_adds_backup_rows_after_local_ones() -> Result<()> {
    let mut backup = LedgerService::new();
    backup.record_transaction("A10S", "screen", Category::SpareGood, 15000, at("2024-05-01"))?;
    backup.record_transaction("A20", "glass", Category::SpareGood, 3000, at("2024-05-01"))?;

    let mut service = LedgerService::new();
    service.record_transaction("A10S", "screen", Category::SpareGood, 15000, at("2024-05-01"))?;
    service.record_transaction("", "unlock", Category::JobService, 2000, at("2024-05-02"))?;

    let added = service.import_snapshot(backup.export_snapshot(), ImportMode::Merge);

    assert_eq!(added, 1);
    let items: Vec<&str> = service.records().iter().map(|t| t.item.as_str()).collect();
    assert_eq!(items, vec!["Screen", "Unlock", "Glass"]);
    Ok(())
}

#[test]
fn test_replace_installs_records_verbatim() -> Result<()> {
    let mut backup = LedgerService::new();
    ShopDay::record(&mut backup, "2024-04-30")?;

    let mut service = LedgerService::new();
    service.record_transaction("A10S", "screen", Category::SpareGood, 15000, at("2024-05-01"))?;

    let installed = service.import_snapshot(backup.export_snapshot(), ImportMode::Replace);

    assert_eq!(installed, 5);
    assert_eq!(service.export_snapshot(), backup.export_snapshot());
    Ok(())
}

#[test]
fn test_todays_single_sale_total() -> Result<()> {
    let mut service = LedgerService::new();
    let today = parse_date("2024-05-02");
    service.record_transaction("A10S", "screen", Category::SpareGood, 5000, at("2024-05-02"))?;

    let todays = filter_by_range(service.records(), today, today);
    assert_eq!(total_revenue(&todays), 5000);
    Ok(())
}

#[test]
fn test_middle_window_total() -> Result<()> {
    let mut service = LedgerService::new();
    service.record_transaction("A10S", "screen", Category::SpareGood, 1000, at("2024-05-01"))?;
    service.record_transaction("A10S", "screen", Category::SpareGood, 2000, at("2024-05-02"))?;
    service.record_transaction("A10S", "screen", Category::SpareGood, 3000, at("2024-05-03"))?;

    let middle = service.transactions_between(parse_date("2024-05-02"), parse_date("2024-05-02"));
    assert_eq!(total_revenue(&middle), 2000);
    Ok(())
}
