//! Carts persisted to a directory and reopened, as the CLI uses them.

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use tempfile::tempdir;
use testresult::TestResult;

use phone_cart::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn open(dir: &std::path::Path) -> Result<(Cart<DirectoryStore>, Option<LoadIssue>), StorageError> {
    let store = DirectoryStore::open(dir)?;

    Ok(Cart::new(store))
}

#[test]
fn cart_survives_reopening() -> TestResult {
    let dir = tempdir()?;
    let catalog = Catalog::from_path(fixture("phones.yml"))?;

    let (mut cart, _) = open(dir.path())?;
    cart.add_item(catalog.product("Pixel 8")?.clone(), 2)?;
    cart.add_one(catalog.product("iPhone 15")?.clone())?;

    let saved = cart.snapshot();
    drop(cart);

    let (reopened, issue) = open(dir.path())?;

    assert!(issue.is_none(), "unexpected load issue: {issue:?}");
    assert_eq!(reopened.snapshot(), saved);
    assert_eq!(
        reopened.line("Pixel 8").and_then(CartLine::catalog_id),
        Some("41")
    );

    Ok(())
}

#[test]
fn slot_holds_a_json_array_of_lines() -> TestResult {
    let dir = tempdir()?;

    let (mut cart, _) = open(dir.path())?;
    cart.add_one(Catalog::from_path(fixture("phones.yml"))?.product("Redmi Note 13")?.clone())?;

    let raw = fs::read_to_string(dir.path().join("cart.json"))?;
    let json: serde_json::Value = serde_json::from_str(&raw)?;

    assert_eq!(json[0]["modelId"], "Redmi Note 13");
    assert_eq!(json[0]["unitPrice"], "199.50");
    assert_eq!(json[0]["quantity"], 1);

    Ok(())
}

#[test]
fn corrupted_file_opens_empty_and_is_replaced_on_next_change() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("cart.json"), "[{\"modelId\":")?;

    let (mut cart, issue) = open(dir.path())?;

    assert!(cart.is_empty());
    assert!(
        matches!(issue, Some(LoadIssue::Corrupted(_))),
        "expected corruption, got {issue:?}"
    );

    cart.add_one(Product {
        model_id: "A".to_string(),
        brand: "Acme".to_string(),
        display_name: "Acme A".to_string(),
        unit_price: Decimal::from(100),
        image_url: String::new(),
        catalog_id: None,
    })?;

    let (reopened, issue) = open(dir.path())?;

    assert!(issue.is_none(), "unexpected load issue: {issue:?}");
    assert_eq!(reopened.len(), 1);

    Ok(())
}

#[test]
fn quota_failure_keeps_memory_authoritative() -> TestResult {
    let dir = tempdir()?;
    let store = DirectoryStore::open(dir.path())?.with_quota(64);
    let (mut cart, _) = Cart::new(store);

    let catalog = Catalog::from_path(fixture("phones.yml"))?;
    let outcome = cart.add_one(catalog.product("Galaxy S24")?.clone())?;

    assert!(
        matches!(
            outcome.warning(),
            Some(PersistenceWarning::Write {
                source: StorageError::QuotaExceeded { .. },
                ..
            })
        ),
        "expected quota warning, got {outcome:?}"
    );
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.pricing().final_total, Decimal::new(79_999, 2));

    let (reopened, _) = open(dir.path())?;

    assert!(reopened.is_empty());

    Ok(())
}

#[test]
fn configured_policy_and_key_are_used() -> TestResult {
    let dir = tempdir()?;
    let config = CartConfig::from_yaml_str("storage_key: cart-v2\ndiscount:\n  per_unit: 5%\n")?;

    let slot = CartSlot::with_key(DirectoryStore::open(dir.path())?, config.storage_key.clone());
    let (mut cart, _) = Cart::open(slot, config.discount_policy()?);

    let catalog = Catalog::from_path(fixture("phones.yml"))?;
    cart.add_item(catalog.product("iPhone 15")?.clone(), 3)?;

    assert_eq!(cart.pricing().discount_rate, Decimal::new(10, 2));
    assert!(dir.path().join("cart-v2.json").is_file());

    Ok(())
}

#[test]
fn bundled_config_fixture_is_valid() -> TestResult {
    let config = CartConfig::from_path(fixture("cart.yml"))?;

    assert_eq!(config.discount_policy()?, DiscountPolicy::default());

    Ok(())
}
