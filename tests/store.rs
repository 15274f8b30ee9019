use chrono::{DateTime, Duration, TimeZone, Utc};
use sphone::store::{PhoneStore, StoreError};

fn t(seconds_offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds_offset)
}

async fn store() -> PhoneStore {
    PhoneStore::in_memory().await.expect("open in-memory store")
}

#[tokio::test]
async fn upsert_creates_then_updates_in_place() {
    let store = store().await;

    let created = store
        .upsert(Some(7), "+12125550123", "USA", t(0))
        .await
        .expect("create");
    assert_eq!(created.id, 7);
    assert_eq!(created.phone_number, "+12125550123");
    assert_eq!(created.created_at, t(0));
    assert_eq!(created.updated_at, t(0));

    let updated = store
        .upsert(Some(7), "+14155550198", "USA", t(5))
        .await
        .expect("upsert same id");
    assert_eq!(updated.id, 7);
    assert_eq!(updated.phone_number, "+14155550198");
    assert_eq!(updated.created_at, t(0), "created_at survives the upsert");
    assert!(updated.updated_at > created.updated_at);

    assert_eq!(store.count(None).await.expect("count"), 1);
}

#[tokio::test]
async fn upsert_without_id_autogenerates() {
    let store = store().await;

    let first = store
        .upsert(None, "+12125550123", "USA", t(0))
        .await
        .expect("create first");
    let second = store
        .upsert(None, "+442079460958", "GBR", t(1))
        .await
        .expect("create second");
    assert_ne!(first.id, second.id);
    assert_eq!(store.count(None).await.expect("count"), 2);
}

#[tokio::test]
async fn duplicate_number_is_rejected_and_original_untouched() {
    let store = store().await;

    let original = store
        .upsert(Some(1), "+12125550123", "USA", t(0))
        .await
        .expect("create");

    let err = store
        .upsert(Some(2), "+12125550123", "USA", t(5))
        .await
        .expect_err("second id with same number must fail");
    assert!(matches!(err, StoreError::DuplicateNumber(ref n) if n == "+12125550123"));

    let kept = store.get(1).await.expect("get").expect("row exists");
    assert_eq!(kept, original, "original row untouched");
    assert_eq!(store.get(2).await.expect("get"), None);
    assert_eq!(store.count(None).await.expect("count"), 1);
}

#[tokio::test]
async fn list_orders_by_updated_desc_and_paginates() {
    let store = store().await;
    store
        .upsert(None, "+12125550123", "USA", t(0))
        .await
        .expect("a");
    store
        .upsert(None, "+442079460958", "GBR", t(1))
        .await
        .expect("b");
    store
        .upsert(None, "+6281234567890", "IDN", t(2))
        .await
        .expect("c");

    let all = store.list(None, None, None).await.expect("list all");
    let numbers: Vec<&str> = all.iter().map(|r| r.phone_number.as_str()).collect();
    assert_eq!(
        numbers,
        ["+6281234567890", "+442079460958", "+12125550123"],
        "newest write first"
    );

    let page = store.list(None, Some(2), Some(1)).await.expect("page");
    let numbers: Vec<&str> = page.iter().map(|r| r.phone_number.as_str()).collect();
    assert_eq!(numbers, ["+442079460958", "+12125550123"]);

    assert_eq!(store.count(None).await.expect("count"), 3);
}

#[tokio::test]
async fn search_matches_number_and_country_substring() {
    let store = store().await;
    store
        .upsert(None, "+12125550123", "USA", t(0))
        .await
        .expect("us");
    store
        .upsert(None, "+442079460958", "GBR", t(1))
        .await
        .expect("gb");

    let by_number = store.list(Some("4420"), None, None).await.expect("search");
    assert_eq!(by_number.len(), 1);
    assert_eq!(by_number[0].country_info, "GBR");

    let by_country = store.list(Some("USA"), None, None).await.expect("search");
    assert_eq!(by_country.len(), 1);
    assert_eq!(by_country[0].phone_number, "+12125550123");

    assert_eq!(store.count(Some("USA")).await.expect("count"), 1);
    assert_eq!(store.count(Some("nope")).await.expect("count"), 0);
    assert!(store
        .list(Some("nope"), None, None)
        .await
        .expect("search")
        .is_empty());
}

#[tokio::test]
async fn update_replaces_fields_or_reports_missing() {
    let store = store().await;
    let created = store
        .upsert(None, "+12125550123", "USA", t(0))
        .await
        .expect("create");

    let updated = store
        .update(created.id, "+442079460958", "GBR", t(5))
        .await
        .expect("update")
        .expect("row exists");
    assert_eq!(updated.phone_number, "+442079460958");
    assert_eq!(updated.country_info, "GBR");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let missing = store
        .update(9999, "+442079460958", "GBR", t(6))
        .await
        .expect("update");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn update_to_conflicting_number_is_rejected() {
    let store = store().await;
    store
        .upsert(None, "+12125550123", "USA", t(0))
        .await
        .expect("us");
    let other = store
        .upsert(None, "+442079460958", "GBR", t(1))
        .await
        .expect("gb");

    let err = store
        .update(other.id, "+12125550123", "USA", t(5))
        .await
        .expect_err("collision with existing number");
    assert!(matches!(err, StoreError::DuplicateNumber(_)));
}

#[tokio::test]
async fn delete_one_and_delete_all() {
    let store = store().await;
    let record = store
        .upsert(None, "+12125550123", "USA", t(0))
        .await
        .expect("create");
    store
        .upsert(None, "+442079460958", "GBR", t(1))
        .await
        .expect("create");

    assert!(!store.delete(9999).await.expect("delete missing"));
    assert!(store.delete(record.id).await.expect("delete existing"));
    assert_eq!(store.get(record.id).await.expect("get"), None);

    assert_eq!(store.delete_all().await.expect("delete all"), 1);
    assert_eq!(store.count(None).await.expect("count"), 0);
    assert!(store.list(None, None, None).await.expect("list").is_empty());
}

#[tokio::test]
async fn stats_aggregate_per_country_largest_first() {
    let store = store().await;
    store
        .upsert(None, "+12125550123", "USA", t(0))
        .await
        .expect("us 1");
    store
        .upsert(None, "+14155550198", "USA", t(1))
        .await
        .expect("us 2");
    store
        .upsert(None, "+442079460958", "GBR", t(2))
        .await
        .expect("gb");

    let stats = store.stats().await.expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.countries.len(), 2);
    assert_eq!(stats.countries[0].country_info, "USA");
    assert_eq!(stats.countries[0].count, 2);
    assert_eq!(stats.countries[1].country_info, "GBR");
    assert_eq!(stats.countries[1].count, 1);
}
