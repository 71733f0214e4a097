use chart_drawing_tools::application::{AnnotationStore, DEFAULT_STORAGE_KEY};
use chart_drawing_tools::domain::chart::DomainPoint;
use chart_drawing_tools::domain::drawing::{
    Annotation, AnnotationId, AnnotationKind, AnnotationStyle, ChartKey, KeyValueStorage,
};
use chart_drawing_tools::domain::errors::StorageError;
use chart_drawing_tools::domain::market_data::{Symbol, TimeInterval};
use chart_drawing_tools::infrastructure::InMemoryStorage;

fn key(symbol: &str, interval: TimeInterval) -> ChartKey {
    ChartKey::new(Symbol::from(symbol), interval)
}

fn trend(id: &str) -> Annotation {
    Annotation::new(
        AnnotationId::new(id),
        AnnotationKind::TrendLine,
        DomainPoint::new(100.0, 1, 60_000),
        DomainPoint::new(120.0, 4, 240_000),
        AnnotationStyle::default(),
        1_700_000_000_000,
    )
}

/// Reads succeed with nothing stored; every write fails (quota exceeded).
struct FullStorage;

impl KeyValueStorage for FullStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write("QuotaExceededError".to_string()))
    }
}

struct BrokenStorage;

impl KeyValueStorage for BrokenStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read("SecurityError".to_string()))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("SecurityError".to_string()))
    }
}

#[test]
fn list_for_creates_and_persists_an_empty_list() {
    let btc = key("BTCUSDT", TimeInterval::OneHour);
    let mut store = AnnotationStore::new(InMemoryStorage::new(), DEFAULT_STORAGE_KEY);

    assert!(store.list_for(&btc).is_empty());
    assert!(store.annotations().contains_key(&btc));
    assert_eq!(store.storage().item(DEFAULT_STORAGE_KEY), Some(r#"{"BTCUSDT_1h":[]}"#));
}

#[test]
fn every_mutation_is_persisted() {
    let btc = key("BTCUSDT", TimeInterval::OneHour);
    let mut store = AnnotationStore::new(InMemoryStorage::new(), DEFAULT_STORAGE_KEY);

    store.append(&btc, trend("a"));
    store.append(&btc, trend("b"));
    let reopened = AnnotationStore::open(store.storage().clone(), DEFAULT_STORAGE_KEY);
    assert_eq!(reopened.get(&btc), store.get(&btc));
    assert_eq!(reopened.get(&btc).len(), 2);

    store.delete_at(&btc, 0);
    let reopened = AnnotationStore::open(store.storage().clone(), DEFAULT_STORAGE_KEY);
    let ids: Vec<&str> = reopened.get(&btc).iter().map(|a| a.id.value()).collect();
    assert_eq!(ids, ["b"]);
}

#[test]
fn clear_leaves_other_keys_alone() {
    let btc = key("BTCUSDT", TimeInterval::OneHour);
    let btc_daily = key("BTCUSDT", TimeInterval::OneDay);
    let eth = key("ETHUSDT", TimeInterval::OneHour);
    let mut store = AnnotationStore::new(InMemoryStorage::new(), DEFAULT_STORAGE_KEY);

    store.append(&btc, trend("a"));
    store.append(&btc_daily, trend("b"));
    store.append(&eth, trend("c"));
    store.clear(&btc);

    assert!(store.get(&btc).is_empty());
    assert_eq!(store.get(&btc_daily).len(), 1);
    assert_eq!(store.get(&eth).len(), 1);

    let reopened = AnnotationStore::open(store.storage().clone(), DEFAULT_STORAGE_KEY);
    assert!(reopened.get(&btc).is_empty());
    assert_eq!(reopened.get(&eth)[0].id.value(), "c");
}

#[test]
fn stale_index_delete_is_a_no_op() {
    let btc = key("BTCUSDT", TimeInterval::OneHour);
    let mut store = AnnotationStore::new(InMemoryStorage::new(), DEFAULT_STORAGE_KEY);
    store.append(&btc, trend("a"));

    assert_eq!(store.delete_at(&btc, 3), None);
    assert_eq!(store.delete_at(&key("ETHUSDT", TimeInterval::OneHour), 0), None);
    assert_eq!(store.get(&btc).len(), 1);
    assert_eq!(store.delete_at(&btc, 0).map(|a| a.id), Some(AnnotationId::new("a")));
}

#[test]
fn malformed_payload_restores_empty() {
    let storage = InMemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, "{not json");
    let store = AnnotationStore::open(storage, DEFAULT_STORAGE_KEY);
    assert!(store.annotations().is_empty());
}

#[test]
fn unreadable_payload_is_kept_under_the_backup_key() {
    let legacy = r#"{"BTCUSDT_1h":[{"id":"d1","x1":50,"y1":50,"x2":100,"y2":80}]}"#;
    let storage = InMemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, legacy);
    let mut store = AnnotationStore::open(storage, DEFAULT_STORAGE_KEY);
    assert!(store.annotations().is_empty());
    assert_eq!(store.backup_key(), "omar_terminal_drawings.unreadable");

    store.append(&key("BTCUSDT", TimeInterval::OneHour), trend("a"));

    let storage = store.storage();
    assert_eq!(storage.item("omar_terminal_drawings.unreadable"), Some(legacy));
    assert!(storage.item(DEFAULT_STORAGE_KEY).is_some_and(|json| json.contains(r#""id":"a""#)));
}

#[test]
fn unknown_chart_key_in_payload_restores_empty() {
    let storage = InMemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, r#"{"BTCUSDT_7x":[]}"#);
    let store = AnnotationStore::open(storage, DEFAULT_STORAGE_KEY);
    assert!(store.annotations().is_empty());
}

#[test]
fn storage_failures_never_interrupt_drawing() {
    let btc = key("BTCUSDT", TimeInterval::OneHour);

    let mut store = AnnotationStore::open(FullStorage, DEFAULT_STORAGE_KEY);
    store.append(&btc, trend("a"));
    assert_eq!(store.get(&btc).len(), 1);

    let mut store = AnnotationStore::open(BrokenStorage, DEFAULT_STORAGE_KEY);
    assert!(store.annotations().is_empty());
    store.append(&btc, trend("a"));
    store.clear(&btc);
    assert!(store.get(&btc).is_empty());
}

#[test]
fn reads_the_saved_terminal_format() {
    let saved = r##"{"ETHUSDT_15m":[{"id":"1700000000000-0000002a-1","tool":"hline","anchor1":{"price":2250.5,"candleIndex":12,"time":1700000000000},"anchor2":{"price":2250.5,"candleIndex":40,"time":1700000420000},"color":"#ff8c00","lineWidth":2.0,"createdAt":1700000000000}]}"##;
    let storage = InMemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, saved);
    let store = AnnotationStore::open(storage, DEFAULT_STORAGE_KEY);

    let list = store.get(&key("ETHUSDT", TimeInterval::FifteenMinutes));
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].kind, AnnotationKind::HorizontalLine);
    assert_eq!(list[0].anchor1.candle_index, 12);
    assert_eq!(list[0].style.color.to_hex(), 0xff8c00);
}
