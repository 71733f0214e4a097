use std::collections::BTreeMap;

use crate::domain::chart::ChartEngine;
use crate::domain::drawing::{Annotation, ChartKey, KeyValueStorage};
use crate::domain::logging::{LogComponent, LogEntry, LogLevel, get_logger};

/// Every saved drawing, grouped per instrument/timeframe.
pub type AnnotationMap = BTreeMap<ChartKey, Vec<Annotation>>;

const UNREADABLE_SUFFIX: &str = ".unreadable";

/// Owner of all committed annotations.
///
/// Lists keep creation order (deletion is by index). Every mutation writes
/// the whole map back to storage before returning; a failed write is logged
/// and otherwise ignored so drawing never stops because of storage.
pub struct AnnotationStore<S: KeyValueStorage> {
    annotations: AnnotationMap,
    storage: S,
    storage_key: String,
}

impl<S: KeyValueStorage> AnnotationStore<S> {
    /// Empty store; call `restore` to load what was saved.
    pub fn new(storage: S, storage_key: impl Into<String>) -> Self {
        Self { annotations: AnnotationMap::new(), storage, storage_key: storage_key.into() }
    }

    /// Store loaded from `storage`.
    pub fn open(storage: S, storage_key: impl Into<String>) -> Self {
        let mut store = Self::new(storage, storage_key);
        store.restore();
        store
    }

    /// Key of the chart the engine is showing.
    pub fn current_key(chart: &impl ChartEngine) -> ChartKey {
        chart.active_key()
    }

    /// List for `key`, created (and persisted) empty if absent.
    pub fn list_for(&mut self, key: &ChartKey) -> &[Annotation] {
        if !self.annotations.contains_key(key) {
            self.annotations.insert(key.clone(), Vec::new());
            self.persist();
        }
        self.annotations.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Read-only lookup that never creates an entry.
    pub fn get(&self, key: &ChartKey) -> &[Annotation] {
        self.annotations.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn append(&mut self, key: &ChartKey, annotation: Annotation) {
        get_logger().debug(
            LogComponent::Store,
            &format!("➕ {} {} on {}", annotation.tool().as_ref(), annotation.id, key),
        );
        self.annotations.entry(key.clone()).or_default().push(annotation);
        self.persist();
    }

    /// Append to the list of the chart currently shown.
    pub fn append_current(&mut self, chart: &impl ChartEngine, annotation: Annotation) {
        let key = Self::current_key(chart);
        self.append(&key, annotation);
    }

    /// Remove one annotation. An out-of-range index (stale selection) is a
    /// no-op and returns `None`.
    pub fn delete_at(&mut self, key: &ChartKey, index: usize) -> Option<Annotation> {
        let list = self.annotations.get_mut(key)?;
        if index >= list.len() {
            crate::log_debug!(
                LogComponent::Store,
                "delete_at({index}) ignored, {key} holds {} drawings",
                list.len()
            );
            return None;
        }
        let removed = list.remove(index);
        self.persist();
        Some(removed)
    }

    /// Empty the list for `key`; other keys are untouched.
    pub fn clear(&mut self, key: &ChartKey) {
        let cleared = self.annotations.insert(key.clone(), Vec::new()).map_or(0, |old| old.len());
        get_logger().info(
            LogComponent::Store,
            &format!("🗑️ Cleared {cleared} drawings on {key}"),
        );
        self.persist();
    }

    /// Write the whole map to storage.
    pub fn persist(&mut self) {
        let json = match serde_json::to_string(&self.annotations) {
            Ok(json) => json,
            Err(e) => {
                get_logger().error(
                    LogComponent::Store,
                    &format!("❌ Failed to serialize drawings: {e}"),
                );
                return;
            }
        };

        if let Err(e) = self.storage.set_item(&self.storage_key, &json) {
            get_logger().error(
                LogComponent::Store,
                &format!("❌ Failed to save drawings: {e}"),
            );
        }
    }

    /// Replace the in-memory map with what storage holds. Missing data
    /// yields an empty map. Unreadable data is logged and also yields an
    /// empty map; a payload that does not parse is first copied to
    /// `backup_key()` so the next persist does not destroy it.
    pub fn restore(&mut self) {
        self.annotations = match self.storage.get_item(&self.storage_key) {
            Ok(Some(json)) => match serde_json::from_str::<AnnotationMap>(&json) {
                Ok(map) => {
                    get_logger().info(
                        LogComponent::Store,
                        &format!("📂 Restored drawings for {} charts", map.len()),
                    );
                    map
                }
                Err(e) => {
                    self.back_up(&json, &e);
                    AnnotationMap::new()
                }
            },
            Ok(None) => AnnotationMap::new(),
            Err(e) => {
                get_logger()
                    .error(LogComponent::Store, &format!("❌ Failed to load drawings: {e}"));
                AnnotationMap::new()
            }
        };
    }

    /// Key that receives a saved payload this version cannot read.
    pub fn backup_key(&self) -> String {
        format!("{}{UNREADABLE_SUFFIX}", self.storage_key)
    }

    fn back_up(&mut self, json: &str, error: &serde_json::Error) {
        let backup_key = self.backup_key();
        let saved = self.storage.set_item(&backup_key, json);
        get_logger().log(
            LogEntry::new(LogLevel::Error, LogComponent::Store, "❌ Saved drawings unreadable")
                .with_field("error", error)
                .with_field("bytes", json.len())
                .with_field(
                    "backup",
                    match saved {
                        Ok(()) => backup_key,
                        Err(e) => format!("failed ({e})"),
                    },
                ),
        );
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}
