//! In-process record store.
//!
//! Mirrors the libsql store's semantics (integer ids, millisecond
//! `created_at`, newest-first listing). Counts calls and can be told to fail,
//! which the tests rely on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{Filter, RecordStore};
use crate::error::StoreError;
use crate::model::Record;
use crate::schema::EntitySchema;
use crate::validate::NormalizedFields;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<Record>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<&'static str, Table>>>,
    calls: Arc<AtomicUsize>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every following call fail with `message` until cleared with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = message.map(str::to_string);
        }
    }

    fn begin(&self) -> Result<MutexGuard<'_, HashMap<&'static str, Table>>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .failure
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .clone();
        if let Some(message) = failure {
            return Err(StoreError::Unavailable(message));
        }

        self.tables
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn now() -> String {
        chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, schema: &EntitySchema, filter: Filter) -> Result<Vec<Record>, StoreError> {
        let tables = self.begin()?;
        let Some(table) = tables.get(schema.table) else {
            return Ok(vec![]);
        };

        let mut rows: Vec<Record> = table
            .rows
            .iter()
            .filter(|r| match filter {
                Filter::All => true,
                Filter::Id(id) => r.id() == Some(id),
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(rows)
    }

    async fn insert(&self, schema: &EntitySchema, fields: &NormalizedFields) -> Result<Record, StoreError> {
        let mut tables = self.begin()?;
        let table = tables.entry(schema.table).or_default();
        table.next_id += 1;

        let mut record = Record::new();
        record.set("id", JsonValue::from(table.next_id));
        for field in schema.fields {
            let value = match fields.get(field.name) {
                Some(v) => v.clone(),
                None => field.default.map_or(JsonValue::Null, |d| d.to_json()),
            };
            record.set(field.name, value);
        }
        record.set("created_at", JsonValue::String(Self::now()));

        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        schema: &EntitySchema,
        id: i64,
        fields: &NormalizedFields,
    ) -> Result<Option<Record>, StoreError> {
        let mut tables = self.begin()?;
        let Some(row) = tables
            .get_mut(schema.table)
            .and_then(|t| t.rows.iter_mut().find(|r| r.id() == Some(id)))
        else {
            return Ok(None);
        };

        for (name, value) in fields.iter() {
            row.set(name, value.clone());
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, schema: &EntitySchema, id: i64) -> Result<u64, StoreError> {
        let mut tables = self.begin()?;
        let Some(table) = tables.get_mut(schema.table) else {
            return Ok(0);
        };

        let before = table.rows.len();
        table.rows.retain(|r| r.id() != Some(id));
        Ok((before - table.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FORM, TODO};
    use crate::validate::{Mode, validate};
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_applies_defaults_and_nulls() {
        let store = MemoryStore::new();
        let fields = validate(&TODO, &json!({ "task": "X" }), Mode::Create).unwrap();
        let todo = store.insert(&TODO, &fields).await.unwrap();

        assert_eq!(todo.id(), Some(1));
        assert_eq!(todo.get("is_complete"), Some(&json!(false)));
        assert!(todo.created_at().is_some());

        let fields = validate(
            &FORM,
            &json!({ "first_name": "A", "last_name": "B", "email": "c@d", "message": "m" }),
            Mode::Create,
        )
        .unwrap();
        let form = store.insert(&FORM, &fields).await.unwrap();
        assert_eq!(form.get("phone"), Some(&JsonValue::Null));
        assert_eq!(form.id(), Some(1));
    }

    #[tokio::test]
    async fn test_select_is_newest_first() {
        let store = MemoryStore::new();
        for task in ["first", "second", "third"] {
            let fields = validate(&TODO, &json!({ "task": task }), Mode::Create).unwrap();
            store.insert(&TODO, &fields).await.unwrap();
        }

        let rows = store.select(&TODO, Filter::All).await.unwrap();
        let tasks: Vec<_> = rows.iter().filter_map(|r| r.get_str("task")).collect();
        assert_eq!(tasks, vec!["third", "second", "first"]);

        let rows = store.select(&TODO, Filter::Id(2)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("task"), Some("second"));
    }

    #[tokio::test]
    async fn test_failure_injection_counts_calls() {
        let store = MemoryStore::new();
        store.set_failure(Some("boom"));

        let err = store.select(&TODO, Filter::All).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref m) if m == "boom"));
        assert_eq!(store.calls(), 1);

        store.set_failure(None);
        assert!(store.select(&TODO, Filter::All).await.unwrap().is_empty());
        assert_eq!(store.delete(&TODO, 7).await.unwrap(), 0);
        assert_eq!(store.calls(), 3);
    }
}
