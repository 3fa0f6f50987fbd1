//! Record store seam.
//!
//! Every call is scoped to one entity table. Item-level calls are keyed on
//! `id`; `select` with `Filter::All` returns rows newest first.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::Record;
use crate::schema::EntitySchema;
use crate::validate::NormalizedFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Id(i64),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, schema: &EntitySchema, filter: Filter) -> Result<Vec<Record>, StoreError>;

    /// Inserts exactly `fields` and returns the full row with store-assigned values.
    async fn insert(&self, schema: &EntitySchema, fields: &NormalizedFields) -> Result<Record, StoreError>;

    /// Writes `fields` to the row with `id`. `None` when no such row exists.
    async fn update(
        &self,
        schema: &EntitySchema,
        id: i64,
        fields: &NormalizedFields,
    ) -> Result<Option<Record>, StoreError>;

    /// Returns the number of rows removed.
    async fn delete(&self, schema: &EntitySchema, id: i64) -> Result<u64, StoreError>;
}
