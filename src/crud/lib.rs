use serde_json::Value as JsonValue;

use crate::error::CrudError;
use crate::model::Record;
use crate::schema::{EntityKind, EntitySchema};
use crate::store::{Filter, RecordStore};
use crate::validate::{Mode, validate};

/// Validated list/create/update/delete over one entity table.
pub struct Crud<'a> {
    store: &'a dyn RecordStore,
    schema: &'static EntitySchema,
}

impl<'a> Crud<'a> {
    pub fn new(store: &'a dyn RecordStore, kind: EntityKind) -> Self {
        Self {
            store,
            schema: kind.schema(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub async fn list(&self) -> Result<Vec<Record>, CrudError> {
        let records = self
            .store
            .select(self.schema, Filter::All)
            .await
            .map_err(CrudError::store(self.kind()))?;

        tracing::debug!(entity = %self.kind(), count = records.len(), "listed records");
        Ok(records)
    }

    pub async fn create(&self, raw: &JsonValue) -> Result<Record, CrudError> {
        let fields = validate(self.schema, raw, Mode::Create).map_err(|failure| CrudError::Validation {
            entity: self.kind(),
            failure,
        })?;

        let record = self
            .store
            .insert(self.schema, &fields)
            .await
            .map_err(CrudError::store(self.kind()))?;

        tracing::info!(entity = %self.kind(), id = ?record.id(), "created record");
        Ok(record)
    }

    pub async fn update(&self, id: i64, raw: &JsonValue) -> Result<Record, CrudError> {
        let fields = validate(self.schema, raw, Mode::Update).map_err(|failure| CrudError::Validation {
            entity: self.kind(),
            failure,
        })?;

        let record = self
            .store
            .update(self.schema, id, &fields)
            .await
            .map_err(CrudError::store(self.kind()))?
            .ok_or(CrudError::NotFound {
                entity: self.kind(),
                id,
            })?;

        tracing::info!(entity = %self.kind(), id, fields = ?fields.names(), "updated record");
        Ok(record)
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete(&self, id: i64) -> Result<(), CrudError> {
        let affected = self
            .store
            .delete(self.schema, id)
            .await
            .map_err(CrudError::store(self.kind()))?;

        if affected == 0 {
            tracing::debug!(entity = %self.kind(), id, "delete matched no rows");
        } else {
            tracing::info!(entity = %self.kind(), id, "deleted record");
        }
        Ok(())
    }
}
