use thiserror::Error;

use crate::schema::EntityKind;

/// Infrastructure failures raised by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DatabaseError")]
    Database(#[from] libsql::Error),
    #[error("DecodeError: column {column}: {message}")]
    Decode { column: String, message: String },
    #[error("MigrationError: {name}: {message}")]
    Migration { name: String, message: String },
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// Client-caused input problems. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("at least one of these fields must be non-empty: {}", .0.join(", "))]
    AllFieldsEmpty(Vec<&'static str>),
    #[error("invalid value for fields: {}", .0.join(", "))]
    TypeCoercionFailed(Vec<&'static str>),
}

impl ValidationFailure {
    pub fn fields(&self) -> &[&'static str] {
        use ValidationFailure::*;
        match self {
            MissingFields(f) | AllFieldsEmpty(f) | TypeCoercionFailed(f) => f,
        }
    }
}

#[derive(Debug, Error)]
pub enum CrudError {
    #[error("invalid {entity}: {failure}")]
    Validation {
        entity: EntityKind,
        failure: ValidationFailure,
    },
    #[error("{entity} store failure")]
    Store {
        entity: EntityKind,
        #[source]
        source: StoreError,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },
}

impl CrudError {
    pub fn store(entity: EntityKind) -> impl FnOnce(StoreError) -> CrudError {
        move |source| CrudError::Store { entity, source }
    }

    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            CrudError::Validation { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_message_keeps_entity_and_cause() {
        let err = CrudError::Store {
            entity: EntityKind::Note,
            source: StoreError::Unavailable("connection reset".to_string()),
        };
        assert_eq!(
            crate::unpack_error(&err),
            "note store failure: Unavailable: connection reset"
        );
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err = CrudError::Validation {
            entity: EntityKind::Mech,
            failure: ValidationFailure::MissingFields(vec!["variant"]),
        };
        assert_eq!(err.to_string(), "invalid mech: missing required fields: variant");
        assert_eq!(err.validation_failure().map(|f| f.fields()), Some(&["variant"][..]));
    }
}
