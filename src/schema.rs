//! Entity schemas.
//!
//! Every feature of the service is a single flat table. A schema names the
//! table, the writable fields and which of them must be present on create.
//! `id` and `created_at` are store-assigned and never appear in `fields`.

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    Int,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Value written by the store when the field is absent on create.
    pub default: Option<FieldDefault>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Bool(bool),
}

impl FieldDefault {
    pub fn to_json(self) -> JsonValue {
        match self {
            FieldDefault::Bool(b) => JsonValue::Bool(b),
        }
    }
}

const fn text(name: &'static str, required: bool) -> Field {
    Field {
        name,
        kind: FieldKind::Text,
        required,
        default: None,
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub table: &'static str,
    pub fields: &'static [Field],
}

impl EntitySchema {
    pub fn required(&self) -> impl Iterator<Item = &'static Field> + '_ {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Column list used by every SELECT and RETURNING clause, in row order.
    pub fn columns(&self) -> String {
        let mut cols = vec!["id"];
        cols.extend(self.fields.iter().map(|f| f.name));
        cols.push("created_at");
        cols.join(", ")
    }
}

pub static NOTE: EntitySchema = EntitySchema {
    kind: EntityKind::Note,
    table: "notes",
    fields: &[text("content", true)],
};

pub static TODO: EntitySchema = EntitySchema {
    kind: EntityKind::Todo,
    table: "todos",
    fields: &[
        text("task", true),
        Field {
            name: "is_complete",
            kind: FieldKind::Bool,
            required: false,
            default: Some(FieldDefault::Bool(false)),
        },
    ],
};

pub static MECH: EntitySchema = EntitySchema {
    kind: EntityKind::Mech,
    table: "mechs",
    fields: &[
        text("name", true),
        text("variant", true),
        text("description", true),
    ],
};

pub static FLASHCARD: EntitySchema = EntitySchema {
    kind: EntityKind::Flashcard,
    table: "flashcards",
    fields: &[text("question", true), text("answer", true)],
};

pub static FORM: EntitySchema = EntitySchema {
    kind: EntityKind::Form,
    table: "forms",
    fields: &[
        text("first_name", true),
        text("last_name", true),
        text("email", true),
        Field {
            name: "phone",
            kind: FieldKind::Int,
            required: false,
            default: None,
        },
        text("message", true),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Note,
    Todo,
    Mech,
    Flashcard,
    Form,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Note,
        EntityKind::Todo,
        EntityKind::Mech,
        EntityKind::Flashcard,
        EntityKind::Form,
    ];

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::Note => &NOTE,
            EntityKind::Todo => &TODO,
            EntityKind::Mech => &MECH,
            EntityKind::Flashcard => &FLASHCARD,
            EntityKind::Form => &FORM,
        }
    }

    /// Human readable name used in messages and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Note => "note",
            EntityKind::Todo => "todo",
            EntityKind::Mech => "mech",
            EntityKind::Flashcard => "flashcard",
            EntityKind::Form => "form submission",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-level handle on an entity kind so axum handlers can be generic over it.
pub trait Entity: Send + Sync + 'static {
    const KIND: EntityKind;
}

pub struct Note;
pub struct Todo;
pub struct Mech;
pub struct Flashcard;
pub struct Form;

impl Entity for Note {
    const KIND: EntityKind = EntityKind::Note;
}

impl Entity for Todo {
    const KIND: EntityKind = EntityKind::Todo;
}

impl Entity for Mech {
    const KIND: EntityKind = EntityKind::Mech;
}

impl Entity for Flashcard {
    const KIND: EntityKind = EntityKind::Flashcard;
}

impl Entity for Form {
    const KIND: EntityKind = EntityKind::Form;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_point_at_their_schema() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.schema().kind, kind);
        }
    }

    #[test]
    fn test_columns_wrap_fields_with_store_assigned_ones() {
        assert_eq!(NOTE.columns(), "id, content, created_at");
        assert_eq!(TODO.columns(), "id, task, is_complete, created_at");
    }

    #[test]
    fn test_required_fields() {
        let required: Vec<_> = FORM.required().map(|f| f.name).collect();
        assert_eq!(required, vec!["first_name", "last_name", "email", "message"]);
        assert_eq!(TODO.required().count(), 1);
    }
}
