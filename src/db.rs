use crate::config::Config;
use crate::error::StoreError;
use crate::model::Record;
use crate::schema::{EntitySchema, FieldKind};
use crate::store::{Filter, RecordStore};
use crate::validate::NormalizedFields;
use anyhow::Result;
use async_trait::async_trait;
use libsql::{Builder, Connection, Database as LibsqlDatabase, Value};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[
    ("001_notes.sql", include_str!("migrations/001_notes.sql")),
    ("002_todos.sql", include_str!("migrations/002_todos.sql")),
    ("003_mechs.sql", include_str!("migrations/003_mechs.sql")),
    ("004_flashcards.sql", include_str!("migrations/004_flashcards.sql")),
    ("005_forms.sql", include_str!("migrations/005_forms.sql")),
];

pub struct Database {
    db: LibsqlDatabase,
    conn: Connection,
    turso_url: Option<String>,
    turso_auth_token: Option<String>,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_replica(turso_url: &Option<String>, turso_auth_token: &Option<String>) -> bool {
        turso_url.is_some() && turso_auth_token.is_some()
    }

    pub async fn sync(&self) -> Result<()> {
        if Self::is_replica(&self.turso_url, &self.turso_auth_token) {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql).await.map_err(|e| StoreError::Migration {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.app.get_db());
        let turso_url = cfg.app.turso_url.clone();
        let turso_auth_token = cfg.app.turso_auth_token.clone();

        let db = match (&turso_url, &turso_auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.app.sync_interval_seconds);
                Builder::new_synced_database(&path, url.clone(), token.clone())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            _ => Builder::new_local(&path).build().await?,
        };

        Self::setup(db, turso_url, turso_auth_token).await
    }

    /// Opens a plain local database file, without replication.
    pub async fn open_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        Self::setup(db, None, None).await
    }

    async fn setup(
        db: LibsqlDatabase,
        turso_url: Option<String>,
        turso_auth_token: Option<String>,
    ) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        for (filename, sql) in MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database {
            db,
            conn,
            turso_url,
            turso_auth_token,
        })
    }

    fn to_params(fields: &NormalizedFields) -> Vec<Value> {
        fields.iter().map(|(_, v)| json_to_value(v)).collect()
    }

    async fn fetch_one(&self, query: &str, params: Vec<Value>, schema: &EntitySchema) -> Result<Option<Record>, StoreError> {
        let mut rows = self.conn.query(query, params).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row, schema)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn select(&self, schema: &EntitySchema, filter: Filter) -> Result<Vec<Record>, StoreError> {
        let (query, params) = match filter {
            Filter::All => (
                format!(
                    "SELECT {} FROM {} ORDER BY created_at DESC, id DESC",
                    schema.columns(),
                    schema.table
                ),
                vec![],
            ),
            Filter::Id(id) => (
                format!("SELECT {} FROM {} WHERE id = ?", schema.columns(), schema.table),
                vec![Value::Integer(id)],
            ),
        };

        let mut rows = self.conn.query(&query, params).await?;
        let mut records = Vec::new();

        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row, schema)?);
        }

        Ok(records)
    }

    async fn insert(&self, schema: &EntitySchema, fields: &NormalizedFields) -> Result<Record, StoreError> {
        let query = if fields.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING {}",
                schema.table,
                schema.columns()
            )
        } else {
            let names = fields.names();
            let placeholders = vec!["?"; names.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                schema.table,
                names.join(", "),
                placeholders,
                schema.columns()
            )
        };

        self.fetch_one(&query, Self::to_params(fields), schema)
            .await?
            .ok_or_else(|| StoreError::Unavailable(format!("insert into {} returned no row", schema.table)))
    }

    async fn update(
        &self,
        schema: &EntitySchema,
        id: i64,
        fields: &NormalizedFields,
    ) -> Result<Option<Record>, StoreError> {
        if fields.is_empty() {
            return Ok(self.select(schema, Filter::Id(id)).await?.into_iter().next());
        }

        let updates: Vec<String> = fields.names().iter().map(|n| format!("{} = ?", n)).collect();
        let mut params = Self::to_params(fields);
        params.push(Value::Integer(id));

        let query = format!(
            "UPDATE {} SET {} WHERE id = ? RETURNING {}",
            schema.table,
            updates.join(", "),
            schema.columns()
        );

        self.fetch_one(&query, params, schema).await
    }

    async fn delete(&self, schema: &EntitySchema, id: i64) -> Result<u64, StoreError> {
        let query = format!("DELETE FROM {} WHERE id = ?", schema.table);
        let affected = self.conn.execute(&query, libsql::params![id]).await?;
        Ok(affected)
    }
}

fn json_to_value(v: &JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Integer(*b as i64),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .unwrap_or_else(|| Value::Real(n.as_f64().unwrap_or_default())),
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

fn decode_err(column: &str, message: impl std::fmt::Display) -> StoreError {
    StoreError::Decode {
        column: column.to_string(),
        message: message.to_string(),
    }
}

fn row_to_record(row: &libsql::Row, schema: &EntitySchema) -> Result<Record, StoreError> {
    let mut record = Record::new();

    let id = match row.get_value(0)? {
        Value::Integer(i) => i,
        other => return Err(decode_err("id", format!("expected integer, got {:?}", other))),
    };
    record.set("id", JsonValue::from(id));

    for (i, field) in schema.fields.iter().enumerate() {
        let value = row.get_value(i as i32 + 1)?;
        let json = match (field.kind, value) {
            (_, Value::Null) => JsonValue::Null,
            (FieldKind::Text, Value::Text(s)) => JsonValue::String(s),
            (FieldKind::Bool, Value::Integer(n)) => JsonValue::Bool(n != 0),
            (FieldKind::Int, Value::Integer(n)) => JsonValue::from(n),
            (kind, other) => {
                return Err(decode_err(
                    field.name,
                    format!("expected {:?}, got {:?}", kind, other),
                ));
            }
        };
        record.set(field.name, json);
    }

    let created_at_idx = schema.fields.len() as i32 + 1;
    let created_at: String = row
        .get(created_at_idx)
        .map_err(|e| decode_err("created_at", e))?;
    record.set("created_at", JsonValue::String(created_at));

    Ok(record)
}
