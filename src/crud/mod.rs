//! Validated single-table CRUD.
//!
//! One generic handler serves every entity kind. The schema decides the table,
//! the writable fields and what is required on create; the store is injected.
//!
//! # Usage
//!
//! ```rust,ignore
//! use minilabs::crud::{self, Crud};
//! use minilabs::schema::{EntityKind, Note};
//!
//! // Mount the routes
//! let app = Router::new()
//!     .nest("/api/notes", crud::routes::<Note>())
//!     .with_state(app_state);
//!
//! // Use the library directly
//! let notes = Crud::new(store.as_ref(), EntityKind::Note);
//! let note = notes.create(&json!({ "content": "Buy milk" })).await?;
//! ```

mod handler;
mod lib;
mod routes;

pub use handler::error_response;
pub use lib::*;
pub use routes::routes;
