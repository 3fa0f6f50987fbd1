use std::error::Error;

pub mod config;
pub mod crud;
pub mod db;
pub mod error;
pub mod flashcards;
pub mod handler;
pub mod model;
pub mod schema;
pub mod store;
pub mod validate;

/// Flattens an error and its sources into one `a: b: c` line.
pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
