//! Loading the car table from a JSON document
//!
//! The document is a top-level object holding an array of flat records under
//! a known key, e.g. `{"cars": [{"make": "Ford", ...}, ...]}`.

use crate::table::frame::CarTable;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Anything that stops the table from loading. These end the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: simd_json::Error,
    },

    #[error("expected a JSON object at the top level of {origin}")]
    NotAnObject { origin: String },

    #[error("key '{key}' not found in {origin}")]
    MissingKey { origin: String, key: String },

    #[error("'{key}' in {origin} is not an array")]
    NotAnArray { origin: String, key: String },

    #[error("record {index} under '{key}' in {origin} is not an object")]
    RecordNotObject {
        origin: String,
        key: String,
        index: usize,
    },
}

/// Read and parse the file at `path`, taking the records stored under `key`
pub fn load_path(path: &Path, key: &str) -> Result<CarTable, LoadError> {
    let origin = path.display().to_string();
    let mut content = std::fs::read(path).map_err(|source| LoadError::Io {
        origin: origin.clone(),
        source,
    })?;
    debug!("read {} bytes from {}", content.len(), origin);

    parse_slice(&mut content, key, &origin)
}

/// Parse an in-memory JSON document. simd-json parses in place, hence `&mut`.
pub fn parse_slice(content: &mut [u8], key: &str, origin: &str) -> Result<CarTable, LoadError> {
    let document: Value =
        simd_json::serde::from_slice(content).map_err(|source| LoadError::Json {
            origin: origin.to_string(),
            source,
        })?;

    from_document(document, key, origin)
}

/// Build the table from an already parsed document
pub fn from_document(document: Value, key: &str, origin: &str) -> Result<CarTable, LoadError> {
    let mut root = match document {
        Value::Object(root) => root,
        _ => {
            return Err(LoadError::NotAnObject {
                origin: origin.to_string(),
            })
        }
    };

    let records = match root.remove(key) {
        Some(Value::Array(records)) => records,
        Some(_) => {
            return Err(LoadError::NotAnArray {
                origin: origin.to_string(),
                key: key.to_string(),
            })
        }
        None => {
            return Err(LoadError::MissingKey {
                origin: origin.to_string(),
                key: key.to_string(),
            })
        }
    };

    let records = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(fields) => Ok(fields),
            _ => Err(LoadError::RecordNotObject {
                origin: origin.to_string(),
                key: key.to_string(),
                index,
            }),
        })
        .collect::<Result<Vec<Map<String, Value>>, _>>()?;

    Ok(CarTable::from_records(records))
}
