//! Bulk import of stored query records from newline-delimited JSON.

use crate::errors::QueryError;
use std::io::{BufRead, BufReader, Read};

use super::{QueryRegistry, StoredQuery};

/// Decodes every line before inserting anything, so an unknown operation kind
/// or a malformed record leaves the registry untouched. Records then go
/// through [`QueryRegistry::import`], which rejects duplicate names and ids.
pub fn load_queries_ndjson<R: Read>(registry: &QueryRegistry, reader: R) -> Result<usize, QueryError> {
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let query: StoredQuery = serde_json::from_str(line)
            .map_err(|e| QueryError::InvalidDefinition(format!("stored query line {}: {e}", idx + 1)))?;
        records.push(query);
    }
    let n = records.len();
    for query in records {
        registry.import(query)?;
    }
    log::info!("imported {n} stored quer{}", if n == 1 { "y" } else { "ies" });
    Ok(n)
}
