//! Seed collections from newline-delimited JSON files.

use crate::errors::StoreError;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::MemoryStore;

/// Inserts one document per non-empty line. Returns the number inserted.
pub fn load_ndjson<R: Read>(
    store: &MemoryStore,
    collection: &str,
    reader: R,
) -> Result<usize, StoreError> {
    let mut reader = BufReader::new(reader);
    let mut buf = String::with_capacity(8 * 1024);
    let mut line_no = 0usize;
    let mut inserted = 0usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        let v: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            StoreError::InvalidDocument(format!("{collection} line {line_no}: {e}"))
        })?;
        store.insert_json(collection, &v)?;
        inserted += 1;
    }
    log::info!("loaded {inserted} document(s) into '{collection}'");
    Ok(inserted)
}

/// Loads every `*.ndjson` file in `dir`; the file stem names the collection.
pub fn load_ndjson_dir(store: &MemoryStore, dir: &Path) -> Result<Vec<(String, usize)>, StoreError> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("ndjson"))
        .collect();
    entries.sort();
    let mut loaded = Vec::with_capacity(entries.len());
    for path in entries {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let n = load_ndjson(store, &stem, std::fs::File::open(&path)?)?;
        loaded.push((stem, n));
    }
    Ok(loaded)
}
