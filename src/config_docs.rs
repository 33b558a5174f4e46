//! Named JSON documents loaded once at startup
//!
//! Every `*.json` file in the directory becomes an entry keyed by its file
//! stem. A document that cannot be read or parsed maps to `None` instead of
//! aborting startup.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub type ConfigDocs = BTreeMap<String, Option<Value>>;

pub fn load_config_dir(dir: impl AsRef<Path>) -> ConfigDocs {
    let dir = dir.as_ref();
    let mut docs = ConfigDocs::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::info!("No config documents loaded from {}: {}", dir.display(), e);
            return docs;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if !is_json || !path.is_file() {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));

        match parsed {
            Ok(value) => {
                docs.insert(name.to_string(), Some(value));
            }
            Err(e) => {
                log::warn!("⚠️  Config document {} is not valid JSON: {}", path.display(), e);
                docs.insert(name.to_string(), None);
            }
        }
    }

    log::info!("📝 Loaded {} config documents from {}", docs.len(), dir.display());
    docs
}
