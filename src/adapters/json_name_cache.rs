//! Local symbol-to-name JSON cache.
//!
//! One flat JSON object (`{"600519": "Kweichow Moutai", ...}`) consulted
//! before any registry lookup. Read-only: an unreadable or malformed file is
//! simply an empty map.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct JsonNameCache {
    map: HashMap<String, String>,
}

impl JsonNameCache {
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) else {
            return Self::default();
        };
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let map = object
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|name| (k.clone(), name.to_string())))
            .collect();
        Self { map }
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.map
    }
}
