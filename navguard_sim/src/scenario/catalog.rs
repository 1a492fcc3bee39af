// navguard_sim/src/scenario/catalog.rs

//! Named lane profiles shared across scenarios.

use std::collections::HashMap;
use std::path::Path;

use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Raw lane profiles keyed by their path below the catalog root, with
/// separators replaced by dots (`lanes/fixed_wing.toml` is `lanes.fixed_wing`).
#[derive(Debug, Default, Clone)]
pub struct ProfileCatalog(pub HashMap<String, Value>);

impl ProfileCatalog {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Walks `root` and parses every `.toml` file into the catalog.
///
/// A missing directory yields an empty catalog. Files that fail to parse are
/// logged and skipped so one bad profile does not take the others down.
pub fn load_catalog(root: &Path) -> ProfileCatalog {
    let mut catalog = ProfileCatalog::default();
    if !root.exists() {
        warn!(?root, "profile catalog not found, no profiles loaded");
        return catalog;
    }

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "toml"))
    {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let key = relative
            .with_extension("")
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, ".");

        match Figment::new().merge(Toml::file(path)).extract::<Value>() {
            Ok(data) => {
                debug!(%key, "loaded lane profile");
                catalog.0.insert(key, data);
            }
            Err(e) => {
                error!(?path, %e, "failed to load lane profile");
            }
        }
    }
    catalog
}
