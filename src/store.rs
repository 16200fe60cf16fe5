//! Localized store: one content tree per language, plus its on-disk layout.
//!
//! On disk a store is a directory holding one `<code>.json` document per
//! localized language and a `manifest.json` that maps language codes to
//! document files. Aliased languages have no document of their own; they are
//! listed in the manifest and served from the default language's tree.

use crate::content::ContentNode;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const MANIFEST_FILE: &str = "manifest.json";

static EMPTY_TREE: ContentNode = ContentNode::Null;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub default_language: String,
    pub generated_at: DateTime<Utc>,

    /// Language code to document file name, relative to the store directory
    pub documents: BTreeMap<String, String>,

    /// Languages intentionally served by the default document
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// In-memory store. Built once, then read-only.
#[derive(Debug, Clone)]
pub struct LocalizedStore {
    default_language: String,
    documents: BTreeMap<String, Arc<ContentNode>>,
    aliases: BTreeSet<String>,
}

impl LocalizedStore {
    pub fn new(default_language: impl Into<String>, default_tree: ContentNode) -> Self {
        let default_language = default_language.into();
        let mut documents = BTreeMap::new();
        documents.insert(default_language.clone(), Arc::new(default_tree));
        Self {
            default_language,
            documents,
            aliases: BTreeSet::new(),
        }
    }

    /// Add or replace a language's tree. The default language cannot be replaced.
    pub fn insert(&mut self, language: impl Into<String>, tree: ContentNode) {
        let language = language.into();
        if language == self.default_language {
            warn!("Ignoring attempt to replace default language '{}'", language);
            return;
        }
        self.aliases.remove(&language);
        self.documents.insert(language, Arc::new(tree));
    }

    /// Serve `language` from the default tree.
    pub fn alias_to_default(&mut self, language: impl Into<String>) {
        let language = language.into();
        if language == self.default_language {
            return;
        }
        let tree = self.default_arc();
        self.documents.insert(language.clone(), tree);
        self.aliases.insert(language);
    }

    pub fn get(&self, language: &str) -> Option<&ContentNode> {
        self.documents.get(language).map(Arc::as_ref)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn default_tree(&self) -> &ContentNode {
        self.documents
            .get(&self.default_language)
            .map(Arc::as_ref)
            .unwrap_or(&EMPTY_TREE)
    }

    pub fn languages(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, language: &str) -> bool {
        self.documents.contains_key(language)
    }

    pub fn is_alias(&self, language: &str) -> bool {
        self.aliases.contains(language)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    fn default_arc(&self) -> Arc<ContentNode> {
        self.documents
            .get(&self.default_language)
            .cloned()
            .unwrap_or_else(|| Arc::new(ContentNode::Null))
    }

    /// Load a published store.
    ///
    /// Fails if the manifest or any listed document is unreadable, if a
    /// document is not a JSON object, or if the default language is missing.
    /// Documents whose structure differs from the default tree are loaded
    /// with a warning.
    pub fn load(dir: &Path) -> Result<Self, StoreError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&manifest_path)
            .map_err(|e| StoreError::io(&manifest_path, e))?;
        let manifest: Manifest =
            serde_json::from_str(&raw).map_err(|source| StoreError::Manifest {
                path: manifest_path.clone(),
                source,
            })?;

        let default_file = manifest
            .documents
            .get(&manifest.default_language)
            .ok_or_else(|| StoreError::MissingDefault(manifest.default_language.clone()))?;
        let default_tree = read_document(&manifest.default_language, &dir.join(default_file))?;

        let mut store = Self::new(manifest.default_language.clone(), default_tree);

        for (language, file) in &manifest.documents {
            if *language == manifest.default_language {
                continue;
            }
            let tree = read_document(language, &dir.join(file))?;
            if !tree.same_shape(store.default_tree()) {
                warn!(
                    "Document for '{}' does not match the structure of '{}'",
                    language, manifest.default_language
                );
            }
            store.insert(language.clone(), tree);
        }

        for language in &manifest.aliases {
            store.alias_to_default(language.clone());
        }

        info!(
            "Loaded store from {} ({} languages, {} aliased)",
            dir.display(),
            store.documents.len(),
            store.aliases.len()
        );
        Ok(store)
    }
}

fn read_document(language: &str, path: &Path) -> Result<ContentNode, StoreError> {
    let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let tree: ContentNode =
        serde_json::from_str(&raw).map_err(|e| StoreError::MalformedDocument {
            language: language.to_string(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if tree.as_map().is_none() {
        return Err(StoreError::MalformedDocument {
            language: language.to_string(),
            path: path.to_path_buf(),
            reason: format!("top level is a {}, expected an object", tree.kind()),
        });
    }
    Ok(tree)
}

/// Writes a store to disk so readers never observe a half-written directory.
pub struct StoreWriter;

impl StoreWriter {
    /// Publish `store` into `dir`, replacing any previous store there.
    ///
    /// Everything is written to a sibling staging directory first. The old
    /// store is then moved aside and the staging directory renamed into place.
    /// If that second rename fails the old store is moved back.
    pub fn publish(store: &LocalizedStore, dir: &Path) -> Result<Manifest, StoreError> {
        let staging = sibling(dir, "staging");
        let previous = sibling(dir, "previous");

        Self::recover(dir)?;

        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| StoreError::io(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| StoreError::io(&staging, e))?;

        let mut documents = BTreeMap::new();
        for (language, tree) in &store.documents {
            if store.is_alias(language) {
                continue;
            }
            let file = format!("{}.json", language);
            write_json(&staging.join(&file), &**tree)?;
            debug!("Staged document for '{}'", language);
            documents.insert(language.clone(), file);
        }

        let manifest = Manifest {
            default_language: store.default_language.clone(),
            generated_at: Utc::now(),
            documents,
            aliases: store.aliases.iter().cloned().collect(),
        };
        write_json(&staging.join(MANIFEST_FILE), &manifest)?;

        if previous.exists() {
            fs::remove_dir_all(&previous).map_err(|e| StoreError::io(&previous, e))?;
        }
        if dir.exists() {
            fs::rename(dir, &previous).map_err(|e| StoreError::io(dir, e))?;
        }
        if let Err(e) = fs::rename(&staging, dir) {
            if previous.exists() {
                if let Err(restore) = fs::rename(&previous, dir) {
                    error!(
                        "Failed to restore {} from {}: {}",
                        dir.display(),
                        previous.display(),
                        restore
                    );
                }
            }
            return Err(StoreError::io(dir, e));
        }
        if previous.exists() {
            fs::remove_dir_all(&previous).map_err(|e| StoreError::io(&previous, e))?;
        }

        info!(
            "Published {} documents to {}",
            manifest.documents.len(),
            dir.display()
        );
        Ok(manifest)
    }

    /// Put back a store left aside by a publish that stopped between its two
    /// renames. Returns whether anything was restored.
    pub fn recover(dir: &Path) -> Result<bool, StoreError> {
        let previous = sibling(dir, "previous");
        if dir.exists() || !previous.exists() {
            return Ok(false);
        }
        fs::rename(&previous, dir).map_err(|e| StoreError::io(dir, e))?;
        warn!("Restored {} from an interrupted publish", dir.display());
        Ok(true)
    }
}

/// `<parent>/.<name>.<suffix>`, next to `dir` so renames stay on one filesystem.
fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    dir.with_file_name(format!(".{}.{}", name, suffix))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        StoreError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    fs::write(path, json).map_err(|e| StoreError::io(path, e))
}
