//! Roster bootstrap
//!
//! One reference image per identity in a flat directory; the file stem,
//! uppercased, is the canonical name. The roster is built once at startup
//! and never mutated during a session.

use crate::recognition::{Embedding, IdentityResolver};
use rollcall_common::{Error, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// A known identity: canonical name plus its reference embedding
#[derive(Debug, Clone)]
pub struct KnownIdentity {
    pub name: String,
    pub embedding: Embedding,
}

impl KnownIdentity {
    pub fn new(name: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            name: name.into(),
            embedding,
        }
    }
}

/// Immutable set of known identities
///
/// Embeddings are kept in a parallel slice so the resolver can compare a
/// probe against all of them in one call.
#[derive(Debug)]
pub struct Roster {
    identities: Vec<KnownIdentity>,
    embeddings: Vec<Embedding>,
}

impl Roster {
    pub fn from_identities(identities: Vec<KnownIdentity>) -> Self {
        let embeddings = identities.iter().map(|k| k.embedding.clone()).collect();
        Self {
            identities,
            embeddings,
        }
    }

    /// Build the roster from a directory of reference images.
    ///
    /// An image that fails to decode or yields no embedding is skipped with
    /// a warning; only a missing directory is fatal.
    pub fn load(dir: &Path, resolver: &dyn IdentityResolver) -> Result<Self> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| Error::Config(format!("Cannot read roster directory {}: {}", dir.display(), e)))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        let mut identities = Vec::new();
        for path in entries {
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            let name = stem.to_uppercase();

            let image = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping roster image {}: {}", path.display(), e);
                    continue;
                }
            };
            match resolver.encode(&image) {
                Ok(embeddings) => match embeddings.into_iter().next() {
                    Some(embedding) => {
                        info!("Loaded roster entry: {}", name);
                        identities.push(KnownIdentity::new(name, embedding));
                    }
                    None => {
                        warn!(
                            "Skipping roster image {}: no face found in image",
                            path.display()
                        );
                    }
                },
                Err(e) => {
                    warn!("Skipping roster image {}: {}", path.display(), e);
                }
            }
        }

        if identities.is_empty() {
            warn!("Roster is empty; every scan will resolve as UNKNOWN");
        }

        Ok(Self::from_identities(identities))
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Reference embeddings, index-aligned with the identity list
    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    pub fn name_at(&self, index: usize) -> &str {
        &self.identities[index].name
    }

    /// Unique canonical names, for absentee computation
    pub fn unique_names(&self) -> Vec<String> {
        self.identities
            .iter()
            .map(|k| k.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
