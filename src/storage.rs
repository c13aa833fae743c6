//! Feed storage
//!
//! Writes named artifacts into the storage directory shared with the site
//! build. Writes go through a temporary file in the same directory and a
//! rename, so readers never see a partial file.

use crate::error::AppResult;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Name of the feed artifact
pub const FEED_ARTIFACT: &str = "ffs.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Written { path: PathBuf, digest: String },
    /// Existing artifact already had identical content
    Unchanged { path: PathBuf, digest: String },
}

pub struct FeedStorage {
    dir: PathBuf,
}

impl FeedStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Store `contents` under `name`, replacing any previous version
    pub fn put(&self, name: &str, contents: &[u8]) -> AppResult<PutOutcome> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_of(name);
        let digest = sha256_hex(contents);

        if let Some(existing) = existing_digest(&path)? {
            if existing == digest {
                debug!("{} unchanged (sha256 {})", path.display(), digest);
                return Ok(PutOutcome::Unchanged { path, digest });
            }
        }

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        info!(
            "Wrote {} ({} bytes, sha256 {})",
            path.display(),
            contents.len(),
            digest
        );
        Ok(PutOutcome::Written { path, digest })
    }
}

fn existing_digest(path: &Path) -> AppResult<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(sha256_hex(&bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
