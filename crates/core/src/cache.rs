//! Content-addressed caching for synthesized speech.
//!
//! Every distinct (text, voice, tone) triple maps to one deterministic
//! filename, so re-synthesis of identical input is a file-existence check.
//! Concurrent requests may race on the same path; each writer stages its
//! own uniquely named temp file before the rename, and since the content
//! for a given key is identical the last writer winning is harmless.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::types::Tone;

/// The one error class that propagates out of the pipeline: the storage
/// medium itself cannot be written, placeholder included.
#[derive(Debug, thiserror::Error)]
#[error("storage unavailable at {path}: {source}")]
pub struct StorageUnavailable {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Get the cache directory.
///
/// Uses `TALESPIN_CACHE_DIR` env var if set, otherwise `~/.cache/talespin`.
pub fn cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TALESPIN_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".cache").join("talespin")
}

/// Get the directory holding effect assets and the placeholder.
///
/// Uses `TALESPIN_ASSETS_DIR` env var if set, otherwise `<cache>/assets`.
pub fn assets_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TALESPIN_ASSETS_DIR") {
        return PathBuf::from(dir);
    }
    cache_dir().join("assets")
}

/// Deterministic fingerprint of a (text, voice, tone) synthesis request.
///
/// Short hex prefix of SHA-256(text); the voice and tone are folded into
/// the filename rather than the hash so cache entries stay greppable.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{:x}", digest);
    hex[..10].to_string()
}

/// Cache filename for one synthesis request.
pub fn speech_filename(text: &str, voice_id: &str, tone: Tone) -> String {
    format!("speech_{}_{}_{}.wav", voice_id, tone, fingerprint(text))
}

/// Full cache path for one synthesis request under `dir`.
pub fn speech_cache_path(dir: &Path, text: &str, voice_id: &str, tone: Tone) -> PathBuf {
    dir.join("speech").join(speech_filename(text, voice_id, tone))
}

/// Atomically write data to a file via a unique temp file + rename.
///
/// Same-key racers each stage their own temp file, so neither can tear or
/// steal the other's in-flight write; the last rename wins.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<(), StorageUnavailable> {
    let fail = |source| StorageUnavailable { path: target.to_path_buf(), source };

    let parent = target.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(fail)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(fail)?;
    tmp.write_all(data).map_err(fail)?;
    tmp.persist(target).map_err(|e| fail(e.error))?;
    Ok(())
}

/// True if a cached artifact exists and is non-empty at `path`.
pub fn is_cached(path: &Path) -> bool {
    path.exists() && path.metadata().map(|m| m.len() > 0).unwrap_or(false)
}
