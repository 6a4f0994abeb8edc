/**
    Corpus loading
    The whole CSV file is read into memory as one string. No CSV structure is
    checked here; rows are just text as far as the chunker and the embedding
    provider are concerned. The SHA-256 of the contents travels with the corpus
    so the index cache can tell when the file changed underneath it.
*/
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Corpus {
    pub path: PathBuf,
    pub contents: String,
    pub sha256: String,
}

impl Corpus {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => AppError::Io(e),
        })?;

        debug!(path = %path.display(), bytes = contents.len(), "Loaded corpus");

        Ok(Self {
            path: path.to_path_buf(),
            sha256: sha256_hex(&contents),
            contents,
        })
    }
}

pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
