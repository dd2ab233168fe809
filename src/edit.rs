use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: a pure insertion at a byte offset.
///
/// Offsets always refer to the text the insertion was planned against, never
/// to a partially patched buffer. Several insertions into one file are
/// reconciled by [`apply_insertions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "Insertion does nothing until it is applied"]
pub struct Insertion {
    /// Byte offset in the original text
    pub offset: usize,
    /// Text to insert at `offset`
    pub text: String,
}

impl Insertion {
    pub fn new(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
        }
    }
}

/// Verification strategy used to detect that a file changed between planning
/// and commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large files)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }

    /// Get hash value regardless of variant.
    pub fn hash(&self) -> u64 {
        match self {
            EditVerification::Hash(h) => *h,
            EditVerification::ExactMatch(text) => xxh3_64(text.as_bytes()),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("insertion offset {offset} is past the end of a {len}-byte document")]
    InvalidOffset { offset: usize, len: usize },

    #[error("insertion offset {offset} does not fall on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("{file} changed after its update was planned (expected hash {expected:016x}, found {found:016x})")]
    StaleDocument {
        file: PathBuf,
        expected: u64,
        found: u64,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Splice insertions into `original`, producing the new text.
///
/// Insertions are sorted by ascending original offset (stable, so insertions
/// sharing an offset keep their recorded order) and concatenated between the
/// untouched segments of the original:
/// `text[0..o1] + ins1 + text[o1..o2] + ins2 + ... + text[oN..]`.
///
/// Every offset is validated before any output is built, so a failure never
/// yields a partially patched text.
pub fn apply_insertions(original: &str, insertions: &[Insertion]) -> Result<String, EditError> {
    let mut ordered: Vec<&Insertion> = insertions.iter().collect();
    ordered.sort_by_key(|insertion| insertion.offset);

    for insertion in &ordered {
        if insertion.offset > original.len() {
            return Err(EditError::InvalidOffset {
                offset: insertion.offset,
                len: original.len(),
            });
        }
        if !original.is_char_boundary(insertion.offset) {
            return Err(EditError::NotCharBoundary {
                offset: insertion.offset,
            });
        }
    }

    let inserted: usize = ordered.iter().map(|insertion| insertion.text.len()).sum();
    let mut patched = String::with_capacity(original.len() + inserted);
    let mut cursor = 0;

    for insertion in ordered {
        patched.push_str(&original[cursor..insertion.offset]);
        patched.push_str(&insertion.text);
        cursor = insertion.offset;
    }
    patched.push_str(&original[cursor..]);

    Ok(patched)
}

/// Atomic file write: tempfile + fsync + rename, then bump mtime.
///
/// Either the full write succeeds or the file on disk is left unchanged.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Dev servers watching the tree key off mtime
    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    Ok(())
}
