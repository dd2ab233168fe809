//! Staged view of a workspace directory.
//!
//! Reads fall through to disk; creations and updates are kept in memory and
//! only reach the disk when [`StagedTree::flush`] is called. A failed
//! generation therefore leaves the workspace untouched.

use crate::edit::{apply_insertions, atomic_write, EditError, EditVerification, Insertion};
use crate::paths;
use crate::safety::{SafetyError, WorkspaceGuard};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("File {0} does not exist.")]
    FileNotFound(String),

    #[error("File {0} already exists.")]
    AlreadyExists(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not valid UTF-8")]
    Utf8(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

/// How a staged file relates to what is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct StagedFile {
    pub kind: StagedKind,
    pub content: String,
}

/// Insertions recorded against one file, not yet committed.
#[derive(Debug)]
#[must_use = "an UpdateRecorder does nothing until committed"]
pub struct UpdateRecorder {
    path: String,
    original: String,
    verification: EditVerification,
    insertions: Vec<Insertion>,
}

impl UpdateRecorder {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The text the recorded offsets refer to.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Record `text` to be inserted at `offset` of the original text.
    pub fn insert_left(&mut self, offset: usize, text: impl Into<String>) -> &mut Self {
        self.insertions.push(Insertion::new(offset, text));
        self
    }

    pub fn insertions(&self) -> &[Insertion] {
        &self.insertions
    }

    /// Splice the recorded insertions without committing them.
    pub fn preview(&self) -> Result<String, EditError> {
        apply_insertions(&self.original, &self.insertions)
    }
}

/// Staged content captured by [`StagedTree::checkpoint`].
#[derive(Debug, Clone)]
#[must_use = "a Checkpoint does nothing unless restored"]
pub struct Checkpoint(BTreeMap<String, StagedFile>);

/// A workspace directory with an in-memory overlay of pending writes.
#[derive(Debug)]
pub struct StagedTree {
    root: PathBuf,
    staged: BTreeMap<String, StagedFile>,
}

impl StagedTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staged: BTreeMap::new(),
        }
    }

    fn disk_path(&self, path: &str) -> PathBuf {
        self.root.join(paths::normalize(path))
    }

    /// Current content of `path`, staged or on disk; `None` if absent.
    pub fn read(&self, path: &str) -> Result<Option<String>, TreeError> {
        let key = paths::normalize(path);
        if let Some(file) = self.staged.get(&key) {
            return Ok(Some(file.content.clone()));
        }

        let disk = self.disk_path(&key);
        if disk.is_dir() {
            return Ok(None);
        }
        match fs::read(&disk) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| TreeError::Utf8(key)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TreeError::Io { path: disk, source }),
        }
    }

    /// Content of `path` as it was on disk before anything was staged.
    pub fn read_original(&self, path: &str) -> Option<String> {
        fs::read_to_string(self.disk_path(path)).ok()
    }

    pub fn exists(&self, path: &str) -> bool {
        let key = paths::normalize(path);
        self.staged.contains_key(&key) || self.disk_path(&key).is_file()
    }

    /// File names directly inside `dir`, staged files included, sorted.
    pub fn list_files(&self, dir: &str) -> Vec<String> {
        let dir = paths::normalize(dir);
        let mut names: Vec<String> = WalkDir::new(self.disk_path(&dir))
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();

        for key in self.staged.keys() {
            if paths::dirname(key) == dir {
                names.push(paths::basename(key));
            }
        }

        names.sort();
        names.dedup();
        names
    }

    /// Stage a new file; fails if it already exists.
    pub fn create(&mut self, path: &str, content: impl Into<String>) -> Result<(), TreeError> {
        let key = paths::normalize(path);
        if self.exists(&key) {
            return Err(TreeError::AlreadyExists(key));
        }
        tracing::debug!(path = %key, "staged new file");
        self.staged.insert(
            key,
            StagedFile {
                kind: StagedKind::Created,
                content: content.into(),
            },
        );
        Ok(())
    }

    /// Start recording insertions against the current content of `path`.
    pub fn begin_update(&self, path: &str) -> Result<UpdateRecorder, TreeError> {
        let key = paths::normalize(path);
        let original = self
            .read(&key)?
            .ok_or_else(|| TreeError::FileNotFound(key.clone()))?;

        Ok(UpdateRecorder {
            verification: EditVerification::from_text(&original),
            path: key,
            original,
            insertions: Vec::new(),
        })
    }

    /// Apply a recorder's insertions, replacing the staged content of its
    /// file exactly once.
    ///
    /// Fails without staging anything if the file changed since
    /// [`begin_update`](Self::begin_update) or an offset is invalid.
    pub fn commit_update(&mut self, recorder: UpdateRecorder) -> Result<(), TreeError> {
        let current = self
            .read(&recorder.path)?
            .ok_or_else(|| TreeError::FileNotFound(recorder.path.clone()))?;

        if !recorder.verification.matches(&current) {
            return Err(EditError::StaleDocument {
                file: PathBuf::from(&recorder.path),
                expected: recorder.verification.hash(),
                found: EditVerification::from_text(&current).hash(),
            }
            .into());
        }

        let patched = recorder.preview()?;
        let kind = match self.staged.get(&recorder.path) {
            Some(file) => file.kind,
            None => StagedKind::Updated,
        };

        tracing::debug!(
            path = %recorder.path,
            insertions = recorder.insertions.len(),
            "committed update"
        );
        self.staged.insert(
            recorder.path,
            StagedFile {
                kind,
                content: patched,
            },
        );
        Ok(())
    }

    /// Pending writes in path order.
    pub fn staged(&self) -> impl Iterator<Item = (&str, &StagedFile)> {
        self.staged.iter().map(|(path, file)| (path.as_str(), file))
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.staged.clone())
    }

    /// Drop everything staged since `checkpoint` was taken.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        let discarded = self.staged.len().saturating_sub(checkpoint.0.len());
        tracing::debug!(discarded, "restored staged tree");
        self.staged = checkpoint.0;
    }

    /// Write every staged file to disk.
    ///
    /// All targets are checked against `guard` before the first write; each
    /// file is then written atomically.
    pub fn flush(self, guard: &WorkspaceGuard) -> Result<Vec<PathBuf>, TreeError> {
        let targets = self
            .staged
            .iter()
            .map(|(path, file)| Ok((guard.validate_target(self.disk_path(path))?, file)))
            .collect::<Result<Vec<_>, SafetyError>>()?;

        let mut written = Vec::with_capacity(targets.len());
        for (target, file) in targets {
            atomic_write(&target, file.content.as_bytes())?;
            tracing::info!(path = %target.display(), kind = ?file.kind, "wrote file");
            written.push(target);
        }

        Ok(written)
    }
}
