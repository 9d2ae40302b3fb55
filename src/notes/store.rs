//! On-disk memo store inside the working copy.

use std::fs;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use super::format::{format_note, note_filename};
use crate::listener::MessageReceived;
use crate::sync::INBOX_DIR;

/// Errors that can occur while writing a memo file.
#[derive(Error, Diagnostic, Debug)]
pub enum NoteError {
    #[error("Failed to write memo file: {0}")]
    #[diagnostic(code(memosync::notes::write_failed))]
    Io(#[from] std::io::Error),
}

/// Writes memo files into `00_inbox/` under the working copy.
pub struct NoteStore {
    work_dir: PathBuf,
}

impl NoteStore {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    /// Write one memo to disk and return its repo-relative path, ready
    /// to be staged. Creates the inbox directory if needed so writes
    /// keep working in local-only mode. An existing memo with the same
    /// timestamp name gets a numeric suffix rather than an overwrite.
    pub fn write(&self, msg: &MessageReceived) -> Result<PathBuf, NoteError> {
        let inbox = self.work_dir.join(INBOX_DIR);
        fs::create_dir_all(&inbox)?;

        // Two captures within the same second share a timestamp name;
        // suffix instead of overwriting the earlier memo.
        let base = note_filename(&msg.created_at);
        let mut filename = base.clone();
        let mut n = 1;
        while inbox.join(&filename).exists() {
            let stem = base.strip_suffix(".md").unwrap_or(&base);
            filename = format!("{stem}_{n}.md");
            n += 1;
        }

        let path = inbox.join(&filename);
        fs::write(&path, format_note(msg))?;
        debug!(path = %path.display(), "memo written");

        Ok(PathBuf::from(INBOX_DIR).join(filename))
    }
}
