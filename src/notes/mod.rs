//! Note formatting and storage.
//!
//! Turns a captured chat message into a timestamped Markdown memo file
//! inside the working copy's inbox directory. Writes are never rolled
//! back by later sync failures.

mod format;
#[cfg(test)]
mod format_test;
mod store;

pub use format::{format_note, note_filename};
pub use store::{NoteError, NoteStore};
