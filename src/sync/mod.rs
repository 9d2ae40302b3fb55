//! Sync module - keeps the local note repository and the GitHub remote
//! consistent.
//!
//! The working copy is an ordinary git checkout; each captured memo is
//! staged, committed, and pushed to the shared `main` branch through
//! the `SyncManager`.

mod auth;
mod git;
#[cfg(test)]
mod git_test;
mod manager;
#[cfg(test)]
mod manager_test;
mod paths;
mod reporter;

pub use auth::build_authenticated_url;
#[cfg(test)]
pub use git::MockGitOps;
pub use git::{GitError, GitOps, RealGit};
pub use manager::{BRANCH, REMOTE_NAME, RemoteSpec, SyncError, SyncManager, SyncOutcome};
pub use paths::{INBOX_DIR, get_data_dir};
pub use reporter::{AckSignal, ack_for};
