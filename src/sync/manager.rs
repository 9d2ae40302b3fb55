//! Repository state manager - owns the note working copy.
//!
//! Coordinates clone-or-reconcile at startup and the
//! pull/stage/commit/push sequence for each new memo.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::auth::build_authenticated_url;
use super::git::{GitError, GitOps};
use super::paths::INBOX_DIR;

/// Name of the single remote the manager keeps pointed at GitHub.
pub const REMOTE_NAME: &str = "origin";

/// The one shared branch everything syncs through.
pub const BRANCH: &str = "main";

/// Commit message used when bootstrap finds uncommitted drift.
const AUTO_COMMIT_MESSAGE: &str = "Auto-commit local changes";

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Initial clone failed: {0}")]
    CloneFailed(#[source] GitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one publish attempt.
///
/// Produced fresh per call and consumed immediately by the message
/// handler to pick an acknowledgment reaction. A failed push is never
/// retried here; the next memo triggers a fresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Memo committed and pushed to the remote branch.
    Success,
    /// Memo written to disk but staging, commit, or push failed.
    PushFailedLocalSaved,
    /// The memo could not even be written locally.
    FatalLocalError,
}

/// Remote repository settings, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct RemoteSpec {
    pub url: String,
    pub username: String,
    pub token: String,
    pub committer_name: String,
    pub committer_email: String,
}

impl RemoteSpec {
    fn authenticated_url(&self) -> String {
        build_authenticated_url(&self.url, &self.username, &self.token)
    }
}

/// Sync manager owns the working-copy path for the process lifetime.
///
/// Generic over `GitOps` so tests can use `MockGitOps` while production
/// uses `RealGit`. No other component mutates the working copy directly.
pub struct SyncManager<G: GitOps> {
    git: G,
    work_dir: PathBuf,
    remote: RemoteSpec,
}

impl<G: GitOps> SyncManager<G> {
    /// Create a new sync manager for the given working-copy path.
    pub fn new(git: G, work_dir: PathBuf, remote: RemoteSpec) -> Self {
        Self {
            git,
            work_dir,
            remote,
        }
    }

    /// Path of the working copy.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the inbox subdirectory new memos are written into.
    pub fn inbox_dir(&self) -> PathBuf {
        self.work_dir.join(INBOX_DIR)
    }

    /// Check if a working copy exists at the configured path.
    pub fn is_initialized(&self) -> bool {
        self.work_dir.join(".git").exists()
    }

    /// Idempotent bootstrap, run once at process start.
    ///
    /// Without a working copy this clones the remote and sets committer
    /// identity; a clone failure is returned to the caller (sync stays
    /// disabled for the session, memo writes keep working). With an
    /// existing working copy it reconciles instead, and any error on
    /// that path is logged and swallowed - the process continues with
    /// whatever local state resulted.
    pub fn ensure_ready(&self) -> Result<(), SyncError> {
        let bootstrap = if self.is_initialized() {
            if let Err(e) = self.reconcile() {
                warn!(
                    error = %e,
                    path = %self.work_dir.display(),
                    "reconcile of existing working copy failed; continuing with local state"
                );
            }
            Ok(())
        } else {
            self.clone_fresh()
        };

        // Memo writes must keep working even in local-only mode.
        fs::create_dir_all(self.inbox_dir())?;

        bootstrap
    }

    /// Publish one memo that has already been written to disk.
    ///
    /// `relative_path` is relative to the working copy root. The file is
    /// never deleted or rolled back on sync failure.
    pub fn publish(&self, relative_path: &Path) -> SyncOutcome {
        let filename = relative_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| relative_path.to_string_lossy().into_owned());

        // Repair the remote in case something re-pointed it since bootstrap.
        if let Err(e) = self.repoint_remote() {
            warn!(error = %e, "failed to re-point remote before publish");
        }

        // A failed pull does not abort the sequence: the push may still
        // succeed, or will itself fail and be reported below.
        if let Err(e) = self.git.pull_rebase(&self.work_dir, REMOTE_NAME, BRANCH) {
            warn!(error = %e, "pull --rebase before publish failed; continuing");
        }

        match self.stage_commit_push(relative_path, &filename) {
            Ok(()) => {
                info!(file = %filename, "memo pushed to remote");
                SyncOutcome::Success
            }
            Err(e) => {
                error!(error = %e, file = %filename, "publish failed; memo saved locally only");
                SyncOutcome::PushFailedLocalSaved
            }
        }
    }

    fn stage_commit_push(&self, relative_path: &Path, filename: &str) -> Result<(), GitError> {
        let staged = vec![relative_path.to_string_lossy().into_owned()];
        self.git.add_files(&self.work_dir, &staged)?;
        self.git
            .commit(&self.work_dir, &format!("Add memo: {}", filename))?;
        self.git.push(&self.work_dir, REMOTE_NAME, BRANCH)?;
        Ok(())
    }

    fn clone_fresh(&self) -> Result<(), SyncError> {
        info!(path = %self.work_dir.display(), "no working copy found; cloning");
        self.git
            .clone_repo(&self.remote.authenticated_url(), &self.work_dir)
            .map_err(SyncError::CloneFailed)?;
        self.set_identity()?;
        Ok(())
    }

    /// Bring an existing working copy back to a clean, rebased state:
    /// identity, authenticated remote, one auto-commit for any drift,
    /// then a rebase pull. Drift is always committed before pulling so
    /// the rebase never starts from a dirty tree.
    fn reconcile(&self) -> Result<(), SyncError> {
        self.set_identity()?;
        self.repoint_remote()?;

        let status = self.git.status_porcelain(&self.work_dir)?;
        let drift = String::from_utf8_lossy(&status.stdout);
        if !drift.trim().is_empty() {
            info!("working copy has uncommitted drift; auto-committing before pull");
            self.git.add_all(&self.work_dir)?;
            self.git.commit(&self.work_dir, AUTO_COMMIT_MESSAGE)?;
        }

        self.git.pull_rebase(&self.work_dir, REMOTE_NAME, BRANCH)?;
        Ok(())
    }

    fn set_identity(&self) -> Result<(), GitError> {
        self.git
            .set_config(&self.work_dir, "user.name", &self.remote.committer_name)?;
        self.git
            .set_config(&self.work_dir, "user.email", &self.remote.committer_email)?;
        Ok(())
    }

    /// Point the remote at the authenticated URL. When the remote
    /// already matches, the repair is skipped entirely; otherwise any
    /// stale remote is removed and re-added. A missing remote makes the
    /// removal a no-op.
    fn repoint_remote(&self) -> Result<(), GitError> {
        let wanted = self.remote.authenticated_url();
        if let Ok(output) = self.git.remote_get_url(&self.work_dir, REMOTE_NAME) {
            if String::from_utf8_lossy(&output.stdout).trim() == wanted {
                return Ok(());
            }
        }
        if let Err(e) = self.git.remove_remote(&self.work_dir, REMOTE_NAME) {
            debug!(error = %e, "remote remove skipped");
        }
        self.git.add_remote(&self.work_dir, REMOTE_NAME, &wanted)?;
        Ok(())
    }
}
