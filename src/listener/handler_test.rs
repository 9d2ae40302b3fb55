use crate::listener::{MessageReceived, MockChatApi};
use crate::notes::NoteStore;
use crate::sync::{AckSignal, MockGitOps, RemoteSpec, SyncManager};
use chrono::{TimeZone, Utc};
use mockall::predicate::*;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use tempfile::TempDir;

use super::handler::MessageHandler;

fn mock_output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

fn test_remote() -> RemoteSpec {
    RemoteSpec {
        url: "https://github.com/alice/notes.git".to_string(),
        username: "alice".to_string(),
        token: "tok123".to_string(),
        committer_name: "Memo Bot".to_string(),
        committer_email: "bot@example.com".to_string(),
    }
}

fn test_message() -> MessageReceived {
    MessageReceived {
        id: "1112223334445556667".to_string(),
        author: "alice".to_string(),
        channel_id: "2222".to_string(),
        channel_name: "general".to_string(),
        content: "Buy milk".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap(),
    }
}

/// GitOps mock where the whole publish sequence succeeds.
fn git_publish_ok() -> MockGitOps {
    let mut git = MockGitOps::new();
    git.expect_remote_get_url()
        .returning(|_, _| Ok(mock_output(0, "https://github.com/alice/notes.git\n", "")));
    git.expect_remove_remote()
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_add_remote()
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_pull_rebase()
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_add_files()
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_commit()
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_push()
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git
}

fn handler_with(
    api: MockChatApi,
    git: MockGitOps,
    work_dir: PathBuf,
) -> MessageHandler<MockChatApi, MockGitOps> {
    MessageHandler::new(
        api,
        NoteStore::new(work_dir.clone()),
        SyncManager::new(git, work_dir, test_remote()),
        "777".to_string(),
        "2222".to_string(),
        "general".to_string(),
    )
}

#[tokio::test]
async fn test_handle_success_acknowledges_saved() {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = temp_dir.path().to_path_buf();

    let mut api = MockChatApi::new();
    api.expect_add_reaction()
        .with(eq("2222"), eq("1112223334445556667"), eq("\u{2705}"))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let handler = handler_with(api, git_publish_ok(), work_dir.clone());
    let ack = handler.handle(&test_message()).await;

    assert_eq!(ack, AckSignal::Saved);

    // End-to-end: the memo landed in the inbox with the full template.
    let memo = work_dir.join("00_inbox/20240501_123456_discord.md");
    let contents = std::fs::read_to_string(memo).unwrap();
    assert!(contents.contains("- From: alice"));
    assert!(contents.contains("- Channel: general"));
    assert!(contents.contains("Buy milk"));
    assert_eq!(contents.trim_end().lines().last().unwrap(), "#discord #memo");
}

#[tokio::test]
async fn test_handle_push_failure_acknowledges_saved_not_synced() {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = temp_dir.path().to_path_buf();

    let mut git = MockGitOps::new();
    git.expect_remote_get_url()
        .returning(|_, _| Ok(mock_output(0, "https://github.com/alice/notes.git\n", "")));
    git.expect_remove_remote()
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_add_remote()
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_pull_rebase()
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_add_files()
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_commit()
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_push().returning(|_, _, _| {
        Err(crate::sync::GitError::NonZeroExit {
            code: 1,
            output: "! [rejected] main -> main (non-fast-forward)\n".to_string(),
        })
    });

    let mut api = MockChatApi::new();
    api.expect_add_reaction()
        .with(eq("2222"), eq("1112223334445556667"), eq("\u{26a0}\u{fe0f}"))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let handler = handler_with(api, git, work_dir.clone());
    let ack = handler.handle(&test_message()).await;

    assert_eq!(ack, AckSignal::SavedNotSynced);
    // The memo stays on disk exactly as written.
    let memo = work_dir.join("00_inbox/20240501_123456_discord.md");
    assert!(memo.exists());
}

#[tokio::test]
async fn test_handle_write_failure_acknowledges_failed() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the working copy should be makes the memo write fail.
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    // No git expectations: publish must not run when the write failed.
    let git = MockGitOps::new();

    let mut api = MockChatApi::new();
    api.expect_add_reaction()
        .with(eq("2222"), eq("1112223334445556667"), eq("\u{274c}"))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let handler = handler_with(api, git, blocker);
    let ack = handler.handle(&test_message()).await;

    assert_eq!(ack, AckSignal::Failed);
}

#[tokio::test]
async fn test_handle_concurrent_messages_both_complete() {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = temp_dir.path().to_path_buf();

    let mut api = MockChatApi::new();
    api.expect_add_reaction()
        .times(2)
        .returning(|_, _, _| Ok(()));

    let handler = handler_with(api, git_publish_ok(), work_dir.clone());

    let first = test_message();
    let mut second = test_message();
    second.id = "1112223334445556668".to_string();
    second.content = "Buy eggs".to_string();
    second.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 57).unwrap();

    // Publishes run one at a time on the shared working copy, but
    // neither message may block the other from finishing.
    let (a, b) = tokio::join!(handler.handle(&first), handler.handle(&second));

    assert_eq!(a, AckSignal::Saved);
    assert_eq!(b, AckSignal::Saved);
    assert!(work_dir.join("00_inbox/20240501_123456_discord.md").exists());
    assert!(work_dir.join("00_inbox/20240501_123457_discord.md").exists());
}

#[tokio::test]
async fn test_handle_reaction_failure_is_swallowed() {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = temp_dir.path().to_path_buf();

    let mut api = MockChatApi::new();
    api.expect_add_reaction().times(1).returning(|_, _, _| {
        Err(crate::listener::ChatError::ApiError {
            status: 403,
            message: "Missing Permissions".to_string(),
        })
    });

    let handler = handler_with(api, git_publish_ok(), work_dir);
    // The outcome still reflects the sync result, not the reaction.
    let ack = handler.handle(&test_message()).await;
    assert_eq!(ack, AckSignal::Saved);
}
