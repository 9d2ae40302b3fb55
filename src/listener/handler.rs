//! Per-message pipeline: write the memo, publish it, acknowledge.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{ChannelMessage, ChatApi, MessageReceived};
use crate::notes::NoteStore;
use crate::sync::{AckSignal, GitOps, SyncManager, SyncOutcome, ack_for};

/// Handles captured messages from one channel.
///
/// Generic over `ChatApi` and `GitOps` so both collaborators can be
/// mocked in tests.
pub struct MessageHandler<C: ChatApi, G: GitOps> {
    api: C,
    store: NoteStore,
    // Publishes are serialized: interleaved git operations on the one
    // shared working copy could corrupt its state.
    sync: Arc<Mutex<SyncManager<G>>>,
    self_id: String,
    channel_id: String,
    channel_name: String,
}

impl<C: ChatApi, G: GitOps + Send + 'static> MessageHandler<C, G> {
    pub fn new(
        api: C,
        store: NoteStore,
        sync: SyncManager<G>,
        self_id: String,
        channel_id: String,
        channel_name: String,
    ) -> Self {
        Self {
            api,
            store,
            sync: Arc::new(Mutex::new(sync)),
            self_id,
            channel_id,
            channel_name,
        }
    }

    /// Poll the channel forever, capturing each new message.
    ///
    /// The first successful fetch only establishes the watermark;
    /// history from before startup is never replayed.
    pub async fn run(&self, poll_interval: Duration) {
        let mut after: Option<String> = None;

        loop {
            match self
                .api
                .fetch_messages(&self.channel_id, after.as_deref())
                .await
            {
                Ok(messages) => {
                    let establishing = after.is_none();
                    if let Some(last) = messages.last() {
                        after = Some(last.id.clone());
                    } else if establishing {
                        // Empty channel: anything that arrives next is new.
                        after = Some("0".to_string());
                    }

                    if establishing {
                        if !messages.is_empty() {
                            debug!(
                                count = messages.len(),
                                "watermark established; earlier messages are not replayed"
                            );
                        }
                    } else {
                        for msg in &messages {
                            if msg.author_id == self.self_id {
                                continue;
                            }
                            let event = self.to_event(msg);
                            info!(author = %event.author, id = %event.id, "message captured");
                            self.handle(&event).await;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "failed to poll channel"),
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    fn to_event(&self, msg: &ChannelMessage) -> MessageReceived {
        MessageReceived {
            id: msg.id.clone(),
            author: msg.author.clone(),
            channel_id: self.channel_id.clone(),
            channel_name: self.channel_name.clone(),
            content: msg.content.clone(),
            created_at: msg.created_at,
        }
    }

    /// Capture one message end to end and return the acknowledgment
    /// that was emitted. The memo file is never rolled back when sync
    /// fails; the reaction is the only user-visible trace of failure.
    pub async fn handle(&self, msg: &MessageReceived) -> AckSignal {
        let outcome = match self.store.write(msg) {
            Ok(pending) => {
                // Git subprocesses block, so the publish runs on the
                // blocking pool while the guard keeps it exclusive.
                let sync = Arc::clone(&self.sync).lock_owned().await;
                match tokio::task::spawn_blocking(move || sync.publish(&pending)).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(error = %e, id = %msg.id, "publish task failed");
                        SyncOutcome::PushFailedLocalSaved
                    }
                }
            }
            Err(e) => {
                error!(error = %e, id = %msg.id, "failed to write memo file");
                SyncOutcome::FatalLocalError
            }
        };

        let ack = ack_for(outcome);
        if let Err(e) = self
            .api
            .add_reaction(&msg.channel_id, &msg.id, ack.emoji())
            .await
        {
            warn!(error = %e, id = %msg.id, "failed to add acknowledgment reaction");
        }

        ack
    }
}
