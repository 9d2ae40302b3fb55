//! Maps sync outcomes to user-visible acknowledgment signals.
//!
//! Pure classification, no I/O. The chat layer renders the signal as a
//! reaction on the captured message; detailed diagnostics go only to
//! the operator-facing log.

use super::manager::SyncOutcome;

/// Acknowledgment signal shown to the message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckSignal {
    /// Memo saved and pushed.
    Saved,
    /// Memo saved locally but not synced to the remote.
    SavedNotSynced,
    /// Memo could not be saved at all.
    Failed,
}

impl AckSignal {
    /// Reaction emoji for this signal.
    pub fn emoji(&self) -> &'static str {
        match self {
            AckSignal::Saved => "\u{2705}",          // ✅
            AckSignal::SavedNotSynced => "\u{26a0}\u{fe0f}", // ⚠️
            AckSignal::Failed => "\u{274c}",         // ❌
        }
    }
}

/// Classify a sync outcome into the acknowledgment to emit.
///
/// A fatal local error always gets a distinct failure reaction; the
/// author should never be left without feedback.
pub fn ack_for(outcome: SyncOutcome) -> AckSignal {
    match outcome {
        SyncOutcome::Success => AckSignal::Saved,
        SyncOutcome::PushFailedLocalSaved => AckSignal::SavedNotSynced,
        SyncOutcome::FatalLocalError => AckSignal::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_total() {
        assert_eq!(ack_for(SyncOutcome::Success), AckSignal::Saved);
        assert_eq!(
            ack_for(SyncOutcome::PushFailedLocalSaved),
            AckSignal::SavedNotSynced
        );
        assert_eq!(ack_for(SyncOutcome::FatalLocalError), AckSignal::Failed);
    }

    #[test]
    fn test_emojis_are_distinct() {
        assert_ne!(AckSignal::Saved.emoji(), AckSignal::SavedNotSynced.emoji());
        assert_ne!(AckSignal::SavedNotSynced.emoji(), AckSignal::Failed.emoji());
        assert_ne!(AckSignal::Saved.emoji(), AckSignal::Failed.emoji());
    }
}
