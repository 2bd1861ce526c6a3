//! Per-session slot pairing a run with its player and countdown task.

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::state::run::Run;

/// One player's session: the run plus the handle of the TimeAttack
/// countdown task driving it, if any.
///
/// The slot owns the countdown exclusively so the timer can never outlive
/// the session: replacing or dropping the slot aborts the task.
pub struct PlayerSession {
    /// Identifier the HTTP surface addresses this session by.
    pub id: Uuid,
    /// Player name the best record is reconciled under.
    pub user_name: String,
    /// The live run state machine.
    pub run: Run,
    countdown: Option<JoinHandle<()>>,
}

impl PlayerSession {
    /// Create a session slot with no countdown armed.
    pub fn new(id: Uuid, user_name: String, run: Run) -> Self {
        Self {
            id,
            user_name,
            run,
            countdown: None,
        }
    }

    /// Install a countdown task, aborting any previous one.
    pub fn set_countdown(&mut self, handle: JoinHandle<()>) {
        self.stop_countdown();
        self.countdown = Some(handle);
    }

    /// Abort the countdown task if one is armed.
    pub fn stop_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.stop_countdown();
    }
}
