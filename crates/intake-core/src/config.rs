//! Policy constants and tunable configuration.

use std::time::Duration;

/// Fixed identifier of the singleton draft row. At most one draft exists
/// at any time.
pub const DRAFT_ID: &str = "current_draft";

/// Key under which the session token is persisted in session-scoped storage.
pub const SESSION_KEY: &str = "register_session_id";

/// Tunable policy values for the intake core.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// How long an untouched draft is retained before the startup sweeper
    /// deletes it. The boundary is exclusive: a draft exactly this old is
    /// still retained.
    pub retention: Duration,

    /// Artificial delay standing in for the backend call during submission.
    pub submit_delay: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(24 * 60 * 60),
            submit_delay: Duration::from_millis(800),
        }
    }
}
