//! Role session names.
//!
//! STS accepts up to 64 characters from `[\w+=,.@-]` for a session name.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix of every generated session name.
pub const SESSION_NAME_PREFIX: &str = "Jenkins";

/// How role session names are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionNamePolicy {
    /// `Jenkins-{unix millis}`.
    #[default]
    Timestamp,
    /// `Jenkins-{unix millis}-{8 random hex chars}`, for hosts that start
    /// several scopes within the same millisecond.
    Unique,
}

impl SessionNamePolicy {
    /// Generates a session name for the current instant.
    pub fn session_name(&self) -> String {
        self.session_name_at(Utc::now())
    }

    fn session_name_at(&self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        match self {
            Self::Timestamp => format!("{}-{}", SESSION_NAME_PREFIX, millis),
            Self::Unique => {
                let suffix = Uuid::new_v4().simple().to_string();
                format!("{}-{}-{}", SESSION_NAME_PREFIX, millis, &suffix[..8])
            }
        }
    }
}
