use std::collections::BTreeSet;

use shared::{DailyProgress, LeaderboardEntry, Username};

use crate::auth::SessionToken;

/// Everything the service keeps per account, apart from the credential.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub username: Username,
    pub on_count: u64,
    pub off_count: u64,
    pub driving_minimized: bool,
    pub friends: BTreeSet<Username>,
    pub active_token: Option<SessionToken>,
    pub progress: DailyProgress,
}

impl AccountRecord {
    pub fn new(username: Username, challenge_count: usize) -> Self {
        Self {
            username,
            on_count: 0,
            off_count: 0,
            driving_minimized: false,
            friends: BTreeSet::new(),
            active_token: None,
            progress: DailyProgress::new(challenge_count),
        }
    }

    pub fn leaderboard_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry::new(self.username.clone(), self.on_count, self.off_count)
    }
}
