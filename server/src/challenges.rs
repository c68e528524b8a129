use chrono::NaiveDate;
use shared::StreakUserData;
use tracing::instrument;

use crate::{auth::Session, error::ServiceError, tracker::Tracker};

/// Today's checklist as the server sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDay {
    pub date: NaiveDate,
    pub flags: Vec<bool>,
    pub completed: bool,
    pub streak: StreakUserData,
}

/// Streak together with the date it was read against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakDay {
    pub date: NaiveDate,
    pub streak: StreakUserData,
}

impl Tracker {
    pub async fn challenges(&self, session: &Session) -> Result<ChallengeDay, ServiceError> {
        let today = self.today();
        let account = session.lock().await?;
        let challenges = &account.progress.challenges;

        Ok(ChallengeDay {
            date: today,
            flags: challenges.flags_on(today),
            completed: challenges.completed_on(today),
            streak: account.progress.streak,
        })
    }

    /// Sets one of today's flags. The date comes from the server clock, and
    /// the flag write plus the streak transition happen under one lock.
    #[instrument(skip(self))]
    pub async fn set_challenge(
        &self,
        session: &Session,
        index: usize,
        done: bool,
    ) -> Result<ChallengeDay, ServiceError> {
        let today = self.today();
        let mut account = session.lock().await?;
        let update = account.progress.set_challenge(today, index, done)?;

        if let Some(transition) = update.transition {
            tracing::info!(
                "Day {today} completed by {}: {transition}, streak is {}",
                session.username(),
                account.progress.streak.amount
            );
        }

        Ok(ChallengeDay {
            date: today,
            flags: update.flags,
            completed: update.completed,
            streak: account.progress.streak,
        })
    }

    pub async fn streak(&self, session: &Session) -> Result<StreakDay, ServiceError> {
        let date = self.today();
        let streak = session.lock().await?.progress.streak;
        Ok(StreakDay { date, streak })
    }
}
