use shared::{rank, LeaderboardEntry, Statistics};
use tracing::instrument;

use crate::{auth::Session, error::ServiceError, tracker::Tracker};

impl Tracker {
    /// The caller and their friends, ranked.
    ///
    /// Each account is read under its own lock; the board as a whole is not a
    /// single atomic snapshot.
    #[instrument(skip(self))]
    pub async fn friends_leaderboard(
        &self,
        session: &Session,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let (own, friends) = {
            let account = session.lock().await?;
            (account.leaderboard_entry(), account.friends.clone())
        };

        let mut entries = Vec::with_capacity(friends.len() + 1);
        entries.push(own);
        for friend in friends {
            match self.db.get(&friend).await? {
                Some(handle) => entries.push(handle.lock().await.leaderboard_entry()),
                None => tracing::warn!("Friend {friend} of {} is missing", session.username()),
            }
        }

        Ok(rank(entries))
    }

    /// Every account, ranked. The scan is bounded by the configured deadline.
    #[instrument(skip(self))]
    pub async fn global_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let scan = async {
            let handles = self.db.all().await?;
            let mut entries = Vec::with_capacity(handles.len());
            for handle in handles {
                entries.push(handle.lock().await.leaderboard_entry());
            }
            Ok::<_, ServiceError>(entries)
        };

        let entries = rocket::tokio::time::timeout(self.env.leaderboard_deadline(), scan)
            .await
            .map_err(|_| ServiceError::DeadlineExceeded)??;

        Ok(rank(entries))
    }

    pub async fn statistics(&self) -> Result<Statistics, ServiceError> {
        let ranked = self.global_leaderboard().await?;
        Ok(Statistics::from_ranked(&ranked))
    }
}
