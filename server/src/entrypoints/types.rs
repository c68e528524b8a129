use chrono::NaiveDate;
use ecobuddy_server::{challenges::ChallengeDay, db::types::AccountRecord};
use serde::{Deserialize, Serialize};
use shared::{currently_on, HistogramBucket, LeaderboardEntry, Statistics, StreakUserData};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    #[serde(alias = "password")]
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IncrementRequest {
    /// `"on"` or `"off"`
    #[serde(alias = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FriendRequest {
    pub friend: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChallengeRequest {
    pub index: Option<usize>,
    /// Defaults to `true`
    pub done: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub username: String,
    pub on_count: u64,
    pub off_count: u64,
    pub currently_on: u64,
    pub driving_minimized: bool,
    pub friends: Vec<String>,
}

impl From<AccountRecord> for AccountResponse {
    fn from(record: AccountRecord) -> Self {
        Self {
            currently_on: currently_on(record.on_count, record.off_count),
            username: record.username,
            on_count: record.on_count,
            off_count: record.off_count,
            driving_minimized: record.driving_minimized,
            friends: record.friends.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountEnvelope {
    pub account: AccountResponse,
}

impl From<AccountRecord> for AccountEnvelope {
    fn from(record: AccountRecord) -> Self {
        Self {
            account: record.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub account: AccountResponse,
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountersResponse {
    pub on_count: u64,
    pub off_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriveResponse {
    pub driving_minimized: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryResponse {
    pub username: String,
    pub currently_on: u64,
}

impl From<LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            username: entry.username,
            currently_on: entry.currently_on,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntryResponse>,
}

impl From<Vec<LeaderboardEntry>> for LeaderboardResponse {
    fn from(entries: Vec<LeaderboardEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HistogramBucketResponse {
    pub from: f64,
    pub to: f64,
    pub count: u64,
}

impl From<HistogramBucket> for HistogramBucketResponse {
    fn from(bucket: HistogramBucket) -> Self {
        Self {
            from: bucket.from,
            to: bucket.to,
            count: bucket.count,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_players: u64,
    pub average: f64,
    pub median: f64,
    pub top: u64,
    pub top_players: Vec<LeaderboardEntryResponse>,
    pub histogram: Vec<HistogramBucketResponse>,
}

impl From<Statistics> for StatisticsResponse {
    fn from(stats: Statistics) -> Self {
        Self {
            total_players: stats.total_players,
            average: stats.average,
            median: stats.median,
            top: stats.top,
            top_players: stats.top_players.into_iter().map(Into::into).collect(),
            histogram: stats.histogram.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreakResponse {
    pub current: u32,
    pub best: u32,
    pub last_completion: Option<NaiveDate>,
    pub achieved_today: bool,
}

impl StreakResponse {
    pub fn new(streak: StreakUserData, today: NaiveDate) -> Self {
        Self {
            current: streak.current(today),
            best: streak.best,
            last_completion: streak.last_completion,
            achieved_today: streak.achieved_on(today),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChallengesResponse {
    pub date: NaiveDate,
    pub flags: Vec<bool>,
    pub completed: bool,
    pub streak: StreakResponse,
}

impl From<ChallengeDay> for ChallengesResponse {
    fn from(day: ChallengeDay) -> Self {
        Self {
            streak: StreakResponse::new(day.streak, day.date),
            date: day.date,
            flags: day.flags,
            completed: day.completed,
        }
    }
}
