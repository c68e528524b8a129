use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::streak::{StreakTransition, StreakUserData};

pub const DEFAULT_CHALLENGE_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChallengeError {
    #[error("challenge index {index} is out of range, there are {count} challenges per day")]
    OutOfRange { index: usize, count: usize },
}

/// Checklist for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenges {
    date: Option<NaiveDate>,
    flags: Vec<bool>,
}

impl DailyChallenges {
    pub fn new(count: usize) -> Self {
        Self {
            date: None,
            flags: vec![false; count],
        }
    }

    pub fn count(&self) -> usize {
        self.flags.len()
    }

    /// Flags as seen on `today`. A checklist stored for another day reads as
    /// untouched.
    pub fn flags_on(&self, today: NaiveDate) -> Vec<bool> {
        if self.date == Some(today) {
            self.flags.clone()
        } else {
            vec![false; self.flags.len()]
        }
    }

    pub fn completed_on(&self, today: NaiveDate) -> bool {
        self.date == Some(today) && !self.flags.is_empty() && self.flags.iter().all(|f| *f)
    }

    pub fn set(&mut self, today: NaiveDate, index: usize, done: bool) -> Result<(), ChallengeError> {
        let count = self.flags.len();
        if index >= count {
            return Err(ChallengeError::OutOfRange { index, count });
        }

        if self.date != Some(today) {
            self.flags.iter_mut().for_each(|f| *f = false);
            self.date = Some(today);
        }
        self.flags[index] = done;
        Ok(())
    }
}

/// Today's checklist together with the streak it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub challenges: DailyChallenges,
    pub streak: StreakUserData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub flags: Vec<bool>,
    pub completed: bool,
    pub transition: Option<StreakTransition>,
}

impl DailyProgress {
    pub fn new(challenge_count: usize) -> Self {
        Self {
            challenges: DailyChallenges::new(challenge_count),
            streak: StreakUserData::default(),
        }
    }

    /// Records one checklist flag and, once every flag of `today` is set,
    /// offers the day to the streak engine. Re-completing the same day is a
    /// no-op for the streak.
    pub fn set_challenge(
        &mut self,
        today: NaiveDate,
        index: usize,
        done: bool,
    ) -> Result<ProgressUpdate, ChallengeError> {
        self.challenges.set(today, index, done)?;

        let completed = self.challenges.completed_on(today);
        let transition = completed.then(|| self.streak.complete_day(today));

        Ok(ProgressUpdate {
            flags: self.challenges.flags_on(today),
            completed,
            transition,
        })
    }
}
