use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::day::previous_day;

/// Outcome of offering a completed day to the streak engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StreakTransition {
    /// The day was already counted.
    AlreadyApplied,
    /// Yesterday was completed, the streak grew by one.
    Continued,
    /// First completion ever, or the chain was broken: the streak restarts at 1.
    Started,
    /// The offered day is older than the last completion.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakUserData {
    pub amount: u32,
    pub best: u32,
    pub last_completion: Option<NaiveDate>,
}

impl StreakUserData {
    /// Applies the once-per-day transition for `today`.
    ///
    /// The caller must hold exclusive access to this value for the whole call:
    /// the read of `last_completion` and the write below form one step.
    pub fn complete_day(&mut self, today: NaiveDate) -> StreakTransition {
        let transition = match self.last_completion {
            Some(last) if last == today => return StreakTransition::AlreadyApplied,
            Some(last) if last > today => return StreakTransition::Ignored,
            Some(last) if Some(last) == previous_day(today) => {
                self.amount = self.amount.saturating_add(1);
                StreakTransition::Continued
            }
            _ => {
                self.amount = 1;
                StreakTransition::Started
            }
        };

        self.best = self.best.max(self.amount);
        self.last_completion = Some(today);
        transition
    }

    /// Streak as it stands on `today`.
    ///
    /// The stored amount is only reset by the next completion, so a chain
    /// whose last day is older than yesterday already reads as zero.
    pub fn current(&self, today: NaiveDate) -> u32 {
        match self.last_completion {
            Some(last) if last == today || Some(last) == previous_day(today) => self.amount,
            _ => 0,
        }
    }

    pub fn achieved_on(&self, today: NaiveDate) -> bool {
        self.last_completion == Some(today)
    }
}
