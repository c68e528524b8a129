use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

mod challenge;
mod day;
mod leaderboard;
mod streak;

pub use challenge::*;
pub use day::*;
pub use leaderboard::*;
pub use streak::*;

pub type Username = String;

/// Which lights counter an `/increment` call bumps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LightSwitch {
    On,
    Off,
}
