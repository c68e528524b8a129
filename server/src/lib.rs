pub mod auth;
pub mod challenges;
pub mod config;
pub mod db;
pub mod error;
pub mod guards;
pub mod leaderboard;
pub mod tracker;

pub use error::ServiceError;
pub use tracker::Tracker;

#[cfg(test)]
mod tests;
