use std::time::Duration;

use argon2::{Algorithm, Argon2, Params, Version};
use serde::Deserialize;
use shared::DEFAULT_CHALLENGE_COUNT;

const DEFAULT_LEADERBOARD_DEADLINE_MS: u64 = 500;

/// Service settings read from the process environment.
///
/// Rocket reads its own settings (address, port, log level) from `ROCKET_*`
/// variables and `Rocket.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Env {
    challenge_count: Option<usize>,
    leaderboard_deadline_ms: Option<u64>,
    password_hash_memory_kib: Option<u32>,
    password_hash_iterations: Option<u32>,
}

impl Env {
    pub fn load() -> anyhow::Result<Self> {
        Ok(envy::from_env::<Env>()?)
    }

    pub fn with_challenge_count(mut self, count: usize) -> Self {
        self.challenge_count = Some(count);
        self
    }

    pub fn with_leaderboard_deadline_ms(mut self, ms: u64) -> Self {
        self.leaderboard_deadline_ms = Some(ms);
        self
    }

    pub fn with_password_hash_cost(mut self, memory_kib: u32, iterations: u32) -> Self {
        self.password_hash_memory_kib = Some(memory_kib);
        self.password_hash_iterations = Some(iterations);
        self
    }

    pub fn challenge_count(&self) -> usize {
        self.challenge_count.unwrap_or(DEFAULT_CHALLENGE_COUNT)
    }

    pub fn leaderboard_deadline(&self) -> Duration {
        Duration::from_millis(
            self.leaderboard_deadline_ms
                .unwrap_or(DEFAULT_LEADERBOARD_DEADLINE_MS),
        )
    }

    pub fn password_hasher(&self) -> anyhow::Result<Argon2<'static>> {
        let params = Params::new(
            self.password_hash_memory_kib
                .unwrap_or(Params::DEFAULT_M_COST),
            self.password_hash_iterations
                .unwrap_or(Params::DEFAULT_T_COST),
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid password hash parameters: {e}"))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
