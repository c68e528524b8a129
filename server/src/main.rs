#[macro_use]
extern crate rocket;

mod entrypoints;

use ecobuddy_server::{config::Env, Tracker};
use rocket::{Build, Rocket};
use rocket_prometheus::PrometheusMetrics;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

pub fn build(tracker: Tracker) -> anyhow::Result<Rocket<Build>> {
    let cors = rocket_cors::CorsOptions::default().to_cors()?;
    let prometheus = PrometheusMetrics::new();

    Ok(rocket::build()
        .manage(tracker)
        .attach(prometheus.clone())
        .attach(cors)
        .attach(entrypoints::stage())
        .mount("/metrics", prometheus))
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber)?;

    let env = Env::load()?;
    tracing::info!(
        "Starting with {} daily challenges, leaderboard deadline {:?}",
        env.challenge_count(),
        env.leaderboard_deadline()
    );
    let tracker = Tracker::new(env)?;

    let _ = build(tracker)?.launch().await?;
    tracing::warn!("Server stopped");

    Ok(())
}
