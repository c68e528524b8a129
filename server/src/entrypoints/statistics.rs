use ecobuddy_server::{auth::Session, error::ErrorResponse, ServiceError, Tracker};
use rocket::{serde::json::Json, State};

use super::types::StatisticsResponse;

#[utoipa::path(responses(
    (status = 200, description = "Aggregates over the global leaderboard", body = StatisticsResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
    (status = 503, description = "Leaderboard scan exceeded its deadline", body = ErrorResponse)
))]
#[get("/leaderboard/stats")]
pub(super) async fn get_statistics(
    tracker: &State<Tracker>,
    _session: Session,
) -> Result<Json<StatisticsResponse>, ServiceError> {
    let statistics = tracker.statistics().await?;
    Ok(Json(statistics.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing statistics entrypoints", |rocket| async {
        rocket.mount("/", rocket::routes![get_statistics])
    })
}
