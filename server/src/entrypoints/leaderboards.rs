use ecobuddy_server::{auth::Session, error::ErrorResponse, ServiceError, Tracker};
use rocket::{serde::json::Json, State};

use super::types::LeaderboardResponse;

#[utoipa::path(responses(
    (status = 200, description = "The caller and their friends ranked by lights left on", body = LeaderboardResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[get("/leaderboard")]
pub(super) async fn get_friends_leaderboard(
    tracker: &State<Tracker>,
    session: Session,
) -> Result<Json<LeaderboardResponse>, ServiceError> {
    let entries = tracker.friends_leaderboard(&session).await?;
    Ok(Json(entries.into()))
}

#[utoipa::path(responses(
    (status = 200, description = "Every account ranked by lights left on", body = LeaderboardResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
    (status = 503, description = "Leaderboard scan exceeded its deadline", body = ErrorResponse)
))]
#[get("/leaderboard/all")]
pub(super) async fn get_global_leaderboard(
    tracker: &State<Tracker>,
    _session: Session,
) -> Result<Json<LeaderboardResponse>, ServiceError> {
    let entries = tracker.global_leaderboard().await?;
    Ok(Json(entries.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing leaderboard entrypoints", |rocket| async {
        rocket.mount(
            "/",
            rocket::routes![get_friends_leaderboard, get_global_leaderboard],
        )
    })
}
