use ecobuddy_server::{auth::Session, error::ErrorResponse, ServiceError, Tracker};
use rocket::{
    serde::json::{self, Json},
    State,
};

use super::types::{ChallengeRequest, ChallengesResponse, StreakResponse};

#[utoipa::path(responses(
    (status = 200, description = "Today's checklist and streak", body = ChallengesResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[get("/challenges")]
pub(super) async fn get_challenges(
    tracker: &State<Tracker>,
    session: Session,
) -> Result<Json<ChallengesResponse>, ServiceError> {
    let day = tracker.challenges(&session).await?;
    Ok(Json(day.into()))
}

#[utoipa::path(request_body = ChallengeRequest, responses(
    (status = 200, description = "Checklist after the update; completing every flag advances the streak once per day", body = ChallengesResponse),
    (status = 400, description = "Missing or out of range index", body = ErrorResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[post("/challenges", data = "<body>")]
pub(super) async fn set_challenge(
    tracker: &State<Tracker>,
    session: Session,
    body: Result<Json<ChallengeRequest>, json::Error<'_>>,
) -> Result<Json<ChallengesResponse>, ServiceError> {
    let body = super::request_body(body)?;
    let index = body
        .index
        .ok_or_else(|| ServiceError::BadRequest("index is required".to_string()))?;
    let day = tracker
        .set_challenge(&session, index, body.done.unwrap_or(true))
        .await?;
    Ok(Json(day.into()))
}

#[utoipa::path(responses(
    (status = 200, description = "Streak as of the server's current date", body = StreakResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[get("/streak")]
pub(super) async fn get_streak(
    tracker: &State<Tracker>,
    session: Session,
) -> Result<Json<StreakResponse>, ServiceError> {
    let day = tracker.streak(&session).await?;
    Ok(Json(StreakResponse::new(day.streak, day.date)))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing challenge entrypoints", |rocket| async {
        rocket.mount(
            "/",
            rocket::routes![get_challenges, set_challenge, get_streak],
        )
    })
}
