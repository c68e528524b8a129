use std::str::FromStr;

use ecobuddy_server::{auth::Session, error::ErrorResponse, ServiceError, Tracker};
use rocket::{
    serde::json::{self, Json},
    State,
};
use shared::LightSwitch;

use super::types::{
    AccountEnvelope, CountersResponse, DriveResponse, FriendRequest, IncrementRequest, OkResponse,
};

#[utoipa::path(responses(
    (status = 200, description = "Current account, without credentials", body = AccountEnvelope),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[get("/me")]
pub(super) async fn me(
    tracker: &State<Tracker>,
    session: Session,
) -> Result<Json<AccountEnvelope>, ServiceError> {
    let account = tracker.me(&session).await?;
    Ok(Json(account.into()))
}

#[utoipa::path(request_body = IncrementRequest, responses(
    (status = 200, description = "Counters after the increment", body = CountersResponse),
    (status = 400, description = "Unknown kind", body = ErrorResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[post("/increment", data = "<body>")]
pub(super) async fn increment(
    tracker: &State<Tracker>,
    session: Session,
    body: Result<Json<IncrementRequest>, json::Error<'_>>,
) -> Result<Json<CountersResponse>, ServiceError> {
    let body = super::request_body(body)?;
    let kind = body
        .kind
        .as_deref()
        .ok_or_else(|| ServiceError::BadRequest("kind is required".to_string()))?;
    let switch = LightSwitch::from_str(kind).map_err(|_| {
        ServiceError::BadRequest(format!("unknown kind {kind:?}, expected \"on\" or \"off\""))
    })?;

    let (on_count, off_count) = tracker.increment(&session, switch).await?;
    Ok(Json(CountersResponse {
        on_count,
        off_count,
    }))
}

#[utoipa::path(responses(
    (status = 200, description = "Flag after the toggle", body = DriveResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[post("/toggle-drive")]
pub(super) async fn toggle_drive(
    tracker: &State<Tracker>,
    session: Session,
) -> Result<Json<DriveResponse>, ServiceError> {
    let driving_minimized = tracker.toggle_drive(&session).await?;
    Ok(Json(DriveResponse { driving_minimized }))
}

#[utoipa::path(request_body = FriendRequest, responses(
    (status = 200, description = "Friend added, or already a friend", body = OkResponse),
    (status = 400, description = "Missing friend or befriending yourself", body = ErrorResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
    (status = 404, description = "No such account", body = ErrorResponse)
))]
#[post("/add-friend", data = "<body>")]
pub(super) async fn add_friend(
    tracker: &State<Tracker>,
    session: Session,
    body: Result<Json<FriendRequest>, json::Error<'_>>,
) -> Result<Json<OkResponse>, ServiceError> {
    let body = super::request_body(body)?;
    let friend = body.friend.as_deref().unwrap_or_default().trim();
    tracker.add_friend(&session, friend).await?;
    Ok(Json(OkResponse::ok()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing user entrypoints", |rocket| async {
        rocket.mount("/", rocket::routes![me, increment, toggle_drive, add_friend])
    })
}
