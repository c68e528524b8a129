use ecobuddy_server::{
    error::{ErrorBody, ErrorResponse},
    ServiceError,
};
use rocket::{
    fairing::AdHoc,
    serde::json::{self, Json},
};
use utoipa::OpenApi;

pub mod aliases;
pub mod auth;
pub mod challenges;
pub mod leaderboards;
pub mod statistics;
pub mod types;
pub mod user;


use types::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::logout,
        user::me,
        user::increment,
        user::toggle_drive,
        user::add_friend,
        aliases::user_info,
        leaderboards::get_friends_leaderboard,
        leaderboards::get_global_leaderboard,
        statistics::get_statistics,
        challenges::get_challenges,
        challenges::set_challenge,
        challenges::get_streak,
    ),
    components(schemas(
        CredentialsRequest,
        IncrementRequest,
        FriendRequest,
        ChallengeRequest,
        AccountResponse,
        AccountEnvelope,
        LoginResponse,
        OkResponse,
        CountersResponse,
        DriveResponse,
        LeaderboardEntryResponse,
        LeaderboardResponse,
        HistogramBucketResponse,
        StatisticsResponse,
        StreakResponse,
        ChallengesResponse,
        ErrorResponse,
        ErrorBody,
    ))
)]
pub struct ApiDoc;

/// Unwraps a JSON body. Syntax and shape errors both become `BadRequest`.
fn request_body<T>(body: Result<Json<T>, json::Error<'_>>) -> Result<T, ServiceError> {
    body.map(Json::into_inner).map_err(|e| {
        ServiceError::BadRequest(match e {
            json::Error::Io(e) => format!("failed to read request body: {e}"),
            json::Error::Parse(_, e) => format!("invalid request body: {e}"),
        })
    })
}

#[get("/api-docs/openapi.json")]
fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[catch(400)]
fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("BadRequest", "malformed request"))
}

#[catch(401)]
fn unauthorized() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Unauthorized",
        "missing or invalid session token",
    ))
}

#[catch(404)]
fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("NotFound", "no such endpoint"))
}

#[catch(500)]
fn internal() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Internal", "internal server error"))
}

#[catch(503)]
fn unavailable() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "DeadlineExceeded",
        "request deadline exceeded",
    ))
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .mount("/", routes![openapi])
            .register(
                "/",
                catchers![
                    bad_request,
                    unauthorized,
                    not_found,
                    internal,
                    unavailable
                ],
            )
            .attach(auth::stage())
            .attach(user::stage())
            .attach(aliases::stage())
            .attach(leaderboards::stage())
            .attach(statistics::stage())
            .attach(challenges::stage())
    })
}
