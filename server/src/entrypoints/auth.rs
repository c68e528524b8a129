use ecobuddy_server::{auth::Session, error::ErrorResponse, ServiceError, Tracker};
use rocket::{
    serde::json::{self, Json},
    State,
};

use super::types::{AccountEnvelope, CredentialsRequest, LoginResponse, OkResponse};

fn credentials(body: &CredentialsRequest) -> (&str, &str) {
    (
        body.username.as_deref().unwrap_or_default(),
        body.secret.as_deref().unwrap_or_default(),
    )
}

#[utoipa::path(request_body = CredentialsRequest, responses(
    (status = 200, description = "Account created", body = AccountEnvelope),
    (status = 400, description = "Missing or malformed username or secret", body = ErrorResponse),
    (status = 409, description = "Username is taken", body = ErrorResponse)
))]
#[post("/register", data = "<body>")]
pub(super) async fn register(
    tracker: &State<Tracker>,
    body: Result<Json<CredentialsRequest>, json::Error<'_>>,
) -> Result<Json<AccountEnvelope>, ServiceError> {
    let body = super::request_body(body)?;
    let (username, secret) = credentials(&body);
    let account = tracker.register(username, secret).await?;
    Ok(Json(account.into()))
}

#[utoipa::path(request_body = CredentialsRequest, responses(
    (status = 200, description = "Session issued, any previous session is revoked", body = LoginResponse),
    (status = 401, description = "Wrong secret", body = ErrorResponse),
    (status = 404, description = "Unknown username", body = ErrorResponse)
))]
#[post("/login", data = "<body>")]
pub(super) async fn login(
    tracker: &State<Tracker>,
    body: Result<Json<CredentialsRequest>, json::Error<'_>>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let body = super::request_body(body)?;
    let (username, secret) = credentials(&body);
    let (account, token) = tracker.login(username, secret).await?;
    Ok(Json(LoginResponse {
        account: account.into(),
        token: token.as_str().to_string(),
    }))
}

#[utoipa::path(responses(
    (status = 200, description = "Session revoked", body = OkResponse),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[post("/logout")]
pub(super) async fn logout(
    tracker: &State<Tracker>,
    session: Session,
) -> Result<Json<OkResponse>, ServiceError> {
    tracker.logout(&session).await?;
    Ok(Json(OkResponse::ok()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing auth entrypoints", |rocket| async {
        rocket.mount("/", rocket::routes![register, login, logout])
    })
}
