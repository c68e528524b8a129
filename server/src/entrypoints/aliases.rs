use ecobuddy_server::{auth::Session, error::ErrorResponse, ServiceError, Tracker};
use rocket::{serde::json::Json, State};

use super::types::AccountEnvelope;

#[utoipa::path(responses(
    (status = 200, description = "Alias of /me kept for older clients", body = AccountEnvelope),
    (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
))]
#[get("/user-info")]
pub(super) async fn user_info(
    tracker: &State<Tracker>,
    session: Session,
) -> Result<Json<AccountEnvelope>, ServiceError> {
    super::user::me(tracker, session).await
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing alias entrypoints", |rocket| async {
        rocket.mount("/", rocket::routes![user_info])
    })
}
