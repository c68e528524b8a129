use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};

use crate::{auth::Session, error::ServiceError, tracker::Tracker};

const BEARER_PREFIX: &str = "Bearer ";

/// Token from an `Authorization` header. `Bearer <token>` is the documented
/// form; a bare token is accepted for older clients.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim_start();
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = ServiceError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(tracker) = request.rocket().state::<Tracker>() else {
            tracing::error!("Tracker state is not managed");
            return Outcome::Error((
                Status::InternalServerError,
                ServiceError::Internal(anyhow::anyhow!("Tracker state is not managed")),
            ));
        };

        let Some(token) = bearer_token(request.headers().get_one("Authorization")) else {
            return Outcome::Error((Status::Unauthorized, ServiceError::Unauthorized));
        };

        match tracker.resolve(token).await {
            Ok(session) => Outcome::Success(session),
            Err(e) => {
                if let ServiceError::Internal(inner) = &e {
                    tracing::error!("Failed to resolve session: {inner:#}");
                }
                Outcome::Error((e.status(), e))
            }
        }
    }
}
