use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use serde::Serialize;
use shared::ChallengeError;
use strum::IntoStaticStr;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error, IntoStaticStr)]
pub enum ServiceError {
    #[error("account {0} already exists")]
    AlreadyExists(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid username or secret")]
    InvalidCredential,
    #[error("missing or invalid session token")]
    Unauthorized,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status(&self) -> Status {
        match self {
            Self::AlreadyExists(_) => Status::Conflict,
            Self::NotFound(_) => Status::NotFound,
            Self::InvalidCredential | Self::Unauthorized => Status::Unauthorized,
            Self::InvalidArgument(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::DeadlineExceeded => Status::ServiceUnavailable,
            Self::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<ChallengeError> for ServiceError {
    fn from(e: ChallengeError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                kind: kind.to_string(),
                message: message.into(),
            },
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(e: &ServiceError) -> Self {
        match e {
            // Never leak internals to the client
            ServiceError::Internal(_) => Self::new(e.kind(), "internal server error"),
            _ => Self::new(e.kind(), e.to_string()),
        }
    }
}

impl<'r> Responder<'r, 'static> for ServiceError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            Self::Internal(e) => tracing::error!("Internal error on {}: {e:#}", req.uri()),
            Self::DeadlineExceeded => tracing::warn!("Deadline exceeded on {}", req.uri()),
            e => tracing::debug!("Rejected {}: {e}", req.uri()),
        }

        let status = self.status();
        Response::build_from(Json(ErrorResponse::from(&self)).respond_to(req)?)
            .status(status)
            .ok()
    }
}
