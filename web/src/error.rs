use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use hub::error::{Error as HubError, ErrorKind as HubErrorKind};
use log::*;

#[derive(Debug)]
pub struct Error(HubError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            HubErrorKind::HubUnavailable => {
                error!("Hub is not accepting commands: {}", self.0);
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE UNAVAILABLE").into_response()
            }
            HubErrorKind::Transport | HubErrorKind::WriteTimeout | HubErrorKind::Serialization => {
                error!("Request failed: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<HubError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
