use crate::canvas::RenderError;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;
use tracing::error;

/// Errors raised while invoking a route handler.
#[derive(Debug, Error)]
pub enum HandlerError {
	#[error("missing argument `{0}`")]
	MissingArgument(String),
	#[error("invalid value `{value}` for argument `{name}`")]
	InvalidArgument { name: String, value: String },
	#[error("failed to draw figure: {0}")]
	Drawing(String),
	#[error(transparent)]
	Render(#[from] RenderError),
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl HandlerError {
	pub const fn status(&self) -> StatusCode {
		match self {
			Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
			Self::MissingArgument(_) | Self::Drawing(_) | Self::Render(_) | Self::Other(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

impl<E> From<DrawingAreaErrorKind<E>> for HandlerError
where
	E: std::error::Error + Send + Sync,
{
	fn from(err: DrawingAreaErrorKind<E>) -> Self {
		Self::Drawing(err.to_string())
	}
}

impl IntoResponse for HandlerError {
	fn into_response(self) -> Response {
		error!("{self:?}");
		(self.status(), self.to_string()).into_response()
	}
}

/// Errors raised while assembling the application router.
#[derive(Debug, Error)]
pub enum AppError {
	#[error("route `{path}` uses unsupported method {method}")]
	UnsupportedMethod { method: Method, path: String },
}
