pub(crate) use crate::error::{JsonError, WallhubError};
pub(crate) use crate::web::AppState;
pub(crate) use axum::Json;
pub(crate) use axum::extract::{Query, State};
pub(crate) use axum::http::{HeaderValue, StatusCode};
pub(crate) use axum::response::{IntoResponse, Response};
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use tracing::{debug, error, info};
