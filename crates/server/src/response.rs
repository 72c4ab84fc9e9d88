//! Success envelope types.
//!
//! Every successful response carries `success: true`. Most handlers wrap
//! their payload under a `data` key; the login handler merges its payload
//! into the top level instead, and [`Reply`] covers both shapes.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Successful handler result.
#[derive(Debug)]
pub enum Reply<T> {
    /// `{"success": true, "data": <payload>}`
    Data(T),
    /// `success: true` merged into the payload object itself.
    Raw(T),
}

#[derive(Serialize)]
struct DataEnvelope<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Data(payload) => Json(DataEnvelope {
                success: true,
                data: payload,
            })
            .into_response(),
            Self::Raw(payload) => match serde_json::to_value(&payload) {
                Ok(mut value) => {
                    if let Value::Object(map) = &mut value {
                        map.insert("success".to_string(), Value::Bool(true));
                    }
                    Json(value).into_response()
                }
                Err(e) => {
                    ApiError::Internal(format!("failed to serialize response: {e}")).into_response()
                }
            },
        }
    }
}
