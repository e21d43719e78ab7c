// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of [`BidwiseError`] onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use bidwise_core::{BidwiseError, RejectionReason};

/// Error body shared by every failing route.
///
/// Business denials carry `eligible: false`, the reason code, and the numbers
/// a client needs to explain the denial.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_bids_remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spend_required: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// Axum-facing wrapper around [`BidwiseError`].
#[derive(Debug)]
pub struct ApiError(pub BidwiseError);

impl From<BidwiseError> for ApiError {
    fn from(e: BidwiseError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn denial(&self) -> ErrorBody {
        ErrorBody {
            error: self.0.to_string(),
            reason: Some(self.0.reason()),
            eligible: Some(false),
            ..Default::default()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            BidwiseError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "unauthorized".into(),
                    ..Default::default()
                },
            ),
            BidwiseError::IneligibleCategory { .. }
            | BidwiseError::IneligiblePrice { .. }
            | BidwiseError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.denial()),
            BidwiseError::QuotaExceeded {
                free_bids_remaining,
                total_spent,
                spend_required,
            } => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    free_bids_remaining: Some(*free_bids_remaining),
                    total_spent: Some(*total_spent),
                    spend_required: Some(*spend_required),
                    ..self.denial()
                },
            ),
            BidwiseError::AttemptsExhausted {
                attempts_used,
                max_attempts,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    attempts_used: Some(*attempts_used),
                    max_attempts: Some(*max_attempts),
                    ..self.denial()
                },
            ),
            BidwiseError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: self.0.to_string(),
                    reason: Some(RejectionReason::NotFound),
                    ..Default::default()
                },
            ),
            BidwiseError::Config(_) | BidwiseError::Storage { .. } | BidwiseError::Internal(_) => {
                tracing::error!(error = %self.0, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal server error".into(),
                        ..Default::default()
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_denial_carries_gap() {
        let err = ApiError(BidwiseError::QuotaExceeded {
            free_bids_remaining: 0,
            total_spent: 500.0,
            spend_required: 2500.0,
        });
        let body = err.denial();
        assert_eq!(body.reason, Some(RejectionReason::SpendRequired));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unauthorized_body_is_minimal() {
        let body = ErrorBody {
            error: "unauthorized".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"unauthorized"}"#);
    }

    #[test]
    fn status_codes() {
        let cases = [
            (BidwiseError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                BidwiseError::IneligibleCategory {
                    category: "laptops".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                BidwiseError::AttemptsExhausted {
                    attempts_used: 3,
                    max_attempts: 3,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                BidwiseError::NotFound {
                    kind: "product threshold".into(),
                    id: "p".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                BidwiseError::Storage {
                    source: "disk full".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }
}
