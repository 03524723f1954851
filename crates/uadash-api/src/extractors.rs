// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.
//!
//! Axum's own `Json` and `Query` rejections answer with plain text; these
//! wrappers turn them into [`ApiError::BadRequest`] so every failure has the
//! same JSON shape.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

// =============================================================================
// JSON Body Extractor
// =============================================================================

/// Extractor for JSON request bodies.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(JsonBody(body): JsonBody<serde_json::Value>) -> impl IntoResponse {
///     body.to_string()
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(JsonBody(value))
    }
}

// =============================================================================
// Query Extractor
// =============================================================================

/// Extractor for query strings.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid query: {}", e.body_text())))?;

        Ok(QueryParams(value))
    }
}
