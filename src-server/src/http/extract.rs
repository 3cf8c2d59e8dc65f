//! Request extractors
//!
//! Every rejection is an `ApiError` so clients always get an envelope.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::bearer_token;
use crate::domain::{DomainError, ListQuery, OwnerId};
use crate::state::SharedState;

use super::reply::ApiError;

/// The authenticated caller
pub struct Owner(pub OwnerId);

impl FromRequestParts<SharedState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(DomainError::AuthenticationRequired)?;

        let owner = state.identity.authenticate(token).await?;
        Ok(Owner(owner))
    }
}

/// JSON body; malformed input is a validation failure
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(DomainError::invalid(rejection.body_text()).into()),
        }
    }
}

/// Numeric `{id}` path segment
pub struct ItemId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ItemId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| DomainError::invalid("Id must be an integer"))?;
        if id <= 0 {
            return Err(DomainError::NotFound(format!("Item {}", id)).into());
        }
        Ok(ItemId(id))
    }
}

/// `?filter=&sort=&order=` for list routes
pub struct Listing(pub ListQuery);

impl<S: Send + Sync> FromRequestParts<S> for Listing {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ListQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| DomainError::invalid(rejection.body_text()))?;
        Ok(Listing(query))
    }
}
