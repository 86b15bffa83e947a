//! HTTP handlers and the state they share.

pub mod carts;
pub mod checkouts;
pub mod orders;
pub mod system;

use axum::http::HeaderMap;
use cart::InMemoryCartRepository;
use catalog::InMemoryCatalog;
use checkout::{CheckoutOrchestrator, InMemoryOrderStore};
use common::{CartLineId, UserId};

use crate::error::ApiError;

/// Header carrying the caller's resolved identity, set by the upstream auth layer.
pub const USER_HEADER: &str = "x-user-id";

/// The orchestrator wired to in-memory collaborators.
pub type AppCheckout = CheckoutOrchestrator<
    InMemoryCartRepository,
    InMemoryCatalog,
    InMemoryOrderStore<InMemoryCatalog>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub checkout: AppCheckout,
    pub catalog: InMemoryCatalog,
}

/// Extracts the caller's identity. The header value is trusted as-is.
pub(crate) fn current_user(headers: &HeaderMap) -> Result<UserId, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(UserId::new)
        .ok_or(ApiError::Unauthorized)
}

pub(crate) fn parse_line_id(id: &str) -> Result<CartLineId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid line ID format: {e}")))?;
    Ok(CartLineId::from_uuid(uuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_current_user_requires_non_blank_header() {
        let mut headers = HeaderMap::new();
        assert!(matches!(current_user(&headers), Err(ApiError::Unauthorized)));

        headers.insert(USER_HEADER, HeaderValue::from_static("  "));
        assert!(matches!(current_user(&headers), Err(ApiError::Unauthorized)));

        headers.insert(USER_HEADER, HeaderValue::from_static("ann@example.com"));
        assert_eq!(current_user(&headers).unwrap().as_str(), "ann@example.com");
    }

    #[test]
    fn test_parse_line_id_rejects_garbage() {
        assert!(matches!(
            parse_line_id("not-a-uuid"),
            Err(ApiError::BadRequest(_))
        ));
        let id = CartLineId::new();
        assert_eq!(parse_line_id(&id.to_string()).unwrap(), id);
    }
}
