use news_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    /// Requested item or user is absent. Never retried.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store failed or is unavailable.
    #[error("Store error: {0}")]
    TransientStore(#[source] StoreError),

    /// Rejected at the boundary before touching the store.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<StoreError> for RankingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RankingError::NotFound(format!("item {}", id)),
            other => RankingError::TransientStore(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: RankingError = StoreError::NotFound(7).into();
        assert!(matches!(err, RankingError::NotFound(ref what) if what == "item 7"));
    }

    #[test]
    fn test_other_store_errors_are_transient() {
        let err: RankingError = StoreError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, RankingError::TransientStore(_)));
        assert_eq!(
            err.to_string(),
            "Store error: Store unavailable: connection refused"
        );
    }
}
