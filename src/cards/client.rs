// Card detail client seam

use async_trait::async_trait;
use thiserror::Error;

use crate::cards::types::CardPayload;

#[derive(Debug, Error)]
pub enum CardClientError {
    #[error("card {card_id} not found")]
    NotFound { card_id: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetches card details from the backend
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CardDetailClient: Send + Sync {
    async fn get_card(&self, card_id: &str) -> Result<CardPayload, CardClientError>;
}
