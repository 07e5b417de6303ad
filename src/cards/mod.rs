// Card activation for the payment setup flow

pub mod activation;
pub mod client;
pub mod types;

pub use activation::{CardActivationError, CardActivationService};
pub use client::{CardClientError, CardDetailClient};
pub use types::{
    CardActivationState, CardActivationStatus, CardData, CardDetailsPayload, CardPayload,
    CardPayloadState,
};
