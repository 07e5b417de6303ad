// Card payloads as returned by the card detail endpoint, and the activation
// states derived from them

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::flow::{CompletionSignal, FlowState};
use crate::flows::{ParseFlowError, PaymentSetupState};
use crate::polling::PollOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardPayloadState {
    None,
    Pending,
    Created,
    Active,
    Blocked,
    Expired,
    FraudReview,
    ManualReview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetailsPayload {
    /// Last four digits of the card number
    pub number: String,
    #[serde(rename = "type")]
    pub brand: String,
    #[serde(default)]
    pub label: Option<String>,
    pub expiry_month: u32,
    pub expiry_year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    pub id: String,
    pub partner: String,
    pub state: CardPayloadState,
    pub currency: String,
    #[serde(default)]
    pub card: Option<CardDetailsPayload>,
}

/// A card that has enough detail to be shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardData {
    pub identifier: String,
    pub partner: String,
    pub currency: String,
    pub last_four_digits: String,
    pub brand: String,
    pub label: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
}

impl CardData {
    pub fn from_payload(payload: &CardPayload) -> Option<Self> {
        let card = payload.card.as_ref()?;
        if payload.id.is_empty() || card.number.len() != 4 {
            return None;
        }

        Some(Self {
            identifier: payload.id.clone(),
            partner: payload.partner.clone(),
            currency: payload.currency.clone(),
            last_four_digits: card.number.clone(),
            brand: card.brand.clone(),
            label: card
                .label
                .clone()
                .unwrap_or_else(|| format!("{} {}", card.brand, card.number)),
            expiry_month: card.expiry_month,
            expiry_year: card.expiry_year,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "card", rename_all = "snake_case")]
pub enum CardActivationState {
    Active(CardData),
    Pending,
    Inactive(Option<CardData>),
}

impl CardActivationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CardActivationState::Pending)
    }
}

impl From<&CardPayload> for CardActivationState {
    fn from(payload: &CardPayload) -> Self {
        if payload.state == CardPayloadState::Pending {
            return CardActivationState::Pending;
        }
        let Some(card) = CardData::from_payload(payload) else {
            return CardActivationState::Inactive(None);
        };
        match payload.state {
            CardPayloadState::Active => CardActivationState::Active(card),
            CardPayloadState::Pending => CardActivationState::Pending,
            CardPayloadState::None
            | CardPayloadState::Created
            | CardPayloadState::Blocked
            | CardPayloadState::Expired
            | CardPayloadState::FraudReview
            | CardPayloadState::ManualReview => CardActivationState::Inactive(Some(card)),
        }
    }
}

/// Outcome of waiting for a card, reported back into the payment setup flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardActivationStatus {
    #[default]
    Unknown,
    Activated,
    Failed,
}

impl CompletionSignal for CardActivationStatus {
    fn is_noop(&self) -> bool {
        matches!(self, CardActivationStatus::Unknown)
    }
}

impl From<&PollOutcome<CardActivationState>> for CardActivationStatus {
    fn from(outcome: &PollOutcome<CardActivationState>) -> Self {
        match outcome {
            PollOutcome::Matched(CardActivationState::Active(_)) => CardActivationStatus::Activated,
            PollOutcome::Matched(CardActivationState::Inactive(_)) | PollOutcome::TimedOut => {
                CardActivationStatus::Failed
            }
            // The user backed out; the flow handles that through retreat
            PollOutcome::Matched(CardActivationState::Pending) | PollOutcome::Cancelled => {
                CardActivationStatus::Unknown
            }
        }
    }
}

impl FromStr for CardActivationStatus {
    type Err = ParseFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(CardActivationStatus::Unknown),
            "activated" => Ok(CardActivationStatus::Activated),
            "failed" => Ok(CardActivationStatus::Failed),
            other => Err(ParseFlowError::UnknownSignal {
                flow: PaymentSetupState::FLOW,
                value: other.to_string(),
            }),
        }
    }
}
