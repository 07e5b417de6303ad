// Waits for a newly added card to leave the pending state

use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cards::client::{CardClientError, CardDetailClient};
use crate::cards::types::CardActivationState;
use crate::polling::{PollError, PollOutcome, PollService, PollSettings};

#[derive(Debug, Error)]
pub enum CardActivationError {
    #[error("card activation check failed: {0}")]
    Fetch(#[from] PollError<CardClientError>),
}

/// Each wait runs its own poll. A cancelled token is swapped for a fresh one
/// once the wait it stopped has returned, so one `cancel()` stops exactly one
/// wait.
pub struct CardActivationService {
    client: Arc<dyn CardDetailClient>,
    settings: PollSettings,
    cancel: Mutex<CancellationToken>,
}

impl CardActivationService {
    pub fn new(client: Arc<dyn CardDetailClient>, settings: PollSettings) -> Self {
        Self {
            client,
            settings,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Stops the running (or next) `wait_for_activation`
    pub fn cancel(&self) {
        self.cancel_handle().cancel();
    }

    /// Token for the running (or next) wait, usable from another task
    pub fn cancel_handle(&self) -> CancellationToken {
        self.lock_token().clone()
    }

    fn lock_token(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.cancel.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn rearm_if_cancelled(&self) {
        let mut token = self.lock_token();
        if token.is_cancelled() {
            debug!("Re-arming card activation cancellation");
            *token = CancellationToken::new();
        }
    }

    /// Polls the card until it is no longer pending
    pub async fn wait_for_activation(
        &self,
        card_id: &str,
    ) -> Result<PollOutcome<CardActivationState>, CardActivationError> {
        info!(card.id = %card_id, timeout = ?self.settings.timeout, "Waiting for card activation");

        let poll_service = PollService::new(|state: &CardActivationState| !state.is_pending())
            .with_cancel_token(self.cancel_handle());
        let client = self.client.clone();
        let result = poll_service
            .poll_with(
                || {
                    let client = client.clone();
                    let card_id = card_id.to_string();
                    async move {
                        let payload = client.get_card(&card_id).await?;
                        Ok::<_, CardClientError>(CardActivationState::from(&payload))
                    }
                },
                &self.settings,
            )
            .await;
        self.rearm_if_cancelled();
        let outcome = result?;

        info!(card.id = %card_id, outcome = ?outcome, "Card activation wait finished");
        Ok(outcome)
    }
}
