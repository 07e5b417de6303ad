//! Payment setup flow driven by the card activation poll
//!
//! A fake card client reports the card as pending a few times; the poll
//! outcome is turned into a completion signal and fed back into the flow.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wallet_flows::cards::{
    CardActivationService, CardActivationStatus, CardClientError, CardDetailClient,
    CardDetailsPayload, CardPayload, CardPayloadState,
};
use wallet_flows::flow::{FlowAction, FlowController, FlowSettings};
use wallet_flows::flows::PaymentSetupState;
use wallet_flows::polling::{FetchErrorPolicy, PollSettings};
use wallet_flows::router::{drive, RecordingNavigator};

struct FakeCardClient {
    calls: AtomicU32,
    pending_for: u32,
    settles_as: CardPayloadState,
}

impl FakeCardClient {
    fn new(pending_for: u32, settles_as: CardPayloadState) -> Self {
        Self {
            calls: AtomicU32::new(0),
            pending_for,
            settles_as,
        }
    }
}

#[async_trait]
impl CardDetailClient for FakeCardClient {
    async fn get_card(&self, card_id: &str) -> Result<CardPayload, CardClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let state = if call < self.pending_for {
            CardPayloadState::Pending
        } else {
            self.settles_as
        };
        Ok(CardPayload {
            id: card_id.to_string(),
            partner: "EVERYPAY".to_string(),
            state,
            currency: "EUR".to_string(),
            card: Some(CardDetailsPayload {
                number: "4444".to_string(),
                brand: "VISA".to_string(),
                label: None,
                expiry_month: 6,
                expiry_year: 2029,
            }),
        })
    }
}

fn settings() -> PollSettings {
    PollSettings {
        timeout: Duration::from_secs(60),
        interval: Duration::from_secs(2),
        on_error: FetchErrorPolicy::Continue,
    }
}

async fn activation_status(client: FakeCardClient) -> CardActivationStatus {
    let service = CardActivationService::new(Arc::new(client), settings());
    let outcome = service.wait_for_activation("card-42").await.unwrap();
    CardActivationStatus::from(&outcome)
}

#[tokio::test(start_paused = true)]
async fn test_activated_card_finishes_payment_setup() {
    let mut controller = FlowController::<PaymentSetupState>::spawn(&FlowSettings::default());
    let mut actions = controller.take_actions().unwrap();
    let handle = controller.handle();

    for _ in 0..4 {
        handle.advance().unwrap();
    }
    assert_eq!(
        actions.next().await,
        Some(FlowAction::Advance(PaymentSetupState::PaymentMethods))
    );

    let status = activation_status(FakeCardClient::new(3, CardPayloadState::Active)).await;
    assert_eq!(status, CardActivationStatus::Activated);

    handle.complete_with(status).unwrap();
    handle.advance().unwrap();

    let mut navigator = RecordingNavigator::new();
    let finished = drive(&mut actions, &mut navigator).await;

    assert_eq!(finished, Some(FlowAction::Dismiss));
    assert!(navigator.stack().is_empty());
    assert_eq!(handle.current(), PaymentSetupState::End);
}

#[tokio::test(start_paused = true)]
async fn test_blocked_card_reports_failure() {
    let status = activation_status(FakeCardClient::new(1, CardPayloadState::Blocked)).await;
    assert_eq!(status, CardActivationStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_card_that_stays_pending_times_out_as_failure() {
    let status = activation_status(FakeCardClient::new(u32::MAX, CardPayloadState::Active)).await;
    assert_eq!(status, CardActivationStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_activation_does_not_move_the_flow() {
    let mut controller = FlowController::<PaymentSetupState>::spawn(&FlowSettings::default());
    let mut actions = controller.take_actions().unwrap();
    let handle = controller.handle();

    let service = CardActivationService::new(
        Arc::new(FakeCardClient::new(u32::MAX, CardPayloadState::Active)),
        settings(),
    );
    service.cancel();
    let outcome = service.wait_for_activation("card-42").await.unwrap();

    handle.complete_with(CardActivationStatus::from(&outcome)).unwrap();
    handle.retreat().unwrap();

    assert_eq!(actions.next().await, Some(FlowAction::Dismiss));
    assert_eq!(handle.current(), PaymentSetupState::End);
}
