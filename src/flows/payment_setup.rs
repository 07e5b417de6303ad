// Payment setup: pick a payment method, add a card and wait for its activation

use serde::Serialize;

use crate::flow::{FinishKind, FlowState, TransitionTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSetupState {
    Start,
    PaymentMethods,
    CardDetails,
    CardAuthorization,
    /// Waiting for the card activation poll to settle
    PendingActivation,
    End,
}

impl FlowState for PaymentSetupState {
    const FLOW: &'static str = "payment-setup";

    fn initial() -> Self {
        PaymentSetupState::Start
    }

    fn terminal() -> Self {
        PaymentSetupState::End
    }

    fn all() -> &'static [Self] {
        &[
            PaymentSetupState::Start,
            PaymentSetupState::PaymentMethods,
            PaymentSetupState::CardDetails,
            PaymentSetupState::CardAuthorization,
            PaymentSetupState::PendingActivation,
            PaymentSetupState::End,
        ]
    }

    /// Backing out of the activation wait leaves the flow; the card has
    /// already been submitted by then.
    fn transitions() -> TransitionTable<Self> {
        TransitionTable::linear(Self::all(), FinishKind::Dismiss)
            .with_retreat_exit(PaymentSetupState::CardAuthorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardActivationStatus;
    use crate::flow::{FlowAction, FlowMachine};

    #[test]
    fn test_table_is_valid() {
        assert!(PaymentSetupState::transitions().validate().is_ok());
    }

    #[test]
    fn test_retreat_from_activation_leaves_flow() {
        let mut machine = FlowMachine::<PaymentSetupState>::new();
        for _ in 0..4 {
            machine.advance();
        }
        assert_eq!(machine.current(), PaymentSetupState::PendingActivation);

        assert_eq!(machine.retreat(), FlowAction::Dismiss);
    }

    #[test]
    fn test_activation_result_advances_flow() {
        let mut machine = FlowMachine::<PaymentSetupState>::new();
        for _ in 0..4 {
            machine.advance();
        }

        assert_eq!(machine.complete_with(&CardActivationStatus::Unknown), None);
        assert_eq!(
            machine.complete_with(&CardActivationStatus::Activated),
            Some(FlowAction::Advance(PaymentSetupState::End))
        );
    }
}
