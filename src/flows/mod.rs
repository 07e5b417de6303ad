// Concrete flows of the wallet app

pub mod backup;
pub mod custody_withdrawal;
pub mod payment_setup;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use backup::{BackupState, BackupVerificationStatus};
pub use custody_withdrawal::{CustodyWithdrawalState, CustodyWithdrawalStatus, WithdrawalSubmissionState};
pub use payment_setup::PaymentSetupState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFlowError {
    #[error("unknown flow '{0}' (expected custody-withdrawal, backup-funds or payment-setup)")]
    UnknownFlow(String),
    #[error("unknown completion signal '{value}' for flow '{flow}'")]
    UnknownSignal { flow: &'static str, value: String },
}

/// Names of the flows that can be walked from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    CustodyWithdrawal,
    BackupFunds,
    PaymentSetup,
}

impl FlowKind {
    pub const ALL: [FlowKind; 3] = [
        FlowKind::CustodyWithdrawal,
        FlowKind::BackupFunds,
        FlowKind::PaymentSetup,
    ];

    pub fn name(&self) -> &'static str {
        use crate::flow::FlowState;
        match self {
            FlowKind::CustodyWithdrawal => CustodyWithdrawalState::FLOW,
            FlowKind::BackupFunds => BackupState::FLOW,
            FlowKind::PaymentSetup => PaymentSetupState::FLOW,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlowKind {
    type Err = ParseFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlowKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseFlowError::UnknownFlow(s.to_string()))
    }
}
