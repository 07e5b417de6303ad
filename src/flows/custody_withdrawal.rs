// Custody withdrawal: withdraw a custodial balance, then show the summary

use serde::Serialize;
use std::str::FromStr;

use crate::flow::{CompletionSignal, FinishKind, FlowState, TransitionTable};
use crate::flows::ParseFlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyWithdrawalState {
    /// The start of the custody-send flow
    Start,
    /// Custody withdrawal screen
    Withdrawal,
    /// Summary screen after a withdrawal
    Summary,
    End,
}

impl FlowState for CustodyWithdrawalState {
    const FLOW: &'static str = "custody-withdrawal";

    fn initial() -> Self {
        CustodyWithdrawalState::Start
    }

    fn terminal() -> Self {
        CustodyWithdrawalState::End
    }

    fn all() -> &'static [Self] {
        &[
            CustodyWithdrawalState::Start,
            CustodyWithdrawalState::Withdrawal,
            CustodyWithdrawalState::Summary,
            CustodyWithdrawalState::End,
        ]
    }

    fn transitions() -> TransitionTable<Self> {
        TransitionTable::linear(Self::all(), FinishKind::Dismiss)
    }
}

/// Outcome of a withdrawal submission, reported by the withdrawal screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyWithdrawalStatus {
    #[default]
    Unknown,
    Successful,
    Failed,
}

impl CompletionSignal for CustodyWithdrawalStatus {
    fn is_noop(&self) -> bool {
        matches!(self, CustodyWithdrawalStatus::Unknown)
    }
}

impl FromStr for CustodyWithdrawalStatus {
    type Err = ParseFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(CustodyWithdrawalStatus::Unknown),
            "successful" => Ok(CustodyWithdrawalStatus::Successful),
            "failed" => Ok(CustodyWithdrawalStatus::Failed),
            other => Err(ParseFlowError::UnknownSignal {
                flow: CustodyWithdrawalState::FLOW,
                value: other.to_string(),
            }),
        }
    }
}

/// States of the withdrawal screen's submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalSubmissionState {
    SettingUp,
    Loaded,
    InsufficientFunds,
    Submitting,
    Submitted,
    Error,
}

impl From<WithdrawalSubmissionState> for CustodyWithdrawalStatus {
    fn from(state: WithdrawalSubmissionState) -> Self {
        match state {
            WithdrawalSubmissionState::Submitted => CustodyWithdrawalStatus::Successful,
            WithdrawalSubmissionState::Error => CustodyWithdrawalStatus::Failed,
            WithdrawalSubmissionState::SettingUp
            | WithdrawalSubmissionState::Loaded
            | WithdrawalSubmissionState::InsufficientFunds
            | WithdrawalSubmissionState::Submitting => CustodyWithdrawalStatus::Unknown,
        }
    }
}
