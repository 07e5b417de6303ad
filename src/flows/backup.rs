// Backup funds: show the recovery phrase and have the user verify it

use serde::Serialize;
use std::str::FromStr;

use crate::flow::{CompletionSignal, FinishKind, FlowState, TransitionTable};
use crate::flows::ParseFlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupState {
    Start,
    BackupFunds,
    RecoveryPhrase,
    Verification,
    End,
}

impl FlowState for BackupState {
    const FLOW: &'static str = "backup-funds";

    fn initial() -> Self {
        BackupState::Start
    }

    fn terminal() -> Self {
        BackupState::End
    }

    fn all() -> &'static [Self] {
        &[
            BackupState::Start,
            BackupState::BackupFunds,
            BackupState::RecoveryPhrase,
            BackupState::Verification,
            BackupState::End,
        ]
    }

    /// A verified backup is reported to the presenter, so the flow completes
    /// rather than just dismissing.
    fn transitions() -> TransitionTable<Self> {
        TransitionTable::linear(Self::all(), FinishKind::Complete)
    }
}

/// Result of the recovery phrase verification screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupVerificationStatus {
    #[default]
    Unknown,
    Verified,
}

impl CompletionSignal for BackupVerificationStatus {
    fn is_noop(&self) -> bool {
        matches!(self, BackupVerificationStatus::Unknown)
    }
}

impl FromStr for BackupVerificationStatus {
    type Err = ParseFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(BackupVerificationStatus::Unknown),
            "verified" => Ok(BackupVerificationStatus::Verified),
            other => Err(ParseFlowError::UnknownSignal {
                flow: BackupState::FLOW,
                value: other.to_string(),
            }),
        }
    }
}
