// Wallet Flows Library - screen flow state machines and bounded polling
// This exposes the core components for testing and integration

pub mod cards;
pub mod config;
pub mod flow;
pub mod flows;
pub mod polling;
pub mod router;
pub mod telemetry;

// Re-export key types for easy access
pub use cards::{CardActivationService, CardActivationState, CardActivationStatus, CardDetailClient};
pub use config::{config, WalletFlowsConfig};
pub use flow::{
    CompletionSignal, FlowAction, FlowActions, FlowController, FlowError, FlowHandle, FlowHistory,
    FlowMachine, FlowSettings, FlowState, TransitionTable,
};
pub use flows::{BackupState, CustodyWithdrawalState, FlowKind, PaymentSetupState};
pub use polling::{FetchErrorPolicy, PollError, PollOutcome, PollService, PollSettings};
pub use router::{drive, Navigator, RecordingNavigator};
pub use telemetry::{create_flow_span, generate_correlation_id, init_telemetry, shutdown_telemetry};
