// Linear flow state machines for multi-screen wizards
//
// A flow is a closed set of states walked forward by `advance`, backward by
// `retreat`, or forward by an external completion signal. Each transition
// emits exactly one navigation action for the router to apply.

pub mod controller;
pub mod machine;
pub mod table;
pub mod types;

pub use controller::{FlowActions, FlowController, FlowError, FlowHandle, FlowSettings};
pub use machine::FlowMachine;
pub use table::{Step, TableError, TransitionTable};
pub use types::{CompletionSignal, FinishKind, FlowAction, FlowHistory, FlowState};
