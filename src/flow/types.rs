// Core types for linear screen flows

use serde::Serialize;
use std::fmt;
use std::hash::Hash;

use crate::flow::table::TransitionTable;

/// A closed set of named stops in a wizard-like flow.
///
/// Ordering between states comes from the transition table, never from the
/// enum declaration order.
pub trait FlowState: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Name used in logs and on the command line
    const FLOW: &'static str;

    fn initial() -> Self;

    fn terminal() -> Self;

    /// Every state of the flow, in presentation order
    fn all() -> &'static [Self];

    fn transitions() -> TransitionTable<Self>;
}

/// Externally reported outcome that may move a flow forward.
///
/// Implemented by the child screen's status type so that the flow never
/// depends on the screen's own result types.
pub trait CompletionSignal: fmt::Debug {
    /// The distinguished "nothing happened yet" value. It never triggers a transition.
    fn is_noop(&self) -> bool;
}

/// Navigation side effect implied by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "to", rename_all = "snake_case")]
pub enum FlowAction<S> {
    /// Present the screen associated with the state
    Advance(S),
    /// Pop the current screen
    Retreat,
    /// Unwind the whole flow
    Dismiss,
    /// Unwind the whole flow and report success to whatever presented it
    Complete,
}

impl<S> FlowAction<S> {
    /// Whether the flow is over once this action has been emitted
    pub fn is_finishing(&self) -> bool {
        matches!(self, FlowAction::Dismiss | FlowAction::Complete)
    }
}

/// How a flow ends when advanced past its terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishKind {
    Dismiss,
    Complete,
}

impl<S> From<FinishKind> for FlowAction<S> {
    fn from(kind: FinishKind) -> Self {
        match kind {
            FinishKind::Dismiss => FlowAction::Dismiss,
            FinishKind::Complete => FlowAction::Complete,
        }
    }
}

/// The current state of a flow plus the states visited before it, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowHistory<S> {
    current: S,
    previous: Vec<S>,
}

impl<S: FlowState> FlowHistory<S> {
    pub fn start() -> Self {
        Self {
            current: S::initial(),
            previous: Vec::new(),
        }
    }
}

impl<S: Copy> FlowHistory<S> {
    pub fn current(&self) -> S {
        self.current
    }

    pub fn previous(&self) -> &[S] {
        &self.previous
    }

    /// Number of states recorded, the current one included
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.previous.len() + 1
    }

    /// Moves `current` onto the history and installs `state` as current.
    pub fn appending(mut self, state: S) -> Self {
        self.previous.push(self.current);
        self.current = state;
        self
    }

    /// Promotes the most recent previous state back to current.
    ///
    /// An empty history resolves to `fallback` instead of underflowing.
    pub fn removing_last(mut self, fallback: S) -> Self {
        self.current = self.previous.pop().unwrap_or(fallback);
        self
    }
}
