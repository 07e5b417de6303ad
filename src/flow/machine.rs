use tracing::{debug, info, warn};

use crate::flow::table::{Step, TransitionTable};
use crate::flow::types::{CompletionSignal, FinishKind, FlowAction, FlowHistory, FlowState};

/// Synchronous transition core of a flow.
///
/// Every operation returns the single action the transition implies. Once a
/// finishing action has been produced the machine is latched: any further
/// operation re-emits that action and leaves the history alone.
#[derive(Debug, Clone)]
pub struct FlowMachine<S: FlowState> {
    table: TransitionTable<S>,
    history: FlowHistory<S>,
    finished: Option<FlowAction<S>>,
}

impl<S: FlowState> Default for FlowMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FlowState> FlowMachine<S> {
    pub fn new() -> Self {
        Self::with_table(S::transitions())
    }

    pub fn with_table(table: TransitionTable<S>) -> Self {
        Self {
            table,
            history: FlowHistory::start(),
            finished: None,
        }
    }

    pub fn history(&self) -> &FlowHistory<S> {
        &self.history
    }

    pub fn current(&self) -> S {
        self.history.current()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn advance(&mut self) -> FlowAction<S> {
        if let Some(action) = self.finished {
            debug!(flow = S::FLOW, "Flow already finished, re-emitting {:?}", action);
            return action;
        }

        let current = self.history.current();
        match self.table.step(current) {
            Some(Step::Next(next)) => {
                self.history = self.history.clone().appending(next);
                info!(flow = S::FLOW, from = ?current, to = ?next, "Flow advanced");
                FlowAction::Advance(next)
            }
            Some(Step::Finish(kind)) => self.finish(kind),
            None => {
                warn!(flow = S::FLOW, state = ?current, "No step for state, dismissing flow");
                self.finish(FinishKind::Dismiss)
            }
        }
    }

    pub fn retreat(&mut self) -> FlowAction<S> {
        if let Some(action) = self.finished {
            debug!(flow = S::FLOW, "Flow already finished, re-emitting {:?}", action);
            return action;
        }

        let from = self.history.current();
        self.history = self.history.clone().removing_last(S::terminal());
        let current = self.history.current();

        if self.table.exits_on_retreat(current) {
            info!(flow = S::FLOW, from = ?from, to = ?current, "Flow retreated out");
            self.finish(FinishKind::Dismiss)
        } else {
            info!(flow = S::FLOW, from = ?from, to = ?current, "Flow retreated");
            FlowAction::Retreat
        }
    }

    /// Advances on any signal except the no-op one, which yields `None`.
    pub fn complete_with<C: CompletionSignal>(&mut self, signal: &C) -> Option<FlowAction<S>> {
        if signal.is_noop() {
            debug!(flow = S::FLOW, signal = ?signal, "Ignoring no-op completion signal");
            return None;
        }
        info!(flow = S::FLOW, signal = ?signal, "Completion signal received");
        Some(self.advance())
    }

    fn finish(&mut self, kind: FinishKind) -> FlowAction<S> {
        let action = FlowAction::from(kind);
        self.finished = Some(action);
        info!(flow = S::FLOW, state = ?self.history.current(), "Flow finished with {:?}", action);
        action
    }
}
