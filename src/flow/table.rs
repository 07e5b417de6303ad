// Transition tables: per-flow transition maps kept as data

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::flow::types::{FinishKind, FlowState};

/// What `advance` does from a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<S> {
    /// Append `S` to the history and emit `Advance(S)`
    Next(S),
    /// Leave the history untouched and end the flow
    Finish(FinishKind),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("state {state} has no outgoing step")]
    MissingStep { state: String },
    #[error("terminal state {state} must finish the flow")]
    TerminalAdvances { state: String },
    #[error("state {state} is unreachable from the initial state")]
    Unreachable { state: String },
}

/// Maps each state to the step taken on `advance`, plus the set of states
/// that end the flow when reached by `retreat`.
#[derive(Debug, Clone)]
pub struct TransitionTable<S> {
    steps: HashMap<S, Step<S>>,
    retreat_exits: HashSet<S>,
}

impl<S: FlowState> TransitionTable<S> {
    /// Builds the table for a strictly linear flow.
    ///
    /// Each state advances to the next one in `order`; the last state finishes
    /// with `finish`. Retreating onto the initial or terminal state dismisses.
    pub fn linear(order: &[S], finish: FinishKind) -> Self {
        let mut steps = HashMap::with_capacity(order.len());
        for pair in order.windows(2) {
            steps.insert(pair[0], Step::Next(pair[1]));
        }
        if let Some(last) = order.last() {
            steps.insert(*last, Step::Finish(finish));
        }

        Self {
            steps,
            retreat_exits: HashSet::from([S::initial(), S::terminal()]),
        }
    }

    pub fn empty() -> Self {
        Self {
            steps: HashMap::new(),
            retreat_exits: HashSet::from([S::initial(), S::terminal()]),
        }
    }

    /// Overrides the step taken from `from`
    pub fn with_step(mut self, from: S, step: Step<S>) -> Self {
        self.steps.insert(from, step);
        self
    }

    /// Marks `state` as one that ends the flow when reached by going back
    pub fn with_retreat_exit(mut self, state: S) -> Self {
        self.retreat_exits.insert(state);
        self
    }

    pub fn step(&self, from: S) -> Option<Step<S>> {
        self.steps.get(&from).copied()
    }

    pub fn exits_on_retreat(&self, state: S) -> bool {
        self.retreat_exits.contains(&state)
    }

    /// Steps in the flow's presentation order
    pub fn entries(&self) -> Vec<(S, Step<S>)> {
        S::all()
            .iter()
            .filter_map(|state| self.step(*state).map(|step| (*state, step)))
            .collect()
    }

    /// Checks that every state has a step, that the terminal state finishes
    /// and that every state can be reached by advancing from the initial one.
    pub fn validate(&self) -> Result<(), TableError> {
        for state in S::all() {
            if !self.steps.contains_key(state) {
                return Err(TableError::MissingStep {
                    state: format!("{state:?}"),
                });
            }
        }

        if let Some(Step::Next(_)) = self.step(S::terminal()) {
            return Err(TableError::TerminalAdvances {
                state: format!("{:?}", S::terminal()),
            });
        }

        let mut reached = HashSet::from([S::initial()]);
        let mut cursor = S::initial();
        while let Some(Step::Next(next)) = self.step(cursor) {
            if !reached.insert(next) {
                break;
            }
            cursor = next;
        }

        match S::all().iter().find(|state| !reached.contains(*state)) {
            Some(state) => Err(TableError::Unreachable {
                state: format!("{state:?}"),
            }),
            None => Ok(()),
        }
    }
}
