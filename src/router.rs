// Router side of a flow: applies emitted actions to a navigation stack

use serde::Serialize;
use tracing::{debug, info};

use crate::flow::{FlowAction, FlowActions, FlowState};

/// Performs the navigation an action implies
pub trait Navigator<S> {
    /// Show the screen associated with `state`
    fn push(&mut self, state: S);

    /// Pop the top screen
    fn pop(&mut self);

    /// Unwind every screen of the flow
    fn dismiss(&mut self);

    /// Unwind every screen and report completion to the presenter of the flow
    fn complete(&mut self);
}

/// Applies a single action to `navigator`
pub fn apply<S: FlowState, N: Navigator<S>>(action: FlowAction<S>, navigator: &mut N) {
    debug!(flow = S::FLOW, action = ?action, "Applying flow action");
    match action {
        FlowAction::Advance(state) => navigator.push(state),
        FlowAction::Retreat => navigator.pop(),
        FlowAction::Dismiss => navigator.dismiss(),
        FlowAction::Complete => navigator.complete(),
    }
}

/// Applies actions in emission order, one at a time.
///
/// Returns the finishing action once it has been applied, or `None` if the
/// stream ended first.
pub async fn drive<S, N>(actions: &mut FlowActions<S>, navigator: &mut N) -> Option<FlowAction<S>>
where
    S: FlowState,
    N: Navigator<S>,
{
    while let Some(action) = actions.next().await {
        apply(action, navigator);
        if action.is_finishing() {
            info!(flow = S::FLOW, action = ?action, "Flow unwound");
            return Some(action);
        }
    }
    None
}

/// What a [`RecordingNavigator`] did in response to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "screen", rename_all = "snake_case")]
pub enum NavigationStep<S> {
    Pushed(S),
    Popped(S),
    Skipped(S),
    Dismissed,
    Completed,
}

/// Keeps an in-memory stack of the states the flow has pushed.
///
/// The initial and terminal states have no screen of their own: they stay on
/// the stack so that a later pop removes them rather than a real screen, but
/// they are never reported as screens.
#[derive(Debug, Clone)]
pub struct RecordingNavigator<S> {
    entries: Vec<S>,
    steps: Vec<NavigationStep<S>>,
    completed: bool,
}

impl<S> Default for RecordingNavigator<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            steps: Vec::new(),
            completed: false,
        }
    }
}

impl<S: FlowState> RecordingNavigator<S> {
    pub fn new() -> Self {
        Self::default()
    }

    fn has_screen(state: S) -> bool {
        state != S::initial() && state != S::terminal()
    }

    /// Screens currently shown, bottom first
    pub fn stack(&self) -> Vec<S> {
        self.entries
            .iter()
            .copied()
            .filter(|state| Self::has_screen(*state))
            .collect()
    }

    pub fn steps(&self) -> &[NavigationStep<S>] {
        &self.steps
    }

    /// Topmost visible screen
    pub fn top(&self) -> Option<S> {
        self.entries
            .iter()
            .rev()
            .copied()
            .find(|state| Self::has_screen(*state))
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl<S: FlowState> Navigator<S> for RecordingNavigator<S> {
    fn push(&mut self, state: S) {
        self.entries.push(state);
        if Self::has_screen(state) {
            self.steps.push(NavigationStep::Pushed(state));
        } else {
            self.steps.push(NavigationStep::Skipped(state));
        }
    }

    fn pop(&mut self) {
        match self.entries.pop() {
            Some(state) if Self::has_screen(state) => {
                self.steps.push(NavigationStep::Popped(state))
            }
            Some(state) => self.steps.push(NavigationStep::Skipped(state)),
            None => {}
        }
    }

    fn dismiss(&mut self) {
        self.entries.clear();
        self.steps.push(NavigationStep::Dismissed);
    }

    fn complete(&mut self) {
        self.entries.clear();
        self.completed = true;
        self.steps.push(NavigationStep::Completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowController, FlowSettings};
    use crate::flows::{BackupState, CustodyWithdrawalState};

    #[test]
    fn test_terminal_state_has_no_screen() {
        let mut navigator = RecordingNavigator::new();

        apply(FlowAction::Advance(CustodyWithdrawalState::Withdrawal), &mut navigator);
        apply(FlowAction::Advance(CustodyWithdrawalState::Summary), &mut navigator);
        apply(FlowAction::Advance(CustodyWithdrawalState::End), &mut navigator);

        assert_eq!(
            navigator.stack(),
            vec![CustodyWithdrawalState::Withdrawal, CustodyWithdrawalState::Summary]
        );
        assert_eq!(
            navigator.steps().last(),
            Some(&NavigationStep::Skipped(CustodyWithdrawalState::End))
        );
    }

    #[tokio::test]
    async fn test_retreat_from_terminal_keeps_last_screen() {
        let mut controller = FlowController::<CustodyWithdrawalState>::spawn(&FlowSettings::default());
        let mut actions = controller.take_actions().unwrap();
        let handle = controller.handle();
        let states = handle.states();
        for _ in 0..3 {
            handle.advance().unwrap();
        }
        handle.retreat().unwrap();

        let mut navigator = RecordingNavigator::new();
        for _ in 0..4 {
            let action = actions.next().await.unwrap();
            apply(action, &mut navigator);
        }

        assert_eq!(states.borrow().current(), CustodyWithdrawalState::Summary);
        assert_eq!(navigator.top(), Some(CustodyWithdrawalState::Summary));
        assert_eq!(
            navigator.stack(),
            vec![CustodyWithdrawalState::Withdrawal, CustodyWithdrawalState::Summary]
        );
        assert_eq!(
            navigator.steps().last(),
            Some(&NavigationStep::Skipped(CustodyWithdrawalState::End))
        );
    }

    #[tokio::test]
    async fn test_drive_stops_after_completion() {
        let mut controller = FlowController::<BackupState>::spawn(&FlowSettings::default());
        let mut actions = controller.take_actions().unwrap();
        let handle = controller.handle();
        for _ in 0..5 {
            handle.advance().unwrap();
        }

        let mut navigator = RecordingNavigator::new();
        let finished = drive(&mut actions, &mut navigator).await;

        assert_eq!(finished, Some(FlowAction::Complete));
        assert!(navigator.is_completed());
        assert!(navigator.stack().is_empty());
        assert_eq!(
            navigator.steps(),
            &[
                NavigationStep::Pushed(BackupState::BackupFunds),
                NavigationStep::Pushed(BackupState::RecoveryPhrase),
                NavigationStep::Pushed(BackupState::Verification),
                NavigationStep::Skipped(BackupState::End),
                NavigationStep::Completed,
            ]
        );
    }
}
