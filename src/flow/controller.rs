// Flow controller: serializes every transition of one flow through a single task

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::flow::machine::FlowMachine;
use crate::flow::types::{CompletionSignal, FlowAction, FlowHistory, FlowState};
use crate::telemetry::create_flow_span;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("flow controller for '{flow}' has shut down")]
    ControllerClosed { flow: &'static str },
    #[error("action stream for '{flow}' was already taken")]
    ActionsAlreadyTaken { flow: &'static str },
}

#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Capacity of the action channel
    pub action_buffer: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self { action_buffer: 16 }
    }
}

#[derive(Debug)]
enum FlowCommand {
    Advance,
    Retreat,
    Complete { signal: String },
}

/// Trigger side of a flow, handed to presenters.
///
/// Holds no reference to any presenter; cloning it is cheap.
#[derive(Debug, Clone)]
pub struct FlowHandle<S: FlowState> {
    flow_id: Uuid,
    commands: mpsc::UnboundedSender<FlowCommand>,
    states: watch::Receiver<FlowHistory<S>>,
}

impl<S: FlowState> FlowHandle<S> {
    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn advance(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Advance)
    }

    pub fn retreat(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Retreat)
    }

    /// Forwards a child screen's outcome. The no-op signal is dropped here.
    pub fn complete_with<C: CompletionSignal>(&self, signal: C) -> Result<(), FlowError> {
        if signal.is_noop() {
            debug!(flow = S::FLOW, signal = ?signal, "Filtered no-op completion signal");
            return Ok(());
        }
        self.send(FlowCommand::Complete {
            signal: format!("{signal:?}"),
        })
    }

    /// Latest history, updated before the matching action is emitted
    pub fn states(&self) -> watch::Receiver<FlowHistory<S>> {
        self.states.clone()
    }

    pub fn current(&self) -> S {
        self.states.borrow().current()
    }

    fn send(&self, command: FlowCommand) -> Result<(), FlowError> {
        self.commands
            .send(command)
            .map_err(|_| FlowError::ControllerClosed { flow: S::FLOW })
    }
}

/// The single-subscriber stream of actions emitted by a flow
#[derive(Debug)]
pub struct FlowActions<S> {
    receiver: mpsc::Receiver<FlowAction<S>>,
}

impl<S> FlowActions<S> {
    /// Next action in emission order, `None` once the controller has stopped
    pub async fn next(&mut self) -> Option<FlowAction<S>> {
        self.receiver.recv().await
    }

    pub fn try_next(&mut self) -> Option<FlowAction<S>> {
        self.receiver.try_recv().ok()
    }
}

/// Owns the task that runs a [`FlowMachine`].
///
/// Dropping the controller stops the task; outstanding handles then report
/// [`FlowError::ControllerClosed`].
pub struct FlowController<S: FlowState> {
    handle: Option<FlowHandle<S>>,
    actions: Option<FlowActions<S>>,
    task: Option<JoinHandle<()>>,
}

impl<S: FlowState> FlowController<S> {
    /// Spawns the flow's task on the current tokio runtime
    pub fn spawn(settings: &FlowSettings) -> Self {
        Self::spawn_machine(FlowMachine::new(), settings)
    }

    pub fn spawn_machine(machine: FlowMachine<S>, settings: &FlowSettings) -> Self {
        let flow_id = Uuid::new_v4();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::channel(settings.action_buffer.max(1));
        let (state_tx, state_rx) = watch::channel(machine.history().clone());

        let span = create_flow_span(S::FLOW, &flow_id.to_string());
        let task = tokio::spawn(run_flow(machine, command_rx, action_tx, state_tx).instrument(span));

        Self {
            handle: Some(FlowHandle {
                flow_id,
                commands: command_tx,
                states: state_rx,
            }),
            actions: Some(FlowActions {
                receiver: action_rx,
            }),
            task: Some(task),
        }
    }

    pub fn handle(&self) -> FlowHandle<S> {
        match &self.handle {
            Some(handle) => handle.clone(),
            None => unreachable!("handle is only taken by close()"),
        }
    }

    /// Takes the action stream. Only one subscriber is allowed.
    pub fn take_actions(&mut self) -> Result<FlowActions<S>, FlowError> {
        self.actions
            .take()
            .ok_or(FlowError::ActionsAlreadyTaken { flow: S::FLOW })
    }

    /// Stops accepting new triggers and waits for queued ones to be processed.
    ///
    /// Returns once every other handle has been dropped as well. An action
    /// stream that was never taken is dropped first so queued actions are
    /// discarded. A taken stream must keep being read (or be dropped) while
    /// this runs, otherwise the task waits on a full action buffer.
    pub async fn close(mut self) {
        self.handle.take();
        self.actions.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(flow = S::FLOW, "Flow task ended abnormally: {}", e);
            }
        }
    }
}

impl<S: FlowState> Drop for FlowController<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_flow<S: FlowState>(
    mut machine: FlowMachine<S>,
    mut commands: mpsc::UnboundedReceiver<FlowCommand>,
    actions: mpsc::Sender<FlowAction<S>>,
    states: watch::Sender<FlowHistory<S>>,
) {
    debug!(flow = S::FLOW, "Flow started");

    while let Some(command) = commands.recv().await {
        let action = match command {
            FlowCommand::Advance => machine.advance(),
            FlowCommand::Retreat => machine.retreat(),
            FlowCommand::Complete { signal } => {
                debug!(flow = S::FLOW, signal = %signal, "Advancing on completion signal");
                machine.advance()
            }
        };

        states.send_replace(machine.history().clone());
        if actions.send(action).await.is_err() {
            debug!(flow = S::FLOW, "Action subscriber gone, dropping {:?}", action);
        }
    }

    debug!(flow = S::FLOW, state = ?machine.current(), "Flow stopped");
}
