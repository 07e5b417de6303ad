use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

use wallet_flows::cards::CardActivationStatus;
use wallet_flows::flow::{CompletionSignal, FlowAction, FlowController, FlowHistory, FlowState, Step};
use wallet_flows::flows::{
    BackupState, BackupVerificationStatus, CustodyWithdrawalState, CustodyWithdrawalStatus,
    FlowKind, ParseFlowError, PaymentSetupState,
};
use wallet_flows::router::{apply, NavigationStep, RecordingNavigator};
use wallet_flows::{config, init_telemetry, shutdown_telemetry, WalletFlowsConfig};

#[derive(Parser)]
#[command(name = "wallet-flows")]
#[command(about = "Walk wallet screen flows and inspect their transition tables")]
#[command(long_about = "Wallet flows drives the linear screen flows of the wallet app \
                       (custody withdrawal, backup funds, payment setup) without any UI. \
                       Use 'wallet-flows walk <flow> next next back' to see the navigation \
                       actions a sequence of triggers produces.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a flow through a scripted list of triggers
    Walk {
        /// Flow to walk
        #[arg(help = "One of: custody-withdrawal, backup-funds, payment-setup")]
        flow: FlowKind,
        /// Triggers applied in order
        #[arg(help = "next, back, or signal:<value> (e.g. signal:successful)")]
        triggers: Vec<Trigger>,
        /// Print the walk as JSON
        #[arg(long, help = "Emit the emitted actions and final history as JSON")]
        json: bool,
    },
    /// List the known flows and their transition tables
    Flows,
    /// Print the effective configuration
    Config {
        /// Write the configuration to this file instead of printing it
        #[arg(long, help = "Path of a TOML file to write")]
        write: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
enum Trigger {
    Next,
    Back,
    Signal(String),
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Trigger::Next),
            "back" => Ok(Trigger::Back),
            other => match other.strip_prefix("signal:") {
                Some(value) if !value.is_empty() => Ok(Trigger::Signal(value.to_string())),
                _ => Err(format!(
                    "invalid trigger '{other}' (expected next, back or signal:<value>)"
                )),
            },
        }
    }
}

enum ParsedTrigger<C> {
    Next,
    Back,
    Signal(C),
}

#[derive(Serialize)]
struct WalkReport<S> {
    flow: &'static str,
    actions: Vec<FlowAction<S>>,
    navigation: Vec<NavigationStep<S>>,
    history: FlowHistory<S>,
    screens: Vec<S>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config()?;
    init_telemetry(&config.observability)?;

    let result = match cli.command {
        Commands::Walk { flow, triggers, json } => {
            tokio::runtime::Runtime::new()?.block_on(async {
                match flow {
                    FlowKind::CustodyWithdrawal => {
                        walk::<CustodyWithdrawalState, CustodyWithdrawalStatus>(&triggers, config, json).await
                    }
                    FlowKind::BackupFunds => {
                        walk::<BackupState, BackupVerificationStatus>(&triggers, config, json).await
                    }
                    FlowKind::PaymentSetup => {
                        walk::<PaymentSetupState, CardActivationStatus>(&triggers, config, json).await
                    }
                }
            })
        }
        Commands::Flows => {
            print_table::<CustodyWithdrawalState>();
            print_table::<BackupState>();
            print_table::<PaymentSetupState>();
            Ok(())
        }
        Commands::Config { write } => match write {
            Some(path) => {
                config.save_to_file(&path)?;
                println!("✅ Configuration written to {}", path.display());
                Ok(())
            }
            None => {
                print!("{}", toml::to_string_pretty(config)?);
                Ok(())
            }
        },
    };

    shutdown_telemetry();
    result
}

async fn walk<S, C>(triggers: &[Trigger], config: &WalletFlowsConfig, json: bool) -> Result<()>
where
    S: FlowState + Serialize,
    C: CompletionSignal + FromStr<Err = ParseFlowError>,
{
    // Parse everything first so a typo fails before the flow starts
    let parsed = triggers
        .iter()
        .map(|trigger| {
            Ok(match trigger {
                Trigger::Next => ParsedTrigger::Next,
                Trigger::Back => ParsedTrigger::Back,
                Trigger::Signal(value) => ParsedTrigger::Signal(value.parse::<C>()?),
            })
        })
        .collect::<Result<Vec<ParsedTrigger<C>>, ParseFlowError>>()?;

    let mut controller = FlowController::<S>::spawn(&config.flow_settings());
    let mut actions = controller.take_actions()?;
    let handle = controller.handle();
    let states = handle.states();

    let consumer = tokio::spawn(async move {
        let mut navigator = RecordingNavigator::<S>::new();
        let mut emitted = Vec::new();
        while let Some(action) = actions.next().await {
            apply(action, &mut navigator);
            emitted.push(action);
        }
        (emitted, navigator)
    });

    for trigger in parsed {
        match trigger {
            ParsedTrigger::Next => handle.advance()?,
            ParsedTrigger::Back => handle.retreat()?,
            ParsedTrigger::Signal(signal) => handle.complete_with(signal)?,
        }
    }
    drop(handle);
    controller.close().await;

    let (emitted, navigator) = consumer.await?;
    let report = WalkReport {
        flow: S::FLOW,
        actions: emitted,
        navigation: navigator.steps().to_vec(),
        history: states.borrow().clone(),
        screens: navigator.stack(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🧭 Flow: {}", report.flow);
    for (index, action) in report.actions.iter().enumerate() {
        println!("   {}. {:?}", index + 1, action);
    }
    if report.actions.is_empty() {
        println!("   (no actions emitted)");
    }
    println!("📍 Current state: {:?}", report.history.current());
    println!("📚 Previous states: {:?}", report.history.previous());
    println!("📱 Screens on stack: {:?}", report.screens);
    if navigator.is_completed() {
        println!("✅ Flow completed");
    }
    Ok(())
}

fn print_table<S: FlowState>() {
    let table = S::transitions();
    println!("🔀 {}", S::FLOW);
    for (state, step) in table.entries() {
        let marker = if table.exits_on_retreat(state) { " (back exits)" } else { "" };
        match step {
            Step::Next(next) => println!("   {state:?} → {next:?}{marker}"),
            Step::Finish(kind) => println!("   {state:?} → finish: {kind:?}{marker}"),
        }
    }
    println!();
}
