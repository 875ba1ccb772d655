//! Interactive review loop driving the workflow controller.
//!
//! Decisions advance to the next pending review at once; the decision call
//! and the queue refresh finish in the background and report back through
//! the workflow's event stream.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use reviewdesk_core::approval::{Outcome, REJECTION_REASONS};
use reviewdesk_core::time_range::TimeRange;
use reviewdesk_core::types::ReviewId;
use reviewdesk_gateway::GatewayClient;
use reviewdesk_workflow::{Phase, ReviewWorkflow, SaveOutcome, WorkflowEvent};

use crate::commands::{queue_filter, rejection_reason, require_login, today};
use crate::render;

const HELP: &str = "\
Commands:
  list                 show open reviews
  open <id>            open a review
  approve [note]       approve the open review
  reject <reason|n>    reject the open review (n = preset number)
  reasons              list preset rejection reasons
  edit                 edit the site's area and block
  area <id>            choose an area while editing
  block <id>           choose a block while editing
  save | cancel        finish editing
  refresh              reload the queue
  close                close the open review
  quit";

type Workflow = ReviewWorkflow<GatewayClient>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    List,
    Open(String),
    Approve(Option<String>),
    Reject(String),
    Reasons,
    Edit,
    Area(i64),
    Block(i64),
    Save,
    Cancel,
    Refresh,
    Close,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Input, String> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());
    let id = |what: &str| -> Result<i64, String> {
        rest.parse()
            .map_err(|_| format!("Usage: {what} <id>"))
    };

    match command {
        "l" | "list" => Ok(Input::List),
        "o" | "open" => arg.map(Input::Open).ok_or_else(|| "Usage: open <id>".to_string()),
        "a" | "approve" => Ok(Input::Approve(arg)),
        "r" | "reject" => {
            let preset = rest.parse::<usize>().ok();
            let reason = match preset {
                Some(_) => rejection_reason(None, preset),
                None => rejection_reason(arg.as_deref(), None),
            };
            reason.map(Input::Reject).map_err(|e| e.to_string())
        }
        "reasons" => Ok(Input::Reasons),
        "e" | "edit" => Ok(Input::Edit),
        "area" => id("area").map(Input::Area),
        "block" => id("block").map(Input::Block),
        "save" => Ok(Input::Save),
        "cancel" => Ok(Input::Cancel),
        "refresh" => Ok(Input::Refresh),
        "c" | "close" => Ok(Input::Close),
        "h" | "help" | "?" => Ok(Input::Help),
        "q" | "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("Unknown command '{other}'. Type `help`.")),
    }
}

pub async fn run(client: GatewayClient, range: Option<TimeRange>) -> Result<()> {
    require_login(&client)?;

    let workflow = ReviewWorkflow::with_filter(Arc::new(client), queue_filter(range, today()));
    let mut events = workflow.subscribe();

    let count = workflow
        .reload()
        .await
        .context("Failed to load the review queue")?;
    // The catalog is fetched again when editing starts if this fails.
    let _ = workflow.load_areas().await;
    println!("{count} reviews loaded. Type `help` for commands.");

    let first = workflow.snapshot().open_items().next().map(|i| i.id.clone());
    if let Some(id) = first {
        open(&workflow, &id).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse(line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => handle(&workflow, input, &mut in_flight).await,
                    Err(message) => println!("{message}"),
                }
            }
            event = events.recv() => match event {
                Ok(WorkflowEvent::Error { message }) => println!("! {message}"),
                Ok(WorkflowEvent::DecisionRecorded { id, status }) => {
                    println!("Review {id} {}", status.badge());
                }
                Ok(WorkflowEvent::SessionExpired) => {
                    println!("Session expired. Run `reviewdesk login` again.");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Triage fell behind the event stream");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    if !in_flight.is_empty() {
        println!("Waiting for {} decision(s) to finish...", in_flight.len());
    }
    for task in in_flight {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Decision task failed to complete");
        }
    }
    Ok(())
}

/// Errors from the controller are already on the event stream, so they
/// are not printed here.
async fn handle(workflow: &Workflow, input: Input, in_flight: &mut Vec<JoinHandle<()>>) {
    in_flight.retain(|task| !task.is_finished());

    match input {
        Input::List => list(workflow),
        Input::Open(id) => open(workflow, &ReviewId::new(id)).await,
        Input::Approve(note) => decide(workflow, Outcome::Approve, note.as_deref(), in_flight).await,
        Input::Reject(reason) => decide(workflow, Outcome::Reject, Some(&reason), in_flight).await,
        Input::Reasons => {
            for (i, reason) in REJECTION_REASONS.iter().enumerate() {
                println!("{:>2}. {reason}", i + 1);
            }
        }
        Input::Edit => {
            if let Ok(blocks) = workflow.begin_edit().await {
                if let Some(blocks) = blocks {
                    let _ = blocks.await;
                }
                show_draft(workflow);
            }
        }
        Input::Area(area_id) => {
            if let Ok(blocks) = workflow.select_area(area_id) {
                let _ = blocks.await;
                show_draft(workflow);
            }
        }
        Input::Block(block_id) => {
            if workflow.select_block(block_id).is_ok() {
                show_draft(workflow);
            }
        }
        Input::Save => match workflow.save().await {
            Ok(SaveOutcome::Unchanged) => println!("No changes."),
            Ok(SaveOutcome::Saved { .. }) => {
                println!("Site updated.");
                show_detail(workflow);
            }
            Err(_) => {}
        },
        Input::Cancel => workflow.cancel_edit(),
        Input::Refresh => {
            if let Ok(count) = workflow.reload().await {
                println!("{count} reviews loaded.");
            }
        }
        Input::Close => workflow.close(),
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
}

fn list(workflow: &Workflow) {
    let snapshot = workflow.snapshot();
    let mut any = false;
    for item in snapshot.open_items() {
        any = true;
        println!("{}", render::item_row(item, snapshot.selection.as_ref() == Some(&item.id)));
    }
    if !any {
        println!("No pending reviews.");
    }
}

async fn open(workflow: &Workflow, id: &ReviewId) {
    if let Ok(fetch) = workflow.open(id) {
        let _ = fetch.await;
        show_detail(workflow);
    }
}

async fn decide(
    workflow: &Workflow,
    outcome: Outcome,
    reason: Option<&str>,
    in_flight: &mut Vec<JoinHandle<()>>,
) {
    let Some(id) = workflow.selection() else {
        println!("No review is open.");
        return;
    };
    let Ok(handle) = workflow.decide(&id, outcome, reason) else {
        return;
    };
    in_flight.push(handle.background);

    match (handle.advanced_to, handle.detail) {
        (Some(_), Some(fetch)) => {
            let _ = fetch.await;
            show_detail(workflow);
        }
        _ => println!("No more pending reviews."),
    }
}

fn show_detail(workflow: &Workflow) {
    match (workflow.phase(), workflow.detail()) {
        (Phase::DetailReady, Some(detail)) => println!("{}", render::detail(&detail)),
        (Phase::DetailLoading, _) => println!("Loading..."),
        _ => {}
    }
}

fn show_draft(workflow: &Workflow) {
    let snapshot = workflow.snapshot();
    let Some(draft) = snapshot.draft else {
        return;
    };
    println!(
        "Area: {}  Block: {}",
        draft.area().map_or("-", |a| a.name.as_str()),
        draft.block().map_or("-", |b| b.name.as_str()),
    );
    if draft.block().is_none() && !snapshot.blocks.is_empty() {
        println!("{}", render::blocks(&snapshot.blocks));
    } else if draft.area().is_none() {
        println!("{}", render::areas(&snapshot.areas));
    }
}
