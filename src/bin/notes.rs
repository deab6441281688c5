//! Scripted note-taking session driving a store end to end.
//!
//! Creates a note through a thunk backed by a fake async API, edits it,
//! closes it and reopens it. Every applied transition repaints the note
//! list on stdout; structured logs from the logging stage go to stderr.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};
use unidux::{Action, LoggingMiddleware, Pipeline, Store, StoreHandle, Thunk, ThunkMiddleware};

#[derive(Parser)]
#[command(name = "notes", about = "Scripted note-taking session on a unidux store")]
struct Cli {
    /// Simulated persistence latency in milliseconds
    #[arg(long, default_value_t = 300)]
    latency_ms: u64,
}

type NoteId = u64;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Note {
    id: NoteId,
    content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
struct NotesState {
    notes: BTreeMap<NoteId, Note>,
    open_note_id: Option<NoteId>,
    is_loading: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum NoteAction {
    /// Without an id: the create is pending. With one: the note exists.
    CreateNote { id: Option<NoteId> },
    UpdateNote { id: NoteId, content: String },
    OpenNote { id: NoteId },
    CloseNote,
}

/// Pure transition for the note-taking state.
fn reduce(state: Option<NotesState>, action: &Action) -> NotesState {
    let state = state.unwrap_or_default();
    let Some(action) = action.decode::<NoteAction>() else {
        return state;
    };
    match action {
        NoteAction::CreateNote { id: None } => NotesState {
            is_loading: true,
            ..state
        },
        NoteAction::CreateNote { id: Some(id) } => {
            let mut next = state;
            next.notes.insert(
                id,
                Note {
                    id,
                    content: String::new(),
                },
            );
            next.open_note_id = Some(id);
            next.is_loading = false;
            next
        }
        NoteAction::UpdateNote { id, content } => {
            let mut next = state;
            next.notes
                .entry(id)
                .or_insert_with(|| Note {
                    id,
                    content: String::new(),
                })
                .content = content;
            next
        }
        NoteAction::OpenNote { id } => NotesState {
            open_note_id: Some(id),
            ..state
        },
        NoteAction::CloseNote => NotesState {
            open_note_id: None,
            ..state
        },
    }
}

/// Stand-in for a persistence service: hands out note ids after a delay.
struct FakeApi {
    next_id: AtomicU64,
    latency: Duration,
}

impl FakeApi {
    fn new(latency: Duration) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            latency,
        }
    }

    async fn create_note(&self) -> NoteId {
        tokio::time::sleep(self.latency).await;
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn record(action: &NoteAction) -> serde_json::Result<Action> {
    Action::typed(action)
}

/// Marks the state loading, asks the fake API for an id and completes the
/// note once it arrives.
fn create_note(api: Arc<FakeApi>) -> Thunk<NotesState> {
    Thunk::new(move |store| {
        dispatch_from_thunk(&store, NoteAction::CreateNote { id: None });
        let task_store = store.clone();
        tokio::spawn(async move {
            let id = api.create_note().await;
            dispatch_from_thunk(&task_store, NoteAction::CreateNote { id: Some(id) });
        });
        json!({ "status": "creating" })
    })
}

/// Follow-up dispatches have no caller to report to, so failures land in
/// the log instead.
fn dispatch_from_thunk(store: &StoreHandle<NotesState>, action: NoteAction) {
    match record(&action) {
        Ok(record) => {
            if let Err(error) = store.dispatch(record) {
                tracing::warn!(%error, "follow-up dispatch rejected");
            }
        }
        Err(error) => tracing::warn!(%error, "failed to encode note action"),
    }
}

/// First line of the note, trimmed, or a placeholder while it is blank.
fn title(note: &Note) -> &str {
    match note.content.lines().next() {
        Some(line) if !line.trim().is_empty() => line.trim(),
        _ => "(untitled)",
    }
}

fn render(state: &NotesState) {
    println!("--- notes ({}) ---", state.notes.len());
    if state.is_loading {
        println!("      creating a note...");
    }
    for note in state.notes.values() {
        let marker = if state.open_note_id == Some(note.id) {
            "*"
        } else {
            " "
        };
        println!("  {} [{}] {}", marker, note.id, title(note));
    }
}

/// Logs go to stderr so the rendered list stays clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let api = Arc::new(FakeApi::new(Duration::from_millis(cli.latency_ms)));
    let store = Store::with_pipeline(
        reduce,
        Pipeline::new().with(ThunkMiddleware).with(LoggingMiddleware),
    );

    let render_store = store.clone();
    let _subscription = store.subscribe(move || render(&render_store.get_state()));

    // Create a note through the async path, then wait out the fake API.
    store.dispatch(create_note(Arc::clone(&api)))?;
    tokio::time::sleep(api.latency + Duration::from_millis(50)).await;

    let id = store
        .get_state()
        .open_note_id
        .context("fake API never delivered the note id")?;
    store.dispatch(record(&NoteAction::UpdateNote {
        id,
        content: "Shopping list\n- coffee\n- oat milk".to_owned(),
    })?)?;
    store.dispatch(record(&NoteAction::CloseNote)?)?;
    store.dispatch(record(&NoteAction::OpenNote { id })?)?;

    println!(
        "final state:\n{}",
        serde_json::to_string_pretty(&store.get_state())?
    );
    Ok(())
}
