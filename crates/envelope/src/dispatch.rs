//! Asynchronous work: `op` invocations and file writes
//!
//! Each request runs as its own tokio task and reports back with exactly one
//! [`Event`] on the loop's channel.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use envelope_core::error::{classify, EnvelopeError, Result};
use envelope_core::op::{self, ItemDetail, ListItem};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::app::{Event, Request};

/// Permissions for generated files
pub const FILE_MODE: u32 = 0o644;

/// Spawns requests and routes their results back to the event loop
pub struct Dispatcher {
    op: PathBuf,
    events: UnboundedSender<Event>,
}

impl Dispatcher {
    /// `op` is the resolved path of the 1Password CLI
    pub fn new(op: PathBuf, events: UnboundedSender<Event>) -> Self {
        Self { op, events }
    }

    /// Start a request without waiting for it
    pub fn dispatch(&self, request: Request) {
        let op = self.op.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = run(&op, request).await;
            if events.send(event).is_err() {
                debug!("event loop closed, dropping result");
            }
        });
    }
}

/// Deliver SIGINT/SIGTERM to the loop as a single [`Event::Interrupt`].
///
/// Handlers are registered before returning, so a signal that arrives right
/// after this call is not lost. Must run inside the tokio runtime.
#[cfg(unix)]
pub fn forward_signals(events: UnboundedSender<Event>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("received SIGINT"),
            _ = terminate.recv() => info!("received SIGTERM"),
        }
        if events.send(Event::Interrupt).is_err() {
            debug!("event loop closed, dropping interrupt");
        }
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn forward_signals(events: UnboundedSender<Event>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c");
            let _ = events.send(Event::Interrupt);
        }
    });
    Ok(())
}

/// Carry out a request and turn its result into an event
pub async fn run(op: &Path, request: Request) -> Event {
    let result = match request {
        Request::ListItems { vault } => list_items(op, &vault).await.map(Event::ItemsLoaded),
        Request::GetItem { id } => get_item(op, &id).await.map(Event::ItemLoaded),
        Request::WriteFile { path, content } => {
            write_file(&path, &content).await.map(Event::FileWritten)
        }
    };

    result.unwrap_or_else(|err| {
        warn!(error = %err, "request failed");
        Event::Failed(err)
    })
}

/// Items of a vault, sorted by title
pub async fn list_items(op: &Path, vault: &str) -> Result<Vec<ListItem>> {
    let output = run_op(op, &op::list_args(vault)).await?;
    let items = op::parse_item_list(&output, vault)?;
    debug!(vault, count = items.len(), "listed items");
    Ok(items)
}

pub async fn get_item(op: &Path, id: &str) -> Result<ItemDetail> {
    let output = run_op(op, &op::get_args(id)).await?;
    op::parse_item_detail(&output)
}

/// Write `content` to `path`, replacing any existing file
pub async fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    let write_err = |source| EnvelopeError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = options.open(path).await.map_err(write_err)?;
    file.write_all(content.as_bytes()).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;

    Ok(path.to_path_buf())
}

/// Run `op` and return stdout followed by stderr.
///
/// The child is killed if the task is dropped before it exits.
async fn run_op(op: &Path, args: &[String]) -> Result<Vec<u8>> {
    debug!(?args, "running op");

    let output = Command::new(op)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| classify("", e))?;

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);

    if !output.status.success() {
        return Err(classify(&String::from_utf8_lossy(&combined), output.status));
    }

    Ok(combined)
}
