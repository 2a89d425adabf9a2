//! Background writer for the rule file

use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Hands serialized rule files to a single background task.
///
/// Writes land on disk in submission order, so the file always ends up
/// holding the latest snapshot even when several edits arrive back to back.
#[derive(Debug, Clone)]
pub struct RuleFileWriter {
    path: PathBuf,
    tx: mpsc::UnboundedSender<String>,
}

impl RuleFileWriter {
    /// Start the writer task. Must be called from inside a tokio runtime.
    ///
    /// The task exits once every `RuleFileWriter` clone has been dropped and
    /// the queue is drained.
    pub fn spawn(path: impl Into<PathBuf>) -> (Self, JoinHandle<()>) {
        let path = path.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let task_path = path.clone();
        let handle = tokio::spawn(async move {
            while let Some(contents) = rx.recv().await {
                match tokio::fs::write(&task_path, contents).await {
                    Ok(()) => tracing::info!("Keyword file updated: {}", task_path.display()),
                    Err(e) => {
                        tracing::error!("Error writing keyword file {}: {}", task_path.display(), e)
                    }
                }
            }
            tracing::debug!("Keyword file writer stopped");
        });

        (Self { path, tx }, handle)
    }

    /// Queue a snapshot for writing. Never blocks.
    pub fn submit(&self, contents: String) {
        if self.tx.send(contents).is_err() {
            tracing::error!(
                "Keyword file writer for {} is gone, change not persisted",
                self.path.display()
            );
        }
    }
}
