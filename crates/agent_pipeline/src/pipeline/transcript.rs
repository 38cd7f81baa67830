//! Transcript saving for persisting pipeline runs to disk

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::PipelineOutcome;
use crate::error::Result;

/// Manages transcript persistence with timestamped directories and filenames
#[derive(Debug, Clone)]
pub struct TranscriptSaver {
    base_dir: PathBuf,
    /// Session directory (created at session start with timestamp)
    session_dir: PathBuf,
    run_count: usize,
}

fn timestamp() -> String {
    let now: DateTime<Local> = Local::now();
    now.format("%Y-%m-%d_%H-%M-%S-%3f").to_string()
}

impl TranscriptSaver {
    /// Create a saver with a session subdirectory named `yyyy-mm-dd_HH-MM-SS-mmm`
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let session_dir = base_dir.join(timestamp());

        fs::create_dir_all(&session_dir).await?;
        info!("Transcript session directory: {}", session_dir.display());

        Ok(Self {
            base_dir,
            session_dir,
            run_count: 0,
        })
    }

    /// Write a run as `run_NNN_<timestamp>.json`
    pub async fn save(&mut self, outcome: &PipelineOutcome) -> Result<PathBuf> {
        self.run_count += 1;

        let filename = format!("run_{:03}_{}.json", self.run_count, timestamp());
        let file_path = self.session_dir.join(&filename);

        let body = serde_json::to_vec_pretty(outcome)?;
        fs::write(&file_path, &body).await?;

        debug!(
            "Saved transcript: {} ({} bytes)",
            file_path.display(),
            body.len()
        );

        Ok(file_path)
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn run_count(&self) -> usize {
        self.run_count
    }
}
