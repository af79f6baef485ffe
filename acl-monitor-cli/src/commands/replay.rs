use acl_monitor_core::models::{CanvasSize, FrameReport, PoseFrame, ScanMode};
use acl_monitor_core::{MonitorError, MonitoringSession, PipelineConfig, SharedMonitoringSession};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ui::{self, ConsoleSpeaker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One coloured line per frame
    Text,
    /// One JSON report per line
    Json,
}

/// One line of a recorded session
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayRecord {
    #[serde(flatten)]
    pub frame: PoseFrame,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ReplayRecord {
    /// Canvas for this frame; per-frame dimensions win over the fallback
    pub fn canvas(&self, fallback: CanvasSize) -> CanvasSize {
        CanvasSize::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }
}

#[derive(Args)]
pub struct ReplayCommand {
    /// JSON Lines file of pose frames ("-" reads standard input)
    input: PathBuf,

    /// Canvas width in pixels for frames that carry no dimensions
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Canvas height in pixels for frames that carry no dimensions
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable spoken coaching cues
    #[arg(long)]
    coach: bool,

    /// Athlete name used in coaching cues
    #[arg(long)]
    athlete: Option<String>,

    /// Scan mode (continuous or single)
    #[arg(long)]
    scan_mode: Option<ScanMode>,

    /// Seed for the positive-feedback draw
    #[arg(long)]
    seed: Option<u64>,

    /// Print only the end-of-session summary
    #[arg(long)]
    summary_only: bool,

    /// Fail on the first malformed frame instead of skipping it
    #[arg(long)]
    strict: bool,
}

impl ReplayCommand {
    pub async fn execute(self, mut config: PipelineConfig) -> Result<()> {
        if self.coach {
            config.feedback.enabled = true;
        }
        if let Some(name) = &self.athlete {
            config.feedback.athlete_name = name.clone();
        }
        if let Some(mode) = self.scan_mode {
            config.session.scan_mode = mode;
        }

        let echo = self.format == OutputFormat::Text && !self.summary_only;
        let mut session = MonitoringSession::with_speaker(config, ConsoleSpeaker::new(echo))
            .context("Invalid replay options")?;
        if let Some(seed) = self.seed {
            session = session.with_rng(StdRng::seed_from_u64(seed));
        }
        let session = SharedMonitoringSession::new(session);

        let reader = open_input(&self.input).await?;
        let (tx, mut rx) = mpsc::channel::<ReplayRecord>(1);
        let reader_task = tokio::spawn(read_frames(reader, tx, self.strict));

        let fallback = CanvasSize::new(self.width, self.height);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut interrupted = false;
        loop {
            tokio::select! {
                record = rx.recv() => match record {
                    Some(record) => {
                        let report = session.process_frame(&record.frame, record.canvas(fallback));
                        self.print_report(&report)?;
                    }
                    None => break,
                },
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupted, stopping replay");
                    interrupted = true;
                    break;
                }
            }
        }

        drop(rx);
        if let Some(read) = finish_reader(reader_task, interrupted).await? {
            tracing::debug!(frames = read, "Frame reader finished");
        }

        let stats = session.stats();
        session.stop();

        match self.format {
            OutputFormat::Text => {
                if !self.summary_only {
                    println!();
                }
                println!("{}", ui::format_summary(&stats));
            }
            OutputFormat::Json => {
                let summary = serde_json::json!({ "summary": stats });
                println!("{}", serde_json::to_string(&summary)?);
            }
        }

        Ok(())
    }

    fn print_report(&self, report: &FrameReport) -> Result<()> {
        if self.summary_only {
            return Ok(());
        }
        match self.format {
            OutputFormat::Text => println!("{}", ui::format_report(report)),
            OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        }
        Ok(())
    }
}

type FrameSource = Box<dyn AsyncBufRead + Unpin + Send>;

async fn open_input(input: &Path) -> Result<FrameSource> {
    if input.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }

    let file = File::open(input)
        .await
        .with_context(|| format!("Failed to open frame file {}", input.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Decode one JSON line into a record
pub fn parse_record(line: &str) -> Result<ReplayRecord, MonitorError> {
    Ok(serde_json::from_str(line)?)
}

/// Read JSON Lines frames and hand them to the processor one at a time
async fn read_frames(reader: FrameSource, tx: mpsc::Sender<ReplayRecord>, strict: bool) -> Result<u64> {
    let mut lines = reader.lines();
    let mut line_number = 0u64;
    let mut sent = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read frame input")? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = match parse_record(line) {
            Ok(record) => record,
            Err(e) if strict => {
                return Err(e).with_context(|| format!("Malformed frame on line {}", line_number));
            }
            Err(e) => {
                tracing::warn!(line = line_number, error = %e, "Skipping malformed frame");
                continue;
            }
        };

        // Receiver gone: the replay was interrupted
        if tx.send(record).await.is_err() {
            break;
        }
        sent += 1;
    }

    Ok(sent)
}

/// Collect the reader's result, or abandon it after an interrupt
///
/// A blocked stdin read cannot be cancelled, so an interrupted replay never
/// waits on the reader; the runtime drops it on shutdown.
async fn finish_reader(reader_task: JoinHandle<Result<u64>>, interrupted: bool) -> Result<Option<u64>> {
    if interrupted {
        reader_task.abort();
        return Ok(None);
    }
    let read = reader_task.await.context("Frame reader task failed")??;
    Ok(Some(read))
}
