//! Monitor events and where they are written.

use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::time::Duration;
use watch_core::{CoreError, FormattedRecord, KeywordSet, RecordKind};

/// Result of one cycle, in the shape handed to an [`OutputSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub cycle: u64,
    pub subreddit: String,
    pub records: Vec<FormattedRecord>,
    pub timed_out: bool,
    pub posts_scanned: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Started {
        subreddit: String,
        keywords: KeywordSet,
        include_comments: bool,
    },
    CycleStarted {
        cycle: u64,
        subreddit: String,
    },
    CycleCompleted(ScanReport),
    Waiting {
        delay: Duration,
    },
    Retrying {
        delay: Duration,
        reason: String,
    },
    Stopped,
}

pub trait OutputSink: Send {
    fn emit(&mut self, event: &MonitorEvent) -> Result<(), CoreError>;
}

/// Line-oriented, human-readable report.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &FormattedRecord) -> io::Result<()> {
        let created = format_timestamp(record.created_utc);
        match record.kind {
            RecordKind::Post => {
                writeln!(self.out, "\nPost: {}", record.title)?;
                writeln!(self.out, "URL: {}", record.url)?;
                writeln!(self.out, "Author: u/{}", record.author)?;
                writeln!(self.out, "Score: {}", record.score)?;
                writeln!(self.out, "Created: {}", created)?;
                writeln!(self.out, "Content: {}", record.body_excerpt)
            }
            RecordKind::Comment => {
                writeln!(self.out, "\nComment on post: {}", record.title)?;
                writeln!(self.out, "Post URL: {}", record.url)?;
                writeln!(self.out, "Comment Author: u/{}", record.author)?;
                writeln!(self.out, "Comment Score: {}", record.score)?;
                writeln!(self.out, "Comment Created: {}", created)?;
                writeln!(self.out, "Comment Content: {}", record.body_excerpt)
            }
        }
    }

    fn write_event(&mut self, event: &MonitorEvent) -> io::Result<()> {
        match event {
            MonitorEvent::Started {
                subreddit,
                keywords,
                include_comments,
            } => {
                writeln!(
                    self.out,
                    "Monitoring r/{} for keywords: {}",
                    subreddit, keywords
                )?;
                writeln!(
                    self.out,
                    "Searching in comments: {}",
                    if *include_comments { "Yes" } else { "No" }
                )
            }
            MonitorEvent::CycleStarted { cycle, subreddit } => {
                writeln!(self.out, "\nChecking r/{} (cycle {})...", subreddit, cycle)
            }
            MonitorEvent::CycleCompleted(report) => {
                if report.timed_out {
                    writeln!(
                        self.out,
                        "Scan time limit reached after {} posts, reporting partial results",
                        report.posts_scanned
                    )?;
                }
                if let Some(error) = &report.error {
                    writeln!(self.out, "Scan interrupted: {}", error)?;
                }
                if report.records.is_empty() {
                    writeln!(self.out, "\nNo matching items found in r/{}", report.subreddit)?;
                } else {
                    writeln!(
                        self.out,
                        "\nFound {} matching items in r/{}:",
                        report.records.len(),
                        report.subreddit
                    )?;
                    for record in &report.records {
                        self.write_record(record)?;
                    }
                }
                Ok(())
            }
            MonitorEvent::Waiting { delay } => writeln!(
                self.out,
                "\nWaiting for {} seconds before next check...",
                delay.as_secs()
            ),
            MonitorEvent::Retrying { delay, reason } => {
                writeln!(self.out, "An error occurred: {}", reason)?;
                writeln!(
                    self.out,
                    "Waiting for {} seconds before retrying...",
                    delay.as_secs()
                )
            }
            MonitorEvent::Stopped => writeln!(self.out, "\nMonitoring stopped."),
        }
    }
}

impl<W: Write + Send> OutputSink for ConsoleSink<W> {
    fn emit(&mut self, event: &MonitorEvent) -> Result<(), CoreError> {
        self.write_event(event)?;
        self.out.flush()?;
        Ok(())
    }
}

fn format_timestamp(created_utc: i64) -> String {
    DateTime::from_timestamp(created_utc, 0)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| created_utc.to_string())
}
