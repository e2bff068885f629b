//! The long-running scan loop.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Scanning -> Reporting -> Waiting -> Scanning ...
//!                 |
//!                 +-> RecoveringFromError -> Scanning ...
//! ```
//!
//! A cycle that ends with a source error still reports whatever it matched,
//! then waits out the recovery delay instead of the regular interval. Failing
//! to write a report is handled the same way. Cancellation is only observed
//! between cycles and while sleeping; a scan in progress always finishes.

use crate::report::{MonitorEvent, OutputSink, ScanReport};
use crate::scan::{ScanOutcome, Scanner};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use watch_core::{ContentSource, CoreError, ErrorExt, ErrorReporter, MonitorConfig, ScanConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Scanning,
    Reporting,
    Waiting,
    RecoveringFromError,
    Stopped,
}

/// Where the loop goes once a cycle has been reported.
pub fn state_after_report(
    cycle_error: Option<&CoreError>,
    report_result: &Result<(), CoreError>,
) -> MonitorState {
    if cycle_error.is_some() || report_result.is_err() {
        MonitorState::RecoveringFromError
    } else {
        MonitorState::Waiting
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub recoveries: u64,
    pub records_reported: u64,
}

pub struct Monitor<S, O> {
    source: S,
    scanner: Scanner,
    config: MonitorConfig,
    sink: O,
    reporter: ErrorReporter,
    stats: MonitorStats,
}

impl<S, O> Monitor<S, O>
where
    S: ContentSource,
    O: OutputSink,
{
    pub fn new(
        source: S,
        scan_config: ScanConfig,
        config: MonitorConfig,
        sink: O,
    ) -> Result<Self, CoreError> {
        scan_config.validate()?;
        Ok(Self {
            source,
            scanner: Scanner::new(scan_config)?,
            config,
            sink,
            reporter: ErrorReporter::new(),
            stats: MonitorStats::default(),
        })
    }

    /// Runs until `cancel` fires. Scan and reporting failures never end the loop.
    pub async fn run(&mut self, cancel: &CancellationToken) -> MonitorStats {
        let scan_config = self.scanner.config().clone();
        info!(
            "Monitoring r/{} for keywords: {}",
            scan_config.subreddit, scan_config.keywords
        );
        self.emit_best_effort(&MonitorEvent::Started {
            subreddit: scan_config.subreddit.clone(),
            keywords: scan_config.keywords.clone(),
            include_comments: scan_config.include_comments,
        });

        let mut state = MonitorState::Scanning;
        let mut pending: Option<ScanOutcome> = None;
        let mut fault: Option<String> = None;

        loop {
            debug!("Monitor state: {:?}", state);
            state = match state {
                MonitorState::Scanning => {
                    if cancel.is_cancelled() {
                        MonitorState::Stopped
                    } else {
                        pending = Some(self.run_cycle(&scan_config.subreddit).await);
                        MonitorState::Reporting
                    }
                }
                MonitorState::Reporting => {
                    let outcome = pending.take().unwrap_or_default();
                    let report_result = self.report(&scan_config.subreddit, &outcome);
                    let next = state_after_report(outcome.error.as_ref(), &report_result);

                    if let Err(e) = report_result {
                        self.reporter.report_error(&e);
                        fault = Some(e.to_string());
                    } else if let Some(e) = outcome.error {
                        fault = Some(e.user_friendly_message());
                    }
                    next
                }
                MonitorState::Waiting => {
                    let delay = self.config.check_interval;
                    match self.sink.emit(&MonitorEvent::Waiting { delay }) {
                        Ok(()) => {
                            info!("Waiting {:?} before next check", delay);
                            if self.sleep(delay, cancel).await {
                                MonitorState::Scanning
                            } else {
                                MonitorState::Stopped
                            }
                        }
                        Err(e) => {
                            self.reporter.report_error(&e);
                            fault = Some(e.to_string());
                            MonitorState::RecoveringFromError
                        }
                    }
                }
                MonitorState::RecoveringFromError => {
                    let delay = self.config.recovery_delay;
                    let reason = fault
                        .take()
                        .unwrap_or_else(|| "unknown failure".to_string());
                    self.stats.recoveries += 1;
                    warn!(
                        "Recovering from error ({}), retrying in {:?}",
                        reason, delay
                    );
                    self.emit_best_effort(&MonitorEvent::Retrying { delay, reason });
                    if self.sleep(delay, cancel).await {
                        MonitorState::Scanning
                    } else {
                        MonitorState::Stopped
                    }
                }
                MonitorState::Stopped => {
                    info!(
                        "Monitor stopped after {} cycles ({} recoveries)",
                        self.stats.cycles, self.stats.recoveries
                    );
                    self.emit_best_effort(&MonitorEvent::Stopped);
                    return self.stats.clone();
                }
            };
        }
    }

    async fn run_cycle(&mut self, subreddit: &str) -> ScanOutcome {
        self.stats.cycles += 1;
        let cycle = self.stats.cycles;
        info!("Starting scan cycle {} for r/{}", cycle, subreddit);
        self.emit_best_effort(&MonitorEvent::CycleStarted {
            cycle,
            subreddit: subreddit.to_string(),
        });
        self.scanner.scan(&self.source).await
    }

    fn report(&mut self, subreddit: &str, outcome: &ScanOutcome) -> Result<(), CoreError> {
        let report = ScanReport {
            cycle: self.stats.cycles,
            subreddit: subreddit.to_string(),
            records: outcome.records.clone(),
            timed_out: outcome.timed_out,
            posts_scanned: outcome.posts_scanned,
            error: outcome.error.as_ref().map(|e| e.to_string()),
        };
        self.sink.emit(&MonitorEvent::CycleCompleted(report))?;
        self.stats.records_reported += outcome.records.len() as u64;
        Ok(())
    }

    fn emit_best_effort(&mut self, event: &MonitorEvent) {
        if let Err(e) = self.sink.emit(event) {
            self.reporter.report_warning(&e);
        }
    }

    /// Returns false when cancelled before `delay` elapsed.
    async fn sleep(&self, delay: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancellation received, stopping monitor");
                false
            }
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
