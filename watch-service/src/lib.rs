pub mod formatter;
pub mod matcher;
pub mod monitor;
pub mod report;
pub mod scan;

pub use formatter::{excerpt, format_comment, format_post};
pub use matcher::{matches, KeywordMatcher};
pub use monitor::{state_after_report, Monitor, MonitorState, MonitorStats};
pub use report::{ConsoleSink, MonitorEvent, OutputSink, ScanReport};
pub use scan::{scan, ScanOutcome, Scanner};
