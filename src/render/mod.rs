//! Output rendering (text reports, JSON)

pub mod report;
pub mod text;

pub use report::{batch_report, single_report, to_pretty_string, ReportOptions, REPORT_SCHEMA_VERSION};
pub use text::{render_batch, render_single};
