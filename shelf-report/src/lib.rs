//! shelf-report library - offline reporting over the catalog
//!
//! Two batch jobs share this crate:
//! - the reporting job: snapshot → join → ten independent views → PNG charts
//! - the recommendation query: best-rated books of one genre as a text table

pub mod error;
pub mod job;
pub mod join;
pub mod recommend;
pub mod render;
pub mod snapshot;
pub mod stats;
pub mod views;

pub use crate::error::{ReportError, ReportResult};
pub use crate::job::{run_report, ReportOutcome};
pub use crate::join::{JoinReport, JoinedRow, JoinedTable};
pub use crate::render::{ChartSink, PngRenderer};
pub use crate::snapshot::Snapshot;
pub use crate::views::{Chart, ViewKind};
