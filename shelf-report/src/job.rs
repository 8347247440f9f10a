//! Reporting job driver

use tracing::{info, warn};

use crate::error::ReportResult;
use crate::join::JoinedTable;
use crate::render::ChartSink;
use crate::snapshot::Snapshot;
use crate::views::{self, ViewKind};

/// How a reporting run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// No ratings or no books; nothing was written
    InsufficientData,
    /// Views were emitted in order; `skipped` had nothing to plot
    Generated {
        written: usize,
        skipped: Vec<ViewKind>,
    },
}

/// Compute every view from the snapshot and hand each to the sink
///
/// Views are emitted in order as soon as they are computed, so an error in
/// view N leaves the output of views before N in place.
pub fn run_report(snapshot: &Snapshot, sink: &mut dyn ChartSink) -> ReportResult<ReportOutcome> {
    if snapshot.is_insufficient() {
        warn!(
            "Insufficient data for reports ({} ratings, {} books)",
            snapshot.ratings.len(),
            snapshot.books.len()
        );
        return Ok(ReportOutcome::InsufficientData);
    }

    let (table, join_report) = JoinedTable::from_snapshot(snapshot);
    join_report.log();
    if table.is_empty() {
        warn!("No rating matched a book and user; score charts will be empty");
    } else {
        info!("Joined {} of {} ratings", table.len(), snapshot.ratings.len());
    }

    let mut written = 0;
    let mut skipped = Vec::new();

    for kind in ViewKind::ALL {
        match views::compute(kind, snapshot, &table)? {
            Some(chart) => {
                sink.emit(kind, &chart)?;
                written += 1;
            }
            None => skipped.push(kind),
        }
    }

    Ok(ReportOutcome::Generated { written, skipped })
}
