//! Per-cycle metrics report rendering.
//!
//! Rendering is a pure function over a composite snapshot so tests can check
//! line content directly; the runner pushes the lines through `tracing`.

use tracing::info;

use super::metrics::CompositeSnapshot;

/// Render the once-per-cycle report as one line per statistic.
///
/// Error lines are emitted in ascending status-code order, one per distinct
/// code. The ordering is a reporting aid, not a contract.
#[must_use]
pub fn report_lines(snapshot: &CompositeSnapshot) -> Vec<String> {
    let metrics = &snapshot.metrics;
    let counters = &snapshot.counters;
    let mut lines = Vec::with_capacity(5 + metrics.error_counts.len());
    lines.push(format!(
        "total groups created: {}",
        counters.total_groups_created
    ));
    lines.push(format!(
        "total users created: {}",
        counters.total_users_created
    ));
    lines.push(format!("average latency: {:?}", metrics.average_latency));
    lines.push(format!("peak latency: {:?}", metrics.peak_latency));
    lines.push(format!("total errors: {}", metrics.total_errors));
    for (status, count) in &metrics.error_counts {
        lines.push(format!("HTTP {status} errors: {count}"));
    }
    lines
}

/// Emit the report through the tracing subscriber.
pub fn emit(snapshot: &CompositeSnapshot) {
    for line in report_lines(snapshot) {
        info!("{line}");
    }
}
