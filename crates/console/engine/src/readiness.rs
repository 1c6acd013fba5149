//! Readiness aggregation across launch dependencies

use console_types::{ReadinessReport, ReadinessSnapshot, Subsystem, SubsystemStatus};

/// Folds per-subsystem flags and free-text blockers into one go/no-go.
///
/// Never reports ready while any flag is false or any blocker is present,
/// and every false flag is named by at least one blocker.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadinessAggregator;

/// Stands in for blockers reported without any text
pub const UNSPECIFIED_BLOCKER: &str = "Unspecified readiness blocker";

impl ReadinessAggregator {
    pub fn aggregate(snapshot: &ReadinessSnapshot) -> ReadinessReport {
        let mut blockers: Vec<String> = Vec::with_capacity(snapshot.blockers.len());
        for blocker in &snapshot.blockers {
            let text = if blocker.trim().is_empty() {
                UNSPECIFIED_BLOCKER
            } else {
                blocker.as_str()
            };
            if !blockers.iter().any(|b| b == text) {
                blockers.push(text.to_string());
            }
        }

        for subsystem in snapshot.failing() {
            if !blockers.iter().any(|b| subsystem.is_named_by(b)) {
                blockers.push(subsystem.blocker_label().to_string());
            }
        }

        let ready = blockers.is_empty() && snapshot.failing().is_empty();
        ReadinessReport { ready, blockers }
    }

    /// Build a snapshot from individual probe results. Subsystems with no
    /// result are treated as not ready.
    pub fn snapshot_from(statuses: &[SubsystemStatus]) -> ReadinessSnapshot {
        let mut snapshot = ReadinessSnapshot::default();
        for subsystem in Subsystem::ALL {
            match statuses.iter().find(|s| s.subsystem == subsystem) {
                Some(status) if status.ready => snapshot.set_ready(subsystem, true),
                Some(SubsystemStatus {
                    detail: Some(detail),
                    ..
                }) if !detail.trim().is_empty() => {
                    snapshot.blockers.push(format!("{}: {}", subsystem.label(), detail));
                }
                _ => {}
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ready() {
        let report = ReadinessAggregator::aggregate(&ReadinessSnapshot::all_ready());
        assert!(report.ready);
        assert!(report.blockers.is_empty());
    }

    #[test]
    fn test_missing_flag_is_named() {
        let snapshot = ReadinessSnapshot::all_ready().with_ready(Subsystem::Nats, false);
        let report = ReadinessAggregator::aggregate(&snapshot);
        assert!(!report.ready);
        assert_eq!(report.blockers, vec!["NATS transport is unavailable"]);
    }

    #[test]
    fn test_existing_blocker_not_duplicated() {
        let snapshot = ReadinessSnapshot::all_ready()
            .with_ready(Subsystem::Database, false)
            .with_blocker("Postgres connection refused");
        let report = ReadinessAggregator::aggregate(&snapshot);
        assert_eq!(report.blockers, vec!["Postgres connection refused"]);
    }

    #[test]
    fn test_blocker_alone_blocks() {
        let snapshot = ReadinessSnapshot::all_ready().with_blocker("Budget exhausted");
        let report = ReadinessAggregator::aggregate(&snapshot);
        assert!(!report.ready);
    }

    #[test]
    fn test_blank_blocker_still_blocks() {
        let snapshot = ReadinessSnapshot::all_ready().with_blocker("   ");
        let report = ReadinessAggregator::aggregate(&snapshot);
        assert!(!report.ready);
        assert_eq!(report.blockers, vec![UNSPECIFIED_BLOCKER]);
    }

    #[test]
    fn test_blocker_about_another_subsystem_does_not_hide_failure() {
        let snapshot = ReadinessSnapshot::all_ready()
            .with_ready(Subsystem::Sse, false)
            .with_blocker("Provider token stream quota exceeded");
        let report = ReadinessAggregator::aggregate(&snapshot);
        assert_eq!(
            report.blockers,
            vec![
                "Provider token stream quota exceeded",
                "SSE stream is disconnected"
            ]
        );
    }

    #[test]
    fn test_snapshot_from_probes() {
        let statuses = vec![
            SubsystemStatus::ready(Subsystem::Provider),
            SubsystemStatus::not_ready(Subsystem::Sse, "stream closed by peer"),
        ];
        let snapshot = ReadinessAggregator::snapshot_from(&statuses);
        assert!(snapshot.provider_ready);
        assert!(!snapshot.sse_ready);
        assert!(!snapshot.mcp_ready);
        assert_eq!(snapshot.blockers, vec!["SSE stream: stream closed by peer"]);

        let report = ReadinessAggregator::aggregate(&snapshot);
        // Sse is already named; the four silent subsystems get labels
        assert_eq!(report.blockers.len(), 5);
    }
}
