//! Deliverables queue: envelopes held for human review
//!
//! Entries keep insertion order and ids are unique. Plain artifacts may be
//! acknowledged; governance halts stay until an explicit decision is made,
//! and while one is pending its source agent counts as blocked.

use chrono::Utc;
use console_types::{
    ConsoleError, ConsoleResult, CtsEnvelope, DecisionRecord, GovernanceDecision, Resolution,
};
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
pub struct DeliverablesQueue {
    entries: Vec<CtsEnvelope>,
    audit: Vec<DecisionRecord>,
}

impl DeliverablesQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an envelope. Returns `false` if its id is already queued.
    pub fn enqueue(&mut self, envelope: CtsEnvelope) -> bool {
        if self.contains(&envelope.id) {
            debug!(envelope_id = %envelope.id, "Duplicate deliverable ignored");
            return false;
        }
        debug!(envelope_id = %envelope.id, signal = %envelope.signal, "Deliverable queued");
        self.entries.push(envelope);
        true
    }

    /// Remove an envelope without recording a resolution.
    pub fn dequeue(&mut self, id: &str) -> Option<CtsEnvelope> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&CtsEnvelope> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn list(&self) -> &[CtsEnvelope] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dismiss a plain artifact after review.
    pub fn acknowledge(&mut self, id: &str) -> ConsoleResult<DecisionRecord> {
        if self.get(id).is_some_and(CtsEnvelope::is_governance_halt) {
            return Err(ConsoleError::AcknowledgeRequiresDecision(id.to_string()));
        }
        let envelope = self
            .dequeue(id)
            .ok_or_else(|| ConsoleError::DeliverableNotFound(id.to_string()))?;
        Ok(self.record(envelope, Resolution::Acknowledged, None))
    }

    /// Record an explicit decision for any queued envelope.
    pub fn decide(
        &mut self,
        id: &str,
        decision: GovernanceDecision,
        reason: Option<String>,
    ) -> ConsoleResult<DecisionRecord> {
        let envelope = self
            .dequeue(id)
            .ok_or_else(|| ConsoleError::DeliverableNotFound(id.to_string()))?;
        Ok(self.record(envelope, Resolution::Decided(decision), reason))
    }

    fn record(
        &mut self,
        envelope: CtsEnvelope,
        resolution: Resolution,
        reason: Option<String>,
    ) -> DecisionRecord {
        let record = DecisionRecord {
            envelope_id: envelope.id,
            source: envelope.source,
            signal: envelope.signal,
            resolution,
            reason,
            decided_at: Utc::now(),
        };
        info!(
            envelope_id = %record.envelope_id,
            source = %record.source,
            resolution = %record.resolution,
            "Deliverable resolved"
        );
        self.audit.push(record.clone());
        record
    }

    /// Resolutions in the order they were made
    pub fn audit_log(&self) -> &[DecisionRecord] {
        &self.audit
    }

    /// Whether an unresolved governance halt is pending for this agent.
    pub fn is_agent_blocked(&self, source: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.is_governance_halt() && e.source == source)
    }

    /// Agents with a pending halt, in queue order
    pub fn blocked_agents(&self) -> Vec<String> {
        let mut agents: Vec<String> = Vec::new();
        for envelope in self.entries.iter().filter(|e| e.is_governance_halt()) {
            if !agents.contains(&envelope.source) {
                agents.push(envelope.source.clone());
            }
        }
        agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_types::EnvelopeSignal;

    fn halt(source: &str) -> CtsEnvelope {
        let mut env = CtsEnvelope::governance_halt(source, Utc::now());
        env.id = format!("gov-{}", source);
        env
    }

    #[test]
    fn test_insertion_order_and_duplicates() {
        let mut queue = DeliverablesQueue::new();
        assert!(queue.enqueue(CtsEnvelope::artifact("b", "s", "x")));
        assert!(queue.enqueue(CtsEnvelope::artifact("a", "s", "x")));
        assert!(!queue.enqueue(CtsEnvelope::artifact("b", "s", "other")));
        let ids: Vec<_> = queue.list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(queue.get("b").unwrap().payload.content, "x");
    }

    #[test]
    fn test_acknowledge_artifact() {
        let mut queue = DeliverablesQueue::new();
        queue.enqueue(CtsEnvelope::artifact("a", "coder", "x"));
        let record = queue.acknowledge("a").unwrap();
        assert_eq!(record.resolution, Resolution::Acknowledged);
        assert!(queue.is_empty());
        assert_eq!(queue.audit_log().len(), 1);
    }

    #[test]
    fn test_halt_requires_decision() {
        let mut queue = DeliverablesQueue::new();
        queue.enqueue(halt("coder"));
        assert!(queue.is_agent_blocked("coder"));
        assert!(matches!(
            queue.acknowledge("gov-coder"),
            Err(ConsoleError::AcknowledgeRequiresDecision(_))
        ));
        assert_eq!(queue.count(), 1);

        let record = queue
            .decide("gov-coder", GovernanceDecision::ContinueWithout, Some("late".into()))
            .unwrap();
        assert_eq!(record.signal, EnvelopeSignal::GovernanceHalt);
        assert_eq!(record.reason.as_deref(), Some("late"));
        assert!(!queue.is_agent_blocked("coder"));
    }

    #[test]
    fn test_blocked_agents_are_unique() {
        let mut queue = DeliverablesQueue::new();
        queue.enqueue(halt("a"));
        queue.enqueue(CtsEnvelope::artifact("x", "b", "c"));
        let mut second = halt("a");
        second.id = "gov-a-2".into();
        queue.enqueue(second);
        assert_eq!(queue.blocked_agents(), vec!["a".to_string()]);
    }

    #[test]
    fn test_unknown_id() {
        let mut queue = DeliverablesQueue::new();
        assert!(queue.dequeue("nope").is_none());
        assert!(matches!(
            queue.decide("nope", GovernanceDecision::Approve, None),
            Err(ConsoleError::DeliverableNotFound(_))
        ));
        assert!(queue.audit_log().is_empty());
    }
}
