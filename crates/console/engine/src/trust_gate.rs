//! Trust gate: decides whether an envelope is shown or held for review

use console_types::{ConsoleError, ConsoleResult, CtsEnvelope};
use serde::{Deserialize, Serialize};

/// Why an envelope was held back
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum InterceptReason {
    GovernanceHalt,
    /// No trust score was attached; unscored output is never trusted
    Unscored,
    BelowThreshold { score: f64, threshold: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Bypass,
    Intercept(InterceptReason),
}

impl GateDecision {
    pub fn is_bypass(&self) -> bool {
        matches!(self, Self::Bypass)
    }
}

/// Operator-adjustable trust threshold
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustPolicy {
    threshold: f64,
}

impl TrustPolicy {
    pub fn new(threshold: f64) -> ConsoleResult<Self> {
        check_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Replace the threshold, returning the previous value.
    pub fn set_threshold(&mut self, threshold: f64) -> ConsoleResult<f64> {
        check_threshold(threshold)?;
        Ok(std::mem::replace(&mut self.threshold, threshold))
    }
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self { threshold: 0.8 }
    }
}

fn check_threshold(threshold: f64) -> ConsoleResult<()> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ConsoleError::InvalidThreshold(threshold))
    }
}

/// Applies a [`TrustPolicy`] to envelopes.
///
/// The threshold is read on every call so runtime adjustments take effect
/// on the next decision.
#[derive(Clone, Debug, Default)]
pub struct TrustGate {
    policy: TrustPolicy,
}

impl TrustGate {
    pub fn new(policy: TrustPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut TrustPolicy {
        &mut self.policy
    }

    pub fn evaluate(&self, envelope: &CtsEnvelope) -> GateDecision {
        Self::decide(envelope, self.policy.threshold())
    }

    pub fn decide(envelope: &CtsEnvelope, threshold: f64) -> GateDecision {
        if envelope.is_governance_halt() {
            return GateDecision::Intercept(InterceptReason::GovernanceHalt);
        }
        match envelope.trust_score {
            None => GateDecision::Intercept(InterceptReason::Unscored),
            Some(score) if score >= threshold => GateDecision::Bypass,
            Some(score) => GateDecision::Intercept(InterceptReason::BelowThreshold { score, threshold }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_scored_artifacts() {
        let high = CtsEnvelope::artifact("a1", "coder", "x").with_trust_score(0.92);
        let low = CtsEnvelope::artifact("a2", "coder", "x").with_trust_score(0.3);
        assert_eq!(TrustGate::decide(&high, 0.8), GateDecision::Bypass);
        assert!(matches!(
            TrustGate::decide(&low, 0.8),
            GateDecision::Intercept(InterceptReason::BelowThreshold { .. })
        ));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let env = CtsEnvelope::artifact("a", "s", "c").with_trust_score(0.8);
        assert!(TrustGate::decide(&env, 0.8).is_bypass());
    }

    #[test]
    fn test_fail_closed() {
        let env = CtsEnvelope::artifact("a", "s", "c");
        assert_eq!(
            TrustGate::decide(&env, 0.0),
            GateDecision::Intercept(InterceptReason::Unscored)
        );
        let halt = CtsEnvelope::governance_halt("s", Utc::now()).with_trust_score(1.0);
        assert_eq!(
            TrustGate::decide(&halt, 0.0),
            GateDecision::Intercept(InterceptReason::GovernanceHalt)
        );
    }

    #[test]
    fn test_threshold_read_at_decision_time() {
        let env = CtsEnvelope::artifact("a", "s", "c").with_trust_score(0.6);
        let mut gate = TrustGate::default();
        assert!(!gate.evaluate(&env).is_bypass());
        let previous = gate.policy_mut().set_threshold(0.5).unwrap();
        assert_eq!(previous, 0.8);
        assert!(gate.evaluate(&env).is_bypass());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut policy = TrustPolicy::default();
        assert!(policy.set_threshold(1.2).is_err());
        assert!(policy.set_threshold(f64::NAN).is_err());
        assert_eq!(policy.threshold(), 0.8);
        assert!(TrustPolicy::new(-0.1).is_err());
    }
}
