//! Team instantiation wizard
//!
//! A four-step, forward-only state machine:
//! Objective → ProfileSelection → ReadinessCheck → LaunchReview.
//! Each forward transition has a guard. `reset` returns to Objective
//! from anywhere, and both terminal launch actions reset on completion.
//!
//! Readiness arrives asynchronously. [`ReadinessTicket`]s carry the
//! wizard epoch so a result that lands after a reset, or after a newer
//! check was started, is recognised as stale and dropped.

use chrono::Utc;
use console_types::{
    ApprovalRequest, BlueprintTeam, ConsoleError, ConsoleResult, ForcedTransition, LaunchDirective,
    LaunchMode, LaunchPlan, MissionBlueprint, MissionId, ProfileCatalog, ReadinessReport,
    ReadinessSnapshot, Surface, TeamProfile, WizardStep,
};
use tracing::{info, warn};

use crate::readiness::ReadinessAggregator;
use crate::route_templates::RouteTemplateEngine;

/// Handle for one in-flight readiness check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadinessTicket {
    epoch: u64,
    check: u64,
}

impl ReadinessTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReadinessOutcome {
    Applied(ReadinessReport),
    /// The wizard moved on since the check was issued
    Stale,
}

#[derive(Debug)]
pub struct TeamInstantiationWizard {
    catalog: ProfileCatalog,
    step: WizardStep,
    objective: String,
    profile: Option<TeamProfile>,
    routes: RouteTemplateEngine,
    readiness: Option<ReadinessReport>,
    forced: Option<ForcedTransition>,
    epoch: u64,
    checks_issued: u64,
}

impl Default for TeamInstantiationWizard {
    fn default() -> Self {
        Self::new(ProfileCatalog::builtin())
    }
}

impl TeamInstantiationWizard {
    pub fn new(catalog: ProfileCatalog) -> Self {
        Self {
            catalog,
            step: WizardStep::Objective,
            objective: String::new(),
            profile: None,
            routes: RouteTemplateEngine::default(),
            readiness: None,
            forced: None,
            epoch: 0,
            checks_issued: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn selected_profile(&self) -> Option<&TeamProfile> {
        self.profile.as_ref()
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn readiness(&self) -> Option<&ReadinessReport> {
        self.readiness.as_ref()
    }

    pub fn forced_transition(&self) -> Option<&ForcedTransition> {
        self.forced.as_ref()
    }

    pub fn routes(&self) -> &RouteTemplateEngine {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut RouteTemplateEngine {
        &mut self.routes
    }

    /// Incremented on every reset
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the guard for the current step passes
    pub fn can_continue(&self) -> bool {
        self.guard().is_ok()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_objective(&mut self, text: impl Into<String>) -> ConsoleResult<()> {
        self.expect_step(WizardStep::Objective)?;
        self.objective = text.into();
        Ok(())
    }

    /// Select a profile and seed the route list with its suggested routes.
    pub fn select_profile(&mut self, profile_id: &str) -> ConsoleResult<&TeamProfile> {
        self.expect_step(WizardStep::ProfileSelection)?;
        let profile = self
            .catalog
            .get(profile_id)
            .cloned()
            .ok_or_else(|| ConsoleError::ProfileNotFound(profile_id.to_string()))?;
        self.routes.reseed(profile.suggested_routes.clone());
        let selected = self.profile.insert(profile);
        Ok(&*selected)
    }

    /// Take one guarded step forward.
    pub fn advance(&mut self) -> ConsoleResult<WizardStep> {
        self.guard()?;
        let next = self.step.next().ok_or_else(|| ConsoleError::GuardNotSatisfied {
            step: self.step,
            reason: "already at the final step".to_string(),
        })?;
        info!(from = %self.step, to = %next, "Wizard advanced");
        self.step = next;
        Ok(next)
    }

    fn guard(&self) -> ConsoleResult<()> {
        let unsatisfied = |reason: &str| ConsoleError::GuardNotSatisfied {
            step: self.step,
            reason: reason.to_string(),
        };
        match self.step {
            WizardStep::Objective if self.objective.trim().is_empty() => {
                Err(unsatisfied("objective is empty"))
            }
            WizardStep::ProfileSelection if self.profile.is_none() => {
                Err(unsatisfied("no profile selected"))
            }
            WizardStep::ReadinessCheck => match &self.readiness {
                None => Err(unsatisfied("readiness has not been checked")),
                Some(report) if !report.ready => {
                    Err(unsatisfied(report.blockers.join("; ").as_str()))
                }
                Some(_) => Ok(()),
            },
            WizardStep::LaunchReview => Err(unsatisfied("already at the final step")),
            _ => Ok(()),
        }
    }

    /// Start a readiness check. Any earlier ticket becomes stale.
    pub fn begin_readiness_check(&mut self) -> ConsoleResult<ReadinessTicket> {
        self.expect_step(WizardStep::ReadinessCheck)?;
        self.checks_issued += 1;
        Ok(ReadinessTicket {
            epoch: self.epoch,
            check: self.checks_issued,
        })
    }

    /// Apply the result of a readiness check if it is still current.
    pub fn resolve_readiness(
        &mut self,
        ticket: ReadinessTicket,
        snapshot: &ReadinessSnapshot,
    ) -> ReadinessOutcome {
        let current = ticket.epoch == self.epoch
            && ticket.check == self.checks_issued
            && self.step == WizardStep::ReadinessCheck;
        if !current {
            warn!(
                ticket_epoch = ticket.epoch,
                wizard_epoch = self.epoch,
                step = %self.step,
                "Discarding stale readiness result"
            );
            return ReadinessOutcome::Stale;
        }
        let report = ReadinessAggregator::aggregate(snapshot);
        info!(ready = report.ready, blockers = report.blockers.len(), "Readiness resolved");
        self.readiness = Some(report.clone());
        ReadinessOutcome::Applied(report)
    }

    /// Continue past a failed readiness gate, recording the override.
    /// Passed readiness is not overridable; use [`Self::advance`].
    pub fn force_advance(&mut self, reason: impl Into<String>) -> ConsoleResult<ForcedTransition> {
        self.expect_step(WizardStep::ReadinessCheck)?;
        if self.readiness.as_ref().is_some_and(|r| r.ready) {
            return Err(ConsoleError::GuardNotSatisfied {
                step: self.step,
                reason: "readiness passed; advance instead of forcing".to_string(),
            });
        }
        let blockers = match &self.readiness {
            Some(report) => report.blockers.clone(),
            None => vec!["Readiness was not checked".to_string()],
        };
        let transition = ForcedTransition {
            from: self.step,
            blockers,
            reason: reason.into(),
            forced_at: Utc::now(),
        };
        warn!(
            reason = %transition.reason,
            blockers = ?transition.blockers,
            "Readiness gate overridden by operator"
        );
        self.forced = Some(transition.clone());
        self.step = WizardStep::LaunchReview;
        Ok(transition)
    }

    /// Perform a terminal action and reset the wizard.
    pub fn launch(&mut self, mode: LaunchMode) -> ConsoleResult<LaunchPlan> {
        self.expect_step(WizardStep::LaunchReview)?;
        let profile = self
            .profile
            .clone()
            .ok_or_else(|| ConsoleError::LaunchBlocked("no profile selected".to_string()))?;

        if mode == LaunchMode::LaunchNow {
            if self.forced.is_some() {
                return Err(ConsoleError::LaunchBlocked(
                    "readiness was overridden; use propose-only".to_string(),
                ));
            }
            if !self.readiness.as_ref().is_some_and(|r| r.ready) {
                return Err(ConsoleError::LaunchBlocked("readiness has not passed".to_string()));
            }
        }

        let routes = self.routes.subjects().to_vec();
        let objective = self.objective.trim().to_string();
        let blueprint = MissionBlueprint::new(MissionId::generate(), objective.clone())
            .with_team(BlueprintTeam::new(profile.name.clone(), profile.id.clone()));

        let (directive, focus) = match mode {
            LaunchMode::LaunchNow => (LaunchDirective::StartMission, Surface::Teams),
            LaunchMode::ProposeOnly => {
                let mut request = ApprovalRequest::new(
                    blueprint.mission_id.clone(),
                    objective,
                    profile.id.clone(),
                    routes.clone(),
                );
                request.forced = self.forced.is_some();
                request.blockers = match (&self.forced, &self.readiness) {
                    (Some(forced), _) => forced.blockers.clone(),
                    (None, Some(report)) => report.blockers.clone(),
                    (None, None) => Vec::new(),
                };
                (LaunchDirective::RequestApproval(request), Surface::Approvals)
            }
        };

        let plan = LaunchPlan {
            mode,
            blueprint,
            profile_id: profile.id,
            routes,
            directive,
            focus,
            forced: self.forced.clone(),
        };
        info!(
            mission_id = %plan.blueprint.mission_id,
            mode = ?plan.mode,
            profile = %plan.profile_id,
            "Launch planned"
        );
        self.reset();
        Ok(plan)
    }

    /// Return to Objective and invalidate in-flight readiness checks.
    pub fn reset(&mut self) {
        self.step = WizardStep::Objective;
        self.objective.clear();
        self.profile = None;
        self.readiness = None;
        self.forced = None;
        self.routes.reseed(Vec::new());
        self.epoch += 1;
    }

    fn expect_step(&self, expected: WizardStep) -> ConsoleResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ConsoleError::InvalidStep {
                expected,
                actual: self.step,
            })
        }
    }
}
