//! Carrying out wizard launch plans

use std::sync::Arc;

use async_trait::async_trait;
use console_types::{ApprovalRequest, LaunchDirective, LaunchPlan, MissionBlueprint, MissionId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{IngestError, IngestResult, TransportError};

/// Downstream collaborator that starts missions and records proposals.
#[async_trait]
pub trait ProposalSink: Send + Sync {
    /// Start a mission immediately. Returns the id of the created run.
    async fn start_mission(&self, blueprint: &MissionBlueprint) -> Result<String, TransportError>;

    /// Submit a proposal for approval. Returns the id of the created proposal.
    async fn submit_proposal(&self, request: &ApprovalRequest) -> Result<String, TransportError>;
}

/// What a successful launch created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LaunchReceipt {
    Started {
        mission_id: MissionId,
        run_id: String,
    },
    Proposed {
        mission_id: MissionId,
        approval_id: String,
        proposal_id: String,
    },
}

impl LaunchReceipt {
    pub fn mission_id(&self) -> &MissionId {
        match self {
            Self::Started { mission_id, .. } | Self::Proposed { mission_id, .. } => mission_id,
        }
    }
}

pub struct LaunchExecutor {
    sink: Arc<dyn ProposalSink>,
}

impl LaunchExecutor {
    pub fn new(sink: Arc<dyn ProposalSink>) -> Self {
        Self { sink }
    }

    /// Execute a launch plan.
    ///
    /// Failures are not retried here. They come back classified so the
    /// operator can choose a remediation.
    #[instrument(skip(self, plan), fields(mission_id = %plan.blueprint.mission_id))]
    pub async fn execute(&self, plan: &LaunchPlan) -> IngestResult<LaunchReceipt> {
        let mission_id = plan.blueprint.mission_id.clone();
        let result = match &plan.directive {
            LaunchDirective::StartMission => self
                .sink
                .start_mission(&plan.blueprint)
                .await
                .map(|run_id| LaunchReceipt::Started {
                    mission_id: mission_id.clone(),
                    run_id,
                }),
            LaunchDirective::RequestApproval(request) => self
                .sink
                .submit_proposal(request)
                .await
                .map(|proposal_id| LaunchReceipt::Proposed {
                    mission_id: mission_id.clone(),
                    approval_id: request.id.clone(),
                    proposal_id,
                }),
        };

        match result {
            Ok(receipt) => {
                info!(receipt = ?receipt, "Launch submitted");
                Ok(receipt)
            }
            Err(e) => {
                let kind = e.classify();
                warn!(
                    failure = %kind,
                    remediation = ?kind.remediation(),
                    error = %e,
                    "Launch submission failed"
                );
                Err(IngestError::LaunchFailed { kind, source: e })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_types::{FailureKind, LaunchMode, Remediation, Surface};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
        fail_with: Option<TransportError>,
    }

    #[async_trait]
    impl ProposalSink for RecordingSink {
        async fn start_mission(&self, blueprint: &MissionBlueprint) -> Result<String, TransportError> {
            self.calls.lock().unwrap().push(format!("start:{}", blueprint.mission_id));
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok("run-1".into()),
            }
        }

        async fn submit_proposal(&self, request: &ApprovalRequest) -> Result<String, TransportError> {
            self.calls.lock().unwrap().push(format!("propose:{}", request.id));
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok("proposal-1".into()),
            }
        }
    }

    fn plan(mode: LaunchMode) -> LaunchPlan {
        let blueprint = MissionBlueprint::new("mission-42", "Reduce p99 latency");
        let (directive, focus) = match mode {
            LaunchMode::LaunchNow => (LaunchDirective::StartMission, Surface::Teams),
            LaunchMode::ProposeOnly => (
                LaunchDirective::RequestApproval(ApprovalRequest::new(
                    blueprint.mission_id.clone(),
                    "Reduce p99 latency",
                    "delivery-team",
                    vec!["swarm.runs.*".into()],
                )),
                Surface::Approvals,
            ),
        };
        LaunchPlan {
            mode,
            blueprint,
            profile_id: "delivery-team".into(),
            routes: vec!["swarm.runs.*".into()],
            directive,
            focus,
            forced: None,
        }
    }

    #[tokio::test]
    async fn test_launch_now_starts_mission() {
        let sink = Arc::new(RecordingSink::default());
        let executor = LaunchExecutor::new(sink.clone());
        let receipt = executor.execute(&plan(LaunchMode::LaunchNow)).await.unwrap();

        assert_eq!(
            receipt,
            LaunchReceipt::Started {
                mission_id: MissionId::new("mission-42"),
                run_id: "run-1".into()
            }
        );
        assert_eq!(*sink.calls.lock().unwrap(), vec!["start:mission-42"]);
    }

    #[tokio::test]
    async fn test_propose_only_submits_proposal() {
        let sink = Arc::new(RecordingSink::default());
        let executor = LaunchExecutor::new(sink.clone());
        let receipt = executor.execute(&plan(LaunchMode::ProposeOnly)).await.unwrap();

        assert_eq!(receipt.mission_id(), &MissionId::new("mission-42"));
        match &receipt {
            LaunchReceipt::Proposed { approval_id, .. } => {
                assert_eq!(approval_id, "approval-mission-42")
            }
            other => panic!("unexpected receipt {:?}", other),
        }
        assert_eq!(*sink.calls.lock().unwrap(), vec!["propose:approval-mission-42"]);
    }

    #[tokio::test]
    async fn test_failure_is_classified() {
        let sink = Arc::new(RecordingSink {
            fail_with: Some(TransportError::Status {
                status: 503,
                message: "Service Unavailable".into(),
            }),
            ..RecordingSink::default()
        });
        let executor = LaunchExecutor::new(sink);
        let err = executor.execute(&plan(LaunchMode::LaunchNow)).await.unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::ServerError));
        assert_eq!(
            FailureKind::ServerError.remediation(),
            Remediation::ContinueDegraded
        );
    }
}
