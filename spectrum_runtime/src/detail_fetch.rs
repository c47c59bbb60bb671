//! Issues the two per-selection retrievals on the tokio runtime.
//!
//! Nothing here cancels an in-flight request. Each outcome carries the
//! [`DetailRequest`] it answers and the [`ChartModel`] drops it if the
//! selection has since moved on, even back to the same entity.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use spectrum_core::{ChartModel, Commit, DetailRequest};
use spectrum_schema::{EntityId, MemberDetail, StatementEvidence};

use crate::api::{ApiClient, ApiError};

/// Source of per-entity evidence.
pub trait EvidenceSource: Send + Sync + 'static {
    fn member(&self, id: &EntityId) -> impl Future<Output = Result<MemberDetail, ApiError>> + Send;

    fn statements(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Vec<StatementEvidence>, ApiError>> + Send;
}

impl EvidenceSource for ApiClient {
    fn member(&self, id: &EntityId) -> impl Future<Output = Result<MemberDetail, ApiError>> + Send {
        ApiClient::member(self, id)
    }

    fn statements(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Vec<StatementEvidence>, ApiError>> + Send {
        ApiClient::statements(self, id)
    }
}

#[derive(Debug)]
pub enum DetailOutcome {
    Member {
        request: DetailRequest,
        result: Result<MemberDetail, ApiError>,
    },
    Statements {
        request: DetailRequest,
        result: Result<Vec<StatementEvidence>, ApiError>,
    },
}

impl DetailOutcome {
    pub fn request(&self) -> &DetailRequest {
        match self {
            DetailOutcome::Member { request, .. } | DetailOutcome::Statements { request, .. } => request,
        }
    }

    pub fn entity(&self) -> &EntityId {
        &self.request().entity
    }

    /// Hands the outcome to the chart, which discards it if stale.
    pub fn commit(self, chart: &mut ChartModel) -> Commit {
        let commit = match self {
            DetailOutcome::Member { request, result } => chart.complete_member(&request, result),
            DetailOutcome::Statements { request, result } => {
                chart.complete_statements(&request, result)
            }
        };
        trace!(target: "spectrum::detail", ?commit, "detail.outcome");
        commit
    }
}

/// Spawns both retrievals for `request`; each reports back independently.
pub fn spawn_detail_fetch<S: EvidenceSource>(
    source: Arc<S>,
    request: DetailRequest,
    sender: UnboundedSender<DetailOutcome>,
) -> [JoinHandle<()>; 2] {
    debug!(
        target: "spectrum::detail",
        entity = %request.entity,
        generation = request.generation,
        "detail.fetch.spawned"
    );

    let member = {
        let source = Arc::clone(&source);
        let sender = sender.clone();
        let request = request.clone();
        tokio::spawn(async move {
            let result = source.member(&request.entity).await;
            if sender.send(DetailOutcome::Member { request, result }).is_err() {
                trace!(target: "spectrum::detail", "detail receiver dropped");
            }
        })
    };

    let statements = tokio::spawn(async move {
        let result = source.statements(&request.entity).await;
        if sender
            .send(DetailOutcome::Statements { request, result })
            .is_err()
        {
            trace!(target: "spectrum::detail", "detail receiver dropped");
        }
    });

    [member, statements]
}
