//! Per-selection evidence state.
//!
//! Selecting an entity opens a fresh [`DetailRecord`] with both evidence
//! collections loading. Each retrieval completes independently; a completion
//! whose entity no longer matches the selection is discarded, and a failed
//! retrieval degrades to an empty collection without surfacing an error.

use std::fmt::Display;

use tracing::{debug, warn};

use spectrum_schema::{
    Category, Chamber, EntityId, MemberDetail, StatementEvidence, VoteEvidence,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSlot<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
}

impl<T> EvidenceSlot<T> {
    fn loading() -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
        }
    }

    fn resolve(&mut self, items: Vec<T>) {
        self.items = items;
        self.is_loading = false;
    }

    /// Finished loading with nothing to show.
    pub fn is_empty_state(&self) -> bool {
        !self.is_loading && self.items.is_empty()
    }
}

/// Identity fields from the member-detail response.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSummary {
    pub name: String,
    pub party: Category,
    pub state: String,
    pub chamber: Option<Chamber>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub entity: EntityId,
    /// Generation of the request that opened this record.
    pub generation: u64,
    pub member: Option<MemberSummary>,
    pub votes: EvidenceSlot<VoteEvidence>,
    pub statements: EvidenceSlot<StatementEvidence>,
}

impl DetailRecord {
    fn loading(entity: EntityId, generation: u64) -> Self {
        Self {
            entity,
            generation,
            member: None,
            votes: EvidenceSlot::loading(),
            statements: EvidenceSlot::loading(),
        }
    }
}

/// The two retrievals to issue for a new selection.
///
/// `generation` grows with every request, so reselecting an entity never
/// accepts responses issued for an earlier selection of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub entity: EntityId,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    /// Failure recovered as an empty collection.
    Degraded,
    /// The selection moved on; the response was dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct DetailLoader {
    record: Option<DetailRecord>,
    generation: u64,
}

impl DetailLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DetailRecord> {
        self.record.as_ref()
    }

    /// Supersedes the current record. Returns `None` when `entity` is already shown.
    pub fn select(&mut self, entity: EntityId) -> Option<DetailRequest> {
        if self.record.as_ref().is_some_and(|record| record.entity == entity) {
            return None;
        }
        self.generation += 1;
        let generation = self.generation;
        debug!(target: "spectrum::detail", entity = %entity, generation, "detail.requested");
        self.record = Some(DetailRecord::loading(entity.clone(), generation));
        Some(DetailRequest { entity, generation })
    }

    pub fn close(&mut self) {
        if let Some(record) = self.record.take() {
            debug!(target: "spectrum::detail", entity = %record.entity, "detail.closed");
        }
    }

    /// Commits the member-detail retrieval (header and vote evidence).
    pub fn complete_member<E: Display>(
        &mut self,
        requested: &DetailRequest,
        result: Result<MemberDetail, E>,
    ) -> Commit {
        let Some(record) = self.matching_record(requested, "member") else {
            return Commit::Stale;
        };
        match result {
            Ok(detail) => {
                record.member = Some(MemberSummary {
                    name: detail.name,
                    party: detail.party,
                    state: detail.state,
                    chamber: detail.chamber,
                });
                record.votes.resolve(detail.evidence.votes);
                Commit::Applied
            }
            Err(err) => {
                warn!(
                    target: "spectrum::detail",
                    entity = %requested.entity,
                    error = %err,
                    "member detail fetch failed; showing empty votes"
                );
                record.votes.resolve(Vec::new());
                Commit::Degraded
            }
        }
    }

    pub fn complete_statements<E: Display>(
        &mut self,
        requested: &DetailRequest,
        result: Result<Vec<StatementEvidence>, E>,
    ) -> Commit {
        let Some(record) = self.matching_record(requested, "statements") else {
            return Commit::Stale;
        };
        match result {
            Ok(statements) => {
                record.statements.resolve(statements);
                Commit::Applied
            }
            Err(err) => {
                warn!(
                    target: "spectrum::detail",
                    entity = %requested.entity,
                    error = %err,
                    "statements fetch failed; showing empty statements"
                );
                record.statements.resolve(Vec::new());
                Commit::Degraded
            }
        }
    }

    /// The open record, if it was opened by `requested`.
    fn matching_record(&mut self, requested: &DetailRequest, kind: &str) -> Option<&mut DetailRecord> {
        match self.record.as_mut() {
            Some(record)
                if record.entity == requested.entity && record.generation == requested.generation =>
            {
                Some(record)
            }
            current => {
                debug!(
                    target: "spectrum::detail",
                    requested = %requested.entity,
                    generation = requested.generation,
                    current = ?current.map(|record| (record.entity.as_str(), record.generation)),
                    kind,
                    "discarding stale detail response"
                );
                None
            }
        }
    }
}
