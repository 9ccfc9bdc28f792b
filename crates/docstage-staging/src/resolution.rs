//! Collision-resolution state machine.
//!
//! A [`ResolutionSession`] walks the collision queue front to back, one user decision
//! at a time. Decisions are applied to a staged copy of the working collection; the
//! original is kept untouched so that cancelling at any decision boundary restores it
//! exactly.

use std::collections::VecDeque;

use docstage_core::models::{CandidateFile, CollisionRecord, ResolutionAction};

use crate::duplicates::{BatchPartition, FailedFile};
use crate::error::ResolutionError;
use crate::naming::unique_name_excluding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    /// Nothing to decide; pending files are staged directly
    Idle,
    AwaitingDecision {
        current: CollisionRecord,
        remaining: VecDeque<CollisionRecord>,
    },
    Resolved,
    Cancelled,
}

impl ResolutionState {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionState::Idle => "idle",
            ResolutionState::AwaitingDecision { .. } => "awaiting_decision",
            ResolutionState::Resolved => "resolved",
            ResolutionState::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug)]
pub struct ResolutionSession {
    /// Working collection as it was before resolution started
    baseline: Vec<CandidateFile>,
    /// Working collection with the decisions taken so far
    staged: Vec<CandidateFile>,
    /// Non-colliding files, added only when resolution completes
    pending: Vec<CandidateFile>,
    state: ResolutionState,
}

impl ResolutionSession {
    pub fn new(
        working: Vec<CandidateFile>,
        collisions: Vec<CollisionRecord>,
        pending: Vec<CandidateFile>,
    ) -> Self {
        let mut queue: VecDeque<_> = collisions.into();
        let mut staged = working.clone();

        let state = match queue.pop_front() {
            Some(current) => ResolutionState::AwaitingDecision {
                current,
                remaining: queue,
            },
            None => {
                staged.extend(pending.iter().cloned());
                ResolutionState::Idle
            }
        };

        Self {
            baseline: working,
            staged,
            pending,
            state,
        }
    }

    /// Start a session from a partitioned selection, handing back the files that
    /// could not be hashed so the caller can report them.
    pub fn from_partition(
        working: Vec<CandidateFile>,
        partition: BatchPartition,
    ) -> (Self, Vec<FailedFile>) {
        let BatchPartition {
            collisions,
            pending,
            failed,
        } = partition;
        (Self::new(working, collisions, pending), failed)
    }

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    /// Collision currently waiting for a decision
    pub fn current(&self) -> Option<&CollisionRecord> {
        match &self.state {
            ResolutionState::AwaitingDecision { current, .. } => Some(current),
            _ => None,
        }
    }

    /// Number of collisions still to decide, including the current one
    pub fn remaining(&self) -> usize {
        match &self.state {
            ResolutionState::AwaitingDecision { remaining, .. } => remaining.len() + 1,
            _ => 0,
        }
    }

    /// Working collection including the decisions applied so far
    pub fn working(&self) -> &[CandidateFile] {
        match self.state {
            ResolutionState::Cancelled => &self.baseline,
            _ => &self.staged,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, ResolutionState::AwaitingDecision { .. })
    }

    /// Apply `action` to the current collision and advance to the next one.
    pub fn resolve(
        &mut self,
        action: ResolutionAction,
    ) -> Result<&ResolutionState, ResolutionError> {
        let (current, mut remaining) =
            match std::mem::replace(&mut self.state, ResolutionState::Resolved) {
                ResolutionState::AwaitingDecision { current, remaining } => (current, remaining),
                other => {
                    let state = other.name();
                    self.state = other;
                    return Err(ResolutionError::NotAwaitingDecision { state });
                }
            };

        tracing::debug!(
            name = %current.new_file.name(),
            existing_index = current.existing_index,
            match_type = %current.match_type,
            action = %action,
            "Applying collision decision"
        );

        match action {
            ResolutionAction::Replace => match self.staged.get_mut(current.existing_index) {
                Some(slot) => *slot = current.new_file,
                None => {
                    let index = current.existing_index;
                    let len = self.staged.len();
                    self.state = ResolutionState::AwaitingDecision { current, remaining };
                    return Err(ResolutionError::StaleIndex { index, len });
                }
            },
            ResolutionAction::Reject => {}
            ResolutionAction::KeepBoth => {
                // Pending files join the collection on completion, so their names are taken too
                let taken = self.staged.iter().chain(&self.pending).map(|f| f.name());
                let name = unique_name_excluding(current.new_file.name(), taken);
                self.staged.push(current.new_file.renamed(name));
            }
        }

        self.state = match remaining.pop_front() {
            Some(next) => ResolutionState::AwaitingDecision {
                current: next,
                remaining,
            },
            None => {
                self.staged.append(&mut self.pending);
                ResolutionState::Resolved
            }
        };

        Ok(&self.state)
    }

    /// Apply the same action to every remaining collision, one at a time.
    pub fn resolve_all(
        &mut self,
        action: ResolutionAction,
    ) -> Result<&ResolutionState, ResolutionError> {
        if !matches!(self.state, ResolutionState::AwaitingDecision { .. }) {
            return Err(ResolutionError::NotAwaitingDecision {
                state: self.state.name(),
            });
        }
        while matches!(self.state, ResolutionState::AwaitingDecision { .. }) {
            self.resolve(action)?;
        }
        Ok(&self.state)
    }

    /// Abandon resolution; the working collection reverts to its original contents
    /// and pending files are dropped.
    pub fn cancel(&mut self) -> Result<(), ResolutionError> {
        if !matches!(self.state, ResolutionState::AwaitingDecision { .. }) {
            return Err(ResolutionError::NotAwaitingDecision {
                state: self.state.name(),
            });
        }

        tracing::debug!(remaining = self.remaining(), "Collision resolution cancelled");

        self.staged = self.baseline.clone();
        self.pending.clear();
        self.state = ResolutionState::Cancelled;
        Ok(())
    }

    /// The working collection to keep once no decision is outstanding.
    pub fn finish(self) -> Result<Vec<CandidateFile>, ResolutionError> {
        match self.state {
            ResolutionState::Idle | ResolutionState::Resolved => Ok(self.staged),
            ResolutionState::Cancelled => Ok(self.baseline),
            ResolutionState::AwaitingDecision { .. } => Err(ResolutionError::NotFinished {
                state: self.state.name(),
            }),
        }
    }
}
