//! The match engine: candidate loading, swipe recording, mutual-like
//! detection and match creation, plus the local swipe-session cursor.

use crate::common::models::{Profile, Swipe, UserRole};
use crate::store::Store;
use chrono::Utc;

/// Local cursor over the fetched candidate sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SwipePhase {
    #[default]
    Loading,
    Ready(usize),
    Exhausted,
}

/// One swipe session: the fetched candidates, the cursor and the transient
/// match-found overlay.
#[derive(Debug, Clone, Default)]
pub struct SwipeSession {
    pub candidates: Vec<Profile>,
    pub phase: SwipePhase,
    pub match_found: Option<Profile>,
}

impl SwipeSession {
    pub fn with_candidates(candidates: Vec<Profile>) -> Self {
        let phase = if candidates.is_empty() {
            SwipePhase::Exhausted
        } else {
            SwipePhase::Ready(0)
        };
        Self {
            candidates,
            phase,
            match_found: None,
        }
    }

    pub fn current(&self) -> Option<&Profile> {
        match self.phase {
            SwipePhase::Ready(cursor) => self.candidates.get(cursor),
            _ => None,
        }
    }

    /// Moves to the next candidate; exhaustion is an explicit terminal state
    /// that only a reload leaves.
    pub fn advance_cursor(&mut self) {
        if let SwipePhase::Ready(cursor) = self.phase {
            if cursor + 1 < self.candidates.len() {
                self.phase = SwipePhase::Ready(cursor + 1);
            } else {
                self.phase = SwipePhase::Exhausted;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchService {
    store: Store,
}

impl MatchService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Candidates for `self_id`: every profile except the caller's own, any
    /// profile sharing the caller's role, and anything already swiped
    /// (like or pass). Ordered by id for reproducibility. A fetch failure is
    /// logged and yields an empty list rather than propagating.
    pub async fn load_candidates(&self, role: UserRole, self_id: &str) -> Vec<Profile> {
        let profiles = match self.store.list_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                log::error!("candidate fetch failed: {}", e);
                return Vec::new();
            }
        };
        let swiped: Vec<String> = match self.store.swipes_from(self_id).await {
            Ok(swipes) => swipes.into_iter().map(|s| s.to_user_id).collect(),
            Err(e) => {
                log::error!("swipe fetch failed: {}", e);
                return Vec::new();
            }
        };

        profiles
            .into_iter()
            .filter(|p| p.id != self_id)
            .filter(|p| p.role != role)
            .filter(|p| !swiped.contains(&p.id))
            .collect()
    }

    /// Persists the swipe and, for likes, runs the mutual-like check and
    /// conditionally creates the match.
    ///
    /// Returns the newly created match's participant id (`target_id`) as
    /// `true` when a match was created by this swipe. A swipe-write failure
    /// propagates so the caller can keep the cursor in place; failures in
    /// the match check or match insert are absorbed here, since the swipe
    /// itself is already recorded.
    pub async fn record_swipe(
        &self,
        self_id: &str,
        target_id: &str,
        liked: bool,
    ) -> anyhow::Result<bool> {
        let swipe = Swipe {
            from_user_id: self_id.to_string(),
            to_user_id: target_id.to_string(),
            liked,
            timestamp: Utc::now(),
        };
        self.store.upsert_swipe(&swipe).await?;

        if !liked {
            return Ok(false);
        }
        match self.check_mutual_like(self_id, target_id).await {
            Ok(true) => self.create_match(self_id, target_id).await,
            Ok(false) => Ok(false),
            Err(e) => {
                log::error!("mutual-like check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// True iff the target previously liked the caller.
    pub async fn check_mutual_like(&self, self_id: &str, target_id: &str) -> anyhow::Result<bool> {
        self.store.liked_swipe_exists(target_id, self_id).await
    }

    /// Creates the match for the pair unless it already exists. Returns
    /// whether a new match record came into being.
    pub async fn create_match(&self, self_id: &str, other_id: &str) -> anyhow::Result<bool> {
        match self.store.insert_match(self_id, other_id).await {
            Ok(Some(_)) => {
                log::info!("match created: {} <-> {}", self_id, other_id);
                Ok(true)
            }
            Ok(None) => {
                log::debug!("pair already matched: {} <-> {}", self_id, other_id);
                Ok(false)
            }
            Err(e) => {
                log::error!("match insert failed: {}", e);
                Ok(false)
            }
        }
    }
}
