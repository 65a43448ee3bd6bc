//! The live tournament plus its snapshot store.
//!
//! A mutation counts as committed only once the snapshot holding it is on disk. Each one
//! runs against a copy of the aggregate; the copy replaces the live state after a
//! successful save, so a failed write leaves memory exactly as it was.

use crate::logic::{self, PairingPolicy};
use crate::models::{
    KnockoutSlot, MatchId, Score, Stage, TeamId, Tournament, TournamentError, TournamentState,
};
use crate::store::SnapshotStore;

pub struct TournamentSession {
    tournament: Tournament,
    store: SnapshotStore,
    policy: Box<dyn PairingPolicy + Send + Sync>,
}

impl TournamentSession {
    /// Start a session for a new tournament; writes the initial snapshot.
    pub fn create(
        tournament: Tournament,
        store: SnapshotStore,
        policy: Box<dyn PairingPolicy + Send + Sync>,
    ) -> Result<Self, TournamentError> {
        store.save(&tournament)?;
        Ok(Self {
            tournament,
            store,
            policy,
        })
    }

    /// Resume from the store's snapshot, if there is one.
    pub fn resume(
        store: SnapshotStore,
        policy: Box<dyn PairingPolicy + Send + Sync>,
    ) -> Result<Option<Self>, TournamentError> {
        Ok(store.load()?.map(|tournament| Self {
            tournament,
            store,
            policy,
        }))
    }

    /// Read-only view for reports and exports.
    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Apply `f` to a copy, persist the copy, then make it the live state.
    fn commit<T, F>(&mut self, f: F) -> Result<T, TournamentError>
    where
        F: FnOnce(&mut Tournament, &dyn PairingPolicy) -> Result<T, TournamentError>,
    {
        let mut next = self.tournament.clone();
        let out = f(&mut next, self.policy.as_ref())?;
        if let Err(e) = self.store.save(&next) {
            log::error!("Snapshot write failed, change discarded: {}", e);
            return Err(e);
        }
        self.tournament = next;
        Ok(out)
    }

    pub fn add_team(&mut self, group: &str, country: &str) -> Result<TeamId, TournamentError> {
        self.commit(|t, _| t.add_team(group, country))
    }

    pub fn remove_team(&mut self, id: &str) -> Result<(), TournamentError> {
        self.commit(|t, _| t.remove_team(id))
    }

    pub fn lock(&mut self) -> Result<(), TournamentError> {
        self.commit(|t, _| {
            t.lock();
            log::info!("Teams and groups locked");
            Ok(())
        })
    }

    /// Round-robin matches for groups without a schedule.
    pub fn schedule_round_robin(&mut self) -> Result<usize, TournamentError> {
        self.commit(|t, _| logic::schedule_round_robin(t))
    }

    pub fn record_score(&mut self, match_id: MatchId, score: Score) -> Result<(), TournamentError> {
        self.commit(|t, _| logic::record_score(t, match_id, score))
    }

    /// Record a score typed in as text; non-integers are rejected before anything changes.
    pub fn record_score_text(&mut self, match_id: MatchId, home: &str, away: &str) -> Result<(), TournamentError> {
        let score = Score::parse(home, away)?;
        self.record_score(match_id, score)
    }

    pub fn set_knockout_calendar(&mut self, slots: Vec<KnockoutSlot>) -> Result<(), TournamentError> {
        self.commit(|t, _| {
            t.knockout_calendar = slots;
            for stage in Stage::ALL.into_iter().filter(|s| s.is_knockout()) {
                t.apply_knockout_calendar(stage);
            }
            Ok(())
        })
    }

    pub fn advance(&mut self) -> Result<TournamentState, TournamentError> {
        self.commit(|t, policy| logic::advance(t, policy))
    }

    pub fn advance_with_override(&mut self, reason: &str) -> Result<TournamentState, TournamentError> {
        self.commit(|t, policy| logic::advance_with_override(t, policy, reason))
    }
}
