//! Knockout bracket: first-round pairings from the qualifier pools.
//!
//! Which qualifier meets which is a regulation input, supplied as a [`PairingPolicy`].
//! Whatever the policy leaves unresolved is paired sequentially in registry order and
//! flagged with [`MatchOrigin::Fallback`].

use crate::logic::group_play::Standing;
use crate::logic::qualifiers::{select_qualifiers, Qualifiers};
use crate::models::{GameMatch, MatchId, MatchOrigin, Stage, TeamId, Tournament, TournamentError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Teams in the first knockout round.
pub const BRACKET_SIZE: usize = 16;

/// A qualifier position.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Winner of the given group.
    Winner(String),
    /// Runner-up of the given group.
    RunnerUp(String),
    /// n-th best third-placed team (0 = best).
    Third(usize),
}

impl Slot {
    pub fn winner(group: impl Into<String>) -> Self {
        Slot::Winner(group.into())
    }

    pub fn runner_up(group: impl Into<String>) -> Self {
        Slot::RunnerUp(group.into())
    }

    /// The qualifier in this slot, if the pools have one.
    pub fn resolve<'q>(&self, qualifiers: &'q Qualifiers) -> Option<&'q Standing> {
        match self {
            Slot::Winner(group) => qualifiers.winners.iter().find(|s| &s.group == group),
            Slot::RunnerUp(group) => qualifiers.runners_up.iter().find(|s| &s.group == group),
            Slot::Third(rank) => qualifiers.best_thirds.get(*rank),
        }
    }
}

/// Maps qualifier slots to first-round pairings.
pub trait PairingPolicy {
    fn pairings(&self, qualifiers: &Qualifiers) -> Vec<(Slot, Slot)>;
}

impl<F> PairingPolicy for F
where
    F: Fn(&Qualifiers) -> Vec<(Slot, Slot)>,
{
    fn pairings(&self, qualifiers: &Qualifiers) -> Vec<(Slot, Slot)> {
        self(qualifiers)
    }
}

/// A fixed slot table, e.g. loaded from a regulation file.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SlotTable {
    pub pairs: Vec<(Slot, Slot)>,
}

impl SlotTable {
    pub fn new(pairs: Vec<(Slot, Slot)>) -> Self {
        Self { pairs }
    }

    /// Six groups A-F: 1A-3rd#1, 1B-3rd#2, 1C-3rd#3, 1D-3rd#4, 1E-2F, 1F-2E, 2A-2C, 2B-2D.
    ///
    /// Not any competition's official mapping.
    pub fn six_groups() -> Self {
        Self::new(vec![
            (Slot::winner("A"), Slot::Third(0)),
            (Slot::winner("B"), Slot::Third(1)),
            (Slot::winner("C"), Slot::Third(2)),
            (Slot::winner("D"), Slot::Third(3)),
            (Slot::winner("E"), Slot::runner_up("F")),
            (Slot::winner("F"), Slot::runner_up("E")),
            (Slot::runner_up("A"), Slot::runner_up("C")),
            (Slot::runner_up("B"), Slot::runner_up("D")),
        ])
    }

    /// Read a table from JSON, e.g. `{"pairs": [[{"winner": "A"}, {"third": 0}], ...]}`.
    pub fn load(path: &std::path::Path) -> Result<Self, TournamentError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl PairingPolicy for SlotTable {
    fn pairings(&self, _qualifiers: &Qualifiers) -> Vec<(Slot, Slot)> {
        self.pairs.clone()
    }
}

/// One planned first-round match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Pairing {
    pub home: TeamId,
    pub away: TeamId,
    /// `Policy` or `Fallback`.
    pub origin: MatchOrigin,
}

/// Plan the first round over exactly the qualified teams. With an odd number of
/// qualifiers the last one in registry order is left unpaired.
pub fn plan_bracket(
    tournament: &Tournament,
    qualifiers: &Qualifiers,
    policy: &dyn PairingPolicy,
) -> Vec<Pairing> {
    let mut used: HashSet<TeamId> = HashSet::new();
    let mut plan: Vec<Pairing> = Vec::new();

    for (a, b) in policy.pairings(qualifiers) {
        let (Some(home), Some(away)) = (a.resolve(qualifiers), b.resolve(qualifiers)) else {
            log::warn!("Pairing policy slot {:?} vs {:?} has no team", a, b);
            continue;
        };
        if home.team_id == away.team_id || used.contains(&home.team_id) || used.contains(&away.team_id) {
            log::warn!("Pairing policy reuses a team in {:?} vs {:?}; skipped", a, b);
            continue;
        }
        used.insert(home.team_id.clone());
        used.insert(away.team_id.clone());
        plan.push(Pairing {
            home: home.team_id.clone(),
            away: away.team_id.clone(),
            origin: MatchOrigin::Policy,
        });
    }

    let leftovers: Vec<&TeamId> = tournament
        .teams
        .iter()
        .map(|t| &t.id)
        .filter(|id| qualifiers.contains(id) && !used.contains(*id))
        .collect();
    for pair in leftovers.chunks_exact(2) {
        log::warn!("Fallback pairing {} vs {}", pair[0], pair[1]);
        plan.push(Pairing {
            home: pair[0].clone(),
            away: pair[1].clone(),
            origin: MatchOrigin::Fallback,
        });
    }
    plan
}

/// Create the Round of 16 matches from the current group standings.
///
/// A qualifier count other than [`BRACKET_SIZE`] is not an error: every qualifier is
/// paired (policy first, then fallback) and an odd one out gets a bye. Fails only if
/// fewer than two teams qualified or if the round already exists.
pub fn generate_bracket(
    tournament: &mut Tournament,
    policy: &dyn PairingPolicy,
) -> Result<Vec<MatchId>, TournamentError> {
    if tournament.matches_in(Stage::RoundOf16).next().is_some() {
        return Err(TournamentError::InvalidState);
    }
    let qualifiers = select_qualifiers(tournament);
    if qualifiers.len() < 2 {
        return Err(TournamentError::NotEnoughQualifiers(qualifiers.len()));
    }
    if qualifiers.len() != BRACKET_SIZE {
        log::warn!(
            "{} qualified team(s) instead of {}; bracket completed by fallback",
            qualifiers.len(),
            BRACKET_SIZE
        );
    }

    let plan = plan_bracket(tournament, &qualifiers, policy);
    let paired: HashSet<&TeamId> = plan.iter().flat_map(|p| [&p.home, &p.away]).collect();
    let odd_one: Option<TeamId> = tournament
        .teams
        .iter()
        .map(|t| &t.id)
        .find(|id| qualifiers.contains(id) && !paired.contains(id))
        .cloned();

    let mut ids = Vec::with_capacity(plan.len() + 1);
    for p in plan {
        let m = GameMatch::new(p.home, p.away, Stage::RoundOf16, p.origin);
        ids.push(m.id);
        tournament.push_match(m)?;
    }
    if let Some(home) = odd_one {
        let bye = tournament.add_bye();
        log::warn!("{} has no opponent in {}; gets a bye", home, Stage::RoundOf16);
        let m = GameMatch::new(home, bye, Stage::RoundOf16, MatchOrigin::Bye);
        ids.push(m.id);
        tournament.push_match(m)?;
    }
    tournament.apply_knockout_calendar(Stage::RoundOf16);
    log::info!("Generated {} Round of 16 match(es)", ids.len());
    Ok(ids)
}
