//! Data structures for the tournament: teams, matches, tournament state.

mod game;
mod team;
mod tournament;

pub use game::{GameMatch, MatchId, MatchOrigin, Score, Stage};
pub use team::{Team, TeamId, TeamStats, POINTS_DRAW, POINTS_WIN};
pub use tournament::{
    KnockoutSlot, OverrideRecord, Tournament, TournamentError, TournamentId, TournamentState,
};
