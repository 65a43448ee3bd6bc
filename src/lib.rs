//! Tournament tracker: group stage standings, qualifiers, knockout bracket and stage
//! progression, with CSV import/export and an atomically written JSON snapshot.

pub mod config;
pub mod export;
pub mod import;
pub mod logic;
pub mod models;
pub mod session;
pub mod store;

pub use config::Config;
pub use logic::{
    advance, advance_with_override, all_standings, champion, draw_groups, generate_bracket,
    group_standings, pending_matches, plan_bracket, recompute_stats, record_score,
    round_robin, schedule_round_robin, select_qualifiers, PairingPolicy, Qualifiers, Slot,
    SlotTable, Standing,
};
pub use models::{
    GameMatch, KnockoutSlot, MatchId, MatchOrigin, OverrideRecord, Score, Stage, Team, TeamId,
    TeamStats, Tournament, TournamentError, TournamentId, TournamentState,
};
pub use session::TournamentSession;
pub use store::SnapshotStore;
