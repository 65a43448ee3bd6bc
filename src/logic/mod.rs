//! Tournament business logic: setup, group play, qualifiers, bracket, progression.

mod bracket;
mod group_play;
mod progression;
mod qualifiers;
mod setup;

pub use bracket::{generate_bracket, plan_bracket, Pairing, PairingPolicy, Slot, SlotTable, BRACKET_SIZE};
pub use group_play::{
    all_standings, group_standings, matchday_results, pending_matches, recompute_stats,
    record_score, tally, Standing,
};
pub use progression::{advance, advance_with_override, champion, stage_winners};
pub use qualifiers::{select_qualifiers, Qualifiers, BEST_THIRDS};
pub use setup::{draw_groups, group_labels, round_robin, schedule_round_robin};
