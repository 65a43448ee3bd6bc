//! Stage progression: GroupStage -> RoundOf16 -> QuarterFinals -> SemiFinals -> Final -> Completed.
//!
//! Transitions are triggered explicitly and refuse to run while the current stage has
//! matches without a result, unless the caller overrides (which is logged and recorded
//! in the tournament's audit list).
//!
//! Winners are paired in the order their matches were created (winner of match 1 vs
//! winner of match 2, and so on). This is not a seeded bracket: it does not keep
//! bracket halves apart.

use crate::logic::bracket::{generate_bracket, PairingPolicy};
use crate::logic::group_play::{pending_matches, recompute_stats};
use crate::models::{
    GameMatch, MatchId, MatchOrigin, OverrideRecord, Stage, Team, TeamId, Tournament,
    TournamentError, TournamentState,
};

/// Advance to the next state. Fails with [`TournamentError::Incomplete`] if any match of
/// the current stage has no result.
pub fn advance(
    tournament: &mut Tournament,
    policy: &dyn PairingPolicy,
) -> Result<TournamentState, TournamentError> {
    advance_inner(tournament, policy, None)
}

/// Advance even if results are missing. Matches without a result produce no winner.
pub fn advance_with_override(
    tournament: &mut Tournament,
    policy: &dyn PairingPolicy,
    reason: &str,
) -> Result<TournamentState, TournamentError> {
    advance_inner(tournament, policy, Some(reason))
}

fn advance_inner(
    tournament: &mut Tournament,
    policy: &dyn PairingPolicy,
    override_reason: Option<&str>,
) -> Result<TournamentState, TournamentError> {
    let from = tournament.state;
    let (Some(stage), Some(to)) = (from.stage(), from.next()) else {
        return Err(TournamentError::InvalidState);
    };
    if !tournament.locked {
        return Err(TournamentError::NotLocked);
    }

    let unplayed: Vec<MatchId> = pending_matches(tournament, stage).iter().map(|m| m.id).collect();
    match override_reason {
        None if !unplayed.is_empty() => {
            return Err(TournamentError::Incomplete { stage, unplayed });
        }
        Some(reason) => {
            log::warn!(
                "Override: advancing {:?} -> {:?} with {} unplayed match(es): {}",
                from,
                to,
                unplayed.len(),
                reason
            );
        }
        None => {}
    }

    match to.stage() {
        Some(Stage::RoundOf16) => {
            generate_bracket(tournament, policy)?;
        }
        Some(next) => {
            pair_winners(tournament, stage, next)?;
        }
        None => {}
    }

    if let Some(reason) = override_reason {
        tournament.overrides.push(OverrideRecord {
            from,
            to,
            unplayed,
            reason: reason.to_string(),
            at: chrono::Utc::now(),
        });
    }
    tournament.state = to;
    recompute_stats(tournament);
    log::info!("Tournament advanced {:?} -> {:?}", from, to);
    Ok(to)
}

/// Winners of a knockout stage, in match creation order.
pub fn stage_winners(tournament: &Tournament, stage: Stage) -> Vec<TeamId> {
    tournament
        .matches_in(stage)
        .filter_map(|m| m.winner().cloned())
        .collect()
}

/// Create `next` stage matches by pairing the winners of `stage` sequentially.
/// An odd winner out meets a bye placeholder.
fn pair_winners(tournament: &mut Tournament, stage: Stage, next: Stage) -> Result<(), TournamentError> {
    let winners = stage_winners(tournament, stage);
    for pair in winners.chunks(2) {
        let m = match pair {
            [home, away] => GameMatch::new(home.clone(), away.clone(), next, MatchOrigin::Advancement),
            [home] => {
                let bye = tournament.add_bye();
                log::warn!("{} has no opponent in {}; gets a bye", home, next);
                GameMatch::new(home.clone(), bye, next, MatchOrigin::Bye)
            }
            _ => continue,
        };
        tournament.push_match(m)?;
    }
    tournament.apply_knockout_calendar(next);
    Ok(())
}

/// Winner of the Final, once the tournament is completed.
pub fn champion(tournament: &Tournament) -> Option<&Team> {
    if tournament.state != TournamentState::Completed {
        return None;
    }
    let id = tournament.matches_in(Stage::Final).find_map(|m| m.winner())?;
    tournament.team(id)
}
