//! Group stage: result recording, stats recomputation and standings.

use crate::models::{
    GameMatch, MatchId, Score, Stage, Team, TeamId, TeamStats, Tournament, TournamentError,
    TournamentState,
};
use serde::Serialize;
use std::collections::HashMap;

/// One row of a group table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub position: usize,
    pub team_id: TeamId,
    pub country: String,
    pub abbreviation: String,
    pub group: String,
    pub stats: TeamStats,
}

/// Record the final score of a match, then rebuild every team's stats from the ledger.
///
/// Refused before the registry is locked, for bye matches, for matches of a stage that
/// is already closed, and for knockout draws (no decider is modeled). On error the
/// tournament is left untouched.
pub fn record_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    score: Score,
) -> Result<(), TournamentError> {
    if !tournament.locked {
        return Err(TournamentError::NotLocked);
    }
    let current = tournament.state;
    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_bye() {
        return Err(TournamentError::ByeMatch(match_id));
    }
    if TournamentState::from(m.stage) < current {
        return Err(TournamentError::StageClosed(m.stage));
    }
    if m.stage.is_knockout() && score.is_draw() {
        return Err(TournamentError::DrawNotAllowed(match_id));
    }
    m.score = Some(score);
    log::info!("Recorded {} {} {} ({})", m.home, score, m.away, m.stage);
    recompute_stats(tournament);
    Ok(())
}

/// Tally stats for every team from scratch over the matches accepted by `include`.
/// Pure: same ledger in, same stats out.
pub fn tally<F>(teams: &[Team], matches: &[GameMatch], include: F) -> HashMap<TeamId, TeamStats>
where
    F: Fn(&GameMatch) -> bool,
{
    let mut stats: HashMap<TeamId, TeamStats> = teams
        .iter()
        .map(|t| (t.id.clone(), TeamStats::default()))
        .collect();
    for m in matches.iter().filter(|m| include(*m)) {
        for (team, home) in [(&m.home, true), (&m.away, false)] {
            let Some(entry) = stats.get_mut(team) else {
                continue;
            };
            let mut next = entry.reached(m.stage);
            if let Some(score) = m.score {
                next = next.with_score(score, home);
            }
            *entry = next;
        }
    }
    stats
}

/// Replace every team's stats with a fresh tally over all played matches of all stages.
pub fn recompute_stats(tournament: &mut Tournament) {
    let mut fresh = tally(&tournament.teams, &tournament.matches, |_| true);
    for team in &mut tournament.teams {
        team.stats = fresh.remove(&team.id).unwrap_or_default();
    }
    log::debug!("Recomputed stats for {} team(s)", tournament.teams.len());
}

/// Standings of one group, computed from its GroupStage results only.
///
/// Sorted by points, goal difference, goals for (all descending); teams still level
/// are ordered by their position in the group (`A2` before `A10`).
pub fn group_standings(tournament: &Tournament, group: &str) -> Vec<Standing> {
    let members: Vec<&Team> = tournament.group_teams(group).collect();
    let mut stats = tally(&tournament.teams, &tournament.matches, |m| {
        m.stage == Stage::GroupStage && members.iter().any(|t| t.id == m.home)
    });
    let mut rows: Vec<(&Team, TeamStats)> = members
        .iter()
        .map(|t| (*t, stats.remove(&t.id).unwrap_or_default()))
        .collect();
    rows.sort_by(|(a, sa), (b, sb)| {
        sb.ranking_key()
            .cmp(&sa.ranking_key())
            .then_with(|| a.position().cmp(&b.position()))
            .then_with(|| a.id.cmp(&b.id))
    });
    rows.into_iter()
        .enumerate()
        .map(|(i, (team, stats))| Standing {
            position: i + 1,
            team_id: team.id.clone(),
            country: team.country.clone(),
            abbreviation: team.abbreviation.clone(),
            group: group.to_string(),
            stats,
        })
        .collect()
}

/// Standings for every group, ordered by group label.
pub fn all_standings(tournament: &Tournament) -> Vec<(String, Vec<Standing>)> {
    tournament
        .groups()
        .into_iter()
        .map(|g| {
            let table = group_standings(tournament, &g);
            (g, table)
        })
        .collect()
}

/// Matches of `stage` that still need a result (byes never do).
pub fn pending_matches(tournament: &Tournament, stage: Stage) -> Vec<&GameMatch> {
    tournament.matches_in(stage).filter(|m| !m.is_decided()).collect()
}

/// Group matches of one matchday, in creation order.
pub fn matchday_results(tournament: &Tournament, matchday: u32) -> Vec<&GameMatch> {
    tournament
        .matches_in(Stage::GroupStage)
        .filter(|m| m.matchday == Some(matchday))
        .collect()
}
