//! Setup: group draw and round-robin schedule generation.

use crate::models::{Stage, TeamId, Tournament, TournamentError};
use rand::seq::SliceRandom;
use rand::Rng;

/// Group labels `A`, `B`, ... for `count` groups (at most 26).
pub fn group_labels(count: usize) -> Vec<String> {
    (b'A'..=b'Z')
        .take(count)
        .map(|c| char::from(c).to_string())
        .collect()
}

/// Randomly draw countries into `group_count` groups, dealing them out one at a time.
/// Returns the groups in label order, each as an ordered list of countries.
pub fn draw_groups<R: Rng + ?Sized>(
    countries: &[String],
    group_count: usize,
    rng: &mut R,
) -> Vec<(String, Vec<String>)> {
    let mut pool = countries.to_vec();
    pool.shuffle(rng);
    let mut groups: Vec<(String, Vec<String>)> = group_labels(group_count)
        .into_iter()
        .map(|g| (g, Vec::new()))
        .collect();
    if groups.is_empty() {
        return groups;
    }
    let n = groups.len();
    for (i, country) in pool.into_iter().enumerate() {
        groups[i % n].1.push(country);
    }
    groups
}

/// Round-robin matchdays by the circle method: every team meets every other once.
/// With an odd number of teams one team rests each matchday.
pub fn round_robin(teams: &[TeamId]) -> Vec<Vec<(TeamId, TeamId)>> {
    let mut slots: Vec<Option<&TeamId>> = teams.iter().map(Some).collect();
    if slots.len() < 2 {
        return Vec::new();
    }
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    let mut matchdays = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let day: Vec<(TeamId, TeamId)> = (0..n / 2)
            .filter_map(|i| match (slots[i], slots[n - 1 - i]) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                _ => None,
            })
            .collect();
        matchdays.push(day);
        // Keep the first slot fixed, rotate the rest.
        slots[1..].rotate_right(1);
    }
    matchdays
}

/// Add round-robin group matches for every group that has none yet.
/// Returns the number of matches created.
pub fn schedule_round_robin(tournament: &mut Tournament) -> Result<usize, TournamentError> {
    let mut created = 0;
    for group in tournament.groups() {
        let ids: Vec<TeamId> = tournament.group_teams(&group).map(|t| t.id.clone()).collect();
        let scheduled = tournament
            .matches_in(Stage::GroupStage)
            .any(|m| ids.contains(&m.home));
        if scheduled {
            continue;
        }
        for (day, pairs) in round_robin(&ids).into_iter().enumerate() {
            for (home, away) in pairs {
                tournament.add_group_match(&home, &away, Some(day as u32 + 1))?;
                created += 1;
            }
        }
    }
    if created > 0 {
        log::info!("Generated {} round-robin group match(es)", created);
    }
    Ok(created)
}
