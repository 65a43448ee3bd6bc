//! Shared tournament builders for the integration tests.
#![allow(dead_code)]

use cup_tracker::{
    pending_matches, record_score, schedule_round_robin, MatchId, Score, Stage, Tournament,
};

pub const COUNTRIES: [&str; 24] = [
    "Brazil", "Germany", "Japan", "Ghana", "France", "Mexico", "Korea", "Canada", "Spain",
    "Chile", "Egypt", "Norway", "Italy", "Peru", "Iran", "Wales", "England", "Uruguay",
    "Senegal", "Poland", "Argentina", "Croatia", "Morocco", "Australia",
];

/// Group A of the reference scenario, locked, no matches.
pub fn group_a() -> Tournament {
    let mut t = Tournament::with_groups([(
        "A",
        vec!["Brazil".into(), "Germany".into(), "Japan".into(), "Ghana".into()],
    )])
    .unwrap();
    t.lock();
    t
}

/// `groups` groups of `per_group` teams, round-robin scheduled and locked.
pub fn tournament(groups: usize, per_group: usize) -> Tournament {
    let labels = cup_tracker::logic::group_labels(groups);
    let assignment = labels.iter().enumerate().map(|(g, label)| {
        let teams = COUNTRIES[g * per_group..(g + 1) * per_group]
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        (label.clone(), teams)
    });
    let mut t = Tournament::with_groups(assignment).unwrap();
    schedule_round_robin(&mut t).unwrap();
    t.lock();
    t
}

/// Six groups of four: the standard 16-team bracket setup.
pub fn six_groups() -> Tournament {
    tournament(6, 4)
}

fn position(id: &str) -> usize {
    id[1..].parse().unwrap()
}

fn group_index(id: &str) -> u32 {
    (id.as_bytes()[0] - b'A') as u32
}

/// Play every group match: the lower position always wins, 1-0, except that position 3
/// beats position 4 by (group index + 1) goals, so third-placed teams differ.
pub fn play_group_stage(t: &mut Tournament) {
    let pending: Vec<(MatchId, String, String)> = pending_matches(t, Stage::GroupStage)
        .iter()
        .map(|m| (m.id, m.home.clone(), m.away.clone()))
        .collect();
    for (id, home, away) in pending {
        let margin = if position(&home).min(position(&away)) == 3 {
            group_index(&home) + 1
        } else {
            1
        };
        let score = if position(&home) < position(&away) {
            Score::new(margin, 0)
        } else {
            Score::new(0, margin)
        };
        record_score(t, id, score).unwrap();
    }
}

/// Home side wins 1-0 in every pending match of `stage`.
pub fn play_knockout(t: &mut Tournament, stage: Stage) {
    let pending: Vec<MatchId> = pending_matches(t, stage).iter().map(|m| m.id).collect();
    for id in pending {
        record_score(t, id, Score::new(1, 0)).unwrap();
    }
}

/// Id of the match between two teams, either way round.
pub fn match_between(t: &Tournament, a: &str, b: &str) -> MatchId {
    t.matches
        .iter()
        .find(|m| (m.home == a && m.away == b) || (m.home == b && m.away == a))
        .map(|m| m.id)
        .unwrap()
}
