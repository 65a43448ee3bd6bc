//! Integration tests for qualifier selection.

mod common;

use common::{play_group_stage, six_groups, tournament};
use cup_tracker::logic::BEST_THIRDS;
use cup_tracker::{group_standings, select_qualifiers, Tournament};

#[test]
fn pools_hold_winners_runners_up_and_best_thirds() {
    let mut t = six_groups();
    play_group_stage(&mut t);
    let q = select_qualifiers(&t);

    let winners: Vec<&str> = q.winners.iter().map(|s| s.team_id.as_str()).collect();
    assert_eq!(winners, ["A1", "B1", "C1", "D1", "E1", "F1"]);
    let runners: Vec<&str> = q.runners_up.iter().map(|s| s.team_id.as_str()).collect();
    assert_eq!(runners, ["A2", "B2", "C2", "D2", "E2", "F2"]);
    // Thirds differ only by goal difference, which grows with the group index.
    let thirds: Vec<&str> = q.best_thirds.iter().map(|s| s.team_id.as_str()).collect();
    assert_eq!(thirds, ["F3", "E3", "D3", "C3"]);
    assert_eq!(q.len(), 16);
}

#[test]
fn best_thirds_are_third_placed_and_capped() {
    let mut t = six_groups();
    play_group_stage(&mut t);
    let q = select_qualifiers(&t);
    assert!(q.best_thirds.len() <= BEST_THIRDS);
    for third in &q.best_thirds {
        let table = group_standings(&t, &third.group);
        assert_eq!(table[2].team_id, third.team_id);
    }
}

#[test]
fn pools_are_disjoint() {
    let mut t = six_groups();
    play_group_stage(&mut t);
    let q = select_qualifiers(&t);
    let mut ids: Vec<&str> = q.all().map(|s| s.team_id.as_str()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn short_thirds_pool_when_few_groups_have_a_third() {
    let mut t = tournament(3, 3);
    play_group_stage(&mut t);
    let q = select_qualifiers(&t);
    assert_eq!(q.winners.len(), 3);
    assert_eq!(q.best_thirds.len(), 3);
}

#[test]
fn group_of_one_gives_no_runner_up() {
    let mut t = Tournament::with_groups([
        ("A", vec!["Brazil".to_string(), "Germany".to_string()]),
        ("B", vec!["Japan".to_string()]),
    ])
    .unwrap();
    t.lock();
    let q = select_qualifiers(&t);
    assert_eq!(q.winners.len(), 2);
    assert_eq!(q.runners_up.len(), 1);
    assert!(q.best_thirds.is_empty());
}
