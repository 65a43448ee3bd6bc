//! Integration tests for registry setup, group draw and round-robin scheduling.

use cup_tracker::{draw_groups, round_robin, schedule_round_robin, Config, Tournament, TournamentError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn round_robin_meets_everyone_once() {
    let ids: Vec<String> = ["A1", "A2", "A3", "A4"].iter().map(|s| s.to_string()).collect();
    let days = round_robin(&ids);
    assert_eq!(days.len(), 3);
    let mut pairs = HashSet::new();
    for day in &days {
        assert_eq!(day.len(), 2);
        let mut playing = HashSet::new();
        for (a, b) in day {
            assert!(playing.insert(a.clone()) && playing.insert(b.clone()));
            let key = if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
            assert!(pairs.insert(key));
        }
    }
    assert_eq!(pairs.len(), 6);
}

#[test]
fn round_robin_odd_count_rests_one_team() {
    let ids: Vec<String> = (1..=5).map(|i| format!("B{}", i)).collect();
    let days = round_robin(&ids);
    assert_eq!(days.len(), 5);
    assert!(days.iter().all(|d| d.len() == 2));
    assert_eq!(days.iter().map(Vec::len).sum::<usize>(), 10);
}

#[test]
fn draw_places_every_country_once() {
    let countries: Vec<String> = (0..24).map(|i| format!("Country {}", i)).collect();
    let mut rng = StdRng::seed_from_u64(7);
    let groups = draw_groups(&countries, 6, &mut rng);
    assert_eq!(groups.len(), 6);
    assert_eq!(groups[0].0, "A");
    assert!(groups.iter().all(|(_, teams)| teams.len() == 4));
    let drawn: HashSet<&String> = groups.iter().flat_map(|(_, t)| t).collect();
    assert_eq!(drawn.len(), 24);

    let again = draw_groups(&countries, 6, &mut StdRng::seed_from_u64(7));
    assert_eq!(groups, again);
}

#[test]
fn team_ids_follow_group_position() {
    let mut t = Tournament::new();
    assert_eq!(t.add_team("A", "Brazil"), Ok("A1".to_string()));
    assert_eq!(t.add_team("A", "Germany"), Ok("A2".to_string()));
    assert_eq!(t.add_team("B", "Japan"), Ok("B1".to_string()));
    assert_eq!(t.add_team("A", "brazil"), Err(TournamentError::DuplicateTeam("brazil".into())));
    assert_eq!(t.add_team("A", "  "), Err(TournamentError::InvalidName));

    t.remove_team("A1").unwrap();
    assert_eq!(t.add_team("A", "Ghana"), Ok("A1".to_string()));
    assert_eq!(t.team("A2").unwrap().country, "Germany");
}

#[test]
fn teams_with_matches_cannot_be_removed() {
    let mut t = Tournament::new();
    t.add_team("A", "Brazil").unwrap();
    t.add_team("A", "Germany").unwrap();
    t.add_group_match("A1", "A2", Some(1)).unwrap();
    assert_eq!(t.remove_team("A1"), Err(TournamentError::TeamInUse("A1".into())));
}

#[test]
fn group_matches_are_validated() {
    let mut t = Tournament::new();
    t.add_team("A", "Brazil").unwrap();
    t.add_team("B", "Japan").unwrap();
    assert_eq!(t.add_group_match("A1", "A1", None), Err(TournamentError::SameTeam("A1".into())));
    assert_eq!(t.add_group_match("A1", "Z9", None), Err(TournamentError::TeamNotFound("Z9".into())));
    assert!(matches!(
        t.add_group_match("A1", "B1", None),
        Err(TournamentError::CrossGroupMatch { .. })
    ));
}

#[test]
fn schedule_skips_groups_that_already_have_matches() {
    let mut t = Tournament::new();
    for (g, c) in [("A", "Brazil"), ("A", "Germany"), ("A", "Japan"), ("B", "France"), ("B", "Mexico")] {
        t.add_team(g, c).unwrap();
    }
    t.add_group_match("A1", "A2", Some(1)).unwrap();
    assert_eq!(schedule_round_robin(&mut t), Ok(1));
    assert_eq!(t.matches.len(), 2);
    assert_eq!(schedule_round_robin(&mut t), Ok(0));
}

#[test]
fn config_reads_overrides_and_keeps_defaults() {
    let config = Config::from_lookup(|key| match key {
        "PORT" => Some("9090".to_string()),
        "SNAPSHOT_PATH" => Some("/tmp/cup.json".to_string()),
        _ => None,
    });
    assert_eq!(config.port, 9090);
    assert_eq!(config.snapshot_path, std::path::PathBuf::from("/tmp/cup.json"));
    assert_eq!(config.host, "0.0.0.0");
    assert!(config.pairing_table.is_none());

    let bad = Config::from_lookup(|key| (key == "PORT").then(|| "eighty".to_string()));
    assert_eq!(bad.port, 8080);
}
