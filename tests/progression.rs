//! Integration tests for stage progression (GroupStage -> ... -> Completed).

mod common;

use common::{play_group_stage, play_knockout, six_groups, tournament};
use cup_tracker::{
    advance, advance_with_override, champion, pending_matches, record_score, MatchId,
    MatchOrigin, Score, SlotTable, Stage, Tournament, TournamentError, TournamentState,
};

fn policy() -> SlotTable {
    SlotTable::six_groups()
}

fn in_round_of_16() -> Tournament {
    let mut t = six_groups();
    play_group_stage(&mut t);
    assert_eq!(advance(&mut t, &policy()), Ok(TournamentState::RoundOf16));
    t
}

#[test]
fn advance_refuses_with_unplayed_matches() {
    let mut t = six_groups();
    play_group_stage(&mut t);
    let last: MatchId = t.matches_in(Stage::GroupStage).last().unwrap().id;
    t.get_match_mut(last).unwrap().score = None;
    let before = t.clone();

    match advance(&mut t, &policy()) {
        Err(TournamentError::Incomplete { stage, unplayed }) => {
            assert_eq!(stage, Stage::GroupStage);
            assert_eq!(unplayed, vec![last]);
        }
        other => panic!("expected Incomplete, got {:?}", other),
    }
    assert_eq!(t, before);
}

#[test]
fn override_is_explicit_and_recorded() {
    let mut t = in_round_of_16();
    let ids: Vec<MatchId> = t.matches_in(Stage::RoundOf16).map(|m| m.id).collect();
    for id in &ids[..5] {
        record_score(&mut t, *id, Score::new(2, 1)).unwrap();
    }

    assert!(advance(&mut t, &policy()).is_err());
    let next = advance_with_override(&mut t, &policy(), "weather").unwrap();
    assert_eq!(next, TournamentState::QuarterFinals);

    // 5 winners -> ceil(5 / 2) = 3 matches, the last one a bye.
    let qf: Vec<_> = t.matches_in(Stage::QuarterFinals).collect();
    assert_eq!(qf.len(), 3);
    assert_eq!(qf[2].origin, MatchOrigin::Bye);
    assert!(qf[2].is_decided());

    assert_eq!(t.overrides.len(), 1);
    let record = &t.overrides[0];
    assert_eq!(record.from, TournamentState::RoundOf16);
    assert_eq!(record.to, TournamentState::QuarterFinals);
    assert_eq!(record.unplayed, ids[5..].to_vec());
    assert_eq!(record.reason, "weather");
}

#[test]
fn bye_matches_take_no_score() {
    let mut t = in_round_of_16();
    let ids: Vec<MatchId> = t.matches_in(Stage::RoundOf16).map(|m| m.id).collect();
    for id in &ids[..3] {
        record_score(&mut t, *id, Score::new(1, 0)).unwrap();
    }
    advance_with_override(&mut t, &policy(), "test").unwrap();
    let bye = t.matches_in(Stage::QuarterFinals).find(|m| m.is_bye()).unwrap().id;
    assert_eq!(
        record_score(&mut t, bye, Score::new(1, 0)),
        Err(TournamentError::ByeMatch(bye))
    );
    assert!(pending_matches(&t, Stage::QuarterFinals).iter().all(|m| m.id != bye));
}

#[test]
fn winners_are_paired_in_match_order() {
    let mut t = in_round_of_16();
    let r16: Vec<(String, String)> = t
        .matches_in(Stage::RoundOf16)
        .map(|m| (m.home.clone(), m.away.clone()))
        .collect();
    // Away side wins the first match, home sides win the rest.
    let first = t.matches_in(Stage::RoundOf16).next().unwrap().id;
    record_score(&mut t, first, Score::new(0, 3)).unwrap();
    play_knockout(&mut t, Stage::RoundOf16);
    advance(&mut t, &policy()).unwrap();

    let qf: Vec<(String, String)> = t
        .matches_in(Stage::QuarterFinals)
        .map(|m| (m.home.clone(), m.away.clone()))
        .collect();
    assert_eq!(qf.len(), 4);
    assert_eq!(qf[0], (r16[0].1.clone(), r16[1].0.clone()));
    assert_eq!(qf[1], (r16[2].0.clone(), r16[3].0.clone()));
    assert!(t.matches_in(Stage::QuarterFinals).all(|m| m.origin == MatchOrigin::Advancement));
}

#[test]
fn full_run_to_completion() {
    let mut t = in_round_of_16();
    let expected = [
        (Stage::RoundOf16, TournamentState::QuarterFinals, 4),
        (Stage::QuarterFinals, TournamentState::SemiFinals, 2),
        (Stage::SemiFinals, TournamentState::Final, 1),
    ];
    for (stage, next, matches) in expected {
        play_knockout(&mut t, stage);
        assert_eq!(advance(&mut t, &policy()), Ok(next));
        assert_eq!(t.matches_in(next.stage().unwrap()).count(), matches);
    }
    assert!(champion(&t).is_none());
    play_knockout(&mut t, Stage::Final);
    assert_eq!(advance(&mut t, &policy()), Ok(TournamentState::Completed));

    let final_match = t.matches_in(Stage::Final).next().unwrap();
    let winner = champion(&t).unwrap();
    assert_eq!(winner.id, final_match.home);
    assert_eq!(winner.stats.max_stage_reached, Stage::Final);
    assert_eq!(advance(&mut t, &policy()), Err(TournamentError::InvalidState));
    assert!(t.overrides.is_empty());
}

#[test]
fn knockout_draws_are_rejected() {
    let mut t = in_round_of_16();
    let id = t.matches_in(Stage::RoundOf16).next().unwrap().id;
    assert_eq!(
        record_score(&mut t, id, Score::new(1, 1)),
        Err(TournamentError::DrawNotAllowed(id))
    );
    assert!(t.get_match(id).unwrap().score.is_none());
}

#[test]
fn closed_stage_results_are_frozen() {
    let mut t = in_round_of_16();
    let group_match = t.matches_in(Stage::GroupStage).next().unwrap().id;
    assert_eq!(
        record_score(&mut t, group_match, Score::new(5, 5)),
        Err(TournamentError::StageClosed(Stage::GroupStage))
    );
}

#[test]
fn advance_requires_lock() {
    let mut t = Tournament::new();
    assert_eq!(advance(&mut t, &policy()), Err(TournamentError::NotLocked));
}

#[test]
fn knockout_results_feed_cumulative_stats() {
    let mut t = in_round_of_16();
    play_knockout(&mut t, Stage::RoundOf16);
    let m = t.matches_in(Stage::RoundOf16).next().unwrap().clone();
    let home = &t.team(&m.home).unwrap().stats;
    assert_eq!(home.played, 4);
    assert_eq!(home.max_stage_reached, Stage::RoundOf16);
}

#[test]
fn four_groups_reach_a_champion() {
    let mut t = tournament(4, 4);
    play_group_stage(&mut t);
    assert_eq!(advance(&mut t, &policy()), Ok(TournamentState::RoundOf16));
    assert_eq!(t.matches_in(Stage::RoundOf16).count(), 6);

    play_knockout(&mut t, Stage::RoundOf16);
    assert_eq!(advance(&mut t, &policy()), Ok(TournamentState::QuarterFinals));
    assert_eq!(t.matches_in(Stage::QuarterFinals).count(), 3);

    play_knockout(&mut t, Stage::QuarterFinals);
    assert_eq!(advance(&mut t, &policy()), Ok(TournamentState::SemiFinals));
    let semis: Vec<_> = t.matches_in(Stage::SemiFinals).collect();
    assert_eq!(semis.len(), 2);
    assert_eq!(semis[1].origin, MatchOrigin::Bye);

    play_knockout(&mut t, Stage::SemiFinals);
    assert_eq!(advance(&mut t, &policy()), Ok(TournamentState::Final));
    play_knockout(&mut t, Stage::Final);
    assert_eq!(advance(&mut t, &policy()), Ok(TournamentState::Completed));
    assert!(champion(&t).is_some());
    assert!(t.overrides.is_empty());
}

#[test]
fn override_leaves_a_four_group_stage() {
    let mut t = tournament(4, 4);
    play_group_stage(&mut t);
    let last: MatchId = t.matches_in(Stage::GroupStage).last().unwrap().id;
    t.get_match_mut(last).unwrap().score = None;

    let next = advance_with_override(&mut t, &policy(), "abandoned match").unwrap();
    assert_eq!(next, TournamentState::RoundOf16);
    assert_eq!(t.state, TournamentState::RoundOf16);
    assert!(t.matches_in(Stage::RoundOf16).count() > 0);
    assert_eq!(t.overrides[0].unplayed, vec![last]);
}
