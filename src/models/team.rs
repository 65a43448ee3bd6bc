//! Team and TeamStats data structures.

use crate::models::game::{Score, Stage};
use serde::{Deserialize, Serialize};

/// Identifier of a team: group label + position in the group (`A1`, `A2`, ...), or `BYE-<n>`.
pub type TeamId = String;

/// Points for a win / draw / loss.
pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

/// Statistics of a team, always produced by a full tally over the ledger.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    pub max_stage_reached: Stage,
}

impl Default for TeamStats {
    fn default() -> Self {
        Self {
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            max_stage_reached: Stage::GroupStage,
        }
    }
}

impl TeamStats {
    /// Add one played match, seen from this team's side (`own` goals vs `against`).
    /// Returns a new value; derived fields are recomputed, never carried over.
    pub fn with_result(&self, own: u32, against: u32) -> Self {
        let (won, drawn, lost) = match own.cmp(&against) {
            std::cmp::Ordering::Greater => (1, 0, 0),
            std::cmp::Ordering::Equal => (0, 1, 0),
            std::cmp::Ordering::Less => (0, 0, 1),
        };
        let mut next = Self {
            played: self.played + 1,
            won: self.won + won,
            drawn: self.drawn + drawn,
            lost: self.lost + lost,
            goals_for: self.goals_for + own,
            goals_against: self.goals_against + against,
            max_stage_reached: self.max_stage_reached,
            ..Self::default()
        };
        next.goal_difference = next.goals_for as i32 - next.goals_against as i32;
        next.points = next.won * POINTS_WIN + next.drawn * POINTS_DRAW;
        next
    }

    /// Same as `with_result` for the home side of `score` when `home` is true, else the away side.
    pub fn with_score(&self, score: Score, home: bool) -> Self {
        if home {
            self.with_result(score.home, score.away)
        } else {
            self.with_result(score.away, score.home)
        }
    }

    pub fn reached(&self, stage: Stage) -> Self {
        Self {
            max_stage_reached: self.max_stage_reached.max(stage),
            ..self.clone()
        }
    }

    /// Ranking key, compared descending: (points, goal difference, goals for).
    pub fn ranking_key(&self) -> (u32, i32, u32) {
        (self.points, self.goal_difference, self.goals_for)
    }
}

/// A team in the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub country: String,
    pub abbreviation: String,
    /// None for bye placeholders.
    pub group: Option<String>,
    pub stats: TeamStats,
}

impl Team {
    /// Create a group-stage team. The abbreviation is the first three letters, upper-cased.
    pub fn new(id: impl Into<TeamId>, country: impl Into<String>, group: impl Into<String>) -> Self {
        let country = country.into();
        let abbreviation = abbreviate(&country);
        Self {
            id: id.into(),
            country,
            abbreviation,
            group: Some(group.into()),
            stats: TeamStats::default(),
        }
    }

    /// Position within the group, read from the id (`A10` -> 10). `None` for byes.
    pub fn position(&self) -> Option<u32> {
        self.id.strip_prefix(self.group.as_deref()?)?.parse().ok()
    }

    /// Placeholder opponent for a team without a pairing in a knockout round.
    pub fn bye(id: impl Into<TeamId>) -> Self {
        Self {
            id: id.into(),
            country: "Bye".to_string(),
            abbreviation: "BYE".to_string(),
            group: None,
            stats: TeamStats::default(),
        }
    }
}

fn abbreviate(country: &str) -> String {
    country
        .chars()
        .filter(|c| c.is_alphabetic())
        .take(3)
        .flat_map(char::to_uppercase)
        .collect()
}
