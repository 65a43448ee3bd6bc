//! Match (game), Score, Stage and how a match came to exist.

use crate::models::team::TeamId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Stage a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    GroupStage,
    RoundOf16,
    QuarterFinals,
    SemiFinals,
    Final,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::GroupStage,
        Stage::RoundOf16,
        Stage::QuarterFinals,
        Stage::SemiFinals,
        Stage::Final,
    ];

    pub fn is_knockout(self) -> bool {
        self != Stage::GroupStage
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::GroupStage => "Group Stage",
            Stage::RoundOf16 => "Round of 16",
            Stage::QuarterFinals => "Quarter-finals",
            Stage::SemiFinals => "Semi-finals",
            Stage::Final => "Final",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = String;

    /// Accepts `round_of_16`, `RoundOf16`, `Round of 16`, `quarter-finals`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "groupstage" | "group" | "groups" => Ok(Stage::GroupStage),
            "roundof16" | "r16" | "last16" => Ok(Stage::RoundOf16),
            "quarterfinals" | "quarterfinal" | "qf" => Ok(Stage::QuarterFinals),
            "semifinals" | "semifinal" | "sf" => Ok(Stage::SemiFinals),
            "final" | "finals" => Ok(Stage::Final),
            _ => Err(format!("Unknown stage: {}", s.trim())),
        }
    }
}

/// Final score of a match. Both sides are always present together.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Parse free-text goal counts (e.g. from a form). Both must be non-negative integers.
    pub fn parse(home: &str, away: &str) -> Result<Self, crate::models::TournamentError> {
        let parse_side = |raw: &str| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| crate::models::TournamentError::InvalidScore(raw.trim().to_string()))
        };
        Ok(Self::new(parse_side(home)?, parse_side(away)?))
    }

    pub fn is_draw(&self) -> bool {
        self.home == self.away
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.home, self.away)
    }
}

/// How a match was created. `Fallback` marks bracket pairings the pairing policy
/// could not resolve.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    Schedule,
    Policy,
    Fallback,
    Advancement,
    Bye,
}

/// A single match between two registered teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub home: TeamId,
    pub away: TeamId,
    pub stage: Stage,
    /// Group matches only.
    pub matchday: Option<u32>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// None if not yet played.
    pub score: Option<Score>,
    pub origin: MatchOrigin,
}

impl GameMatch {
    pub fn new(home: impl Into<TeamId>, away: impl Into<TeamId>, stage: Stage, origin: MatchOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            home: home.into(),
            away: away.into(),
            stage,
            matchday: None,
            date: None,
            time: None,
            score: None,
            origin,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.origin == MatchOrigin::Bye
    }

    /// Played, or a bye (decided without a score).
    pub fn is_decided(&self) -> bool {
        self.score.is_some() || self.is_bye()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }

    /// Winning side of a decided knockout match. `None` for unplayed matches and draws.
    pub fn winner(&self) -> Option<&TeamId> {
        if self.is_bye() {
            return Some(&self.home);
        }
        let score = self.score?;
        match score.home.cmp(&score.away) {
            std::cmp::Ordering::Greater => Some(&self.home),
            std::cmp::Ordering::Less => Some(&self.away),
            std::cmp::Ordering::Equal => None,
        }
    }
}
