//! Tournament aggregate, TournamentState and TournamentError.

use crate::models::game::{GameMatch, MatchId, MatchOrigin, Stage};
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// Team registry is locked; teams can no longer be added or removed.
    Locked,
    /// Results can only be recorded once the registry is locked.
    NotLocked,
    /// Empty team or group name.
    InvalidName,
    /// A team with this country name already exists (case-insensitive).
    DuplicateTeam(String),
    TeamNotFound(TeamId),
    MatchNotFound(MatchId),
    /// A match references a team id that is not in the registry.
    UnknownTeamReference { match_id: MatchId, team: TeamId },
    /// A match must be between two different teams.
    SameTeam(TeamId),
    /// Group matches must be between teams of the same group.
    CrossGroupMatch { home: TeamId, away: TeamId },
    /// Team is still referenced by a match.
    TeamInUse(TeamId),
    /// Goal count is not a non-negative integer.
    InvalidScore(String),
    /// Knockout matches need a winner; draws are rejected at entry.
    DrawNotAllowed(MatchId),
    /// Bye matches are decided without a score.
    ByeMatch(MatchId),
    /// The match's stage is already finished.
    StageClosed(Stage),
    /// Stage still has matches without a result. Recoverable by an explicit override.
    Incomplete { stage: Stage, unplayed: Vec<MatchId> },
    /// Group stage produced fewer than two qualifiers, so no knockout match is possible.
    NotEnoughQualifiers(usize),
    /// Snapshot could not be read or written.
    Persistence(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::Locked => write!(f, "Teams and groups are locked"),
            TournamentError::NotLocked => write!(f, "Lock teams and groups before recording results"),
            TournamentError::InvalidName => write!(f, "Name must not be empty"),
            TournamentError::DuplicateTeam(name) => write!(f, "Team {} already exists", name),
            TournamentError::TeamNotFound(id) => write!(f, "Team {} not found", id),
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::UnknownTeamReference { match_id, team } => {
                write!(f, "Match {} references unknown team {}", match_id, team)
            }
            TournamentError::SameTeam(id) => write!(f, "Team {} cannot play itself", id),
            TournamentError::CrossGroupMatch { home, away } => {
                write!(f, "{} and {} are not in the same group", home, away)
            }
            TournamentError::TeamInUse(id) => write!(f, "Team {} still has matches", id),
            TournamentError::InvalidScore(raw) => write!(f, "Goals must be whole numbers (got '{}')", raw),
            TournamentError::DrawNotAllowed(_) => write!(f, "Knockout matches cannot end in a draw"),
            TournamentError::ByeMatch(_) => write!(f, "Bye matches have no score"),
            TournamentError::StageClosed(stage) => write!(f, "{} is already closed", stage),
            TournamentError::Incomplete { stage, unplayed } => {
                write!(f, "{} has {} match(es) without a result", stage, unplayed.len())
            }
            TournamentError::NotEnoughQualifiers(found) => {
                write!(f, "Need at least 2 qualified teams for a bracket (found {})", found)
            }
            TournamentError::Persistence(msg) => write!(f, "Could not save tournament: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

impl From<std::io::Error> for TournamentError {
    fn from(e: std::io::Error) -> Self {
        TournamentError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for TournamentError {
    fn from(e: serde_json::Error) -> Self {
        TournamentError::Persistence(e.to_string())
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament. Only moves forward, one step at a time.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Round-robin groups; results being recorded.
    #[default]
    GroupStage,
    RoundOf16,
    QuarterFinals,
    SemiFinals,
    Final,
    /// Final played; nothing left to do.
    Completed,
}

impl TournamentState {
    /// Stage whose matches are being played in this state.
    pub fn stage(self) -> Option<Stage> {
        match self {
            TournamentState::GroupStage => Some(Stage::GroupStage),
            TournamentState::RoundOf16 => Some(Stage::RoundOf16),
            TournamentState::QuarterFinals => Some(Stage::QuarterFinals),
            TournamentState::SemiFinals => Some(Stage::SemiFinals),
            TournamentState::Final => Some(Stage::Final),
            TournamentState::Completed => None,
        }
    }

    pub fn next(self) -> Option<TournamentState> {
        match self {
            TournamentState::GroupStage => Some(TournamentState::RoundOf16),
            TournamentState::RoundOf16 => Some(TournamentState::QuarterFinals),
            TournamentState::QuarterFinals => Some(TournamentState::SemiFinals),
            TournamentState::SemiFinals => Some(TournamentState::Final),
            TournamentState::Final => Some(TournamentState::Completed),
            TournamentState::Completed => None,
        }
    }
}

impl From<Stage> for TournamentState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::GroupStage => TournamentState::GroupStage,
            Stage::RoundOf16 => TournamentState::RoundOf16,
            Stage::QuarterFinals => TournamentState::QuarterFinals,
            Stage::SemiFinals => TournamentState::SemiFinals,
            Stage::Final => TournamentState::Final,
        }
    }
}

/// Audit entry for a stage advanced with results still missing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub from: TournamentState,
    pub to: TournamentState,
    pub unplayed: Vec<MatchId>,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Date/time lookup entry for knockout matches; the n-th entry of a stage goes
/// to the n-th match of that stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutSlot {
    pub stage: Stage,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

/// Full tournament state: team registry, match ledger and phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    /// Registry, in insertion order.
    pub teams: Vec<Team>,
    /// Ledger, in creation order. Matches are never removed.
    pub matches: Vec<GameMatch>,
    pub state: TournamentState,
    /// Once set, teams can no longer be added or removed.
    pub locked: bool,
    #[serde(default)]
    pub knockout_calendar: Vec<KnockoutSlot>,
    #[serde(default)]
    pub overrides: Vec<OverrideRecord>,
    /// Problems found while importing the setup data, shown to operators.
    #[serde(default)]
    pub import_warnings: Vec<String>,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}

impl Tournament {
    /// Create an empty, unlocked tournament in the group stage.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            teams: Vec::new(),
            matches: Vec::new(),
            state: TournamentState::GroupStage,
            locked: false,
            knockout_calendar: Vec::new(),
            overrides: Vec::new(),
            import_warnings: Vec::new(),
        }
    }

    /// Build a tournament from an ordered group assignment: group label -> team names.
    /// Ids follow the position in the list (`A1`, `A2`, ...).
    pub fn with_groups<G, S>(groups: G) -> Result<Self, TournamentError>
    where
        G: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        let mut tournament = Self::new();
        for (group, countries) in groups {
            let group = group.into();
            for country in countries {
                tournament.add_team(&group, country)?;
            }
        }
        Ok(tournament)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_team_mut(&mut self, id: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    /// Look up a team by country name (case-insensitive).
    pub fn team_by_country(&self, country: &str) -> Option<&Team> {
        let country = country.trim();
        self.teams.iter().find(|t| t.country.eq_ignore_ascii_case(country))
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Matches of one stage, in creation order.
    pub fn matches_in(&self, stage: Stage) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.stage == stage)
    }

    /// Sorted, distinct group labels.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.teams.iter().filter_map(|t| t.group.clone()).collect();
        groups.sort();
        groups.dedup();
        groups
    }

    /// Teams of one group, in registry order.
    pub fn group_teams<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Team> + 'a {
        self.teams.iter().filter(move |t| t.group.as_deref() == Some(group))
    }

    /// Add a team to a group (refused once locked). Returns the new team's id.
    pub fn add_team(&mut self, group: &str, country: impl Into<String>) -> Result<TeamId, TournamentError> {
        if self.locked {
            return Err(TournamentError::Locked);
        }
        let country = country.into();
        let (group, country) = (group.trim(), country.trim());
        if group.is_empty() || country.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        if self.team_by_country(country).is_some() {
            return Err(TournamentError::DuplicateTeam(country.to_string()));
        }
        // Positions of removed teams are reused; existing ids never move.
        let id = (1..)
            .map(|pos| format!("{}{}", group, pos))
            .find(|id| self.team(id).is_none())
            .ok_or(TournamentError::InvalidState)?;
        self.teams.push(Team::new(id.clone(), country, group));
        Ok(id)
    }

    /// Remove a team (refused once locked, or while a match references it).
    pub fn remove_team(&mut self, id: &str) -> Result<(), TournamentError> {
        if self.locked {
            return Err(TournamentError::Locked);
        }
        if self.matches.iter().any(|m| m.involves(id)) {
            return Err(TournamentError::TeamInUse(id.to_string()));
        }
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TournamentError::TeamNotFound(id.to_string()))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Freeze team/group assignment. Results can be recorded from now on.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Schedule a group match between two teams of the same group.
    pub fn add_group_match(
        &mut self,
        home: &str,
        away: &str,
        matchday: Option<u32>,
    ) -> Result<MatchId, TournamentError> {
        if self.state != TournamentState::GroupStage {
            return Err(TournamentError::StageClosed(Stage::GroupStage));
        }
        let home_group = self
            .team(home)
            .ok_or_else(|| TournamentError::TeamNotFound(home.to_string()))?
            .group
            .clone();
        let away_group = self
            .team(away)
            .ok_or_else(|| TournamentError::TeamNotFound(away.to_string()))?
            .group
            .clone();
        if home == away {
            return Err(TournamentError::SameTeam(home.to_string()));
        }
        if home_group.is_none() || home_group != away_group {
            return Err(TournamentError::CrossGroupMatch {
                home: home.to_string(),
                away: away.to_string(),
            });
        }
        let mut m = GameMatch::new(home, away, Stage::GroupStage, MatchOrigin::Schedule);
        m.matchday = matchday;
        let id = m.id;
        self.push_match(m)?;
        Ok(id)
    }

    /// Append a match after checking both team references.
    pub(crate) fn push_match(&mut self, m: GameMatch) -> Result<(), TournamentError> {
        self.check_references(&m)?;
        self.matches.push(m);
        Ok(())
    }

    fn check_references(&self, m: &GameMatch) -> Result<(), TournamentError> {
        for team in [&m.home, &m.away] {
            if self.team(team).is_none() {
                return Err(TournamentError::UnknownTeamReference {
                    match_id: m.id,
                    team: team.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check that every match references registered teams (used when loading snapshots).
    pub fn validate_references(&self) -> Result<(), TournamentError> {
        self.matches.iter().try_for_each(|m| self.check_references(m))
    }

    /// Register a new bye placeholder and return its id.
    pub(crate) fn add_bye(&mut self) -> TeamId {
        let id = (1..)
            .map(|n| format!("BYE-{}", n))
            .find(|id| self.team(id).is_none())
            .unwrap_or_default();
        self.teams.push(Team::bye(id.clone()));
        id
    }

    /// Give the matches of `stage` their date/time from the knockout calendar, by order.
    pub fn apply_knockout_calendar(&mut self, stage: Stage) {
        let slots: Vec<&KnockoutSlot> = self.knockout_calendar.iter().filter(|s| s.stage == stage).collect();
        let targets = self.matches.iter_mut().filter(|m| m.stage == stage);
        for (m, slot) in targets.zip(slots) {
            m.date = slot.date;
            m.time = slot.time;
        }
    }
}
