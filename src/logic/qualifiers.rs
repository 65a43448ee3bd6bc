//! Qualifier selection: group winners, runners-up and the best third-placed teams.

use crate::logic::group_play::{all_standings, Standing};
use crate::models::Tournament;
use serde::Serialize;

/// Number of third-placed teams that advance.
pub const BEST_THIRDS: usize = 4;

/// Teams advancing out of the group stage, as three disjoint pools.
///
/// `winners` and `runners_up` are ordered by group label; `best_thirds` by ranking,
/// best first. `best_thirds` holds fewer than [`BEST_THIRDS`] entries when fewer
/// groups have a third-placed team.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Qualifiers {
    pub winners: Vec<Standing>,
    pub runners_up: Vec<Standing>,
    pub best_thirds: Vec<Standing>,
}

impl Qualifiers {
    /// Every qualified team, pools concatenated (winners, runners-up, thirds).
    pub fn all(&self) -> impl Iterator<Item = &Standing> {
        self.winners
            .iter()
            .chain(self.runners_up.iter())
            .chain(self.best_thirds.iter())
    }

    pub fn len(&self) -> usize {
        self.winners.len() + self.runners_up.len() + self.best_thirds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, team_id: &str) -> bool {
        self.all().any(|s| s.team_id == team_id)
    }
}

/// Select the qualifiers from the current group standings.
pub fn select_qualifiers(tournament: &Tournament) -> Qualifiers {
    let mut qualifiers = Qualifiers::default();
    let mut thirds: Vec<Standing> = Vec::new();

    for (_, table) in all_standings(tournament) {
        let mut rows = table.into_iter();
        if let Some(first) = rows.next() {
            qualifiers.winners.push(first);
        }
        if let Some(second) = rows.next() {
            qualifiers.runners_up.push(second);
        }
        if let Some(third) = rows.next() {
            thirds.push(third);
        }
    }

    // Level thirds keep group-label order.
    thirds.sort_by(|a, b| b.stats.ranking_key().cmp(&a.stats.ranking_key()));
    thirds.truncate(BEST_THIRDS);
    qualifiers.best_thirds = thirds;

    log::debug!(
        "Qualifiers: {} winners, {} runners-up, {} best thirds",
        qualifiers.winners.len(),
        qualifiers.runners_up.len(),
        qualifiers.best_thirds.len()
    );
    qualifiers
}
