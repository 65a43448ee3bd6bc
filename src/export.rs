//! CSV exports of stage results and group tables, for archiving and printing.

use crate::logic::group_standings;
use crate::models::{MatchOrigin, Stage, Tournament};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ResultRow<'a> {
    id: String,
    stage: &'a str,
    team1: &'a str,
    goals1: Option<u32>,
    goals2: Option<u32>,
    team2: &'a str,
    date: String,
    time: String,
    origin: MatchOrigin,
}

#[derive(Serialize)]
struct StandingRow<'a> {
    group: &'a str,
    pos: usize,
    abbr: &'a str,
    team: &'a str,
    played: u32,
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: u32,
    goals_against: u32,
    goal_difference: i32,
    points: u32,
}

/// Write every match of `stage` with its final score (empty cells when unplayed).
pub fn write_stage_results<W: std::io::Write>(
    tournament: &Tournament,
    stage: Stage,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let country = |id: &str| {
        tournament
            .team(id)
            .map(|t| t.country.as_str())
            .unwrap_or("?")
            .to_string()
    };
    for m in tournament.matches_in(stage) {
        let (home, away) = (country(m.home.as_str()), country(m.away.as_str()));
        wtr.serialize(ResultRow {
            id: m.id.to_string(),
            stage: stage.label(),
            team1: &home,
            goals1: m.score.map(|s| s.home),
            goals2: m.score.map(|s| s.away),
            team2: &away,
            date: m.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            time: m.time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
            origin: m.origin,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Stage results as a CSV string.
pub fn stage_results_csv(tournament: &Tournament, stage: Stage) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_stage_results(tournament, stage, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write stage results to `dir/results_<stage>.csv` and return the path.
pub fn export_stage_results(
    tournament: &Tournament,
    stage: Stage,
    dir: &Path,
) -> Result<std::path::PathBuf, csv::Error> {
    std::fs::create_dir_all(dir)?;
    let stage_key = format!("{:?}", stage).to_ascii_lowercase();
    let path = dir.join(format!("results_{}.csv", stage_key));
    let file = std::fs::File::create(&path)?;
    write_stage_results(tournament, stage, file)?;
    log::info!("Exported {} results to {}", stage, path.display());
    Ok(path)
}

/// Write the table of every group, one row per team.
pub fn write_standings<W: std::io::Write>(tournament: &Tournament, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for group in tournament.groups() {
        for s in group_standings(tournament, &group) {
            wtr.serialize(StandingRow {
                group: &group,
                pos: s.position,
                abbr: &s.abbreviation,
                team: &s.country,
                played: s.stats.played,
                won: s.stats.won,
                drawn: s.stats.drawn,
                lost: s.stats.lost,
                goals_for: s.stats.goals_for,
                goals_against: s.stats.goals_against,
                goal_difference: s.stats.goal_difference,
                points: s.stats.points,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}
