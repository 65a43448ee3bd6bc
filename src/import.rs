//! CSV imports: group assignment, group schedule and knockout calendar.
//!
//! Imports never fail the session: a missing file, missing columns or bad rows
//! degrade to (partially) empty data plus warnings for the caller to show.

use crate::models::{KnockoutSlot, Stage, Tournament};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Result of an import: whatever could be read, and what went wrong.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Imported<T> {
    pub data: T,
    pub warnings: Vec<String>,
}

impl<T: Default> Imported<T> {
    fn failed(warning: String) -> Self {
        log::warn!("{}", warning);
        Self {
            data: T::default(),
            warnings: vec![warning],
        }
    }
}

impl<T> Imported<T> {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, warning: String) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Ordered group assignment: group label -> team names by position.
pub type GroupAssignment = Vec<(String, Vec<String>)>;

/// One row of the group schedule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduleRow {
    pub group: String,
    pub matchday: u32,
    pub team1: String,
    pub team2: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

#[derive(Deserialize)]
struct ScheduleRecord {
    group: String,
    matchday: String,
    team1: String,
    team2: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

#[derive(Deserialize)]
struct KnockoutRecord {
    stage: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

fn open(path: &Path) -> Result<File, String> {
    File::open(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))
}

fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Lower-case the header row and check that `required` columns are present.
fn normalize_headers<R: std::io::Read>(rdr: &mut csv::Reader<R>, required: &[&str]) -> Result<(), String> {
    let headers = rdr.headers().map_err(|e| format!("Unreadable header row: {}", e))?;
    let lowered: csv::StringRecord = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !lowered.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing column(s): {}", missing.join(", ")));
    }
    rdr.set_headers(lowered);
    Ok(())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    ["%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw.trim(), fmt).ok())
}

/// Parse an optional date/time cell; a non-empty cell that does not parse is a warning.
fn optional_cell<T>(
    raw: Option<String>,
    parse: fn(&str) -> Option<T>,
    row: usize,
    warnings: &mut Vec<String>,
) -> Option<T> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warnings.push(format!("Row {}: cannot parse '{}'", row, raw));
    }
    parsed
}

/// Group assignment: header row of group labels, then one row per position.
pub fn read_groups(path: &Path) -> Imported<GroupAssignment> {
    match open(path) {
        Ok(f) => read_groups_from(f),
        Err(e) => Imported::failed(e),
    }
}

pub fn read_groups_from<R: std::io::Read>(reader: R) -> Imported<GroupAssignment> {
    let mut rdr = csv_reader(reader);
    let labels: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(str::to_string).collect(),
        Err(e) => return Imported::failed(format!("Unreadable header row: {}", e)),
    };
    if labels.iter().all(|l| l.is_empty()) {
        return Imported::failed("Group file has no group columns".to_string());
    }
    let mut out = Imported {
        data: labels
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| (l.clone(), Vec::new()))
            .collect::<GroupAssignment>(),
        warnings: Vec::new(),
    };
    for (i, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                out.warn(format!("Row {}: {}", i + 2, e));
                continue;
            }
        };
        for (label, cell) in labels.iter().zip(record.iter()) {
            if label.is_empty() || cell.is_empty() {
                continue;
            }
            if let Some((_, teams)) = out.data.iter_mut().find(|(g, _)| g == label) {
                teams.push(cell.to_string());
            }
        }
    }
    out
}

/// Group schedule: `group,matchday,team1,team2[,date,time]`.
pub fn read_schedule(path: &Path) -> Imported<Vec<ScheduleRow>> {
    match open(path) {
        Ok(f) => read_schedule_from(f),
        Err(e) => Imported::failed(e),
    }
}

pub fn read_schedule_from<R: std::io::Read>(reader: R) -> Imported<Vec<ScheduleRow>> {
    let mut rdr = csv_reader(reader);
    if let Err(e) = normalize_headers(&mut rdr, &["group", "matchday", "team1", "team2"]) {
        return Imported::failed(format!("Schedule: {}", e));
    }
    let mut out: Imported<Vec<ScheduleRow>> = Imported::default();
    for (i, rec) in rdr.deserialize::<ScheduleRecord>().enumerate() {
        let row = i + 2;
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                out.warn(format!("Schedule row {}: {}", row, e));
                continue;
            }
        };
        let Ok(matchday) = rec.matchday.parse::<u32>() else {
            out.warn(format!("Schedule row {}: matchday '{}' is not a number", row, rec.matchday));
            continue;
        };
        let mut warnings = Vec::new();
        let date = optional_cell(rec.date, parse_date, row, &mut warnings);
        let time = optional_cell(rec.time, parse_time, row, &mut warnings);
        warnings.into_iter().for_each(|w| out.warn(w));
        out.data.push(ScheduleRow {
            group: rec.group,
            matchday,
            team1: rec.team1,
            team2: rec.team2,
            date,
            time,
        });
    }
    out
}

/// Knockout calendar: `stage,date,time`, applied by order within each stage.
pub fn read_knockout_calendar(path: &Path) -> Imported<Vec<KnockoutSlot>> {
    match open(path) {
        Ok(f) => read_knockout_calendar_from(f),
        Err(e) => Imported::failed(e),
    }
}

pub fn read_knockout_calendar_from<R: std::io::Read>(reader: R) -> Imported<Vec<KnockoutSlot>> {
    let mut rdr = csv_reader(reader);
    if let Err(e) = normalize_headers(&mut rdr, &["stage"]) {
        return Imported::failed(format!("Knockout calendar: {}", e));
    }
    let mut out: Imported<Vec<KnockoutSlot>> = Imported::default();
    for (i, rec) in rdr.deserialize::<KnockoutRecord>().enumerate() {
        let row = i + 2;
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                out.warn(format!("Knockout calendar row {}: {}", row, e));
                continue;
            }
        };
        let stage = match rec.stage.parse::<Stage>() {
            Ok(s) if s.is_knockout() => s,
            _ => {
                out.warn(format!("Knockout calendar row {}: '{}' is not a knockout stage", row, rec.stage));
                continue;
            }
        };
        let mut warnings = Vec::new();
        let date = optional_cell(rec.date, parse_date, row, &mut warnings);
        let time = optional_cell(rec.time, parse_time, row, &mut warnings);
        warnings.into_iter().for_each(|w| out.warn(w));
        out.data.push(KnockoutSlot { stage, date, time });
    }
    out
}

/// Build the group stage from an assignment and a schedule.
///
/// Assignment cells that cannot be registered (duplicate country, empty name) and
/// schedule rows naming a team that is not in the row's group are skipped with a
/// warning; everything else is still loaded.
pub fn load_group_stage(groups: &GroupAssignment, schedule: &[ScheduleRow]) -> Imported<Tournament> {
    let mut out: Imported<Tournament> = Imported::default();
    for (group, countries) in groups {
        for country in countries {
            if let Err(e) = out.data.add_team(group, country.as_str()) {
                out.warn(format!("Group {}: {} skipped: {}", group, country, e));
            }
        }
    }
    for (i, row) in schedule.iter().enumerate() {
        let find = |name: &str| {
            out.data
                .group_teams(&row.group)
                .find(|t| t.country.eq_ignore_ascii_case(name.trim()))
                .map(|t| t.id.clone())
        };
        let (Some(home), Some(away)) = (find(&row.team1), find(&row.team2)) else {
            out.warn(format!(
                "Schedule row {}: {} vs {} not found in group {}",
                i + 2,
                row.team1,
                row.team2,
                row.group
            ));
            continue;
        };
        match out.data.add_group_match(&home, &away, Some(row.matchday)) {
            Ok(id) => {
                if let Some(m) = out.data.get_match_mut(id) {
                    m.date = row.date;
                    m.time = row.time;
                }
            }
            Err(e) => out.warn(format!("Schedule row {}: {}", i + 2, e)),
        }
    }
    out
}

/// Read the three setup files and build a new tournament from them.
///
/// Never fails: every problem found along the way is kept in
/// `Tournament::import_warnings` so it can be shown before results are entered.
pub fn load_setup(groups_csv: &Path, schedule_csv: &Path, knockout_csv: &Path) -> Tournament {
    let groups = read_groups(groups_csv);
    let schedule = read_schedule(schedule_csv);
    let calendar = read_knockout_calendar(knockout_csv);
    let loaded = load_group_stage(&groups.data, &schedule.data);

    let mut tournament = loaded.data;
    tournament.knockout_calendar = calendar.data;
    tournament.import_warnings = groups
        .warnings
        .into_iter()
        .chain(schedule.warnings)
        .chain(calendar.warnings)
        .chain(loaded.warnings)
        .collect();
    if !tournament.import_warnings.is_empty() {
        log::warn!(
            "Setup import had {} problem(s); check the data before entering results",
            tournament.import_warnings.len()
        );
    }
    tournament
}
