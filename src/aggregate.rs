use std::collections::{BTreeMap, BTreeSet};

use crate::boxscore::{PlayerGameRow, STAT_PREFIX};

/// Minutes at or above which an appearance counts as a start.
pub const STARTER_MINUTES: f64 = 60.0;
pub const ASSIST_WEIGHT: f64 = 0.5;

pub const GOALS_COLUMN: &str = "stat_goals";
pub const ASSISTS_COLUMN: &str = "stat_assists";
const MINUTES_COLUMNS: &[&str] = &["stat_minutesplayed", "stat_minutes", "stat_min"];

pub const KEY_COLUMNS: &[&str] = &["player_first", "player_last", "team_name", "team_seo", "season"];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeasonKey {
    pub player_first: String,
    pub player_last: String,
    pub team_name: String,
    pub team_seo: String,
    pub season: String,
}

impl SeasonKey {
    pub fn of(row: &PlayerGameRow) -> Self {
        Self {
            player_first: row.player_first.clone(),
            player_last: row.player_last.clone(),
            team_name: row.team_name.clone(),
            team_seo: row.team_seo.clone(),
            season: row.season.clone(),
        }
    }

    pub fn cells(&self) -> [&str; 5] {
        [
            self.player_first.as_str(),
            self.player_last.as_str(),
            self.team_name.as_str(),
            self.team_seo.as_str(),
            self.season.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeasonRow {
    pub key: SeasonKey,
    pub games_played: u32,
    pub team_wins_in: u32,
    pub est_starts: Option<u32>,
    pub start_rate: Option<f64>,
    pub win_rate: Option<f64>,
    pub production_per_game: Option<f64>,
    pub stats: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonTable {
    pub stat_columns: Vec<String>,
    /// Column used for start estimates; `None` drops `est_starts` and
    /// `start_rate` from the output.
    pub minutes_column: Option<String>,
    pub has_production: bool,
    pub rows: Vec<PlayerSeasonRow>,
}

impl SeasonTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = KEY_COLUMNS.iter().map(|c| c.to_string()).collect();
        cols.extend(self.stat_columns.iter().cloned());
        cols.push("games_played".to_string());
        cols.push("team_wins_in".to_string());
        if self.minutes_column.is_some() {
            cols.push("est_starts".to_string());
            cols.push("start_rate".to_string());
        }
        cols.push("win_rate".to_string());
        if self.has_production {
            cols.push("production_per_game".to_string());
        }
        cols
    }

    pub fn find(&self, key: &SeasonKey) -> Option<&PlayerSeasonRow> {
        self.rows.iter().find(|row| &row.key == key)
    }
}

#[derive(Debug, Default)]
struct Accum {
    games: u32,
    wins: u32,
    starts: u32,
    sums: BTreeMap<String, f64>,
}

pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}

pub fn stat_columns(rows: &[PlayerGameRow]) -> Vec<String> {
    let mut cols = BTreeSet::new();
    for row in rows {
        for key in row.stats.keys() {
            let key = key.to_lowercase();
            if key.starts_with(STAT_PREFIX) {
                cols.insert(key);
            }
        }
    }
    cols.into_iter().collect()
}

pub fn minutes_column(stat_columns: &[String]) -> Option<String> {
    MINUTES_COLUMNS
        .iter()
        .find(|c| stat_columns.iter().any(|s| s == *c))
        .map(|c| c.to_string())
        .or_else(|| stat_columns.iter().find(|c| c.contains("minute")).cloned())
}

fn numeric_stats(row: &PlayerGameRow) -> BTreeMap<String, Option<f64>> {
    let mut out = BTreeMap::new();
    for (key, value) in &row.stats {
        let key = key.to_lowercase();
        if !key.starts_with(STAT_PREFIX) {
            continue;
        }
        let n = value.as_number();
        let slot = out.entry(key).or_insert(None);
        if slot.is_none() {
            *slot = n;
        }
    }
    out
}

/// Rolls player-game rows up to one row per player, team and season.
pub fn aggregate(rows: &[PlayerGameRow]) -> SeasonTable {
    if rows.is_empty() {
        return SeasonTable::default();
    }

    let stat_columns = stat_columns(rows);
    let minutes_column = minutes_column(&stat_columns);
    let has_production = stat_columns.iter().any(|c| c == GOALS_COLUMN)
        && stat_columns.iter().any(|c| c == ASSISTS_COLUMN);

    let mut groups: BTreeMap<SeasonKey, Accum> = BTreeMap::new();
    for row in rows {
        let acc = groups.entry(SeasonKey::of(row)).or_default();
        acc.games += 1;
        if row.team_won {
            acc.wins += 1;
        }
        let stats = numeric_stats(row);
        for (col, value) in &stats {
            if let Some(n) = value {
                *acc.sums.entry(col.clone()).or_insert(0.0) += n;
            }
        }
        let minutes = minutes_column
            .as_deref()
            .and_then(|col| stats.get(col).copied().flatten());
        if minutes.is_some_and(|m| m >= STARTER_MINUTES) {
            acc.starts += 1;
        }
    }

    let rows = groups
        .into_iter()
        .map(|(key, acc)| {
            let games = f64::from(acc.games);
            let stats: BTreeMap<String, f64> = stat_columns
                .iter()
                .map(|col| (col.clone(), acc.sums.get(col).copied().unwrap_or(0.0)))
                .collect();
            let est_starts = minutes_column.as_ref().map(|_| acc.starts);
            let production_per_game = if has_production {
                let goals = stats.get(GOALS_COLUMN).copied().unwrap_or(0.0);
                let assists = stats.get(ASSISTS_COLUMN).copied().unwrap_or(0.0);
                ratio(goals + ASSIST_WEIGHT * assists, games)
            } else {
                None
            };
            PlayerSeasonRow {
                key,
                games_played: acc.games,
                team_wins_in: acc.wins,
                est_starts,
                start_rate: est_starts.and_then(|s| ratio(f64::from(s), games)),
                win_rate: ratio(f64::from(acc.wins), games),
                production_per_game,
                stats,
            }
        })
        .collect();

    SeasonTable {
        stat_columns,
        minutes_column,
        has_production,
        rows,
    }
}
