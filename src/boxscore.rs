use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::http_client::JsonSource;
use crate::payload::{array_at, text_at};
use crate::scoreboard::GameMeta;

pub const STAT_PREFIX: &str = "stat_";

/// Soccer stat names seen upstream. Casing is inconsistent between feeds, so
/// both forms are listed; a later variant overwrites an earlier one that
/// lower-cases to the same column.
pub const SOCCER_STAT_FIELDS: &[&str] = &[
    "goals",
    "assists",
    "points",
    "shots",
    "shotsOnGoal",
    "minutesPlayed",
    "goalsAgainst",
    "saves",
    "Shots",
    "ShotsOnGoal",
    "Goals",
    "Assists",
    "Points",
    "MinutesPlayed",
    "GoalsAgainst",
    "Saves",
    "gp",
    "gs",
    "min",
];

/// Player fields that become identity columns rather than stats.
const IDENTITY_FIELDS: &[&str] = &["firstName", "lastName", "number", "position", "category"];

/// Team ids arrive as numbers in one list and strings in another; both
/// collapse to the same key here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamId(String);

impl TeamId {
    pub fn from_value(v: &Value) -> Option<Self> {
        let raw = match v {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => return None,
        };
        if raw.is_empty() {
            return None;
        }
        // "0042" and 42 name the same team.
        let canonical = match raw.parse::<u64>() {
            Ok(n) => n.to_string(),
            Err(_) => raw,
        };
        Some(Self(canonical))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamInfo {
    pub name: String,
    pub seo: String,
}

/// One cell of an open stat column, kept as received until aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Missing,
}

impl StatValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => StatValue::Missing,
            Value::Bool(b) => StatValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(StatValue::Missing, StatValue::Number),
            Value::String(s) => StatValue::Text(s.clone()),
            other => StatValue::Text(other.to_string()),
        }
    }

    /// Numeric view; anything unparseable is missing.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            StatValue::Number(n) => *n,
            StatValue::Bool(b) => f64::from(u8::from(*b)),
            StatValue::Text(s) => s.trim().parse::<f64>().ok()?,
            StatValue::Missing => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(n) => write!(f, "{}", format_number(*n)),
            StatValue::Bool(b) => write!(f, "{b}"),
            StatValue::Text(s) => f.write_str(s),
            StatValue::Missing => Ok(()),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerGameRow {
    pub game_id: String,
    pub game_date: String,
    pub season: String,
    pub player_first: String,
    pub player_last: String,
    pub player_num: String,
    pub position: String,
    pub stat_type: String,
    pub category: String,
    pub team_name: String,
    pub team_seo: String,
    pub is_home: bool,
    pub team_won: bool,
    pub team_record_at_game: String,
    /// `stat_<name>` columns present for this player in this game.
    pub stats: BTreeMap<String, StatValue>,
}

pub fn boxscore_path(game_id: &str) -> String {
    format!("/game/{game_id}/boxscore")
}

pub fn player_rows(source: &impl JsonSource, game_id: &str, meta: &GameMeta) -> Vec<PlayerGameRow> {
    let Some(payload) = source.fetch(&boxscore_path(game_id)) else {
        debug!(game_id, "boxscore unavailable");
        return Vec::new();
    };
    parse_boxscore_rows(game_id, meta, &payload)
}

pub fn parse_boxscore_rows(game_id: &str, meta: &GameMeta, payload: &Value) -> Vec<PlayerGameRow> {
    let teams = team_lookup(payload);
    let season: String = meta.game_date.chars().take(4).collect();

    let mut rows = Vec::new();
    for team_box in array_at(payload, "teamBoxscore") {
        let info = team_box
            .get("teamId")
            .and_then(TeamId::from_value)
            .and_then(|id| teams.get(&id))
            .cloned()
            .unwrap_or_default();

        // Heuristic: the boxscore carries no home/away marker, so a team is
        // home only when its seo slug equals the scoreboard's home slug.
        // Empty or colliding slugs land on the away side.
        let (is_home, side) = if !info.seo.is_empty() && info.seo == meta.home.seo {
            (true, &meta.home)
        } else {
            (false, &meta.away)
        };

        for player in array_at(team_box, "playerStats") {
            if !player.is_object() {
                continue;
            }
            rows.push(PlayerGameRow {
                game_id: game_id.to_string(),
                game_date: meta.game_date.clone(),
                season: season.clone(),
                player_first: text_at(player, &["firstName"]),
                player_last: text_at(player, &["lastName"]),
                player_num: text_at(player, &["number"]),
                position: text_at(player, &["position"]),
                stat_type: text_at(player, &["__typename"]),
                category: text_at(player, &["category"]),
                team_name: info.name.clone(),
                team_seo: info.seo.clone(),
                is_home,
                team_won: side.winner,
                team_record_at_game: side.record.clone(),
                stats: player_stats(player),
            });
        }
    }
    rows
}

fn team_lookup(payload: &Value) -> HashMap<TeamId, TeamInfo> {
    let mut out = HashMap::new();
    for team in array_at(payload, "teams") {
        let Some(id) = team.get("teamId").and_then(TeamId::from_value) else {
            continue;
        };
        let full = text_at(team, &["nameFull"]);
        let name = if full.is_empty() {
            text_at(team, &["nameShort"])
        } else {
            full
        };
        out.insert(
            id,
            TeamInfo {
                name,
                seo: text_at(team, &["seoname"]),
            },
        );
    }
    out
}

fn player_stats(player: &Value) -> BTreeMap<String, StatValue> {
    let mut stats = BTreeMap::new();
    for field in SOCCER_STAT_FIELDS {
        if let Some(v) = player.get(*field) {
            stats.insert(stat_column(field), StatValue::from_json(v));
        }
    }
    if let Some(obj) = player.as_object() {
        for (key, v) in obj {
            if key.starts_with("__") || IDENTITY_FIELDS.contains(&key.as_str()) {
                continue;
            }
            stats
                .entry(stat_column(key))
                .or_insert_with(|| StatValue::from_json(v));
        }
    }
    stats
}

pub fn stat_column(field: &str) -> String {
    format!("{STAT_PREFIX}{}", field.to_lowercase())
}

/// Raw text of a stat cell, empty when the column is absent for the row.
pub fn stat_text(row: &PlayerGameRow, column: &str) -> String {
    row.stats.get(column).map(|v| v.to_string()).unwrap_or_default()
}
