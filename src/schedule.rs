use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::CollectorConfig;
use crate::http_client::JsonSource;
use crate::payload::{array_at, as_u64_any, text_at};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDateEntry {
    /// As published upstream, `MM-DD-YYYY`.
    pub contest_date: String,
    pub games: u64,
}

pub fn schedule_path(cfg: &CollectorConfig, season: &str, month: &str) -> String {
    format!(
        "/schedule/{}/{}/{}/{}",
        cfg.sport, cfg.division, season, month
    )
}

/// Every date with at least one game across the configured months, as
/// `YYYY/MM/DD` path segments. Months that fail to load contribute nothing.
pub fn game_dates(source: &impl JsonSource, cfg: &CollectorConfig, season: &str) -> Vec<String> {
    let mut dates = Vec::new();
    for month in &cfg.season_months {
        let Some(payload) = source.fetch(&schedule_path(cfg, season, month)) else {
            debug!(season, month = month.as_str(), "schedule month unavailable");
            continue;
        };
        let before = dates.len();
        dates.extend(active_date_paths(&payload));
        debug!(
            season,
            month = month.as_str(),
            dates = dates.len() - before,
            "schedule month loaded"
        );
    }
    info!(season, dates = dates.len(), "game dates found");
    dates
}

pub fn parse_schedule_entries(payload: &Value) -> Vec<GameDateEntry> {
    array_at(payload, "gameDates")
        .iter()
        .map(|entry| GameDateEntry {
            contest_date: text_at(entry, &["contest_date"]),
            games: entry.get("games").and_then(as_u64_any).unwrap_or(0),
        })
        .collect()
}

pub fn active_date_paths(payload: &Value) -> Vec<String> {
    parse_schedule_entries(payload)
        .into_iter()
        .filter(|entry| entry.games > 0)
        .filter_map(|entry| contest_date_to_path(&entry.contest_date))
        .collect()
}

/// `MM-DD-YYYY` to `YYYY/MM/DD`. Segments must be exactly 2, 2 and 4 digits
/// and form a real calendar date.
pub fn contest_date_to_path(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.trim().split('-').collect();
    let [month, day, year] = parts.as_slice() else {
        return None;
    };
    let date = NaiveDate::from_ymd_opt(
        digits(year, 4)?.parse().ok()?,
        digits(month, 2)?.parse().ok()?,
        digits(day, 2)?.parse().ok()?,
    )?;
    Some(date.format("%Y/%m/%d").to_string())
}

fn digits(segment: &str, width: usize) -> Option<&str> {
    (segment.len() == width && segment.bytes().all(|b| b.is_ascii_digit())).then_some(segment)
}
