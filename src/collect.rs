use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::boxscore::{PlayerGameRow, player_rows};
use crate::config::CollectorConfig;
use crate::http_client::JsonSource;
use crate::schedule::game_dates;
use crate::scoreboard::{GameMeta, games_for_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Schedule,
    Scoreboards,
    Boxscores,
}

pub struct CollectProgress {
    pub season: String,
    pub stage: Stage,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeasonSummary {
    pub season: String,
    pub game_dates: usize,
    pub unique_games: usize,
    pub rows: usize,
    /// Games whose boxscore was unavailable or had no players.
    pub failed_games: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub rows: Vec<PlayerGameRow>,
    pub seasons: Vec<SeasonSummary>,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn dedup_games(
    games: impl IntoIterator<Item = (String, GameMeta)>,
    seen: &mut HashSet<String>,
) -> Vec<(String, GameMeta)> {
    games
        .into_iter()
        .filter(|(game_id, _)| seen.insert(game_id.clone()))
        .collect()
}

/// Runs schedule, scoreboard and boxscore stages for every configured season.
pub fn collect_seasons(
    source: &impl JsonSource,
    cfg: &CollectorConfig,
    mut on_progress: impl FnMut(CollectProgress),
) -> Collection {
    let mut collection = Collection::default();
    let mut seen = HashSet::new();

    for season in &cfg.seasons {
        let (rows, summary) = collect_season(source, cfg, season, &mut seen, &mut on_progress);
        info!(
            season = season.as_str(),
            dates = summary.game_dates,
            games = summary.unique_games,
            rows = summary.rows,
            failed = summary.failed_games,
            "season collected"
        );
        collection.rows.extend(rows);
        collection.seasons.push(summary);
    }
    collection
}

fn collect_season(
    source: &impl JsonSource,
    cfg: &CollectorConfig,
    season: &str,
    seen: &mut HashSet<String>,
    on_progress: &mut impl FnMut(CollectProgress),
) -> (Vec<PlayerGameRow>, SeasonSummary) {
    on_progress(CollectProgress {
        season: season.to_string(),
        stage: Stage::Schedule,
        current: 0,
        total: cfg.season_months.len(),
        message: "Getting schedule".to_string(),
    });
    let dates = game_dates(source, cfg, season);

    let mut games = Vec::new();
    for (idx, date) in dates.iter().enumerate() {
        let found = games_for_date(source, cfg, date);
        debug!(date = date.as_str(), games = found.len(), "scoreboard loaded");
        games.extend(found);
        on_progress(CollectProgress {
            season: season.to_string(),
            stage: Stage::Scoreboards,
            current: idx + 1,
            total: dates.len(),
            message: format!("Scoreboard {date}"),
        });
    }
    let unique = dedup_games(games, seen);
    info!(season, games = unique.len(), "unique games found");

    let mut rows = Vec::new();
    let mut failed = 0usize;
    for (idx, (game_id, meta)) in unique.iter().enumerate() {
        let game_rows = player_rows(source, game_id, meta);
        if game_rows.is_empty() {
            debug!(game_id = game_id.as_str(), "no player rows");
            failed += 1;
        }
        rows.extend(game_rows);
        on_progress(CollectProgress {
            season: season.to_string(),
            stage: Stage::Boxscores,
            current: idx + 1,
            total: unique.len(),
            message: format!("Boxscore {game_id}"),
        });
    }

    let summary = SeasonSummary {
        season: season.to_string(),
        game_dates: dates.len(),
        unique_games: unique.len(),
        rows: rows.len(),
        failed_games: failed,
    };
    (rows, summary)
}
