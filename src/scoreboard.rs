use serde_json::Value;
use tracing::debug;

use crate::config::CollectorConfig;
use crate::http_client::JsonSource;
use crate::payload::{array_at, bool_at, text_at};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamSide {
    pub name: String,
    /// Upstream `seo` slug; the only key shared with boxscore team records.
    pub seo: String,
    pub score: String,
    pub winner: bool,
    /// Season record as shown on the scoreboard, e.g. `"(5-2-1)"`.
    pub record: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameMeta {
    pub game_id: String,
    pub game_date: String,
    pub home: TeamSide,
    pub away: TeamSide,
    pub game_state: String,
}

pub fn scoreboard_path(cfg: &CollectorConfig, date_path: &str) -> String {
    format!("/scoreboard/{}/{}/{}", cfg.sport, cfg.division, date_path)
}

pub fn games_for_date(
    source: &impl JsonSource,
    cfg: &CollectorConfig,
    date_path: &str,
) -> Vec<(String, GameMeta)> {
    let Some(payload) = source.fetch(&scoreboard_path(cfg, date_path)) else {
        debug!(date = date_path, "scoreboard unavailable");
        return Vec::new();
    };
    parse_scoreboard_games(&payload)
}

pub fn parse_scoreboard_games(payload: &Value) -> Vec<(String, GameMeta)> {
    let mut out = Vec::new();
    for item in array_at(payload, "games") {
        let Some(game) = item.get("game") else {
            continue;
        };
        let Some(game_id) = game
            .get("url")
            .and_then(|u| u.as_str())
            .and_then(game_id_from_url)
        else {
            continue;
        };
        let meta = GameMeta {
            game_id: game_id.clone(),
            game_date: text_at(game, &["startDate"]),
            home: parse_side(game, "home"),
            away: parse_side(game, "away"),
            game_state: text_at(game, &["gameState"]),
        };
        out.push((game_id, meta));
    }
    out
}

fn parse_side(game: &Value, key: &str) -> TeamSide {
    TeamSide {
        name: text_at(game, &[key, "names", "full"]),
        seo: text_at(game, &[key, "names", "seo"]),
        score: text_at(game, &[key, "score"]),
        winner: bool_at(game, &[key, "winner"]),
        record: text_at(game, &[key, "description"]),
    }
}

/// Last path segment of a game URL such as `/game/6348656`, only if it is
/// entirely ASCII digits.
pub fn game_id_from_url(url: &str) -> Option<String> {
    let segment = url.trim().trim_matches('/').rsplit('/').next()?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::game_id_from_url;

    #[test]
    fn game_id_from_url_keeps_numeric_tail() {
        assert_eq!(game_id_from_url("/game/6348656").as_deref(), Some("6348656"));
        assert_eq!(game_id_from_url("/game/6348656/").as_deref(), Some("6348656"));
        assert_eq!(game_id_from_url("6348656").as_deref(), Some("6348656"));
    }

    #[test]
    fn game_id_from_url_rejects_non_numeric() {
        assert_eq!(game_id_from_url("/game/abc"), None);
        assert_eq!(game_id_from_url("/game/12a4"), None);
        assert_eq!(game_id_from_url("/game/-12"), None);
        assert_eq!(game_id_from_url(""), None);
        assert_eq!(game_id_from_url("/"), None);
    }
}
