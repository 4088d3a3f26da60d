use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://ncaa-api.henrygd.me";
pub const DEFAULT_SPORT: &str = "soccer-women";
pub const DEFAULT_DIVISION: &str = "d1";
pub const DEFAULT_USER_AGENT: &str = "transfer-risk-research/1.0";

/// Women's soccer runs August through November.
pub const DEFAULT_SEASON_MONTHS: &[&str] = &["08", "09", "10", "11"];
pub const DEFAULT_SEASONS: &[&str] = &["2024"];

const DEFAULT_DELAY_MS: u64 = 220;
/// Keeps the request rate at or under ~5 req/s whatever the caller asks for.
const MIN_DELAY_MS: u64 = 200;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

const DEFAULT_OUTPUT_DIR: &str = "data/raw";
const DEFAULT_RAW_FILE: &str = "ncaa_wsoccer_raw_games.csv";
const DEFAULT_SEASON_FILE: &str = "ncaa_wsoccer_transfer_risk.csv";
const DEFAULT_WORKBOOK_FILE: &str = "ncaa_wsoccer_transfer_risk.xlsx";

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    pub base_url: String,
    pub sport: String,
    pub division: String,
    pub seasons: Vec<String>,
    pub season_months: Vec<String>,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub output_dir: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sport: DEFAULT_SPORT.to_string(),
            division: DEFAULT_DIVISION.to_string(),
            seasons: DEFAULT_SEASONS.iter().map(|s| s.to_string()).collect(),
            season_months: DEFAULT_SEASON_MONTHS.iter().map(|s| s.to_string()).collect(),
            request_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl CollectorConfig {
    /// Defaults overlaid with any `NCAA_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_lookup(|key| std::env::var(key).ok());
        cfg
    }

    fn apply_lookup(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("NCAA_BASE_URL") {
            self.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty("NCAA_SPORT") {
            self.sport = v.trim().to_string();
        }
        if let Some(v) = non_empty("NCAA_DIVISION") {
            self.division = v.trim().to_string();
        }
        if let Some(v) = non_empty("NCAA_SEASONS") {
            let seasons = parse_list(&v);
            if !seasons.is_empty() {
                self.seasons = seasons;
            }
        }
        if let Some(v) = non_empty("NCAA_SEASON_MONTHS") {
            let months = parse_months(&v);
            if !months.is_empty() {
                self.season_months = months;
            }
        }
        if let Some(ms) =
            non_empty("NCAA_REQUEST_DELAY_MS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.set_delay_ms(ms);
        }
        if let Some(secs) = non_empty("NCAA_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = non_empty("NCAA_USER_AGENT") {
            self.user_agent = v.trim().to_string();
        }
        if let Some(v) = non_empty("NCAA_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v.trim());
        }
    }

    pub fn set_delay_ms(&mut self, ms: u64) {
        self.request_delay = Duration::from_millis(ms.max(MIN_DELAY_MS));
    }

    pub fn raw_games_path(&self) -> PathBuf {
        self.output_dir.join(DEFAULT_RAW_FILE)
    }

    pub fn player_season_path(&self) -> PathBuf {
        self.output_dir.join(DEFAULT_SEASON_FILE)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.output_dir.join(DEFAULT_WORKBOOK_FILE)
    }
}

/// Splits on `,` `;` or whitespace, dropping blanks and repeats.
pub fn parse_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split([',', ';', ' ', '\t']) {
        let part = part.trim();
        if part.is_empty() || out.iter().any(|s| s == part) {
            continue;
        }
        out.push(part.to_string());
    }
    out
}

/// Like [`parse_list`], but only keeps valid calendar months, zero-padded.
pub fn parse_months(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in parse_list(raw) {
        let Ok(month) = part.parse::<u32>() else {
            continue;
        };
        if !(1..=12).contains(&month) {
            continue;
        }
        let padded = format!("{month:02}");
        if !out.contains(&padded) {
            out.push(padded);
        }
    }
    out
}
