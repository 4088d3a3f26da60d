use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info};

use ncaa_collector::aggregate::aggregate;
use ncaa_collector::collect::{CollectProgress, Stage, collect_seasons};
use ncaa_collector::config::{CollectorConfig, parse_list, parse_months};
use ncaa_collector::export::{export_tables, season_table_rows};
use ncaa_collector::http_client::ApiClient;

const PROGRESS_EVERY: usize = 25;
const PREVIEW_ROWS: usize = 5;
const SUMMARY_FILE: &str = "collect_summary.json";

#[derive(Parser)]
#[command(name = "ncaa_collector")]
#[command(about = "Collect NCAA player boxscores and roll them up to player seasons", long_about = None)]
struct Cli {
    /// Season to collect; repeat or comma-separate for several
    #[arg(short, long = "season")]
    seasons: Vec<String>,

    /// Months of the season to walk, e.g. "08,09,10,11"
    #[arg(long)]
    months: Option<String>,

    #[arg(long)]
    sport: Option<String>,

    #[arg(long)]
    division: Option<String>,

    /// Directory for the CSV outputs
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Pause after every request, in milliseconds (floored at 200)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Also write both tables into one .xlsx workbook
    #[arg(long)]
    xlsx: bool,

    /// Save the raw per-game table only
    #[arg(long)]
    raw_only: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut CollectorConfig) {
        let seasons: Vec<String> = self.seasons.iter().flat_map(|s| parse_list(s)).collect();
        if !seasons.is_empty() {
            cfg.seasons = seasons;
        }
        if let Some(months) = self.months.as_deref().map(parse_months)
            && !months.is_empty()
        {
            cfg.season_months = months;
        }
        if let Some(sport) = &self.sport {
            cfg.sport = sport.clone();
        }
        if let Some(division) = &self.division {
            cfg.division = division.clone();
        }
        if let Some(dir) = &self.out_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(ms) = self.delay_ms {
            cfg.set_delay_ms(ms);
        }
    }
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ncaa_collector=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}

fn log_progress(p: CollectProgress) {
    let due = p.current == p.total || p.current % PROGRESS_EVERY == 0;
    match p.stage {
        Stage::Schedule => info!(season = p.season.as_str(), "{}", p.message),
        Stage::Scoreboards | Stage::Boxscores if due && p.total > 0 => info!(
            season = p.season.as_str(),
            "{:?} {}/{} ({})",
            p.stage,
            p.current,
            p.total,
            p.message
        ),
        _ => {}
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing()?;

    let cli = Cli::parse();
    let mut cfg = CollectorConfig::from_env();
    cli.apply(&mut cfg);
    info!(
        sport = cfg.sport.as_str(),
        division = cfg.division.as_str(),
        seasons = ?cfg.seasons,
        months = ?cfg.season_months,
        "starting collection"
    );

    let client = ApiClient::new(&cfg)?;
    let collection = collect_seasons(&client, &cfg, log_progress);

    for s in &collection.seasons {
        println!(
            "season {}: dates={} games={} rows={} failed/empty={}",
            s.season, s.game_dates, s.unique_games, s.rows, s.failed_games
        );
    }

    if collection.is_empty() {
        error!("no data collected");
        bail!("no player-game rows collected for seasons {:?}", cfg.seasons);
    }

    let table = (!cli.raw_only).then(|| aggregate(&collection.rows));
    let season_path = cfg.player_season_path();
    let workbook_path = cli.xlsx.then(|| cfg.workbook_path());
    let report = export_tables(
        &cfg.raw_games_path(),
        &collection.rows,
        table.as_ref().map(|t| (season_path.as_path(), t)),
        workbook_path.as_deref(),
    )?;

    let summary_path = cfg.output_dir.join(SUMMARY_FILE);
    let summary_json =
        serde_json::to_string_pretty(&collection.seasons).context("serialize run summary")?;
    fs::write(&summary_path, summary_json)
        .with_context(|| format!("write {}", summary_path.display()))?;

    println!(
        "Raw game rows: {:?} -> {}",
        report.raw_shape,
        report.raw_path.display()
    );
    if let Some(path) = &report.season_path {
        println!("Player-season rows: {:?} -> {}", report.season_shape, path.display());
    }
    if let Some(path) = &report.workbook_path {
        println!("Workbook: {}", path.display());
    }

    if let Some(table) = &table {
        let lines = season_table_rows(table);
        println!("\nSample (first {PREVIEW_ROWS} rows):");
        for line in lines.iter().take(PREVIEW_ROWS + 1) {
            println!("{}", line.join(" | "));
        }
        if let Some(header) = lines.first() {
            println!("\nColumns: {header:?}");
        }
    }

    Ok(())
}
