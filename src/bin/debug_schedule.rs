use anyhow::Result;

use ncaa_collector::config::CollectorConfig;
use ncaa_collector::http_client::ApiClient;
use ncaa_collector::schedule::{parse_schedule_entries, schedule_path};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ncaa_collector=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = CollectorConfig::from_env();
    let season = std::env::args()
        .nth(1)
        .or_else(|| cfg.seasons.first().cloned())
        .unwrap_or_default();

    let client = ApiClient::new(&cfg)?;
    for month in &cfg.season_months {
        let path = schedule_path(&cfg, &season, month);
        println!("\nGET {}", client.url_for(&path));
        let response = client.get_raw(&path);
        std::thread::sleep(client.delay());
        let raw = match response {
            Ok(raw) => raw,
            Err(err) => {
                println!("  request failed: {err:#}");
                continue;
            }
        };
        println!("  status: {}", raw.status);
        let payload = match serde_json::from_str::<serde_json::Value>(raw.body.trim()) {
            Ok(payload) if raw.status.is_success() => payload,
            Ok(_) => {
                println!("  body: {}", body_preview(&raw.body));
                continue;
            }
            Err(err) => {
                println!("  invalid json: {err}");
                println!("  body: {}", body_preview(&raw.body));
                continue;
            }
        };
        let entries = parse_schedule_entries(&payload);
        let active: Vec<_> = entries.iter().filter(|e| e.games > 0).collect();
        println!(
            "  gameDates total: {}, with games: {}",
            entries.len(),
            active.len()
        );
        if let Some(first) = active.first() {
            println!(
                "  First active date: {} ({} games)",
                first.contest_date, first.games
            );
        }
    }
    Ok(())
}

const PREVIEW_BYTES: usize = 300;

fn body_preview(body: &str) -> &str {
    let mut end = body.len().min(PREVIEW_BYTES);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
