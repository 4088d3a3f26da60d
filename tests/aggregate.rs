use std::collections::BTreeMap;

use ncaa_collector::aggregate::{SeasonKey, aggregate};
use ncaa_collector::boxscore::{PlayerGameRow, StatValue};
use ncaa_collector::export::{raw_table_rows, season_table_rows};

fn row(first: &str, game_id: &str, won: bool, stats: &[(&str, StatValue)]) -> PlayerGameRow {
    PlayerGameRow {
        game_id: game_id.to_string(),
        game_date: "2024-09-01".to_string(),
        season: "2024".to_string(),
        player_first: first.to_string(),
        player_last: "Test".to_string(),
        team_name: "Stanford University".to_string(),
        team_seo: "stanford".to_string(),
        team_won: won,
        stats: stats
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
        ..PlayerGameRow::default()
    }
}

fn text(s: &str) -> StatValue {
    StatValue::Text(s.to_string())
}

#[test]
fn unparseable_stat_is_missing_not_fatal() {
    let rows = vec![
        row("A", "1", true, &[("stat_shots", text("3"))]),
        row("A", "2", false, &[("stat_shots", text("--"))]),
        row("B", "1", true, &[("stat_shots", text("oops"))]),
    ];
    let table = aggregate(&rows);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0].stats.get("stat_shots"), Some(&3.0));
    // All-missing groups sum to zero.
    assert_eq!(table.rows[1].stats.get("stat_shots"), Some(&0.0));
}

#[test]
fn production_requires_goals_and_assists_columns() {
    let goals_only = vec![row("A", "1", true, &[("stat_goals", StatValue::Number(1.0))])];
    let table = aggregate(&goals_only);
    assert!(!table.has_production);
    assert!(table.rows[0].production_per_game.is_none());
    assert!(!table.columns().iter().any(|c| c == "production_per_game"));

    let both = vec![
        row("A", "1", true, &[("stat_goals", StatValue::Number(1.0))]),
        row("B", "1", true, &[("stat_assists", StatValue::Number(2.0))]),
    ];
    let table = aggregate(&both);
    assert!(table.has_production);
    assert!(table.columns().iter().any(|c| c == "production_per_game"));
    // Missing components count as zero.
    assert_eq!(table.rows[0].production_per_game, Some(1.0));
    assert_eq!(table.rows[1].production_per_game, Some(1.0));
}

#[test]
fn starts_need_a_minutes_column() {
    let rows = vec![row("A", "1", true, &[("stat_goals", StatValue::Number(1.0))])];
    let table = aggregate(&rows);
    assert!(table.minutes_column.is_none());
    assert!(table.rows[0].est_starts.is_none());
    assert!(table.rows[0].start_rate.is_none());
    assert!(!table.columns().iter().any(|c| c == "est_starts"));
    assert_eq!(table.rows[0].win_rate, Some(1.0));
}

#[test]
fn starts_count_sixty_minutes_and_up() {
    let rows = vec![
        row("A", "1", true, &[("stat_min", text("60"))]),
        row("A", "2", true, &[("stat_min", text("59.5"))]),
        row("A", "3", false, &[("stat_min", StatValue::Missing)]),
        row("B", "1", true, &[("stat_min", text("12"))]),
    ];
    let table = aggregate(&rows);
    assert_eq!(table.minutes_column.as_deref(), Some("stat_min"));
    let a = &table.rows[0];
    assert_eq!(a.games_played, 3);
    assert_eq!(a.est_starts, Some(1));
    assert_eq!(a.team_wins_in, 2);
    let b = &table.rows[1];
    assert_eq!(b.est_starts, Some(0));
    assert_eq!(b.start_rate, Some(0.0));
}

#[test]
fn mixed_case_columns_are_normalized() {
    let rows = vec![
        row("A", "1", true, &[("stat_Goals", StatValue::Number(1.0))]),
        row("A", "2", true, &[("stat_goals", StatValue::Number(2.0))]),
    ];
    let table = aggregate(&rows);
    assert_eq!(table.stat_columns, vec!["stat_goals"]);
    assert_eq!(table.rows[0].stats.get("stat_goals"), Some(&3.0));
}

#[test]
fn disjoint_stat_columns_union_in_raw_table() {
    let rows = vec![
        row("A", "1", true, &[("stat_goals", text("1"))]),
        row("B", "1", true, &[("stat_saves", StatValue::Number(4.0))]),
    ];
    let lines = raw_table_rows(&rows);
    let header = &lines[0];
    let goals = header.iter().position(|c| c == "stat_goals").expect("goals column");
    let saves = header.iter().position(|c| c == "stat_saves").expect("saves column");
    assert_eq!(lines[1][goals], "1");
    assert_eq!(lines[1][saves], "");
    assert_eq!(lines[2][goals], "");
    assert_eq!(lines[2][saves], "4");
}

#[test]
fn season_table_lines_match_columns() {
    let rows = vec![
        row("A", "1", true, &[("stat_goals", text("2")), ("stat_assists", text("1"))]),
        row("A", "2", false, &[("stat_goals", text("0")), ("stat_minutesplayed", text("70"))]),
    ];
    let table = aggregate(&rows);
    let lines = season_table_rows(&table);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], table.columns());
    assert_eq!(lines[1].len(), lines[0].len());

    let key = SeasonKey {
        player_first: "A".to_string(),
        player_last: "Test".to_string(),
        team_name: "Stanford University".to_string(),
        team_seo: "stanford".to_string(),
        season: "2024".to_string(),
    };
    let a = table.find(&key).expect("row for key");
    assert_eq!(a.production_per_game, Some(1.25));
    assert_eq!(a.est_starts, Some(1));
    let col = |name: &str| lines[0].iter().position(|c| c == name).expect("column");
    assert_eq!(lines[1][col("games_played")], "2");
    assert_eq!(lines[1][col("stat_goals")], "2");
    assert_eq!(lines[1][col("win_rate")], "0.5");
}
