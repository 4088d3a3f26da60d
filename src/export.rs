use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::aggregate::{SeasonTable, stat_columns};
use crate::boxscore::{PlayerGameRow, format_number, stat_text};

pub const RAW_COLUMNS: &[&str] = &[
    "game_id",
    "game_date",
    "season",
    "player_first",
    "player_last",
    "player_num",
    "position",
    "stat_type",
    "category",
    "team_name",
    "team_seo",
    "is_home",
    "team_won",
    "team_record_at_game",
];

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub raw_path: PathBuf,
    /// `(rows, columns)` excluding the header.
    pub raw_shape: (usize, usize),
    pub season_path: Option<PathBuf>,
    pub season_shape: (usize, usize),
    pub workbook_path: Option<PathBuf>,
}

/// Header plus one line per player appearance. Stat columns are the union
/// across all rows; a row without a column gets an empty cell.
pub fn raw_table_rows(rows: &[PlayerGameRow]) -> Vec<Vec<String>> {
    let stat_cols = stat_columns(rows);
    let mut header: Vec<String> = RAW_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(stat_cols.iter().cloned());

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(header);
    for row in rows {
        let mut cells = vec![
            row.game_id.clone(),
            row.game_date.clone(),
            row.season.clone(),
            row.player_first.clone(),
            row.player_last.clone(),
            row.player_num.clone(),
            row.position.clone(),
            row.stat_type.clone(),
            row.category.clone(),
            row.team_name.clone(),
            row.team_seo.clone(),
            row.is_home.to_string(),
            row.team_won.to_string(),
            row.team_record_at_game.clone(),
        ];
        cells.extend(stat_cols.iter().map(|col| stat_text(row, col)));
        out.push(cells);
    }
    out
}

pub fn season_table_rows(table: &SeasonTable) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(table.rows.len() + 1);
    out.push(table.columns());
    for row in &table.rows {
        let mut cells: Vec<String> = row.key.cells().iter().map(|c| c.to_string()).collect();
        cells.extend(table.stat_columns.iter().map(|col| {
            row.stats
                .get(col)
                .map(|n| format_number(*n))
                .unwrap_or_default()
        }));
        cells.push(row.games_played.to_string());
        cells.push(row.team_wins_in.to_string());
        if table.minutes_column.is_some() {
            cells.push(opt_to_string(row.est_starts));
            cells.push(opt_to_string(row.start_rate));
        }
        cells.push(opt_to_string(row.win_rate));
        if table.has_production {
            cells.push(opt_to_string(row.production_per_game));
        }
        out.push(cells);
    }
    out
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn shape(rows: &[Vec<String>]) -> (usize, usize) {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    (rows.len().saturating_sub(1), cols)
}

pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed creating {}", path.display()))?;
    for row in rows {
        writer
            .write_record(row)
            .with_context(|| format!("failed writing row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed flushing {}", path.display()))?;
    Ok(())
}

pub fn write_workbook(
    path: &Path,
    raw_rows: &[Vec<String>],
    season_rows: Option<&[Vec<String>]>,
) -> Result<()> {
    ensure_parent(path)?;
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("RawGames")?;
        write_rows(sheet, raw_rows)?;
    }
    if let Some(season_rows) = season_rows {
        let sheet = workbook.add_worksheet();
        sheet.set_name("PlayerSeasons")?;
        write_rows(sheet, season_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = cell_index(row_idx, col_idx)?;
            worksheet
                .write_string(r, c, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn cell_index(row_idx: usize, col_idx: usize) -> Result<(u32, u16)> {
    let r = u32::try_from(row_idx).with_context(|| format!("row {row_idx} out of range"))?;
    let c = u16::try_from(col_idx).with_context(|| format!("column {col_idx} out of range"))?;
    Ok((r, c))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed creating directory {}", dir.display()))?;
    }
    Ok(())
}

/// Writes the raw table, and the season table when one is given, to CSV;
/// optionally both into a single workbook as well.
pub fn export_tables(
    raw_path: &Path,
    rows: &[PlayerGameRow],
    season: Option<(&Path, &SeasonTable)>,
    workbook_path: Option<&Path>,
) -> Result<ExportReport> {
    let raw_rows = raw_table_rows(rows);
    write_csv(raw_path, &raw_rows)?;
    info!(path = %raw_path.display(), rows = rows.len(), "raw game rows saved");

    let mut season_path = None;
    let mut season_rows = None;
    if let Some((path, table)) = season {
        let lines = season_table_rows(table);
        write_csv(path, &lines)?;
        info!(path = %path.display(), rows = table.len(), "player-season rows saved");
        season_path = Some(path.to_path_buf());
        season_rows = Some(lines);
    }

    if let Some(path) = workbook_path {
        write_workbook(path, &raw_rows, season_rows.as_deref())?;
        info!(path = %path.display(), "workbook saved");
    }

    Ok(ExportReport {
        raw_path: raw_path.to_path_buf(),
        raw_shape: shape(&raw_rows),
        season_path,
        season_shape: season_rows.as_deref().map(shape).unwrap_or((0, 0)),
        workbook_path: workbook_path.map(Path::to_path_buf),
    })
}
