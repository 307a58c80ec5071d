use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub const CACHE_DIR: &str = "physio_terminal";
const DB_FILE: &str = "training_players.sqlite";

/// One row of the training dataset: the raw features from §3 plus the
/// label. `player_name` identifies the row and is dropped before fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub player_name: String,
    pub age: f64,
    pub games: f64,
    pub minutes: f64,
    pub minutes_90s: f64,
    pub shots: f64,
    pub n_injuries: f64,
    pub n_severe_injuries: f64,
    pub position_df: f64,
    pub position_fw: f64,
    pub position_gk: f64,
    pub position_mf: f64,
    pub currently_injured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CsvReport {
    pub rows: Vec<DatasetRow>,
    pub skipped: usize,
}

pub fn default_db_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(DB_FILE))
}

fn cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS players (
            player_name TEXT PRIMARY KEY,
            age REAL NOT NULL,
            games REAL NOT NULL,
            minutes REAL NOT NULL,
            minutes_90s REAL NOT NULL,
            shots REAL NOT NULL,
            n_injuries REAL NOT NULL,
            n_severe_injuries REAL NOT NULL,
            position_df REAL NOT NULL,
            position_fw REAL NOT NULL,
            position_gk REAL NOT NULL,
            position_mf REAL NOT NULL,
            currently_injured INTEGER NOT NULL
        );
        "#,
    )
    .context("init players schema")?;
    Ok(())
}

pub fn upsert_rows(conn: &mut Connection, rows: &[DatasetRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin upsert transaction")?;
    let mut upserted = 0usize;
    {
        let mut stmt = tx
            .prepare(
                r#"
                INSERT INTO players (
                    player_name, age, games, minutes, minutes_90s, shots,
                    n_injuries, n_severe_injuries,
                    position_df, position_fw, position_gk, position_mf,
                    currently_injured
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(player_name) DO UPDATE SET
                    age = excluded.age,
                    games = excluded.games,
                    minutes = excluded.minutes,
                    minutes_90s = excluded.minutes_90s,
                    shots = excluded.shots,
                    n_injuries = excluded.n_injuries,
                    n_severe_injuries = excluded.n_severe_injuries,
                    position_df = excluded.position_df,
                    position_fw = excluded.position_fw,
                    position_gk = excluded.position_gk,
                    position_mf = excluded.position_mf,
                    currently_injured = excluded.currently_injured
                "#,
            )
            .context("prepare player upsert")?;

        for row in rows {
            stmt.execute(params![
                row.player_name,
                row.age,
                row.games,
                row.minutes,
                row.minutes_90s,
                row.shots,
                row.n_injuries,
                row.n_severe_injuries,
                row.position_df,
                row.position_fw,
                row.position_gk,
                row.position_mf,
                row.currently_injured as i64,
            ])
            .with_context(|| format!("upsert player {}", row.player_name))?;
            upserted += 1;
        }
    }
    tx.commit().context("commit upsert transaction")?;
    Ok(upserted)
}

pub fn load_rows(conn: &Connection) -> Result<Vec<DatasetRow>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT player_name, age, games, minutes, minutes_90s, shots,
                   n_injuries, n_severe_injuries,
                   position_df, position_fw, position_gk, position_mf,
                   currently_injured
            FROM players
            ORDER BY player_name
            "#,
        )
        .context("prepare players select")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(DatasetRow {
                player_name: row.get(0)?,
                age: row.get(1)?,
                games: row.get(2)?,
                minutes: row.get(3)?,
                minutes_90s: row.get(4)?,
                shots: row.get(5)?,
                n_injuries: row.get(6)?,
                n_severe_injuries: row.get(7)?,
                position_df: row.get(8)?,
                position_fw: row.get(9)?,
                position_gk: row.get(10)?,
                position_mf: row.get(11)?,
                currently_injured: row.get::<_, i64>(12)? != 0,
            })
        })
        .context("query players")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read player row")?);
    }
    Ok(out)
}

/// Header-mapped CSV parse. Rows with missing columns or unparseable
/// numbers are skipped and counted, not fatal; the source files are
/// scraped and occasionally ragged.
pub fn parse_csv(raw: &str) -> Result<CsvReport> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().context("csv has no header row")?;
    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_ascii_lowercase())
        .collect();

    let idx = |name: &str| -> Result<usize> {
        columns
            .iter()
            .position(|c| c.as_str() == name)
            .with_context(|| format!("csv is missing column {name:?}"))
    };

    let name_idx = idx("player_name")?;
    let label_idx = idx("currently_injured")?;
    let numeric = [
        idx("age")?,
        idx("games")?,
        idx("minutes")?,
        idx("minutes_90s")?,
        idx("shots")?,
        idx("n_injuries")?,
        idx("n_severe_injuries")?,
        idx("position_df")?,
        idx("position_fw")?,
        idx("position_gk")?,
        idx("position_mf")?,
    ];

    let mut report = CsvReport::default();
    for line in lines {
        let cells: Vec<&str> = line.split(',').map(|c| c.trim().trim_matches('"')).collect();
        if cells.len() != columns.len() {
            report.skipped += 1;
            continue;
        }

        let mut values = [0.0f64; 11];
        let mut bad = false;
        for (slot, &col) in values.iter_mut().zip(&numeric) {
            match cells[col].parse::<f64>() {
                Ok(v) if v.is_finite() => *slot = v,
                _ => {
                    bad = true;
                    break;
                }
            }
        }
        let Some(label) = parse_label(cells[label_idx]) else {
            report.skipped += 1;
            continue;
        };
        if bad {
            report.skipped += 1;
            continue;
        }

        report.rows.push(DatasetRow {
            player_name: cells[name_idx].to_string(),
            age: values[0],
            games: values[1],
            minutes: values[2],
            minutes_90s: values[3],
            shots: values[4],
            n_injuries: values[5],
            n_severe_injuries: values[6],
            position_df: values[7],
            position_fw: values[8],
            position_gk: values[9],
            position_mf: values[10],
            currently_injured: label,
        });
    }

    Ok(report)
}

fn parse_label(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
player_name,age,games,minutes,minutes_90s,shots,n_injuries,n_severe_injuries,position_DF,position_FW,position_GK,position_MF,currently_injured
A. Stone,24,20,1700,18.9,22,1,0,0,1,0,0,0
R. Vega,31,12,980,10.9,6,4,2,1,0,0,0,1
broken row,31,12
L. Park,29,30,2700,30.0,3,0,0,0,0,1,0,0
M. Holt,abc,12,980,10.9,6,4,2,1,0,0,0,1
";

    #[test]
    fn parses_good_rows_and_counts_bad_ones() {
        let report = parse_csv(SAMPLE).unwrap();
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.rows[0].player_name, "A. Stone");
        assert!(!report.rows[0].currently_injured);
        assert!(report.rows[1].currently_injured);
        assert_eq!(report.rows[1].n_severe_injuries, 2.0);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = parse_csv("player_name,age\nA,24\n").unwrap_err();
        assert!(err.to_string().contains("missing column"));
    }

    #[test]
    fn roundtrips_through_sqlite() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let report = parse_csv(SAMPLE).unwrap();
        let upserted = upsert_rows(&mut conn, &report.rows).unwrap();
        assert_eq!(upserted, 3);

        let loaded = load_rows(&conn).unwrap();
        assert_eq!(loaded.len(), 3);
        let vega = loaded
            .iter()
            .find(|r| r.player_name == "R. Vega")
            .expect("row present");
        assert!(vega.currently_injured);
        assert_eq!(vega.position_df, 1.0);
    }

    #[test]
    fn upsert_replaces_existing_players() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let mut rows = parse_csv(SAMPLE).unwrap().rows;
        upsert_rows(&mut conn, &rows).unwrap();
        rows[0].n_injuries = 5.0;
        upsert_rows(&mut conn, &rows).unwrap();

        let loaded = load_rows(&conn).unwrap();
        assert_eq!(loaded.len(), 3);
        let stone = loaded
            .iter()
            .find(|r| r.player_name == "A. Stone")
            .unwrap();
        assert_eq!(stone.n_injuries, 5.0);
    }
}
