use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use physio_terminal::dataset;

fn main() -> Result<()> {
    let csv_path = parse_path_arg("--csv")
        .ok_or_else(|| anyhow!("usage: ingest_dataset --csv <file> [--db <file>]"))?;
    let db_path = parse_path_arg("--db")
        .or_else(dataset::default_db_path)
        .context("unable to resolve sqlite path; pass --db")?;

    let raw = fs::read_to_string(&csv_path)
        .with_context(|| format!("read {}", csv_path.display()))?;
    let report = dataset::parse_csv(&raw)?;
    if report.rows.is_empty() {
        return Err(anyhow!("no usable rows in {}", csv_path.display()));
    }
    if report.skipped > 0 {
        eprintln!("[WARN] skipped {} malformed rows", report.skipped);
    }
    eprintln!("[INFO] parsed {} rows", report.rows.len());

    let mut conn = dataset::open_db(&db_path)?;
    let upserted = dataset::upsert_rows(&mut conn, &report.rows)?;

    println!(
        "ingested {} players into {}",
        upserted,
        db_path.display()
    );
    Ok(())
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && !raw.trim().is_empty()
        {
            return Some(PathBuf::from(raw.trim()));
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next.trim()));
        }
    }
    None
}
