use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use physio_terminal::artifacts::RiskModel;
use physio_terminal::dataset;
use physio_terminal::trainer::{self, TrainConfig};

fn main() -> Result<()> {
    let out_path =
        parse_path_arg("--out").unwrap_or_else(|| PathBuf::from("assets/injury_model_v1.json"));

    let rows = if let Some(csv_path) = parse_path_arg("--csv") {
        let raw = fs::read_to_string(&csv_path)
            .with_context(|| format!("read {}", csv_path.display()))?;
        let report = dataset::parse_csv(&raw)?;
        if report.skipped > 0 {
            eprintln!("[WARN] skipped {} malformed rows", report.skipped);
        }
        report.rows
    } else {
        let db_path = parse_path_arg("--db")
            .or_else(dataset::default_db_path)
            .context("unable to resolve sqlite path; pass --csv or --db")?;
        let conn = dataset::open_db(&db_path)?;
        dataset::load_rows(&conn)?
    };
    if rows.is_empty() {
        return Err(anyhow!("no training rows; run ingest_dataset first"));
    }
    eprintln!("[INFO] training on {} rows", rows.len());

    let mut cfg = TrainConfig::default();
    if let Some(trees) = parse_usize_arg("--trees") {
        cfg.n_trees = trees.max(1);
    }
    if let Some(depth) = parse_usize_arg("--depth") {
        cfg.max_depth = depth.clamp(1, 8);
    }
    if let Some(seed) = parse_usize_arg("--seed") {
        cfg.seed = seed as u64;
    }

    let report = trainer::train(&rows, &cfg)?;
    eprintln!(
        "[INFO] resampled {} -> {} rows",
        report.rows_before_resample, report.rows_after_resample
    );

    // Round-trip through the loader's validation before writing anything.
    let model = RiskModel::from_artifact(report.artifact.clone(), "candidate".to_string())
        .context("trained artifact failed validation")?;

    println!("Model Performance:");
    println!("Accuracy:  {:.4}", report.metrics.accuracy);
    println!("Precision: {:.4}", report.metrics.precision);
    println!("Recall:    {:.4}", report.metrics.recall);
    println!("F1 Score:  {:.4}", report.metrics.f1);

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let raw = serde_json::to_string_pretty(&report.artifact).context("serialize artifact")?;
    fs::write(&out_path, raw).with_context(|| format!("write {}", out_path.display()))?;

    println!(
        "injury model written: {} ({} features)",
        out_path.display(),
        model.feature_names().len()
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

fn parse_usize_arg(name: &str) -> Option<usize> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<usize>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<usize>()
        {
            return Some(v);
        }
    }
    None
}
