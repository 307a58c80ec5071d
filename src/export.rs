use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::artifacts::RiskModel;
use crate::risk;
use crate::roster::Roster;
use crate::state::position_label;

pub struct ExportReport {
    pub path: PathBuf,
    pub players: usize,
    pub factors: usize,
    pub errors: Vec<String>,
}

/// Write the current roster's assessments to an xlsx workbook: one sheet
/// of per-player results, one sheet of triggered risk factors.
pub fn export_roster_report(
    path: &Path,
    roster: &Roster,
    model: &RiskModel,
) -> Result<ExportReport> {
    let mut errors = Vec::new();

    let mut roster_rows = vec![vec![
        "Player".to_string(),
        "Age".to_string(),
        "Games".to_string(),
        "Minutes".to_string(),
        "Minutes/90s".to_string(),
        "Shots".to_string(),
        "Injuries".to_string(),
        "Severe Injuries".to_string(),
        "Position".to_string(),
        "Risk Score".to_string(),
        "Probability".to_string(),
        "Risk Level".to_string(),
        "Flagged".to_string(),
    ]];

    let mut factor_rows = vec![vec![
        "Player".to_string(),
        "Icon".to_string(),
        "Description".to_string(),
        "Severity".to_string(),
    ]];

    for entry in roster.entries() {
        let assessment = match risk::assess(model, &entry.record) {
            Ok(assessment) => assessment,
            Err(err) => {
                errors.push(format!("{}: {err}", entry.name));
                continue;
            }
        };

        let record = &entry.record;
        roster_rows.push(vec![
            entry.name.clone(),
            record.age.to_string(),
            record.games.to_string(),
            format!("{:.0}", record.minutes),
            format!("{:.1}", record.minutes_90s),
            record.shots.to_string(),
            record.n_injuries.to_string(),
            record.n_severe_injuries.to_string(),
            position_label(record.position).to_string(),
            format!("{:.1}", assessment.injury_risk_score),
            format!("{:.4}", assessment.probability),
            assessment.level.label().to_string(),
            if assessment.is_injured { "yes" } else { "no" }.to_string(),
        ]);

        for factor in &assessment.factors {
            factor_rows.push(vec![
                entry.name.clone(),
                factor.icon.to_string(),
                factor.description.clone(),
                factor.severity.label().to_string(),
            ]);
        }
    }

    let players = roster_rows.len().saturating_sub(1);
    let factors = factor_rows.len().saturating_sub(1);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Roster")?;
        write_rows(sheet, &roster_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("RiskFactors")?;
        write_rows(sheet, &factor_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing report to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        players,
        factors,
        errors,
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_the_preset_roster() {
        let model = RiskModel::load().expect("model artifact available");
        let roster = Roster::preset();
        let path = std::env::temp_dir().join(format!(
            "physio_terminal_report_{}.xlsx",
            std::process::id()
        ));

        let report = export_roster_report(&path, &roster, &model).unwrap();
        assert_eq!(report.players, 5);
        assert!(report.factors > 0);
        assert!(report.errors.is_empty());
        assert!(path.exists());

        let _ = std::fs::remove_file(&path);
    }
}
