//! Console rendering of the run report

use anyhow::Result;
use colored::Colorize;
use tabled::{Table, Tabled};

use msmt_core::application::RunReport;

#[derive(Tabled)]
struct ShellRow {
    #[tabled(rename = "b-value")]
    bvalue: String,
    #[tabled(rename = "GM")]
    gm: String,
    #[tabled(rename = "CSF")]
    csf: String,
    #[tabled(rename = "WM (zonal SH)")]
    wm: String,
}

fn rows(report: &RunReport) -> Vec<ShellRow> {
    report
        .responses
        .shells()
        .iter()
        .map(|r| ShellRow {
            bvalue: r.shell.label().to_string(),
            gm: format!("{:.3}", r.gm),
            csf: format!("{:.3}", r.csf),
            wm: r
                .wm
                .iter()
                .map(|c| format!("{:.3}", c))
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect()
}

/// Human-readable summary
pub fn render_summary(report: &RunReport) -> String {
    let mut out = Table::new(rows(report)).to_string();
    out.push('\n');

    let counts: Vec<String> = report
        .voxel_counts
        .iter()
        .map(|v| format!("{} {}", v.tissue, v.count))
        .collect();
    out.push_str(&format!("{} {}\n", "Voxels:".bold(), counts.join(", ")));

    for path in &report.outputs {
        out.push_str(&format!("{} {}\n", "Wrote".green(), path.display()));
    }
    for warning in &report.warnings {
        out.push_str(&format!("{} {}\n", "Warning:".yellow().bold(), warning));
    }
    out
}

pub fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", render_summary(report));
    }
    Ok(())
}
