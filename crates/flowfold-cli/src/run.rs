use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};

use flowfold_core::aggregate;
use flowfold_core::filter::{self, FilterOptions};
use flowfold_core::load;
use flowfold_core::models::FlowSummary;

use crate::cli::Cli;

const COLUMNS: [&str; 6] = [
    "Source address",
    "Destination address",
    "Application",
    "Destination Port",
    "IP Protocol",
    "Range",
];

pub fn run(cli: Cli) -> Result<()> {
    // 1. Load
    println!(
        "  {} {}",
        console::style("[1/3] loading").cyan().bold(),
        cli.log.display(),
    );

    let records = load::load_path(&cli.log)
        .with_context(|| format!("failed to load {}", cli.log.display()))?;

    println!(
        "        {} records",
        console::style(records.len()).green().bold(),
    );

    // 2. Filter
    println!("  {}", console::style("[2/3] filtering").cyan().bold());

    let options = FilterOptions {
        drop_infra_ports: cli.remove_infra_port,
        destination_ports: cli.destination_ports.iter().copied().collect::<HashSet<_>>(),
        window: cli.window(),
    };

    let filtered = filter::filter(records, &options)?;

    println!(
        "        {} records retained",
        console::style(filtered.len()).green().bold(),
    );

    // 3. Aggregate
    println!("  {}", console::style("[3/3] aggregating").cyan().bold());

    let summaries = aggregate::aggregate(&filtered);

    println!(
        "        {} unique flows",
        console::style(summaries.len()).green().bold(),
    );
    println!();

    if summaries.is_empty() {
        println!(
            "  {} no data to display",
            console::style("note:").yellow().bold(),
        );
        return Ok(());
    }

    let rendered = render(&summaries, &cli.format)?;
    println!("{rendered}");

    if let Some(ref path) = cli.output {
        fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!();
        println!(
            "  {} {}",
            console::style("report ->").green().bold(),
            path.display(),
        );
    }

    Ok(())
}

fn render(summaries: &[FlowSummary], format: &str) -> Result<String> {
    match format {
        "json" => serde_json::to_string_pretty(summaries).context("failed to serialize flows"),
        "csv" => render_csv(summaries),
        _ => Ok(render_table(summaries)),
    }
}

fn render_csv(summaries: &[FlowSummary]) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        wtr.write_record(COLUMNS)?;
        for flow in summaries {
            let destination_port = flow.destination_port.to_string();
            wtr.write_record([
                flow.source_address.as_str(),
                flow.destination_address.as_str(),
                flow.application.as_str(),
                destination_port.as_str(),
                flow.ip_protocol.as_str(),
                flow.range.as_str(),
            ])?;
        }
        wtr.flush()?;
    }
    let text = String::from_utf8(buf).context("csv output was not valid utf-8")?;
    Ok(text.trim_end().to_string())
}

fn render_table(summaries: &[FlowSummary]) -> String {
    let rows: Vec<[String; 6]> = summaries
        .iter()
        .map(|flow| {
            [
                flow.source_address.clone(),
                flow.destination_address.clone(),
                flow.application.clone(),
                flow.destination_port.to_string(),
                flow.ip_protocol.clone(),
                flow.range.clone(),
            ]
        })
        .collect();

    let mut widths: [usize; 6] = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for (&width, name) in widths.iter().zip(COLUMNS) {
        let _ = write!(out, "  {name:<width$}");
    }
    out.push('\n');
    for width in widths {
        let _ = write!(out, "  {:-<width$}", "");
    }
    for row in &rows {
        out.push('\n');
        for (&width, cell) in widths.iter().zip(row) {
            let _ = write!(out, "  {cell:<width$}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> FlowSummary {
        FlowSummary {
            source_address: "10.0.0.1".into(),
            destination_address: "10.0.0.2".into(),
            application: "web-browsing".into(),
            destination_port: 443,
            ip_protocol: "tcp".into(),
            min_source_port: 1025,
            max_source_port: 4000,
            range: "1025 - 4000".into(),
        }
    }

    #[test]
    fn test_render_csv_row_shape() {
        let text = render_csv(&[summary()]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Source address,Destination address,Application,Destination Port,IP Protocol,Range"
        );
        assert_eq!(
            lines.next().unwrap(),
            "10.0.0.1,10.0.0.2,web-browsing,443,tcp,1025 - 4000"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_render_table_contains_row_values() {
        let text = render_table(&[summary()]);
        assert!(text.contains("Source address"));
        assert!(text.contains("10.0.0.1"));
        assert!(text.contains("1025 - 4000"));
    }

    #[test]
    fn test_render_json_round_trips() {
        let text = render(&[summary()], "json").unwrap();
        let parsed: Vec<FlowSummary> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![summary()]);
    }
}
