use std::path::PathBuf;

use chrono::NaiveTime;
use clap::Parser;

use flowfold_core::filter::TimeWindow;

#[derive(Parser)]
#[command(
    name = "flowfold",
    about = "Collapse a firewall traffic log into one row per unique flow",
    long_about = "flowfold - Deduplicate an exported firewall connection log.\n\n\
                  Loads a CSV export, applies optional port and time-window\n\
                  criteria, and prints one row per unique (source, destination,\n\
                  application, destination port) flow with the observed source\n\
                  port range.",
    version,
    styles = get_styles(),
)]
pub struct Cli {
    /// Path to the exported traffic log (must end in .csv)
    #[arg(value_name = "LOG", value_parser = parse_log_path)]
    pub log: PathBuf,

    /// Drop traffic to well-known infrastructure ports (DNS, DHCP, HTTP(S), ...)
    #[arg(long, default_value_t = false)]
    pub remove_infra_port: bool,

    /// Keep only traffic to this destination port (repeatable)
    #[arg(long = "destination-port", value_name = "PORT")]
    pub destination_ports: Vec<u16>,

    /// Start of the time window to exclude, 24-hour HH:MM
    #[arg(
        long,
        value_name = "HH:MM",
        value_parser = parse_clock_time,
        requires = "interval"
    )]
    pub date_time: Option<NaiveTime>,

    /// Length of the excluded window in minutes
    #[arg(
        long,
        value_name = "MINUTES",
        value_parser = clap::value_parser!(i64).range(1..),
        requires = "date_time"
    )]
    pub interval: Option<i64>,

    /// Output format
    #[arg(short, long, default_value = "table", value_parser = ["table", "json", "csv"])]
    pub format: String,

    /// Also write the result to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Folds the mutually-required --date-time/--interval pair into the
    /// core's tagged window option.
    pub fn window(&self) -> TimeWindow {
        match (self.date_time, self.interval) {
            (Some(start), Some(minutes)) => TimeWindow::Exclude { start, minutes },
            _ => TimeWindow::None,
        }
    }
}

fn parse_log_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(path),
        _ => Err(format!("'{s}' is not a .csv file")),
    }
}

fn parse_clock_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| format!("'{s}' is not a valid HH:MM time of day"))
}

fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(
            clap::builder::styling::AnsiColor::BrightCyan
                .on_default()
                .bold(),
        )
        .usage(
            clap::builder::styling::AnsiColor::BrightCyan
                .on_default()
                .bold(),
        )
        .literal(
            clap::builder::styling::AnsiColor::BrightGreen
                .on_default()
                .bold(),
        )
        .placeholder(
            clap::builder::styling::AnsiColor::BrightWhite
                .on_default()
                .dimmed(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_must_end_in_csv() {
        assert!(parse_log_path("traffic.csv").is_ok());
        assert!(parse_log_path("traffic.log").is_err());
        assert!(parse_log_path("traffic").is_err());
    }

    #[test]
    fn test_clock_time_parses_hh_mm() {
        assert_eq!(
            parse_clock_time("04:52").unwrap(),
            NaiveTime::from_hms_opt(4, 52, 0).unwrap()
        );
        assert!(parse_clock_time("4:5x").is_err());
        assert!(parse_clock_time("25:00").is_err());
    }

    #[test]
    fn test_date_time_requires_interval() {
        let result = Cli::try_parse_from(["flowfold", "traffic.csv", "--date-time", "04:52"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["flowfold", "traffic.csv", "--interval", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_window_folds_into_tagged_option() {
        let cli = Cli::try_parse_from([
            "flowfold",
            "traffic.csv",
            "--date-time",
            "04:52",
            "--interval",
            "4",
        ])
        .unwrap();
        assert_eq!(
            cli.window(),
            TimeWindow::Exclude {
                start: NaiveTime::from_hms_opt(4, 52, 0).unwrap(),
                minutes: 4,
            }
        );

        let cli = Cli::try_parse_from(["flowfold", "traffic.csv"]).unwrap();
        assert_eq!(cli.window(), TimeWindow::None);
    }

    #[test]
    fn test_interval_must_be_positive() {
        let result = Cli::try_parse_from([
            "flowfold",
            "traffic.csv",
            "--date-time",
            "04:52",
            "--interval",
            "0",
        ]);
        assert!(result.is_err());
    }
}
