use std::collections::HashSet;

use chrono::{Duration, NaiveTime};

use crate::error::PipelineError;
use crate::models::TrafficRecord;

/// Destination ports carrying routine infrastructure traffic (DNS, DHCP,
/// HTTP(S), Kerberos, NTP, RPC, NetBIOS, LDAP, SMB, SEP), eligible for bulk
/// removal.
pub const INFRA_PORTS: [u16; 15] = [
    53, 67, 68, 80, 88, 123, 135, 137, 138, 139, 389, 443, 445, 2967, 8014,
];

pub fn is_infra_port(port: u16) -> bool {
    INFRA_PORTS.contains(&port)
}

// ---------------------------------------------------------------------------
// TimeWindow: tagged window option
// ---------------------------------------------------------------------------

/// Time-of-day window applied to `generate_time`.
///
/// `Exclude` drops every record inside the inclusive window
/// `[start, start + minutes]` and keeps only traffic outside it. A window
/// whose end passes midnight wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    None,
    Exclude { start: NaiveTime, minutes: i64 },
}

impl TimeWindow {
    fn validate(&self) -> Result<(), PipelineError> {
        match *self {
            TimeWindow::Exclude { minutes, .. } if minutes < 1 => {
                Err(PipelineError::Window { minutes })
            }
            _ => Ok(()),
        }
    }

    fn excludes(&self, time: NaiveTime) -> bool {
        match *self {
            TimeWindow::None => false,
            TimeWindow::Exclude { start, minutes } => {
                // a window of a full day or longer covers every time of day
                if minutes >= 24 * 60 {
                    return true;
                }
                // NaiveTime addition wraps at midnight
                let end = start + Duration::minutes(minutes);
                if end >= start {
                    time >= start && time <= end
                } else {
                    time >= start || time <= end
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FilterOptions: the full criteria set, validated before use
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Drop records whose destination port is in `INFRA_PORTS`.
    pub drop_infra_ports: bool,
    /// When non-empty, keep only records destined for one of these ports.
    pub destination_ports: HashSet<u16>,
    pub window: TimeWindow,
}

/// Applies the criteria in fixed order: infra-port removal, then the
/// destination-port allow-list, then time-window exclusion. Absent options
/// pass the sequence through unchanged; input order is preserved.
pub fn filter(
    records: Vec<TrafficRecord>,
    options: &FilterOptions,
) -> Result<Vec<TrafficRecord>, PipelineError> {
    options.window.validate()?;

    let before = records.len();
    let mut kept = records;

    if options.drop_infra_ports {
        kept.retain(|r| !is_infra_port(r.destination_port));
        tracing::debug!(kept = kept.len(), "infra-port stage");
    }

    if !options.destination_ports.is_empty() {
        kept.retain(|r| options.destination_ports.contains(&r.destination_port));
        tracing::debug!(kept = kept.len(), "destination-port stage");
    }

    if options.window != TimeWindow::None {
        kept.retain(|r| !options.window.excludes(r.generate_time));
        tracing::debug!(kept = kept.len(), "time-window stage");
    }

    tracing::info!(before, after = kept.len(), "filtering complete");
    Ok(kept)
}
