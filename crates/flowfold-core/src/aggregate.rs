use std::collections::HashMap;

use crate::models::{FlowSummary, GroupKey, TrafficRecord};

// ---------------------------------------------------------------------------
// FlowFolder: per-key accumulation in first-seen order
// ---------------------------------------------------------------------------

/// Folds a filtered record sequence into one summary per identity key.
///
/// Groups live in a `Vec` in first-seen order, with a key-to-slot map on the
/// side so each incoming record updates its group without rescanning.
pub struct FlowFolder {
    index: HashMap<GroupKey, usize>,
    groups: Vec<GroupState>,
}

struct GroupState {
    key: GroupKey,
    ip_protocol: String,
    min_source_port: u16,
    max_source_port: u16,
}

impl FlowFolder {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub fn observe(&mut self, record: &TrafficRecord) {
        let key = record.group_key();
        match self.index.get(&key) {
            Some(&slot) => {
                // min and max tracked independently so the span grows at
                // either end regardless of arrival order
                let group = &mut self.groups[slot];
                group.min_source_port = group.min_source_port.min(record.source_port);
                group.max_source_port = group.max_source_port.max(record.source_port);
            }
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(GroupState {
                    key,
                    ip_protocol: record.ip_protocol.clone(),
                    min_source_port: record.source_port,
                    max_source_port: record.source_port,
                });
            }
        }
    }

    /// Consumes the folder and returns the summaries in first-seen key order.
    pub fn finalize(self) -> Vec<FlowSummary> {
        self.groups.into_iter().map(GroupState::into_summary).collect()
    }
}

impl Default for FlowFolder {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupState {
    fn into_summary(self) -> FlowSummary {
        let range = format!("{} - {}", self.min_source_port, self.max_source_port);
        FlowSummary {
            source_address: self.key.source_address,
            destination_address: self.key.destination_address,
            application: self.key.application,
            destination_port: self.key.destination_port,
            ip_protocol: self.ip_protocol,
            min_source_port: self.min_source_port,
            max_source_port: self.max_source_port,
            range,
        }
    }
}

/// Single-pass fold over an ordered record sequence. Empty input yields an
/// empty output, not an error.
pub fn aggregate(records: &[TrafficRecord]) -> Vec<FlowSummary> {
    let mut folder = FlowFolder::new();
    for record in records {
        folder.observe(record);
    }
    let summaries = folder.finalize();
    tracing::info!(records = records.len(), flows = summaries.len(), "aggregation complete");
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn record(source: &str, app: &str, source_port: u16, protocol: &str) -> TrafficRecord {
        TrafficRecord {
            generate_time: NaiveTime::from_hms_opt(4, 52, 0).unwrap(),
            source_address: source.into(),
            destination_address: "10.0.0.2".into(),
            application: app.into(),
            source_port,
            destination_port: 443,
            ip_protocol: protocol.into(),
        }
    }

    #[test]
    fn test_grouping_and_range() {
        let records = vec![
            record("10.0.0.1", "HTTP", 1025, "tcp"),
            record("10.0.0.1", "HTTP", 4000, "udp"),
        ];
        let summaries = aggregate(&records);
        assert_eq!(summaries.len(), 1);

        let flow = &summaries[0];
        assert_eq!(flow.min_source_port, 1025);
        assert_eq!(flow.max_source_port, 4000);
        assert_eq!(flow.range, "1025 - 4000");
        // protocol comes from the first record seen for the key
        assert_eq!(flow.ip_protocol, "tcp");
    }

    #[test]
    fn test_min_max_independent_of_arrival_order() {
        let records = vec![
            record("10.0.0.1", "HTTP", 4000, "tcp"),
            record("10.0.0.1", "HTTP", 1025, "tcp"),
            record("10.0.0.1", "HTTP", 2000, "tcp"),
        ];
        let summaries = aggregate(&records);
        assert_eq!(summaries[0].range, "1025 - 4000");
    }

    #[test]
    fn test_single_record_range_collapses() {
        let summaries = aggregate(&[record("10.0.0.1", "ssh", 50000, "tcp")]);
        assert_eq!(summaries[0].range, "50000 - 50000");
    }

    #[test]
    fn test_first_seen_order_is_stable() {
        let records = vec![
            record("10.0.0.1", "HTTP", 2000, "tcp"),
            record("10.0.0.9", "dns", 3000, "udp"),
            record("10.0.0.1", "HTTP", 1000, "tcp"),
        ];
        let summaries = aggregate(&records);
        let sources: Vec<&str> = summaries.iter().map(|s| s.source_address.as_str()).collect();
        assert_eq!(sources, vec!["10.0.0.1", "10.0.0.9"]);
    }

    #[test]
    fn test_aggregation_is_idempotent_on_collapsed_input() {
        let records = vec![
            record("10.0.0.1", "HTTP", 1025, "tcp"),
            record("10.0.0.9", "dns", 33201, "udp"),
        ];
        let first = aggregate(&records);

        let reprojected: Vec<TrafficRecord> = first
            .iter()
            .map(|s| TrafficRecord {
                generate_time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
                source_address: s.source_address.clone(),
                destination_address: s.destination_address.clone(),
                application: s.application.clone(),
                source_port: s.min_source_port,
                destination_port: s.destination_port,
                ip_protocol: s.ip_protocol.clone(),
            })
            .collect();

        assert_eq!(aggregate(&reprojected), first);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }
}
