use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TrafficRecord: the normalized output of the load layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRecord {
    /// Time of day the firewall logged the connection. The date portion of
    /// the exported timestamp is discarded at load time.
    pub generate_time: NaiveTime,
    pub source_address: String,
    pub destination_address: String,
    pub application: String,
    pub source_port: u16,
    pub destination_port: u16,
    pub ip_protocol: String,
}

// ---------------------------------------------------------------------------
// GroupKey: identity of one aggregated flow
// ---------------------------------------------------------------------------

/// Records with equal keys fold into the same summary regardless of
/// timestamp, source port, or protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub source_address: String,
    pub destination_address: String,
    pub application: String,
    pub destination_port: u16,
}

// ---------------------------------------------------------------------------
// FlowSummary: one output row per unique GroupKey
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub source_address: String,
    pub destination_address: String,
    pub application: String,
    pub destination_port: u16,
    /// Protocol of the first record seen for this key; later records in the
    /// same group never overwrite it.
    pub ip_protocol: String,
    pub min_source_port: u16,
    pub max_source_port: u16,
    /// Display form of the observed source-port span, `"<min> - <max>"`.
    pub range: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl TrafficRecord {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            source_address: self.source_address.clone(),
            destination_address: self.destination_address.clone(),
            application: self.application.clone(),
            destination_port: self.destination_port,
        }
    }
}
