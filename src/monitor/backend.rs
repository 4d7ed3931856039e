// SPDX-License-Identifier: GPL-3.0-only
use std::collections::BTreeSet;

use serde::Serialize;

/// Position of a monitor in the current enumeration
pub type MonitorIndex = usize;

/// Index as given on the command line. Negative values are out of range.
pub type RequestedIndex = i64;

/// One entry of the monitor info list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MonitorRecord {
    Ready(MonitorInfo),
    Failed { id: MonitorIndex, error: String },
}

#[cfg(test)]
impl MonitorRecord {
    pub fn id(&self) -> MonitorIndex {
        match self {
            Self::Ready(info) => info.id,
            Self::Failed { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorInfo {
    pub id: MonitorIndex,
    pub name: String,
    pub brightness: u16,
    pub supported_codes: BTreeSet<u8>,
}
