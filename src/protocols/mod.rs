// SPDX-License-Identifier: GPL-3.0-only
//! Monitor control transports
//!
//! The bridge never speaks DDC/CI itself. It drives monitors through the
//! [`VcpMonitor`] primitives and obtains them, freshly enumerated for every
//! command, from a [`MonitorSource`].

pub mod ddc_ci;

use anyhow::Result;
use serde::Serialize;

use crate::capabilities::CapabilityRecord;
use crate::vcp::{BRIGHTNESS_CODE, INPUT_SOURCE_CODE, NamedInput};

/// A VCP feature value as read from a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VcpReading {
    pub value: u16,
    pub maximum: u16,
}

/// Primitives a transport offers for one monitor
///
/// Callers go through [`crate::monitor::Session`], which pairs every
/// `open` with a `close`.
pub trait VcpMonitor: std::fmt::Debug {
    /// Transport-specific identifier, for diagnostics only
    fn id(&self) -> String;

    fn open(&mut self) -> Result<()>;

    fn close(&mut self);

    fn get_vcp_feature(&mut self, code: u8) -> Result<VcpReading>;

    fn set_vcp_feature(&mut self, code: u8, value: u16) -> Result<()>;

    /// Query and parse the monitor's capability string
    fn capabilities(&mut self) -> Result<CapabilityRecord>;

    /// Switch to a named input
    fn set_input_source(&mut self, input: NamedInput) -> Result<()> {
        self.set_vcp_feature(INPUT_SOURCE_CODE, input.vcp_value())
    }

    fn get_luminance(&mut self) -> Result<u16> {
        Ok(self.get_vcp_feature(BRIGHTNESS_CODE)?.value)
    }

    fn set_luminance(&mut self, value: u16) -> Result<()> {
        self.set_vcp_feature(BRIGHTNESS_CODE, value)
    }
}

/// Enumerates the monitors currently reachable through a transport
pub trait MonitorSource {
    type Monitor: VcpMonitor;

    /// Order is whatever the transport reports. An unavailable transport
    /// yields an empty list.
    fn enumerate(&self) -> Vec<Self::Monitor>;
}
