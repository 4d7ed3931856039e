// SPDX-License-Identifier: GPL-3.0-only
//! DDC/CI (Display Data Channel Command Interface) transport
//!
//! DDC/CI is a standard protocol for controlling monitors over I2C bus.
//! The wire protocol is handled by `ddc-hi`; this module adapts it to the
//! [`VcpMonitor`] primitives.

use anyhow::Result;
use ddc_hi::{Ddc, DdcHost, Display};

use super::{MonitorSource, VcpMonitor, VcpReading};
use crate::capabilities::{self, CapabilityRecord};

/// DDC/CI display implementation
pub struct DdcCiDisplay {
    display: Display,
}

impl DdcCiDisplay {
    pub fn new(display: Display) -> Self {
        Self { display }
    }
}

impl VcpMonitor for DdcCiDisplay {
    fn id(&self) -> String {
        self.display.info.id.clone()
    }

    fn open(&mut self) -> Result<()> {
        // ddc-hi acquires the OS handle during enumeration
        debug!(display_id = %self.id(), "Opening DDC/CI session");
        Ok(())
    }

    fn close(&mut self) {
        // Let the bus settle so the next command or process is not early
        self.display.handle.sleep();
        debug!(display_id = %self.id(), "Closed DDC/CI session");
    }

    fn get_vcp_feature(&mut self, code: u8) -> Result<VcpReading> {
        let value = self.display.handle.get_vcp_feature(code)?;
        Ok(VcpReading {
            value: value.value(),
            maximum: value.maximum(),
        })
    }

    fn set_vcp_feature(&mut self, code: u8, value: u16) -> Result<()> {
        self.display.handle.set_vcp_feature(code, value)?;
        Ok(())
    }

    fn capabilities(&mut self) -> Result<CapabilityRecord> {
        let raw = self.display.handle.capabilities_string()?;
        trace!(
            display_id = %self.id(),
            raw = %String::from_utf8_lossy(&raw),
            "Capability string"
        );
        let mut record = capabilities::parse_capabilities(&raw);
        if record.model.is_none() {
            record.model = self.display.info.model_name.clone();
        }
        Ok(record)
    }
}

impl std::fmt::Debug for DdcCiDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DdcCiDisplay(id: {}, model: {:?})",
            self.display.info.id, self.display.info.model_name
        )
    }
}

/// Enumerates monitors through every backend `ddc-hi` was built with
#[derive(Debug, Default, Clone, Copy)]
pub struct DdcCiSource;

impl MonitorSource for DdcCiSource {
    type Monitor = DdcCiDisplay;

    fn enumerate(&self) -> Vec<DdcCiDisplay> {
        let displays: Vec<_> = Display::enumerate().into_iter().map(DdcCiDisplay::new).collect();
        info!("Found {} DDC/CI display(s)", displays.len());
        displays
    }
}
