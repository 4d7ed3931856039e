// SPDX-License-Identifier: GPL-3.0-only
//! VCP command dispatch
//!
//! Every operation re-enumerates monitors through the [`MonitorSource`],
//! so no handle outlives the command that obtained it. Work is sequential:
//! one monitor, one session at a time.
//!
//! # Error policy
//!
//! - Index out of range (negative or past the end): `Ok(false)` / empty
//!   result, nothing is opened.
//! - Session open failure: per-record error in [`MonitorManager::get_monitor_info`],
//!   logged and empty in [`MonitorManager::get_supported_features`],
//!   [`AppError::SessionOpen`] everywhere else.
//! - Write failure: [`AppError::Transport`] for brightness, `Ok(false)` for
//!   input, power and raw VCP writes. A value wider than a VCP word counts
//!   as a rejected write.

use std::collections::BTreeSet;

use anyhow::anyhow;

use crate::capabilities::{self, CapabilityReport};
use crate::error::{AppError, Result};
use crate::names::{self, NameSource};
use crate::protocols::{MonitorSource, VcpMonitor, VcpReading};
use crate::vcp::{BRIGHTNESS_CODE, INPUT_SOURCE_CODE, InputSource, POWER_MODE_CODE};

use super::backend::{MonitorIndex, MonitorInfo, MonitorRecord, RequestedIndex};
use super::session::Session;

pub struct MonitorManager<S: MonitorSource> {
    source: S,
    names: Box<dyn NameSource>,
    probe_codes: Vec<u8>,
}

impl<S: MonitorSource> MonitorManager<S> {
    pub fn new(source: S, names: Box<dyn NameSource>, probe_codes: Vec<u8>) -> Self {
        Self {
            source,
            names,
            probe_codes,
        }
    }

    /// Enumerate and keep only the monitor at `index`
    fn monitor_at(&self, index: RequestedIndex) -> Option<(MonitorIndex, S::Monitor)> {
        let mut monitors = self.source.enumerate();
        match usize::try_from(index) {
            Ok(position) if position < monitors.len() => Some((position, monitors.swap_remove(position))),
            _ => {
                warn!(index, count = monitors.len(), "Monitor index out of range");
                None
            }
        }
    }

    /// VCP values are 16 bits wide
    fn vcp_word(value: i64) -> anyhow::Result<u16> {
        u16::try_from(value).map_err(|_| anyhow!("value {value} does not fit a VCP feature"))
    }

    fn open<'a>(index: MonitorIndex, monitor: &'a mut S::Monitor) -> Result<Session<'a, S::Monitor>> {
        Session::open(monitor).map_err(|source| AppError::SessionOpen { index, source })
    }

    /// Collapse a suppressed write failure into `false`
    fn write_succeeded(index: MonitorIndex, code: u8, result: anyhow::Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    index,
                    code = %format!("{code:#04x}"),
                    error = %e,
                    "VCP write failed"
                );
                false
            }
        }
    }

    /// Name, brightness and declared codes of every monitor
    pub fn get_monitor_info(&self) -> Vec<MonitorRecord> {
        let monitors = self.source.enumerate();
        let os_names = if monitors.is_empty() {
            Vec::new()
        } else {
            names::load_names(self.names.as_ref())
        };

        monitors
            .into_iter()
            .enumerate()
            .map(|(index, mut monitor)| match self.describe(index, &mut monitor, &os_names) {
                Ok(info) => MonitorRecord::Ready(info),
                Err(e) => {
                    error!(
                        index,
                        display_id = %monitor.id(),
                        error = %e,
                        "Failed to query monitor"
                    );
                    MonitorRecord::Failed {
                        id: index,
                        error: e.to_string(),
                    }
                }
            })
            .collect()
    }

    fn describe(
        &self,
        index: MonitorIndex,
        monitor: &mut S::Monitor,
        os_names: &[Option<String>],
    ) -> anyhow::Result<MonitorInfo> {
        let mut session = Session::open(monitor)?;
        let brightness = session.get_luminance()?;

        let capabilities = match capabilities::get_capabilities(&mut *session) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(index, error = %e, "No capability string");
                None
            }
        };
        let model = capabilities.as_ref().and_then(|c| c.model.as_deref());
        let name = names::resolve_name(os_names, index, model);
        let supported_codes = capabilities
            .as_ref()
            .map(|c| c.supported_codes())
            .unwrap_or_default();

        debug!(index, name = %name, brightness, "Queried monitor");
        Ok(MonitorInfo {
            id: index,
            name,
            brightness,
            supported_codes,
        })
    }

    /// Write luminance. `value` is passed through without clamping.
    pub fn set_brightness(&self, index: RequestedIndex, value: i64) -> Result<bool> {
        let Some((index, mut monitor)) = self.monitor_at(index) else {
            return Ok(false);
        };
        let mut session = Self::open(index, &mut monitor)?;
        Self::vcp_word(value)
            .and_then(|value| session.set_luminance(value))
            .map_err(|source| AppError::Transport {
                index,
                code: BRIGHTNESS_CODE,
                source,
            })?;

        info!(index, value, "Brightness set");
        Ok(true)
    }

    pub fn set_input(&self, index: RequestedIndex, source: &InputSource) -> Result<bool> {
        if let InputSource::Unrecognized(name) = source {
            warn!(index, source = %name, "Unrecognized input source");
            return Ok(false);
        }
        let Some((index, mut monitor)) = self.monitor_at(index) else {
            return Ok(false);
        };
        let mut session = Self::open(index, &mut monitor)?;

        let result = match source {
            InputSource::Named(input) => session.set_input_source(*input),
            InputSource::Raw(code) => session.set_vcp_feature(INPUT_SOURCE_CODE, u16::from(*code)),
            InputSource::Unrecognized(_) => return Ok(false),
        };
        let ok = Self::write_succeeded(index, INPUT_SOURCE_CODE, result);
        if ok {
            info!(index, source = ?source, "Input source set");
        }
        Ok(ok)
    }

    /// Write the power mode as given (1 On, 4 Standby, 5 Off by convention)
    pub fn set_power(&self, index: RequestedIndex, mode: i64) -> Result<bool> {
        self.set_vcp(index, POWER_MODE_CODE, mode)
    }

    pub fn set_vcp(&self, index: RequestedIndex, code: u8, value: i64) -> Result<bool> {
        let Some((index, mut monitor)) = self.monitor_at(index) else {
            return Ok(false);
        };
        let mut session = Self::open(index, &mut monitor)?;
        let result = Self::vcp_word(value).and_then(|value| session.set_vcp_feature(code, value));
        let ok = Self::write_succeeded(index, code, result);
        if ok {
            info!(index, code = %format!("{code:#04x}"), value, "VCP feature set");
        }
        Ok(ok)
    }

    /// Read one feature; `None` when out of range or the read is rejected
    pub fn get_vcp(&self, index: RequestedIndex, code: u8) -> Result<Option<VcpReading>> {
        let Some((index, mut monitor)) = self.monitor_at(index) else {
            return Ok(None);
        };
        let mut session = Self::open(index, &mut monitor)?;
        match session.get_vcp_feature(code) {
            Ok(reading) => Ok(Some(reading)),
            Err(e) => {
                warn!(index, code = %format!("{code:#04x}"), error = %e, "VCP read failed");
                Ok(None)
            }
        }
    }

    /// Deduplicated supported codes. Never fails; problems are logged.
    pub fn get_supported_features(&self, index: RequestedIndex) -> BTreeSet<u8> {
        let Some((index, mut monitor)) = self.monitor_at(index) else {
            return BTreeSet::new();
        };
        let mut session = match Session::open(&mut monitor) {
            Ok(session) => session,
            Err(e) => {
                error!(index, error = %e, "Error opening monitor");
                return BTreeSet::new();
            }
        };
        capabilities::supported_features(&mut *session, &self.probe_codes)
    }

    pub fn get_capabilities(&self, index: RequestedIndex) -> Result<Option<CapabilityReport>> {
        let Some((index, mut monitor)) = self.monitor_at(index) else {
            return Ok(None);
        };
        let mut session = Self::open(index, &mut monitor)?;
        match capabilities::get_capabilities(&mut *session) {
            Ok(record) => Ok(Some(record.into())),
            Err(e) => {
                warn!(index, error = %e, "Capability query failed");
                Ok(None)
            }
        }
    }
}
