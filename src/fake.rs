// SPDX-License-Identifier: GPL-3.0-only
//! In-memory transport for tests
//!
//! Each [`FakeState`] is shared between the source and the monitors it
//! hands out, so writes made during one command are visible to the next
//! enumeration, the way a real monitor keeps its settings.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Result, anyhow, bail};

use crate::capabilities::{CapabilityRecord, VcpEntry, VcpKey};
use crate::names::NameSource;
use crate::protocols::{MonitorSource, VcpMonitor, VcpReading};
use crate::vcp::{BRIGHTNESS_CODE, NamedInput};

pub type SharedState = Rc<RefCell<FakeState>>;

#[derive(Debug, Clone)]
pub struct FakeState {
    pub id: String,
    pub fail_open: bool,
    /// Values above this are clamped on write, like a device would
    pub maximum: u16,
    pub values: BTreeMap<u8, u16>,
    /// `None` makes the capability query fail
    pub capabilities: Option<CapabilityRecord>,
    pub reads: Vec<u8>,
    pub writes: Vec<(u8, u16)>,
    pub named_switches: Vec<NamedInput>,
    pub opened: usize,
    pub closed: usize,
}

impl FakeState {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fail_open: false,
            maximum: 100,
            values: BTreeMap::new(),
            capabilities: Some(CapabilityRecord::default()),
            reads: Vec::new(),
            writes: Vec::new(),
            named_switches: Vec::new(),
            opened: 0,
            closed: 0,
        }
    }

    /// A monitor with readable brightness and a capability string
    pub fn typical(id: &str, model: &str, brightness: u16) -> SharedState {
        Self::new(id)
            .with_model(model)
            .with_capabilities(&[0x10, 0x12, 0x60, 0xD6])
            .with_feature(BRIGHTNESS_CODE, brightness)
            .with_feature(0x12, 75)
            .with_feature(0x60, 0x11)
            .with_feature(0xD6, 1)
            .shared()
    }

    pub fn with_feature(mut self, code: u8, value: u16) -> Self {
        self.values.insert(code, value);
        self
    }

    pub fn with_maximum(mut self, maximum: u16) -> Self {
        self.maximum = maximum;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.capabilities.get_or_insert_with(Default::default).model = Some(model.to_string());
        self
    }

    pub fn with_capabilities(mut self, codes: &[u8]) -> Self {
        let record = self.capabilities.get_or_insert_with(Default::default);
        record.vcp = codes
            .iter()
            .map(|&code| VcpEntry::new(VcpKey::Int(code.into())))
            .collect();
        self
    }

    pub fn with_capability_keys(mut self, keys: Vec<VcpKey>) -> Self {
        let record = self.capabilities.get_or_insert_with(Default::default);
        record.vcp = keys.into_iter().map(VcpEntry::new).collect();
        self
    }

    pub fn without_capabilities(mut self) -> Self {
        self.capabilities = None;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn shared(self) -> SharedState {
        Rc::new(RefCell::new(self))
    }
}

#[derive(Debug, Clone)]
pub struct FakeMonitor {
    state: SharedState,
}

impl From<SharedState> for FakeMonitor {
    fn from(state: SharedState) -> Self {
        Self { state }
    }
}

impl From<FakeState> for FakeMonitor {
    fn from(state: FakeState) -> Self {
        Self {
            state: state.shared(),
        }
    }
}

impl VcpMonitor for FakeMonitor {
    fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    fn open(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            bail!("monitor {} is not responding", state.id);
        }
        state.opened += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.state.borrow_mut().closed += 1;
    }

    fn get_vcp_feature(&mut self, code: u8) -> Result<VcpReading> {
        let mut state = self.state.borrow_mut();
        state.reads.push(code);
        let value = *state
            .values
            .get(&code)
            .ok_or_else(|| anyhow!("VCP {code:#04x} unsupported"))?;
        Ok(VcpReading {
            value,
            maximum: state.maximum,
        })
    }

    fn set_vcp_feature(&mut self, code: u8, value: u16) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.writes.push((code, value));
        if !state.values.contains_key(&code) {
            bail!("VCP {code:#04x} rejected");
        }
        let clamped = value.min(state.maximum);
        state.values.insert(code, clamped);
        Ok(())
    }

    fn capabilities(&mut self) -> Result<CapabilityRecord> {
        self.state
            .borrow()
            .capabilities
            .clone()
            .ok_or_else(|| anyhow!("capability string unavailable"))
    }

    fn set_input_source(&mut self, input: NamedInput) -> Result<()> {
        self.state.borrow_mut().named_switches.push(input);
        self.set_vcp_feature(crate::vcp::INPUT_SOURCE_CODE, input.vcp_value())
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeSource {
    pub monitors: Vec<SharedState>,
}

impl FakeSource {
    pub fn new(monitors: Vec<SharedState>) -> Self {
        Self { monitors }
    }
}

impl MonitorSource for FakeSource {
    type Monitor = FakeMonitor;

    fn enumerate(&self) -> Vec<FakeMonitor> {
        self.monitors.iter().cloned().map(FakeMonitor::from).collect()
    }
}

/// Name source returning a fixed list, or failing
#[derive(Debug, Clone)]
pub struct FakeNames(pub Option<Vec<Option<String>>>);

impl NameSource for FakeNames {
    fn friendly_names(&self) -> Result<Vec<Option<String>>> {
        self.0
            .clone()
            .ok_or_else(|| anyhow!("name facility unavailable"))
    }
}
