// SPDX-License-Identifier: GPL-3.0-only
//! VCP (Virtual Control Panel) feature codes
//!
//! Feature codes are defined by the VESA MCCS standard. This module only
//! keeps the handful the bridge writes directly, the symbolic input table
//! and a small catalogue used to annotate capability reports.

use serde::Serialize;

/// VCP code for brightness (luminance)
pub const BRIGHTNESS_CODE: u8 = 0x10;

/// VCP code for the active input source
pub const INPUT_SOURCE_CODE: u8 = 0x60;

/// VCP code for the power mode (1 = On, 4 = Standby, 5 = Off)
pub const POWER_MODE_CODE: u8 = 0xD6;

/// Codes probed one by one when a monitor declares no capabilities
pub const FALLBACK_PROBE_CODES: [u8; 16] = [
    0x10, 0x12, 0x13, 0x14, 0x16, 0x18, 0x1A, 0x60, 0x62, 0x8D, 0xAA, 0xD6, 0x1E, 0x20, 0x30, 0xDC,
];

/// Input sources the host can select by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedInput {
    Hdmi1,
    Hdmi2,
    Dp1,
    TypeC,
}

impl NamedInput {
    pub const ALL: [NamedInput; 4] = [Self::Hdmi1, Self::Hdmi2, Self::Dp1, Self::TypeC];

    /// Look up a symbolic name. Names are matched exactly.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|input| input.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hdmi1 => "HDMI1",
            Self::Hdmi2 => "HDMI2",
            Self::Dp1 => "DP1",
            Self::TypeC => "TYPE-C",
        }
    }

    /// Value written to [`INPUT_SOURCE_CODE`] to select this input
    pub fn vcp_value(self) -> u16 {
        match self {
            Self::Hdmi1 => 0x11,
            Self::Hdmi2 => 0x12,
            Self::Dp1 => 0x0F,
            Self::TypeC => 0x1B,
        }
    }
}

/// The `source` argument of `set_input`, resolved once at the CLI boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Named(NamedInput),
    Raw(u8),
    Unrecognized(String),
}

impl InputSource {
    pub fn parse(source: &str) -> Self {
        if let Some(named) = NamedInput::from_name(source) {
            return Self::Named(named);
        }
        match source.trim().parse::<u8>() {
            Ok(code) => Self::Raw(code),
            Err(_) => Self::Unrecognized(source.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Range,
    Enum,
    Action,
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureInfo {
    pub code: u8,
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn feature(code: u8, name: &'static str, kind: FeatureKind) -> FeatureInfo {
    FeatureInfo { code, name, kind }
}

static CATALOGUE: &[FeatureInfo] = &[
    feature(0x04, "Restore factory defaults", FeatureKind::Action),
    feature(0x05, "Restore brightness and contrast", FeatureKind::Action),
    feature(0x08, "Restore color defaults", FeatureKind::Action),
    feature(0x10, "Brightness", FeatureKind::Range),
    feature(0x12, "Contrast", FeatureKind::Range),
    feature(0x13, "Backlight control", FeatureKind::Range),
    feature(0x14, "Color preset", FeatureKind::Enum),
    feature(0x16, "Video gain (red)", FeatureKind::Range),
    feature(0x18, "Video gain (green)", FeatureKind::Range),
    feature(0x1A, "Video gain (blue)", FeatureKind::Range),
    feature(0x1E, "Auto setup", FeatureKind::Action),
    feature(0x20, "Horizontal position", FeatureKind::Range),
    feature(0x30, "Vertical position", FeatureKind::Range),
    feature(0x60, "Input source", FeatureKind::Enum),
    feature(0x62, "Audio volume", FeatureKind::Range),
    feature(0x8D, "Audio mute", FeatureKind::Enum),
    feature(0xAA, "Screen orientation", FeatureKind::Enum),
    feature(0xD6, "Power mode", FeatureKind::Enum),
    feature(0xDC, "Display mode", FeatureKind::Enum),
];

pub fn describe(code: u8) -> Option<&'static FeatureInfo> {
    CATALOGUE.iter().find(|f| f.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_inputs_resolve_exactly() {
        assert_eq!(InputSource::parse("HDMI1"), InputSource::Named(NamedInput::Hdmi1));
        assert_eq!(InputSource::parse("TYPE-C"), InputSource::Named(NamedInput::TypeC));
        assert_eq!(
            InputSource::parse("hdmi1"),
            InputSource::Unrecognized("hdmi1".to_string())
        );
    }

    #[test]
    fn test_numeric_source_is_raw_code() {
        assert_eq!(InputSource::parse("17"), InputSource::Raw(17));
        assert_eq!(
            InputSource::parse("300"),
            InputSource::Unrecognized("300".to_string())
        );
    }

    #[test]
    fn test_catalogue_covers_probe_list() {
        for code in FALLBACK_PROBE_CODES {
            assert!(describe(code).is_some(), "missing catalogue entry for {code:#04x}");
        }
        assert_eq!(describe(0xD6).map(|f| f.kind), Some(FeatureKind::Enum));
        assert!(describe(0xFF).is_none());
    }
}
