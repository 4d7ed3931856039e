// SPDX-License-Identifier: GPL-3.0-only
//! Capability discovery
//!
//! Monitors describe themselves with a capability string such as
//!
//! ```text
//! (prot(monitor)type(lcd)model(U2720Q)cmds(01 02 03 07 0C E3 F3)vcp(02 04 05 10 12 14(01 04 05) 60(0F 11 12))mccs_ver(2.1))
//! ```
//!
//! Strings are parsed with `mccs-caps`, the parser `ddc-hi` itself uses.
//! Monitors often send strings it rejects (a missing closing parenthesis, a
//! stray token in the `vcp` list), so those are parsed again with a lenient
//! grammar: unclosed groups run to the end of input, unknown groups are kept
//! verbatim and tokens that are not valid codes are dropped. When a monitor
//! declares nothing usable, [`supported_features`] probes a fixed list of
//! codes instead.

use std::collections::{BTreeMap, BTreeSet};

use nom::{
    IResult,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::opt,
    multi::many0,
    sequence::{pair, preceded, terminated},
};
use serde::Serialize;

use crate::protocols::VcpMonitor;
use crate::vcp::{self, FeatureKind};

/// A VCP code as declared by a capability source
///
/// Codes parsed from capability strings are hex tokens; sources that hand
/// over pre-parsed tables may use plain integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcpKey {
    Int(u32),
    Hex(String),
}

impl VcpKey {
    /// The code as a byte, if the key denotes one
    pub fn code(&self) -> Option<u8> {
        match self {
            Self::Int(n) => u8::try_from(*n).ok(),
            Self::Hex(s) => u8::from_str_radix(s.trim(), 16).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcpEntry {
    pub key: VcpKey,
    /// Allowed values listed after the code, e.g. the inputs of `60(0F 11)`
    pub values: Vec<u8>,
}

#[cfg(test)]
impl VcpEntry {
    pub fn new(key: VcpKey) -> Self {
        Self {
            key,
            values: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRecord {
    pub model: Option<String>,
    pub vcp: Vec<VcpEntry>,
    /// Other top-level groups (`prot`, `type`, `mccs_ver`, ...)
    pub extra: BTreeMap<String, String>,
}

impl CapabilityRecord {
    pub fn supported_codes(&self) -> BTreeSet<u8> {
        supported_codes(self.vcp.iter().map(|entry| &entry.key))
    }
}

/// Normalize declared keys into a deduplicated code set. Keys that do not
/// name a code are dropped.
pub fn supported_codes<'a>(keys: impl IntoIterator<Item = &'a VcpKey>) -> BTreeSet<u8> {
    keys.into_iter().filter_map(VcpKey::code).collect()
}

fn hex_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl From<mccs::Capabilities> for CapabilityRecord {
    fn from(caps: mccs::Capabilities) -> Self {
        let mut extra = BTreeMap::new();
        if let Some(protocol) = &caps.protocol {
            extra.insert("prot".to_string(), protocol.to_string());
        }
        if let Some(ty) = &caps.ty {
            extra.insert("type".to_string(), ty.to_string());
        }
        if !caps.commands.is_empty() {
            extra.insert("cmds".to_string(), hex_list(&caps.commands));
        }
        if let Some(whql) = caps.ms_whql {
            extra.insert("mswhql".to_string(), whql.to_string());
        }
        if let Some(version) = &caps.mccs_version {
            extra.insert("mccs_ver".to_string(), version.to_string());
        }
        for tag in &caps.unknown_tags {
            let value = match &tag.data {
                mccs::UnknownData::String(s) => s.trim().to_string(),
                mccs::UnknownData::StringBytes(bytes) => String::from_utf8_lossy(bytes).trim().to_string(),
                mccs::UnknownData::Binary(bytes) => hex_list(bytes),
            };
            extra.insert(tag.name.to_ascii_lowercase(), value);
        }

        let vcp = caps
            .vcp_features
            .iter()
            .map(|(&code, descriptor)| VcpEntry {
                key: VcpKey::Int(code.into()),
                values: descriptor.values().copied().collect(),
            })
            .collect();

        Self {
            model: caps
                .model
                .map(|model| model.trim().to_string())
                .filter(|model| !model.is_empty()),
            vcp,
            extra,
        }
    }
}

/// Content up to the parenthesis closing the current group, or to the end
/// of input when the group is never closed
fn nested(input: &str) -> IResult<&str, &str> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Ok((&input[i..], &input[..i])),
            ')' => depth -= 1,
            _ => {}
        }
    }
    Ok((&input[input.len()..], input))
}

fn group(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char('('), nested), opt(char(')')))(input)
}

fn field(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        multispace0,
        pair(
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
            group,
        ),
    )(input)
}

fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_while1(is_token_char))(input)
}

fn vcp_entry(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    pair(token, opt(group))(input)
}

fn parse_vcp_list(input: &str) -> Vec<VcpEntry> {
    let entries = match many0(vcp_entry)(input) {
        Ok((_, entries)) => entries,
        Err(_) => return Vec::new(),
    };

    entries
        .into_iter()
        .map(|(key, values)| VcpEntry {
            key: VcpKey::Hex(key.to_string()),
            values: values.map(parse_values).unwrap_or_default(),
        })
        .collect()
}

fn parse_values(input: &str) -> Vec<u8> {
    match many0(token)(input) {
        Ok((_, tokens)) => tokens
            .into_iter()
            .filter_map(|t| u8::from_str_radix(t, 16).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Parse a raw capability string. Never fails; an unparseable string
/// yields an empty record.
pub fn parse_capabilities(raw: &[u8]) -> CapabilityRecord {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let raw = &raw[..end];
    match mccs_caps::parse_capabilities(raw) {
        // A `vcp` group it could not read comes back as an unknown tag
        Ok(caps) if !caps.unknown_tags.iter().any(|tag| tag.name.eq_ignore_ascii_case("vcp")) => {
            caps.into()
        }
        Ok(_) => {
            debug!("Malformed vcp group, parsing leniently");
            parse_lenient(raw)
        }
        Err(e) => {
            debug!(error = %e, "Malformed capability string, parsing leniently");
            parse_lenient(raw)
        }
    }
}

fn parse_lenient(raw: &[u8]) -> CapabilityRecord {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();

    let body = match group(text) {
        Ok((rest, inner)) if rest.trim().is_empty() => inner,
        _ => text,
    };

    let fields = match many0(field)(body) {
        Ok((_, fields)) => fields,
        Err(_) => Vec::new(),
    };

    let mut record = CapabilityRecord::default();
    for (name, value) in fields {
        if name.eq_ignore_ascii_case("vcp") {
            record.vcp.extend(parse_vcp_list(value));
        } else if name.eq_ignore_ascii_case("model") {
            let model = value.trim();
            if !model.is_empty() {
                record.model = Some(model.to_string());
            }
        } else {
            record
                .extra
                .insert(name.to_ascii_lowercase(), value.trim().to_string());
        }
    }
    record
}

/// Fetch and parse the capability string of an open monitor
pub fn get_capabilities<M: VcpMonitor + ?Sized>(monitor: &mut M) -> anyhow::Result<CapabilityRecord> {
    monitor.capabilities()
}

/// Supported codes of an open monitor: declared capabilities first, then
/// a read probe of `probe_codes`. Failures are logged, never returned.
pub fn supported_features<M: VcpMonitor + ?Sized>(monitor: &mut M, probe_codes: &[u8]) -> BTreeSet<u8> {
    match get_capabilities(monitor) {
        Ok(record) => {
            let codes = record.supported_codes();
            if !codes.is_empty() {
                return codes;
            }
            debug!(display_id = %monitor.id(), "Capability string declares no VCP codes");
        }
        Err(e) => {
            warn!(display_id = %monitor.id(), error = %e, "Capability query failed");
        }
    }

    info!(display_id = %monitor.id(), "Falling back to manual VCP code probing");
    probe_codes
        .iter()
        .copied()
        .filter(|&code| match monitor.get_vcp_feature(code) {
            Ok(_) => true,
            Err(e) => {
                debug!(code = %format!("{code:#04x}"), error = %e, "VCP probe failed");
                false
            }
        })
        .collect()
}

/// A supported feature annotated from the catalogue
#[derive(Debug, Clone, Serialize)]
pub struct FeatureReport {
    pub code: u8,
    pub name: Option<&'static str>,
    pub kind: Option<FeatureKind>,
    pub values: Vec<u8>,
}

/// Report shape of the `get_capabilities` command
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    pub model: Option<String>,
    pub supported_codes: BTreeSet<u8>,
    pub features: Vec<FeatureReport>,
    pub fields: BTreeMap<String, String>,
}

impl From<CapabilityRecord> for CapabilityReport {
    fn from(record: CapabilityRecord) -> Self {
        let mut features: BTreeMap<u8, FeatureReport> = BTreeMap::new();
        for entry in &record.vcp {
            let Some(code) = entry.key.code() else {
                continue;
            };
            let info = vcp::describe(code);
            let report = features.entry(code).or_insert_with(|| FeatureReport {
                code,
                name: info.map(|f| f.name),
                kind: info.map(|f| f.kind),
                values: Vec::new(),
            });
            for value in &entry.values {
                if !report.values.contains(value) {
                    report.values.push(*value);
                }
            }
        }

        Self {
            supported_codes: features.keys().copied().collect(),
            model: record.model,
            features: features.into_values().collect(),
            fields: record.extra,
        }
    }
}
