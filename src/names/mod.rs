// SPDX-License-Identifier: GPL-3.0-only
//! Display name resolution
//!
//! Names come from three places, in order: the OS display configuration,
//! the `model` field of the capability string, and a synthetic
//! `Monitor N` label.

#[cfg(all(windows, feature = "os-names"))]
mod display_config;

use anyhow::Result;

use crate::config::Config;

/// OS facility listing friendly display names
///
/// The list is indexed like the DDC enumeration. Entries are `None` where
/// the OS has no usable name.
pub trait NameSource {
    fn friendly_names(&self) -> Result<Vec<Option<String>>>;
}

/// Used where the platform has no name facility or lookup is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNames;

impl NameSource for NoNames {
    fn friendly_names(&self) -> Result<Vec<Option<String>>> {
        Ok(Vec::new())
    }
}

/// Pick the name source for this platform and configuration
pub fn system_names(config: &Config) -> Box<dyn NameSource> {
    if !config.name_lookup {
        debug!("OS display name lookup disabled by configuration");
        return Box::new(NoNames);
    }

    #[cfg(all(windows, feature = "os-names"))]
    {
        Box::new(display_config::DisplayConfigNames)
    }

    #[cfg(not(all(windows, feature = "os-names")))]
    {
        Box::new(NoNames)
    }
}

/// Query a name source, treating any failure as "no names"
pub fn load_names(source: &dyn NameSource) -> Vec<Option<String>> {
    match source.friendly_names() {
        Ok(names) => {
            debug!("OS reported {} display name(s)", names.len());
            names
        }
        Err(e) => {
            warn!(error = %e, "OS display name lookup failed");
            Vec::new()
        }
    }
}

/// Decode a fixed-size, zero-padded array of UTF-16 character codes
///
/// Every zero code unit is skipped, not only the padding. Blank names yield
/// `None`.
#[cfg(any(test, all(windows, feature = "os-names")))]
pub fn decode_friendly_name(chars: &[u16]) -> Option<String> {
    let name: String = char::decode_utf16(chars.iter().copied().filter(|&c| c != 0))
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Display name for the monitor at `index`
pub fn resolve_name(os_names: &[Option<String>], index: usize, model: Option<&str>) -> String {
    if let Some(Some(name)) = os_names.get(index) {
        return name.clone();
    }
    if let Some(model) = model.map(str::trim).filter(|m| !m.is_empty()) {
        return model.to_string();
    }
    format!("Monitor {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeNames;

    fn utf16(s: &str, pad: usize) -> Vec<u16> {
        let mut chars: Vec<u16> = s.encode_utf16().collect();
        chars.resize(chars.len() + pad, 0);
        chars
    }

    #[test]
    fn test_decode_padded_name() {
        assert_eq!(
            decode_friendly_name(&utf16("DELL U2720Q", 3)).as_deref(),
            Some("DELL U2720Q")
        );
        assert_eq!(
            decode_friendly_name(&utf16("  LG HDR 4K ", 0)).as_deref(),
            Some("LG HDR 4K")
        );
    }

    #[test]
    fn test_decode_blank_names() {
        assert_eq!(decode_friendly_name(&[0; 14]), None);
        assert_eq!(decode_friendly_name(&[]), None);
        assert_eq!(decode_friendly_name(&utf16("   ", 4)), None);
    }

    #[test]
    fn test_decode_skips_interior_zeros() {
        let chars = [0x44, 0x45, 0, 0x4C, 0x4C, 0, 0];
        assert_eq!(decode_friendly_name(&chars).as_deref(), Some("DELL"));
    }

    #[test]
    fn test_resolve_name_tiers() {
        let os = vec![Some("Studio Display".to_string()), None];

        assert_eq!(resolve_name(&os, 0, Some("U2720Q")), "Studio Display");
        assert_eq!(resolve_name(&os, 1, Some("U2720Q")), "U2720Q");
        assert_eq!(resolve_name(&os, 1, Some("  ")), "Monitor 2");
        assert_eq!(resolve_name(&os, 5, None), "Monitor 6");
        assert_eq!(resolve_name(&[], 0, None), "Monitor 1");
    }

    #[test]
    fn test_failed_lookup_is_empty() {
        assert!(load_names(&FakeNames(None)).is_empty());
        assert_eq!(
            load_names(&FakeNames(Some(vec![None, Some("A".to_string())]))),
            vec![None, Some("A".to_string())]
        );
    }

    #[test]
    fn test_disabled_lookup_uses_no_names() {
        let config = Config {
            name_lookup: false,
            ..Config::default()
        };
        assert!(load_names(system_names(&config).as_ref()).is_empty());
    }
}
