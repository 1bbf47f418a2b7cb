//! Static per-port configuration
//!
//! The hardware only knows how many ports it has; what the ports are
//! called, which alternates they route, and how their direction is
//! controlled comes from a TOML document, read once per attach:
//!
//! ```toml
//! [[port]]
//! name = "uart0_rx"
//! alternate_names = ["pin3", "pin7"]
//! direction_control = ["hw_control", "sw_control"]
//! initial_source = 1
//! ```

use crate::error::{MuxError, Result};
use crate::port::DirectionFlags;
use serde::Deserialize;
use std::path::Path;

/// Whole-device configuration: port descriptors in hardware order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MuxConfig {
    /// Port descriptors; position is the port index.
    #[serde(default, rename = "port")]
    pub ports: Vec<PortConfig>,
}

/// One configured port.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortConfig {
    /// Signal name.
    pub name: String,
    /// Alternate source names, selection order.
    pub alternate_names: Vec<String>,
    /// Direction-control capabilities of the port.
    #[serde(default)]
    pub direction_control: Vec<DirectionCapability>,
    /// Source index to apply at attach; absent leaves hardware state alone.
    #[serde(default)]
    pub initial_source: Option<u32>,
}

/// Direction-control capability words accepted in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionCapability {
    /// Direction can follow the hardware strap.
    HwControl,
    /// Direction can follow the software direction bit.
    SwControl,
    /// Port powers up software-directed.
    SwDirection,
    /// Runtime hardware/software toggling is wired.
    HwswToggle,
}

impl From<DirectionCapability> for DirectionFlags {
    fn from(cap: DirectionCapability) -> Self {
        match cap {
            DirectionCapability::HwControl => Self::HAS_HW_CONTROL,
            DirectionCapability::SwControl => Self::HAS_SW_CONTROL,
            DirectionCapability::SwDirection => Self::SW_DIRECTION,
            DirectionCapability::HwswToggle => Self::HWSW_TOGGLE,
        }
    }
}

impl MuxConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::Config`] for unreadable or malformed files.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MuxError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::Config`] for malformed documents.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MuxError::config(format!("bad port config: {e}")))
    }

    /// Number of configured ports.
    #[must_use]
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

impl PortConfig {
    /// Fold the capability words into the flag set.
    #[must_use]
    pub fn direction_flags(&self) -> DirectionFlags {
        self.direction_control
            .iter()
            .fold(DirectionFlags::empty(), |acc, &cap| acc | cap.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [[port]]
        name = "uart0_rx"
        alternate_names = ["pin3", "pin7"]
        direction_control = ["hw_control", "sw_control"]
        initial_source = 1

        [[port]]
        name = "uart0_tx"
        alternate_names = ["pin4"]
        direction_control = ["hw_control"]
    "#;

    #[test]
    fn parses_port_tables_in_order() {
        let config = MuxConfig::from_toml_str(FULL).expect("config");
        assert_eq!(config.port_count(), 2);
        assert_eq!(config.ports[0].name, "uart0_rx");
        assert_eq!(config.ports[0].initial_source, Some(1));
        assert_eq!(config.ports[1].name, "uart0_tx");
        assert_eq!(config.ports[1].initial_source, None);
    }

    #[test]
    fn folds_capability_words_into_flags() {
        let config = MuxConfig::from_toml_str(FULL).expect("config");
        let flags = config.ports[0].direction_flags();
        assert!(flags.contains(DirectionFlags::HAS_HW_CONTROL));
        assert!(flags.contains(DirectionFlags::HAS_SW_CONTROL));
        assert!(!flags.contains(DirectionFlags::HWSW_TOGGLE));

        assert_eq!(
            config.ports[1].direction_flags(),
            DirectionFlags::HAS_HW_CONTROL
        );
    }

    #[test]
    fn empty_document_has_no_ports() {
        let config = MuxConfig::from_toml_str("").expect("config");
        assert_eq!(config.port_count(), 0);
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = MuxConfig::from_toml_str(
            r#"
            [[port]]
            name = "x"
            alternate_names = ["a"]
            hidden_knob = true
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MuxError::Config { .. }));
    }

    #[test]
    fn unknown_capability_word_rejected() {
        let err = MuxConfig::from_toml_str(
            r#"
            [[port]]
            name = "x"
            alternate_names = ["a"]
            direction_control = ["warp_drive"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MuxError::Config { .. }));
    }

    #[test]
    fn missing_alternates_rejected_at_parse() {
        let err = MuxConfig::from_toml_str(
            r#"
            [[port]]
            name = "x"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MuxError::Config { .. }));
    }
}
