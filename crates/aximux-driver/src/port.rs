//! Port data model
//!
//! One `Port` per routable signal: static identity and configuration fixed
//! at attach, plus the attribute schema derived from its direction flags.
//! The live selected source and direction are never cached here; they stay
//! in the hardware register.

use crate::attrs::PortSchema;
use crate::config::PortConfig;
use crate::error::{MuxError, Result};
use aximux_chip::regs::limits;
use bitflags::bitflags;
use tracing::warn;

bitflags! {
    /// Direction-control capability of one port.
    ///
    /// Bit values match the device-tree encoding the config files carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirectionFlags: u32 {
        /// Direction can be governed by the hardware strap.
        const HAS_HW_CONTROL = 0x01;
        /// Direction can be governed by the software direction bit.
        const HAS_SW_CONTROL = 0x02;
        /// Port powers up software-directed.
        const SW_DIRECTION = 0x04;
        /// Runtime hardware/software toggling is wired for this port.
        const HWSW_TOGGLE = 0x08;
    }
}

/// One routable signal of a mux instance.
#[derive(Debug, Clone)]
pub struct Port {
    index: usize,
    signal_name: String,
    alternate_names: Vec<String>,
    direction_flags: DirectionFlags,
    initial_source: Option<u32>,
    schema: PortSchema,
}

impl Port {
    /// Build a port from its config entry, bounded by the instance's
    /// alternate limit.
    ///
    /// Names longer than the hard limit are truncated with a warning, as
    /// are alternate lists longer than `alt_signal_limit`.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::Config`] if the entry declares no alternates,
    /// declares neither direction-control capability, or requests an
    /// initial source outside its alternates.
    pub fn from_config(index: usize, cfg: &PortConfig, alt_signal_limit: u32) -> Result<Self> {
        let signal_name = truncate_name(&cfg.name, index);

        if cfg.alternate_names.is_empty() {
            return Err(MuxError::config(format!(
                "port {index} ({signal_name}) declares no alternate signals"
            )));
        }

        let mut alternate_names: Vec<String> = cfg
            .alternate_names
            .iter()
            .map(|n| truncate_name(n, index))
            .collect();

        let alt_limit = alt_signal_limit as usize;
        if alternate_names.len() > alt_limit {
            warn!(
                "port {index} ({signal_name}): {} alternate names, hardware supports {alt_limit}; \
                 extra entries dropped",
                alternate_names.len()
            );
            alternate_names.truncate(alt_limit);
        }

        let direction_flags = cfg.direction_flags();
        let schema = PortSchema::build(direction_flags).map_err(|_| {
            MuxError::config(format!(
                "port {index} ({signal_name}): neither hardware nor software direction control"
            ))
        })?;

        if let Some(source) = cfg.initial_source {
            if source as usize >= alternate_names.len() {
                return Err(MuxError::config(format!(
                    "port {index} ({signal_name}): initial source {source} outside {} alternates",
                    alternate_names.len()
                )));
            }
        }

        Ok(Self {
            index,
            signal_name,
            alternate_names,
            direction_flags,
            initial_source: cfg.initial_source,
            schema,
        })
    }

    /// Zero-based port index; doubles as the register word offset.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Signal name, bounded to the hard name limit.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.signal_name
    }

    /// Alternate source names, selection order.
    #[must_use]
    pub fn alternate_names(&self) -> &[String] {
        &self.alternate_names
    }

    /// Number of valid sources; selections must stay below this.
    #[must_use]
    pub fn alternate_count(&self) -> usize {
        self.alternate_names.len()
    }

    /// Direction-control capability flags.
    #[must_use]
    pub const fn direction_flags(&self) -> DirectionFlags {
        self.direction_flags
    }

    /// Source index applied at attach, if configured.
    #[must_use]
    pub const fn initial_source(&self) -> Option<u32> {
        self.initial_source
    }

    /// The fixed attribute schema of this port.
    #[must_use]
    pub const fn schema(&self) -> &PortSchema {
        &self.schema
    }

    /// External group name, `port<index>`.
    #[must_use]
    pub fn group_name(&self) -> String {
        format!("port{}", self.index)
    }
}

fn truncate_name(name: &str, index: usize) -> String {
    if name.chars().count() <= limits::SIGNAL_NAME {
        return name.to_string();
    }
    warn!("port {index}: name '{name}' truncated to {} characters", limits::SIGNAL_NAME);
    name.chars().take(limits::SIGNAL_NAME).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortConfig;

    fn cfg(name: &str, alternates: &[&str], control: &[&str]) -> PortConfig {
        let toml = format!(
            "name = \"{name}\"\nalternate_names = [{}]\ndirection_control = [{}]\n",
            alternates
                .iter()
                .map(|a| format!("\"{a}\""))
                .collect::<Vec<_>>()
                .join(", "),
            control
                .iter()
                .map(|c| format!("\"{c}\""))
                .collect::<Vec<_>>()
                .join(", "),
        );
        toml::from_str(&toml).expect("port config")
    }

    #[test]
    fn builds_from_minimal_config() {
        let port = Port::from_config(2, &cfg("spi_mosi", &["pin4", "pin9"], &["hw_control"]), 16)
            .expect("port");
        assert_eq!(port.index(), 2);
        assert_eq!(port.name(), "spi_mosi");
        assert_eq!(port.alternate_count(), 2);
        assert_eq!(port.group_name(), "port2");
        assert!(port.direction_flags().contains(DirectionFlags::HAS_HW_CONTROL));
    }

    #[test]
    fn long_names_truncated() {
        let port = Port::from_config(
            0,
            &cfg("a_very_long_signal_name_indeed", &["alt0"], &["sw_control"]),
            16,
        )
        .expect("port");
        assert_eq!(port.name().chars().count(), 16);
        assert_eq!(port.name(), "a_very_long_sign");
    }

    #[test]
    fn zero_alternates_is_config_error() {
        let err = Port::from_config(1, &cfg("uart_rx", &[], &["hw_control"]), 16).unwrap_err();
        assert!(matches!(err, MuxError::Config { .. }));
    }

    #[test]
    fn alternates_truncated_to_hardware_limit() {
        let port = Port::from_config(
            0,
            &cfg("gpio0", &["a", "b", "c", "d", "e"], &["hw_control", "sw_control"]),
            3,
        )
        .expect("port");
        assert_eq!(port.alternate_count(), 3);
        assert_eq!(port.alternate_names(), ["a", "b", "c"]);
    }

    #[test]
    fn neither_direction_flag_is_config_error() {
        let err = Port::from_config(0, &cfg("gpio1", &["a"], &[]), 16).unwrap_err();
        assert!(matches!(err, MuxError::Config { .. }));

        // SW_DIRECTION alone does not make direction reachable either.
        let err = Port::from_config(0, &cfg("gpio1", &["a"], &["sw_direction"]), 16).unwrap_err();
        assert!(matches!(err, MuxError::Config { .. }));
    }

    #[test]
    fn initial_source_checked_against_truncated_alternates() {
        let mut config = cfg("gpio2", &["a", "b", "c", "d"], &["hw_control"]);
        config.initial_source = Some(3);

        // Fine against the declared four alternates...
        Port::from_config(0, &config, 16).expect("port");

        // ...but not once the hardware limit cuts the list to two.
        let err = Port::from_config(0, &config, 2).unwrap_err();
        assert!(matches!(err, MuxError::Config { .. }));
    }
}
