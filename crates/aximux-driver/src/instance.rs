//! Mux device instance
//!
//! Attach orchestration and the per-port attribute surface. An attach is a
//! single pass: probe capability, reconcile the configured ports against
//! it, build the port table and schemas, apply initial sources, then
//! publish through the registry. Any failure before publication leaves no
//! visible state behind.

use crate::attrs::{AttrAccess, AttrKey};
use crate::capability::MuxCapability;
use crate::config::MuxConfig;
use crate::error::{MuxError, Result};
use crate::port::Port;
use crate::registry::MuxRegistry;
use crate::window::RegisterWindow;
use aximux_chip::codec::{self, Direction, DirectionMode};
use aximux_chip::regs;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One attached mux instance.
///
/// Owns the register window and the port table exclusively. The window
/// sits behind a mutex because every source or direction update is a
/// read-modify-write on a shared register; the lock scope is this
/// instance, never global.
#[derive(Debug)]
pub struct MuxDevice {
    window: Mutex<Box<dyn RegisterWindow>>,
    capability: MuxCapability,
    ports: Vec<Port>,
    instance_number: u32,
}

impl MuxDevice {
    /// Attach a mux instance.
    ///
    /// Probes the capability register, reconciles the configured port list
    /// against the hardware-reported count (the smaller side wins), builds
    /// the ports and their schemas, applies configured initial sources,
    /// and publishes the instance under a fresh number.
    ///
    /// Atomic: on any error the registry is untouched and nothing is
    /// visible to readers.
    ///
    /// # Errors
    ///
    /// [`MuxError::Config`] for inconsistent port configuration,
    /// [`MuxError::Capacity`] when the registry is full, and window errors
    /// if the mapped region cannot hold the registers it must.
    pub fn attach(
        mut window: Box<dyn RegisterWindow>,
        config: &MuxConfig,
        registry: &MuxRegistry,
    ) -> Result<Arc<Self>> {
        let probed = MuxCapability::probe(window.as_ref())?;

        let configured = config.port_count();
        let reported = probed.signal_count as usize;
        let port_count = if configured > reported {
            warn!(
                "hardware reports {reported} signals, config requests {configured}; \
                 extra config entries dropped"
            );
            reported
        } else {
            configured
        };

        info!("mux with {port_count} ports");

        // The instance's signal count is the reconciled value.
        #[allow(clippy::cast_possible_truncation)]
        let capability = MuxCapability {
            signal_count: port_count as u32,
            ..probed
        };

        let mut ports = Vec::with_capacity(port_count);
        for (index, port_cfg) in config.ports.iter().take(port_count).enumerate() {
            let port = Port::from_config(index, port_cfg, capability.alt_signal_limit)?;

            if let Some(source) = port.initial_source() {
                let reg = window.read_u32(index)?;
                window.write_u32(index, codec::encode_source(reg, source))?;
                debug!("port {index} ({}): initial source {source}", port.name());
            }

            debug!(
                "port {index} ({}): {} attributes",
                port.name(),
                port.schema().len()
            );
            ports.push(port);
        }

        let device = registry.attach(move |instance_number| {
            info!("initialized {}{instance_number} with {port_count} ports", regs::DEVICE_NAME);
            Self {
                window: Mutex::new(window),
                capability,
                ports,
                instance_number,
            }
        })?;

        Ok(device)
    }

    /// Detach this instance, releasing its registry slot.
    ///
    /// Never fails. The register window unmaps once the last reference
    /// drops; the registry only ever held a weak one.
    pub fn detach(self: Arc<Self>, registry: &MuxRegistry) {
        registry.detach(self.instance_number);
        info!("{} removed", self.name());
    }

    /// External instance name, `aximux<N>`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}{}", regs::DEVICE_NAME, self.instance_number)
    }

    /// Registry-assigned instance number, stable until detach.
    #[must_use]
    pub const fn instance_number(&self) -> u32 {
        self.instance_number
    }

    /// Reconciled capability of this instance.
    #[must_use]
    pub const fn capability(&self) -> MuxCapability {
        self.capability
    }

    /// The port table, in index order.
    #[must_use]
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Port by index.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::InvalidPort`] for indices beyond the table.
    pub fn port(&self, index: usize) -> Result<&Port> {
        self.ports.get(index).ok_or(MuxError::InvalidPort {
            index,
            count: self.ports.len(),
        })
    }

    // ── Register-level operations ────────────────────────────────────────────

    /// Currently selected source of a port.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::Validation`] if the hardware selector reads
    /// outside the port's configured alternates; such a value is surfaced
    /// as an inconsistency, never as data.
    pub fn selected_source(&self, port: usize) -> Result<u32> {
        let port = self.port(port)?;
        let reg = self.window.lock().read_u32(port.index())?;
        let value = codec::decode_source(reg);

        if value as usize >= port.alternate_count() {
            return Err(MuxError::Validation {
                port: port.index(),
                value,
                alternate_count: port.alternate_count(),
            });
        }
        Ok(value)
    }

    /// Route a port to one of its alternates.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::Range`] for `source >= alternate_count`; the
    /// register is left unchanged.
    pub fn set_source(&self, port: usize, source: u32) -> Result<()> {
        let port = self.port(port)?;

        if source as usize >= port.alternate_count() {
            return Err(MuxError::Range {
                port: port.index(),
                value: source,
                alternate_count: port.alternate_count(),
            });
        }

        // Lock spans the whole read-modify-write.
        let mut window = self.window.lock();
        let reg = window.read_u32(port.index())?;
        window.write_u32(port.index(), codec::encode_source(reg, source))
    }

    /// Direction-control mode of a port.
    ///
    /// # Errors
    ///
    /// Window errors only.
    pub fn direction_mode(&self, port: usize) -> Result<DirectionMode> {
        let port = self.port(port)?;
        let reg = self.window.lock().read_u32(port.index())?;
        Ok(codec::decode_direction_mode(reg))
    }

    /// Set the direction-control mode of a port.
    ///
    /// Applies the requested mode exactly. The textual surface enforces
    /// the schema's access mode; this call does not.
    ///
    /// # Errors
    ///
    /// Window errors only.
    pub fn set_direction_mode(&self, port: usize, mode: DirectionMode) -> Result<()> {
        let port = self.port(port)?;
        let mut window = self.window.lock();
        let reg = window.read_u32(port.index())?;
        window.write_u32(port.index(), codec::encode_direction_mode(reg, mode))
    }

    /// Software direction value of a port.
    ///
    /// # Errors
    ///
    /// Window errors only.
    pub fn direction(&self, port: usize) -> Result<Direction> {
        let port = self.port(port)?;
        let reg = self.window.lock().read_u32(port.index())?;
        Ok(codec::decode_direction(reg))
    }

    /// Set the software direction value of a port.
    ///
    /// The textual surface enforces the schema's access mode; this call
    /// does not.
    ///
    /// # Errors
    ///
    /// Window errors only.
    pub fn set_direction(&self, port: usize, direction: Direction) -> Result<()> {
        let port = self.port(port)?;
        let mut window = self.window.lock();
        let reg = window.read_u32(port.index())?;
        window.write_u32(port.index(), codec::encode_direction(reg, direction))
    }

    // ── Textual attribute surface ────────────────────────────────────────────

    /// Read one attribute, rendered as the external surface shows it
    /// (trailing newline included).
    ///
    /// # Errors
    ///
    /// [`MuxError::NoSuchAttribute`] if the port's schema omits the key;
    /// [`MuxError::Validation`] for an inconsistent hardware selector.
    pub fn read_attr(&self, port_index: usize, key: AttrKey) -> Result<String> {
        let port = self.port(port_index)?;

        if port.schema().get(key).is_none() {
            return Err(MuxError::NoSuchAttribute {
                port: port_index,
                key: key.as_str().to_string(),
            });
        }

        match key {
            AttrKey::Name => Ok(format!("{}\n", port.name())),
            AttrKey::Alternates => {
                let mut out = port.alternate_names().join("\n");
                out.push('\n');
                Ok(out)
            }
            AttrKey::Source => Ok(format!("{}\n", self.selected_source(port_index)?)),
            AttrKey::DirectionControl => Ok(match self.direction_mode(port_index)? {
                DirectionMode::Hardware => "HW\n".to_string(),
                DirectionMode::Software => "SW\n".to_string(),
            }),
            AttrKey::Direction => Ok(match self.direction(port_index)? {
                Direction::Out => "OUT\n".to_string(),
                Direction::In => "IN\n".to_string(),
            }),
        }
    }

    /// Write one attribute through the textual surface.
    ///
    /// Input is trimmed and parsed; the schema's access mode is enforced
    /// here. Errors are local to this operation and never disturb the
    /// register.
    ///
    /// # Errors
    ///
    /// [`MuxError::NoSuchAttribute`], [`MuxError::ReadOnlyAttribute`],
    /// [`MuxError::InvalidWrite`] for unparseable payloads, and
    /// [`MuxError::Range`] for out-of-range sources.
    pub fn write_attr(&self, port_index: usize, key: AttrKey, input: &str) -> Result<()> {
        let port = self.port(port_index)?;

        let descriptor = port.schema().get(key).ok_or_else(|| MuxError::NoSuchAttribute {
            port: port_index,
            key: key.as_str().to_string(),
        })?;

        if descriptor.access == AttrAccess::ReadOnly {
            return Err(MuxError::ReadOnlyAttribute {
                port: port_index,
                key: key.as_str().to_string(),
            });
        }

        let input = input.trim();
        match key {
            AttrKey::Source => {
                let source: u32 = input.parse().map_err(|_| {
                    MuxError::invalid_write(key.as_str(), format!("'{input}' is not a source index"))
                })?;
                self.set_source(port_index, source)
            }
            AttrKey::DirectionControl => {
                let mode = match input.to_ascii_uppercase().as_str() {
                    "HW" => DirectionMode::Hardware,
                    "SW" => DirectionMode::Software,
                    _ => {
                        return Err(MuxError::invalid_write(
                            key.as_str(),
                            format!("'{input}' is neither HW nor SW"),
                        ))
                    }
                };
                self.set_direction_mode(port_index, mode)
            }
            AttrKey::Direction => {
                let direction = match input.to_ascii_uppercase().as_str() {
                    "IN" => Direction::In,
                    "OUT" => Direction::Out,
                    _ => {
                        return Err(MuxError::invalid_write(
                            key.as_str(),
                            format!("'{input}' is neither IN nor OUT"),
                        ))
                    }
                };
                self.set_direction(port_index, direction)
            }
            // Always read-only; the access guard above already rejected them.
            AttrKey::Name | AttrKey::Alternates => Err(MuxError::ReadOnlyAttribute {
                port: port_index,
                key: key.as_str().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::MemWindow;

    fn test_config() -> MuxConfig {
        MuxConfig::from_toml_str(
            r#"
            [[port]]
            name = "uart_rx"
            alternate_names = ["pin3", "pin7", "pin9"]
            direction_control = ["hw_control", "sw_control"]

            [[port]]
            name = "uart_tx"
            alternate_names = ["pin4", "pin8"]
            direction_control = ["hw_control"]
            "#,
        )
        .expect("config")
    }

    fn attach_test_device(registry: &MuxRegistry) -> Arc<MuxDevice> {
        MuxDevice::attach(
            Box::new(MemWindow::with_capability(4, 2)),
            &test_config(),
            registry,
        )
        .expect("attach")
    }

    #[test]
    fn port_table_matches_reconciled_capability() {
        let registry = MuxRegistry::new();
        let device = attach_test_device(&registry);
        assert_eq!(device.ports().len(), device.capability().signal_count as usize);
        assert_eq!(device.name(), "aximux0");
    }

    #[test]
    fn set_source_preserves_direction_bits() {
        let registry = MuxRegistry::new();
        let device = attach_test_device(&registry);

        device
            .set_direction_mode(0, DirectionMode::Hardware)
            .expect("mode");
        device.set_source(0, 2).expect("source");

        assert_eq!(device.selected_source(0).expect("read"), 2);
        assert_eq!(device.direction_mode(0).expect("mode"), DirectionMode::Hardware);
    }

    #[test]
    fn set_source_rejects_out_of_range() {
        let registry = MuxRegistry::new();
        let device = attach_test_device(&registry);

        // Port 1 declares two alternates: 2 is one past the end.
        let err = device.set_source(1, 2).unwrap_err();
        assert!(matches!(err, MuxError::Range { value: 2, .. }));
        assert_eq!(device.selected_source(1).expect("read"), 0);
    }

    #[test]
    fn invalid_port_index_rejected() {
        let registry = MuxRegistry::new();
        let device = attach_test_device(&registry);
        assert!(matches!(
            device.selected_source(5),
            Err(MuxError::InvalidPort { index: 5, .. })
        ));
    }

    #[test]
    fn direction_ops_roundtrip() {
        let registry = MuxRegistry::new();
        let device = attach_test_device(&registry);

        device.set_direction(0, Direction::Out).expect("set");
        assert_eq!(device.direction(0).expect("get"), Direction::Out);

        device.set_direction(0, Direction::In).expect("set");
        assert_eq!(device.direction(0).expect("get"), Direction::In);
    }
}
