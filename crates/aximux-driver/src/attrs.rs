//! Per-port attribute schema
//!
//! Which endpoints a port exposes, and whether they accept writes, depends
//! on its direction-control flags. The schema is data: a small descriptor
//! set computed once at attach and fixed for the port's lifetime. Accessors
//! address attributes by `(port index, key)`; nothing dispatches on layout.
//!
//! | Attribute | Exposure |
//! |---|---|
//! | `name` | always, read-only |
//! | `alternates` | always, read-only |
//! | `source` | always, read-write |
//! | `direction_control` | always; read-write only with both hardware and software control |
//! | `direction` | only with software control, read-write |

use crate::error::{MuxError, Result};
use crate::port::DirectionFlags;

/// Attribute endpoints a port can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKey {
    /// Signal name.
    Name,
    /// Newline-joined alternate source names.
    Alternates,
    /// Selected source index, decimal.
    Source,
    /// Direction-control mode, `HW` or `SW`.
    DirectionControl,
    /// Software direction value, `IN` or `OUT`.
    Direction,
}

impl AttrKey {
    /// External name of the attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Alternates => "alternates",
            Self::Source => "source",
            Self::DirectionControl => "direction_control",
            Self::Direction => "direction",
        }
    }

    /// Look up a key by its external name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "alternates" => Some(Self::Alternates),
            "source" => Some(Self::Source),
            "direction_control" => Some(Self::DirectionControl),
            "direction" => Some(Self::Direction),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access mode of an exposed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrAccess {
    /// Reads only; writes are rejected.
    ReadOnly,
    /// Reads and writes.
    ReadWrite,
}

/// One exposed attribute of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrDescriptor {
    /// Attribute key.
    pub key: AttrKey,
    /// Access mode the schema grants.
    pub access: AttrAccess,
}

/// The fixed attribute set of one port.
#[derive(Debug, Clone)]
pub struct PortSchema {
    entries: Vec<AttrDescriptor>,
}

impl PortSchema {
    /// Derive the schema from a port's direction flags.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::Config`] when neither `HAS_HW_CONTROL` nor
    /// `HAS_SW_CONTROL` is set: such a port has no reachable direction
    /// control and the configuration is rejected rather than exposed with
    /// dead endpoints.
    pub fn build(flags: DirectionFlags) -> Result<Self> {
        let has_hw = flags.contains(DirectionFlags::HAS_HW_CONTROL);
        let has_sw = flags.contains(DirectionFlags::HAS_SW_CONTROL);

        if !has_hw && !has_sw {
            return Err(MuxError::config(
                "neither hardware nor software direction control",
            ));
        }

        let mode_access = if has_hw && has_sw {
            AttrAccess::ReadWrite
        } else {
            AttrAccess::ReadOnly
        };

        let mut entries = vec![
            AttrDescriptor {
                key: AttrKey::Name,
                access: AttrAccess::ReadOnly,
            },
            AttrDescriptor {
                key: AttrKey::Alternates,
                access: AttrAccess::ReadOnly,
            },
            AttrDescriptor {
                key: AttrKey::Source,
                access: AttrAccess::ReadWrite,
            },
            AttrDescriptor {
                key: AttrKey::DirectionControl,
                access: mode_access,
            },
        ];

        if has_sw {
            entries.push(AttrDescriptor {
                key: AttrKey::Direction,
                access: AttrAccess::ReadWrite,
            });
        }

        Ok(Self { entries })
    }

    /// Exposed attributes, stable order.
    #[must_use]
    pub fn entries(&self) -> &[AttrDescriptor] {
        &self.entries
    }

    /// Descriptor for `key`, if the schema exposes it.
    #[must_use]
    pub fn get(&self, key: AttrKey) -> Option<AttrDescriptor> {
        self.entries.iter().copied().find(|d| d.key == key)
    }

    /// Number of exposed attributes (4 or 5).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no attributes are exposed. Never the case for a built schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_only_port() {
        let schema = PortSchema::build(DirectionFlags::HAS_HW_CONTROL).expect("schema");
        assert_eq!(schema.len(), 4);
        assert_eq!(
            schema.get(AttrKey::DirectionControl).map(|d| d.access),
            Some(AttrAccess::ReadOnly)
        );
        assert!(schema.get(AttrKey::Direction).is_none());
    }

    #[test]
    fn software_only_port() {
        let schema = PortSchema::build(DirectionFlags::HAS_SW_CONTROL).expect("schema");
        assert_eq!(schema.len(), 5);
        assert_eq!(
            schema.get(AttrKey::DirectionControl).map(|d| d.access),
            Some(AttrAccess::ReadOnly)
        );
        assert_eq!(
            schema.get(AttrKey::Direction).map(|d| d.access),
            Some(AttrAccess::ReadWrite)
        );
    }

    #[test]
    fn dual_control_port() {
        let schema =
            PortSchema::build(DirectionFlags::HAS_HW_CONTROL | DirectionFlags::HAS_SW_CONTROL)
                .expect("schema");
        assert_eq!(schema.len(), 5);
        assert_eq!(
            schema.get(AttrKey::DirectionControl).map(|d| d.access),
            Some(AttrAccess::ReadWrite)
        );
        assert_eq!(
            schema.get(AttrKey::Direction).map(|d| d.access),
            Some(AttrAccess::ReadWrite)
        );
    }

    #[test]
    fn no_control_rejected() {
        assert!(matches!(
            PortSchema::build(DirectionFlags::empty()),
            Err(MuxError::Config { .. })
        ));
        // Auxiliary flags alone do not make direction control reachable.
        assert!(matches!(
            PortSchema::build(DirectionFlags::SW_DIRECTION | DirectionFlags::HWSW_TOGGLE),
            Err(MuxError::Config { .. })
        ));
    }

    #[test]
    fn auxiliary_flags_do_not_change_schema() {
        let bare = PortSchema::build(DirectionFlags::HAS_HW_CONTROL).expect("schema");
        let decorated = PortSchema::build(
            DirectionFlags::HAS_HW_CONTROL
                | DirectionFlags::SW_DIRECTION
                | DirectionFlags::HWSW_TOGGLE,
        )
        .expect("schema");
        assert_eq!(bare.entries(), decorated.entries());
    }

    #[test]
    fn base_attributes_always_present() {
        for flags in [
            DirectionFlags::HAS_HW_CONTROL,
            DirectionFlags::HAS_SW_CONTROL,
            DirectionFlags::HAS_HW_CONTROL | DirectionFlags::HAS_SW_CONTROL,
        ] {
            let schema = PortSchema::build(flags).expect("schema");
            assert_eq!(
                schema.get(AttrKey::Name).map(|d| d.access),
                Some(AttrAccess::ReadOnly)
            );
            assert_eq!(
                schema.get(AttrKey::Alternates).map(|d| d.access),
                Some(AttrAccess::ReadOnly)
            );
            assert_eq!(
                schema.get(AttrKey::Source).map(|d| d.access),
                Some(AttrAccess::ReadWrite)
            );
        }
    }

    #[test]
    fn key_names_roundtrip() {
        for key in [
            AttrKey::Name,
            AttrKey::Alternates,
            AttrKey::Source,
            AttrKey::DirectionControl,
            AttrKey::Direction,
        ] {
            assert_eq!(AttrKey::from_name(key.as_str()), Some(key));
        }
        assert_eq!(AttrKey::from_name("short_select"), None);
    }
}
