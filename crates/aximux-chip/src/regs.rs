//! Register map for the AXI mux.
//!
//! The core exposes one 32-bit control register per port, addressed by the
//! port index, and a single capability register (`MUXINFO`) above the port
//! array. Registers are word-addressed; the low two address bits are
//! decoded away by the AXI slave.
//!
//! ```text
//! word 0x00..0x1f: per-port control registers (word offset = port index)
//! word 0x80:       MUXINFO capability register
//! ```
//!
//! Per-port control register layout:
//!
//! ```text
//! bit  7: DIRCTL   software direction value
//! bit  6: DIREN    direction-control mode
//! bit  5: SHORTSEL short-select enable
//! bits 3:0         source-select index
//! ```

// ── Identity ─────────────────────────────────────────────────────────────────

/// Platform device name; used for UIO matching and instance naming.
pub const DEVICE_NAME: &str = "aximux";

/// Device-tree compatible string for this IP core revision.
pub const COMPATIBLE: &str = "axi-mux-2.0";

// ── Addressing ───────────────────────────────────────────────────────────────

/// Shift converting a register word offset to a byte offset.
pub const ADDR_LSB: usize = 2;

/// Capability register word offset.
pub const MUXINFO: usize = 0x80;

/// Byte offset of a register word, for byte-addressed windows.
#[must_use]
pub const fn reg_offset(word: usize) -> usize {
    word << ADDR_LSB
}

// ── Per-port control register bits ───────────────────────────────────────────

pub mod port {
    //! Bit definitions of the per-port control register.

    /// Source-select field (bits 3:0). Values above 15 truncate.
    pub const SRCSEL_MASK: u32 = 0xF;

    /// Short-select enable. The RTL wires it; the control plane does not
    /// expose it as an attribute.
    pub const SHORTSEL: u32 = 1 << 5;

    /// Direction-control mode: 1 = hardware strap, 0 = software bit.
    /// The generator's direction mux reads the opposite way; this polarity
    /// follows the shipped driver until a board confirms it.
    pub const DIREN: u32 = 1 << 6;

    /// Software direction value, meaningful when the mode selects software.
    pub const DIRCTL: u32 = 1 << 7;
}

// ── MUXINFO fields ───────────────────────────────────────────────────────────

pub mod muxinfo {
    //! Field extraction for the capability register.

    /// Bits 7:0 — number of ports the hardware exposes.
    pub const SIGNAL_COUNT_MASK: u32 = 0xFF;

    /// Bits 15:8 — maximum alternates any port may have.
    pub const ALT_LIMIT_MASK: u32 = 0xFF;
    /// Shift for the alternate-limit field.
    pub const ALT_LIMIT_SHIFT: u32 = 8;
}

// ── Hard limits ──────────────────────────────────────────────────────────────

pub mod limits {
    //! Upper bounds the control plane enforces regardless of what the
    //! hardware reports. Headroom values, not user-configurable.

    /// Longest signal name stored per port, in characters.
    pub const SIGNAL_NAME: usize = 16;

    /// Most ports a single instance may expose.
    pub const SIGNALS: usize = 32;

    /// Most alternate sources any port may have.
    pub const SIGNAL_ALTS: usize = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_to_byte_offsets() {
        assert_eq!(reg_offset(0), 0);
        assert_eq!(reg_offset(1), 4);
        assert_eq!(reg_offset(31), 124);
        assert_eq!(reg_offset(MUXINFO), 0x200);
    }

    #[test]
    fn port_bits_disjoint_from_source_field() {
        assert_eq!(port::SRCSEL_MASK & port::SHORTSEL, 0);
        assert_eq!(port::SRCSEL_MASK & port::DIREN, 0);
        assert_eq!(port::SRCSEL_MASK & port::DIRCTL, 0);
        assert_eq!(port::DIREN & port::DIRCTL, 0);
    }

    #[test]
    fn muxinfo_above_port_array() {
        assert!(MUXINFO >= limits::SIGNALS);
    }
}
