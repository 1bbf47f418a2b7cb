//! Capability discovery from the MUXINFO register
//!
//! The mux reports its own geometry: how many ports it exposes and how
//! many alternate sources any port may have. Both values are clamped to
//! the hard limits before anything trusts them.

use crate::error::Result;
use crate::window::RegisterWindow;
use aximux_chip::{codec, regs};

/// Hardware-reported geometry of one mux instance, clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxCapability {
    /// Maximum alternates any port may have, at most 16.
    pub alt_signal_limit: u32,
    /// Number of ports the hardware exposes, at most 32.
    pub signal_count: u32,
}

impl MuxCapability {
    /// Read and clamp MUXINFO from a mapped window.
    ///
    /// # Errors
    ///
    /// Fails if the window is too small to hold the capability register.
    pub fn probe(window: &dyn RegisterWindow) -> Result<Self> {
        let raw = window.read_u32(regs::MUXINFO)?;
        let (alt_raw, count_raw) = codec::decode_capability(raw);
        let (alt_signal_limit, signal_count) = codec::clamp_capability(alt_raw, count_raw);

        if (alt_raw, count_raw) != (alt_signal_limit, signal_count) {
            tracing::debug!(
                "MUXINFO {raw:#010x} clamped: {count_raw}->{signal_count} signals, \
                 {alt_raw}->{alt_signal_limit} alternates"
            );
        }

        tracing::debug!(
            "MUXINFO {raw:#010x}: {signal_count} signals, up to {alt_signal_limit} alternates"
        );

        Ok(Self {
            alt_signal_limit,
            signal_count,
        })
    }
}
