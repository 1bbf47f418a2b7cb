//! Pure codec between abstract port state and the packed register words.
//!
//! Every function here is total: out-of-range inputs are truncated by the
//! field mask, exactly as the hardware truncates them. Range validation
//! against a port's configured alternates is the caller's job and happens
//! before any encode.

use crate::regs::{limits, muxinfo, port};

/// Direction-control mode of one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionMode {
    /// Direction follows the hardware strap.
    Hardware,
    /// Direction follows the software direction bit.
    Software,
}

/// Direction value of a software-directed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Port drives inward.
    In,
    /// Port drives outward.
    Out,
}

// ── Source select ────────────────────────────────────────────────────────────

/// Replace the source-select field, preserving every other bit.
#[must_use]
pub const fn encode_source(reg: u32, source: u32) -> u32 {
    (reg & !port::SRCSEL_MASK) | (source & port::SRCSEL_MASK)
}

/// Selected source index of a control register.
#[must_use]
pub const fn decode_source(reg: u32) -> u32 {
    reg & port::SRCSEL_MASK
}

// ── Direction control ────────────────────────────────────────────────────────

/// Set the direction-control mode bit, preserving every other bit.
#[must_use]
pub const fn encode_direction_mode(reg: u32, mode: DirectionMode) -> u32 {
    match mode {
        DirectionMode::Hardware => reg | port::DIREN,
        DirectionMode::Software => reg & !port::DIREN,
    }
}

/// Direction-control mode of a control register.
#[must_use]
pub const fn decode_direction_mode(reg: u32) -> DirectionMode {
    if reg & port::DIREN != 0 {
        DirectionMode::Hardware
    } else {
        DirectionMode::Software
    }
}

/// Set the software direction bit, preserving every other bit.
#[must_use]
pub const fn encode_direction(reg: u32, direction: Direction) -> u32 {
    match direction {
        Direction::Out => reg | port::DIRCTL,
        Direction::In => reg & !port::DIRCTL,
    }
}

/// Software direction value of a control register.
#[must_use]
pub const fn decode_direction(reg: u32) -> Direction {
    if reg & port::DIRCTL != 0 {
        Direction::Out
    } else {
        Direction::In
    }
}

// ── Short select ─────────────────────────────────────────────────────────────

/// Set the short-select bit, preserving every other bit.
#[must_use]
pub const fn encode_short_select(reg: u32, enabled: bool) -> u32 {
    if enabled {
        reg | port::SHORTSEL
    } else {
        reg & !port::SHORTSEL
    }
}

/// Short-select state of a control register.
#[must_use]
pub const fn decode_short_select(reg: u32) -> bool {
    reg & port::SHORTSEL != 0
}

// ── Capability register ──────────────────────────────────────────────────────

/// Raw capability fields of a MUXINFO word: `(alt_signal_limit, signal_count)`.
///
/// Values are as the hardware reports them; clamp with [`clamp_capability`]
/// before use.
#[must_use]
pub const fn decode_capability(muxinfo: u32) -> (u32, u32) {
    (
        (muxinfo >> muxinfo::ALT_LIMIT_SHIFT) & muxinfo::ALT_LIMIT_MASK,
        muxinfo & muxinfo::SIGNAL_COUNT_MASK,
    )
}

/// Pack capability fields into a MUXINFO word.
#[must_use]
pub const fn encode_capability(alt_signal_limit: u32, signal_count: u32) -> u32 {
    ((alt_signal_limit & muxinfo::ALT_LIMIT_MASK) << muxinfo::ALT_LIMIT_SHIFT)
        | (signal_count & muxinfo::SIGNAL_COUNT_MASK)
}

/// Clamp hardware-reported capability fields to the hard limits.
///
/// Silent truncation: the limits are headroom bounds, not an error surface.
#[must_use]
pub const fn clamp_capability(alt_signal_limit: u32, signal_count: u32) -> (u32, u32) {
    let alts = limits::SIGNAL_ALTS as u32;
    let signals = limits::SIGNALS as u32;
    (
        if alt_signal_limit > alts { alts } else { alt_signal_limit },
        if signal_count > signals { signals } else { signal_count },
    )
}
