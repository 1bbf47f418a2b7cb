//! Register window abstraction
//!
//! One seam over the mapped hardware window and the in-memory double used
//! by tests and tooling. Offsets are register words: the AXI slave decodes
//! the low two address bits away, so word addressing matches how the
//! hardware numbers its registers (port index = word offset).

use crate::error::{MuxError, Result};
use aximux_chip::{codec, regs};
use std::fmt::Debug;

/// Word-addressed window over the mux register file.
///
/// Implementations bound-check every access; a `MuxDevice` serializes
/// read-modify-write sequences on top of this.
pub trait RegisterWindow: Debug + Send {
    /// Read the 32-bit register at `word`.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::OutOfBounds`] if `word` is beyond the window.
    fn read_u32(&self, word: usize) -> Result<u32>;

    /// Write the 32-bit register at `word`.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::OutOfBounds`] if `word` is beyond the window.
    fn write_u32(&mut self, word: usize, value: u32) -> Result<()>;

    /// Number of 32-bit words the window covers.
    fn words(&self) -> usize;
}

/// In-memory register file.
///
/// Behaves like the hardware window, including the MUXINFO word, so the
/// whole attach and attribute path runs without a device.
#[derive(Debug, Clone)]
pub struct MemWindow {
    words: Vec<u32>,
}

impl MemWindow {
    /// Window whose MUXINFO reports `signal_count` ports with at most
    /// `alt_signal_limit` alternates each.
    #[must_use]
    pub fn with_capability(alt_signal_limit: u32, signal_count: u32) -> Self {
        let mut words = vec![0u32; regs::MUXINFO + 1];
        words[regs::MUXINFO] = codec::encode_capability(alt_signal_limit, signal_count);
        Self { words }
    }

    /// Window with a raw MUXINFO word, for exercising clamp paths.
    #[must_use]
    pub fn with_raw_muxinfo(muxinfo: u32) -> Self {
        let mut words = vec![0u32; regs::MUXINFO + 1];
        words[regs::MUXINFO] = muxinfo;
        Self { words }
    }
}

impl RegisterWindow for MemWindow {
    fn read_u32(&self, word: usize) -> Result<u32> {
        self.words
            .get(word)
            .copied()
            .ok_or(MuxError::OutOfBounds {
                word,
                words: self.words.len(),
            })
    }

    fn write_u32(&mut self, word: usize, value: u32) -> Result<()> {
        let words = self.words.len();
        match self.words.get_mut(word) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(MuxError::OutOfBounds { word, words }),
        }
    }

    fn words(&self) -> usize {
        self.words.len()
    }
}
