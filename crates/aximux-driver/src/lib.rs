//! Userspace driver for the AXI mux control plane.
//!
//! The mux core is a register file behind an AXI-Lite slave: one 32-bit
//! control register per routable port, plus a capability word describing
//! the geometry. This crate maps that window, reconciles it against a
//! TOML port configuration, and exposes every port through a typed
//! attribute surface.
//!
//! # Attach pipeline
//!
//! ```text
//! UioWindow / MemWindow          register access, bound-checked
//!   MuxCapability::probe         MUXINFO word, clamped to hard limits
//!   reconcile with MuxConfig     the smaller port count wins
//!   Port + PortSchema            identity, alternates, direction flags
//!   MuxRegistry publish          visible as aximux<N>
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use aximux_driver::{AttrKey, MuxConfig, MuxDevice, MuxRegistry, UioWindow};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = MuxRegistry::new();
//! let config = MuxConfig::from_path("ports.toml")?;
//! let window = UioWindow::open("/dev/uio0")?;
//!
//! let mux = MuxDevice::attach(Box::new(window), &config, &registry)?;
//! println!("{}: {} ports", mux.name(), mux.ports().len());
//!
//! mux.set_source(0, 1)?;
//! print!("{}", mux.read_attr(0, AttrKey::Source)?);
//!
//! mux.detach(&registry);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod attrs;
mod capability;
mod config;
mod error;
mod instance;
mod port;
mod registry;
pub mod uio;
mod window;

pub use attrs::{AttrAccess, AttrDescriptor, AttrKey, PortSchema};
pub use capability::MuxCapability;
pub use config::{DirectionCapability, MuxConfig, PortConfig};
pub use error::{MuxError, Result};
pub use instance::MuxDevice;
pub use port::{DirectionFlags, Port};
pub use registry::{MuxRegistry, MAX_INSTANCES};
pub use uio::{enumerate, UioDevice, UioWindow};
pub use window::{MemWindow, RegisterWindow};

pub use aximux_chip::codec::{Direction, DirectionMode};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        AttrKey, Direction, DirectionMode, MemWindow, MuxCapability, MuxConfig, MuxDevice,
        MuxError, MuxRegistry, RegisterWindow, Result, UioWindow,
    };
}
