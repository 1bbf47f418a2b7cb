//! Silicon model for the AXI mux signal router.
//!
//! This crate has **no dependencies** and **no hardware access** — it is a
//! pure model of the IP core: register offsets, bit fields, hard limits,
//! and the codec between abstract port state and the packed register words.
//!
//! The mux routes each of up to 32 logical ports onto one of up to 16
//! alternate input sources, with optional hardware/software direction
//! control per port. Everything here mirrors the IP core's generated
//! register map; the hard limits are the generator's compile-time bounds.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`regs`] | Register map — offsets, bit definitions, hard limits |
//! | [`codec`] | Pure encode/decode between port state and register words |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod regs;
