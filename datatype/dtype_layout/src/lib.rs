//! Layout engine for derived message-passing datatypes.
//!
//! A derived datatype describes a non-contiguous arrangement of basic
//! elements in memory: strided blocks, indexed blocks, resized bounds,
//! struct-like aggregates. This crate computes the layout facts a transfer
//! engine needs for each new type (payload size, bounds, extent, alignment,
//! contiguity and an upper bound on contiguous runs) in constant or linear
//! time from the base type's facts, without walking its bytes.
//!
//! # Layers
//!
//! - [`attrs`]: pure attribute rules per combinator.
//! - [`blocks`]: contiguous-block estimator, with the fast-path collapse to
//!   a single run.
//! - [`construct`]: one entry point per type constructor, composing the
//!   two over a resolved [`Base`].
//! - [`TypePool`]: reference-counted arena that owns derived types and
//!   their recorded [`Contents`], addressed by [`TypeId`].
//!
//! # Debugging
//!
//! Constructors emit `tracing` spans at `trace` level; fast-path collapses
//! and pool allocation at `debug`. See [`init_tracing`].

mod aggregate;
pub mod attrs;
mod basic;
pub mod blocks;
pub mod construct;
mod error;
mod layout;
mod pool;

pub use basic::BasicType;
pub use construct::{ArrayOrder, DarrayParams, Distribution, SubarrayParams};
pub use error::LayoutError;
pub use layout::{Base, LayoutAttrs, StructField, TypeLayout, Units};
pub use pool::{Contents, TypeId, TypePool, TypeRef, Typerep};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=dtype_layout=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

// TypeLayout is copied out of the pool on every constructor call.
#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<TypeLayout>() <= 128);

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod test_helpers;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
