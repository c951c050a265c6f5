#![deny(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::missing_safety_doc)]
#![cfg_attr(not(test), deny(clippy::redundant_clone))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::print_stdout)]
#![deny(clippy::dbg_macro)]
#![deny(unreachable_pub)]
#![no_std]

//! Entry point crate for the rivulet reactive-streams workspace.
//!
//! Re-exports the workspace member crates under stable module names so a
//! dependent only needs a single `rivulet-rs` dependency. The operator core
//! lives in [`streams`], the shared queue and synchronization primitives in
//! [`utils`].

pub use rivulet_streams_rs as streams;
pub use rivulet_utils_rs as utils;

/// Returns the semantic version of the workspace facade crate.
#[must_use]
pub const fn crate_version() -> &'static str {
  env!("CARGO_PKG_VERSION")
}
