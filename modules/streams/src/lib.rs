#![deny(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::missing_safety_doc)]
#![cfg_attr(not(test), deny(clippy::redundant_clone))]
#![deny(clippy::redundant_field_names)]
#![deny(clippy::redundant_pattern)]
#![deny(clippy::needless_borrow)]
#![deny(clippy::manual_ok_or)]
#![deny(clippy::manual_map)]
#![deny(clippy::manual_let_else)]
#![deny(clippy::unused_self)]
#![deny(clippy::unnecessary_wraps)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::print_stdout)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::must_use_candidate)]
#![deny(clippy::len_without_is_empty)]
#![deny(clippy::from_over_into)]
#![deny(clippy::match_like_matches_macro)]
#![deny(unreachable_pub)]
//! Reactive-streams operator core.
//!
//! The centerpiece is the demand-driven flat-map merge coordinator: it maps
//! each upstream element to an inner sequence and merges every concurrently
//! active inner into one serialized downstream, honoring backpressure,
//! cancellation, queue fusion, and configurable terminal semantics.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

/// Operator core: contract traits, sources, probes, and the flat-map machine.
pub mod core;
