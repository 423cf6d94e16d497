//! Purpose: Shared library crate used by the `funcson` CLI and tests.
//! Exports: `api` (codec, documents, compile seam) and `core` (pipeline).
//! Role: Library backing the binary; `api` is the supported embedding surface.
//! Invariants: `core` module layout may shift; `api` stays additive-only.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
