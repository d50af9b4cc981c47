//! Property-based tests for oxifloat
//!
//! These verify the algebraic identities the engine is supposed to hold
//! bit-for-bit, driven by arbitrary encodings rather than hand-picked
//! vectors.

mod double_double_properties;
mod ieee_properties;
