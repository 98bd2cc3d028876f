//! Domain model and local processing for video annotation uploads.
//!
//! Everything here is free of network access: the annotation model and
//! its wire format, mask loading, video probing, and the assembly of an
//! annotation from a mask directory and a rectangle table.

pub mod annotation;
pub mod assembly;
pub mod error;
pub mod geometry;
pub mod hashing;
pub mod meta;
pub mod naming;
pub mod probe;
pub mod roundtrip;
pub mod schema;
pub mod types;
