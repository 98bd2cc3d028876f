//! Library half of the `slyvid` binary: configuration, run context and
//! the upload pipeline.

pub mod config;
pub mod context;
pub mod pipeline;
