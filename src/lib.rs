//! Concurrent FHIR pseudonymization pipeline.
//!
//! Records are streamed from a [`storage::StorageProvider`], sent through a
//! [`transform::TransformClient`] by a bounded worker pool and written back
//! to the destination; the run yields per-category counts.

pub mod app;
pub mod config;
pub mod domain;
pub mod io;
pub mod pipeline;
pub mod prelude;
pub mod registry;
pub mod storage;
pub mod transform;
