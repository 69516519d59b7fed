//! In-process adapters
//!
//! Lightweight [`crate::core::ports::KpiEventSink`] and
//! [`crate::core::ports::VectorStore`] implementations backed by memory.
//! Useful for tests, demos, and single-process deployments.

pub mod kpi_sink;
pub mod vector_store;

pub use kpi_sink::InMemoryKpiSink;
pub use vector_store::InMemoryVectorStore;
