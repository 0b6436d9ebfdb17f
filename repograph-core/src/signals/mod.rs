//! Signal derivation over aggregated facts.
//!
//! Each deriver is a set of free functions: a per-project function that reads
//! the project's finished metrics and dependency summary, and a repository
//! rollup over the finished projects.

pub mod architecture;
pub mod modernization;
pub mod structural;

pub use modernization::RuntimeModernizationBuilder;
