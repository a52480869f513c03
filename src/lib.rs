//! Mains-cycle sampler: reads one period of a 60 Hz signal at a fixed rate
//! with interrupts held off, then reports the RMS and DC voltage of the
//! burst.
#![cfg_attr(target_arch = "avr", no_std)]

pub mod analysis;
pub mod application;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod hal;
pub mod os;
pub mod report;
pub mod sampler;

#[cfg(test)]
mod testing;

pub use analysis::CycleStatistics;
pub use application::Analyzer;
pub use error::{ConfigError, CycleError};
pub use sampler::{SampleBurst, Sampler, SamplingPlan, Trigger};
