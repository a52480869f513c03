//! Error types shared by the sampler and the analyzer loop

use thiserror::Error;

/// A sampling plan that cannot be honoured by the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("target frequency must be non-zero")]
    ZeroFrequency,

    #[error("sample rate {rate_hz} Hz is below the target frequency {frequency_hz} Hz")]
    RateBelowFrequency { rate_hz: u32, frequency_hz: u32 },

    #[error("burst of {len} samples exceeds the ceiling of {max}")]
    BurstTooLong { len: usize, max: usize },

    /// Fs * L >= 1: the reader cannot keep up with the nominal rate and
    /// sampling would free-run at the reader latency.
    #[error("sample period {period_ns} ns does not exceed read latency {latency_ns} ns")]
    LatencyExceedsPeriod { period_ns: u32, latency_ns: u32 },

    #[error("plan yields {plan} samples but the burst buffer holds {buffer}")]
    BufferMismatch { plan: usize, buffer: usize },
}

/// Reasons a single acquire/report cycle did not complete.
#[derive(Debug, Error)]
pub enum CycleError<R, W> {
    #[error("voltage read failed: {0:?}")]
    Read(R),

    #[error("console write failed: {0:?}")]
    Console(W),
}
