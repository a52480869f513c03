//! Fixed-rate burst acquisition
//!
//! A burst is one period of the target signal, read back-to-back from a
//! single channel inside an uninterruptible section. Between two reads the
//! sampler pauses for the sample period minus the reader's own latency.

use embedded_hal::blocking::delay::DelayUs;
use log::{debug, trace};

use crate::config::MAX_BURST_LEN;
use crate::drivers::VoltageReader;
use crate::error::ConfigError;
use crate::os::Uninterruptible;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_US: u32 = 1_000;

/// Timing of one acquire/report cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    frequency_hz: u32,
    rate_hz: u32,
    latency_ns: u32,
    idle_ms: u32,
}

impl SamplingPlan {
    /// Validate a plan. Rejects any rate the reader cannot sustain instead of
    /// letting the pause go negative.
    pub const fn new(
        frequency_hz: u32,
        rate_hz: u32,
        latency_ns: u32,
        idle_ms: u32,
    ) -> Result<Self, ConfigError> {
        if frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if rate_hz < frequency_hz {
            return Err(ConfigError::RateBelowFrequency { rate_hz, frequency_hz });
        }

        let len = (rate_hz / frequency_hz) as usize;
        if len > MAX_BURST_LEN {
            return Err(ConfigError::BurstTooLong { len, max: MAX_BURST_LEN });
        }

        let period_ns = (NANOS_PER_SEC / rate_hz as u64) as u32;
        if period_ns <= latency_ns {
            return Err(ConfigError::LatencyExceedsPeriod { period_ns, latency_ns });
        }

        Ok(Self {
            frequency_hz,
            rate_hz,
            latency_ns,
            idle_ms,
        })
    }

    #[inline]
    pub const fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    #[inline]
    pub const fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// N = Fs / F
    #[inline]
    pub const fn burst_len(&self) -> usize {
        (self.rate_hz / self.frequency_hz) as usize
    }

    /// Ts in nanoseconds
    #[inline]
    pub const fn period_ns(&self) -> u32 {
        (NANOS_PER_SEC / self.rate_hz as u64) as u32
    }

    #[inline]
    pub const fn latency_ns(&self) -> u32 {
        self.latency_ns
    }

    /// Ts - L, clamped at zero
    #[inline]
    pub const fn pause_ns(&self) -> u32 {
        self.period_ns().saturating_sub(self.latency_ns)
    }

    #[inline]
    pub const fn idle_ms(&self) -> u32 {
        self.idle_ms
    }
}

/// Splits a fractional-microsecond pause into whole microseconds, carrying
/// the remainder forward so the running total never drifts by a full
/// microsecond.
#[derive(Debug, Clone)]
pub struct PauseSchedule {
    pause_ns: u32,
    carry_ns: u32,
}

impl PauseSchedule {
    pub const fn new(pause_ns: u32) -> Self {
        Self { pause_ns, carry_ns: 0 }
    }

    /// Microseconds to wait after the next read.
    #[inline]
    pub fn next_us(&mut self) -> u32 {
        let due = self.carry_ns + self.pause_ns;
        self.carry_ns = due % NANOS_PER_US;
        due / NANOS_PER_US
    }
}

/// Rising-edge trigger: wait for the signal to pass from below `level_mv` to
/// `level_mv` or above before starting the burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub level_mv: u32,
    pub max_polls: u32,
}

/// One period of calibrated readings, in millivolts.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBurst<const N: usize> {
    samples: [u32; N],
    triggered: bool,
}

impl<const N: usize> SampleBurst<N> {
    pub fn samples(&self) -> &[u32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Whether the burst started on a trigger edge.
    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

/// Owns the reader, the delay source and the critical-section token for the
/// lifetime of the sampling loop.
pub struct Sampler<R, PIN, D, S, const N: usize> {
    reader: R,
    channel: PIN,
    delay: D,
    section: S,
    plan: SamplingPlan,
    trigger: Option<Trigger>,
}

impl<R, PIN, D, S, const N: usize> Sampler<R, PIN, D, S, N>
where
    R: VoltageReader<PIN>,
    D: DelayUs<u32>,
    S: Uninterruptible,
{
    /// The buffer length `N` must match the plan, so every burst has exactly
    /// `plan.burst_len()` samples.
    pub fn new(
        reader: R,
        channel: PIN,
        delay: D,
        section: S,
        plan: SamplingPlan,
    ) -> Result<Self, ConfigError> {
        if plan.burst_len() != N {
            return Err(ConfigError::BufferMismatch {
                plan: plan.burst_len(),
                buffer: N,
            });
        }
        Ok(Self {
            reader,
            channel,
            delay,
            section,
            plan,
            trigger: None,
        })
    }

    pub fn with_trigger(mut self, trigger: Option<Trigger>) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn plan(&self) -> &SamplingPlan {
        &self.plan
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Delay source, handed back for the idle wait between bursts.
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Read one burst. The reads and pauses run inside the critical section;
    /// a failing read aborts the burst and leaves the section.
    pub fn acquire(&mut self) -> Result<SampleBurst<N>, R::Error> {
        let Self {
            reader,
            channel,
            delay,
            section,
            plan,
            trigger,
        } = self;

        let mut samples = [0u32; N];
        let mut schedule = PauseSchedule::new(plan.pause_ns());

        let triggered = section.run(|| -> Result<bool, R::Error> {
            let triggered = match trigger {
                Some(trigger) => wait_for_edge(reader, channel, trigger)?,
                None => false,
            };

            for slot in samples.iter_mut() {
                *slot = reader.read_voltage(channel)?;
                let pause_us = schedule.next_us();
                if pause_us > 0 {
                    delay.delay_us(pause_us);
                }
            }
            Ok(triggered)
        })?;

        debug!("burst complete: {} samples, triggered={}", N, triggered);
        Ok(SampleBurst { samples, triggered })
    }
}

fn wait_for_edge<R, PIN>(
    reader: &mut R,
    channel: &mut PIN,
    trigger: &Trigger,
) -> Result<bool, R::Error>
where
    R: VoltageReader<PIN>,
{
    let mut armed = false;
    for _ in 0..trigger.max_polls {
        let mv = reader.read_voltage(channel)?;
        if mv < trigger.level_mv {
            armed = true;
        } else if armed {
            return Ok(true);
        }
    }
    trace!("trigger timed out after {} polls", trigger.max_polls);
    Ok(false)
}
