//! Configuration constants for the mains sampler

use crate::drivers::calibration::{Attenuation, Width};
use crate::os::ticks_to_ms;
use crate::sampler::{SamplingPlan, Trigger};

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Frequency of the measured signal in Hz
pub const TARGET_FREQUENCY_HZ: u32 = 60;

/// Sampling rate in Hz
pub const SAMPLE_RATE_HZ: u32 = 32_400;

/// Upper bound on the burst length. A full burst lives on the stack for the
/// whole cycle.
pub const MAX_BURST_LEN: usize = 540;

/// Time one calibrated conversion takes, loop overhead included
#[cfg(target_arch = "avr")]
pub const READ_LATENCY_NS: u32 = 25_000;

/// Time one calibrated conversion takes on a hosted build
#[cfg(not(target_arch = "avr"))]
pub const READ_LATENCY_NS: u32 = 2_000;

/// Idle time between two cycles, in scheduler ticks
pub const IDLE_TICKS: u32 = 250;

/// Length of one scheduler tick in milliseconds
pub const TICK_PERIOD_MS: u32 = 10;

/// `SCHED_FIFO` priority requested for the sampler thread on hosted builds
#[cfg(not(target_arch = "avr"))]
pub const SAMPLER_RT_PRIORITY: i32 = 80;

/// Reference voltage in millivolts, used when nothing is stored in EEPROM
pub const DEFAULT_VREF_MV: u16 = 1050;

/// Converter input carrying the measured signal
pub const ADC_CHANNEL: u8 = 6;

#[cfg(target_arch = "avr")]
pub const ADC_WIDTH: Width = Width::Bits10;

#[cfg(not(target_arch = "avr"))]
pub const ADC_WIDTH: Width = Width::Bits12;

pub const ADC_ATTENUATION: Attenuation = Attenuation::Db0;

/// Rising-edge trigger armed before every burst. `None` samples free-running.
pub const TRIGGER: Option<Trigger> = None;

/// Samples per burst
pub const BURST_LEN: usize = (SAMPLE_RATE_HZ / TARGET_FREQUENCY_HZ) as usize;

/// Sampling plan built from the constants above. Evaluated at compile time,
/// an impossible combination fails the build.
pub const PLAN: SamplingPlan = match SamplingPlan::new(
    TARGET_FREQUENCY_HZ,
    SAMPLE_RATE_HZ,
    READ_LATENCY_NS,
    ticks_to_ms(IDLE_TICKS, TICK_PERIOD_MS),
) {
    Ok(plan) => plan,
    Err(_) => panic!("invalid sampling configuration"),
};

const _: () = assert!(PLAN.burst_len() == BURST_LEN);
