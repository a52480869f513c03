//! Synthetic mains waveform behind a one-shot converter interface

use core::convert::Infallible;
use core::f64::consts::TAU;
use std::time::{Duration, Instant};

use embedded_hal::adc::{Channel, OneShot};

use super::calibration::Width;
use crate::config::ADC_CHANNEL;
use crate::hal::host::spin_for;

/// Input pin of the synthetic converter.
#[derive(Debug, Default)]
pub struct MainsInput;

impl Channel<SyntheticMains> for MainsInput {
    type ID = u8;

    fn channel() -> u8 {
        ADC_CHANNEL
    }
}

/// `offset + amplitude * sin(2 pi f t)` in raw converter codes, with `t`
/// measured from construction. Each conversion takes `conversion` to
/// complete.
#[derive(Debug)]
pub struct SyntheticMains {
    origin: Instant,
    frequency_hz: f64,
    offset: f64,
    amplitude: f64,
    full_scale: u16,
    conversion: Duration,
}

impl SyntheticMains {
    /// `offset` and `amplitude` are fractions of full scale.
    pub fn new(frequency_hz: u32, offset: f64, amplitude: f64, width: Width) -> Self {
        Self {
            origin: Instant::now(),
            frequency_hz: frequency_hz as f64,
            offset,
            amplitude,
            full_scale: (1u16 << width.bits()) - 1,
            conversion: Duration::ZERO,
        }
    }

    pub fn with_conversion_time(mut self, conversion: Duration) -> Self {
        self.conversion = conversion;
        self
    }

    /// Raw code at `t` seconds after the origin.
    pub fn code_at(&self, t: f64) -> u16 {
        let level = self.offset + self.amplitude * libm::sin(TAU * self.frequency_hz * t);
        let code = libm::round(level * self.full_scale as f64);
        code.clamp(0.0, self.full_scale as f64) as u16
    }
}

impl<PIN> OneShot<SyntheticMains, u16, PIN> for SyntheticMains
where
    PIN: Channel<SyntheticMains, ID = u8>,
{
    type Error = Infallible;

    fn read(&mut self, _pin: &mut PIN) -> nb::Result<u16, Infallible> {
        let t = self.origin.elapsed().as_secs_f64();
        spin_for(self.conversion);
        Ok(self.code_at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_spans_offset_plus_minus_amplitude() {
        let source = SyntheticMains::new(60, 0.5, 0.25, Width::Bits12);
        let period = 1.0 / 60.0;
        assert_eq!(source.code_at(0.0), 2_048);
        assert_eq!(source.code_at(period / 4.0), 3_071);
        assert_eq!(source.code_at(3.0 * period / 4.0), 1_024);
    }

    #[test]
    fn codes_clamp_to_full_scale() {
        let source = SyntheticMains::new(60, 0.5, 1.0, Width::Bits10);
        let period = 1.0 / 60.0;
        assert_eq!(source.code_at(period / 4.0), 1_023);
        assert_eq!(source.code_at(3.0 * period / 4.0), 0);
    }

    #[test]
    fn reads_through_one_shot() {
        let mut source = SyntheticMains::new(60, 0.25, 0.0, Width::Bits12);
        let code = nb::block!(source.read(&mut MainsInput)).unwrap();
        assert_eq!(code, 1_024);
    }
}
