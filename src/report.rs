//! Per-cycle console report
//!
//! ```text
//! F: 60, Fs: 32400, N: 540
//!
//! Samples:[
//!
//! 512,530,...
//!
//!  V_rms: 707.106781 mV, V_dc: 500.000000 mV, Diff: 207.106781 mV
//! ```

use ufmt::{uDisplay, uWrite, uwrite, uwriteln, Formatter};

use crate::analysis::CycleStatistics;
use crate::sampler::SamplingPlan;

const FRACTION_DIGITS: u32 = 6;
const FRACTION_SCALE: f64 = 1_000_000.0;

/// Millivolt value printed with six decimals; `ufmt` has no float support.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Millivolts(pub f64);

impl uDisplay for Millivolts {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let scaled = libm::round(libm::fabs(self.0) * FRACTION_SCALE) as u64;
        if self.0 < 0.0 && scaled != 0 {
            f.write_char('-')?;
        }

        let whole = scaled / FRACTION_SCALE as u64;
        let fraction = scaled % FRACTION_SCALE as u64;
        uwrite!(f, "{}.", whole)?;

        let mut divisor = 10u64.pow(FRACTION_DIGITS - 1);
        while divisor > 0 {
            let digit = ((fraction / divisor) % 10) as u8;
            f.write_char((b'0' + digit) as char)?;
            divisor /= 10;
        }
        Ok(())
    }
}

/// Header, raw samples, and the statistics trailer for one cycle.
pub fn write_cycle<W>(
    w: &mut W,
    plan: &SamplingPlan,
    samples: &[u32],
    stats: &CycleStatistics,
) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwriteln!(
        w,
        "F: {}, Fs: {}, N: {} \n",
        plan.frequency_hz(),
        plan.rate_hz(),
        plan.burst_len()
    )?;

    // the list is left open; readers split on the blank lines
    w.write_str("Samples:[\n\n")?;
    for mv in samples {
        uwrite!(w, "{},", *mv)?;
    }
    w.write_str("\n\n")?;

    uwriteln!(
        w,
        " V_rms: {} mV, V_dc: {} mV, Diff: {} mV\n",
        Millivolts(stats.rms_mv),
        Millivolts(stats.dc_mv),
        Millivolts(stats.diff_mv())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: f64) -> String {
        let mut out = String::new();
        uwrite!(out, "{}", Millivolts(value)).unwrap();
        out
    }

    #[test]
    fn millivolts_six_decimals() {
        assert_eq!(render(0.0), "0.000000");
        assert_eq!(render(100.0), "100.000000");
        assert_eq!(render(707.1067811865476), "707.106781");
        assert_eq!(render(207.10678118654755), "207.106781");
        assert_eq!(render(0.0000004), "0.000000");
        assert_eq!(render(1.9999996), "2.000000");
    }

    #[test]
    fn negative_values_keep_sign() {
        assert_eq!(render(-12.5), "-12.500000");
        assert_eq!(render(-0.0000001), "0.000000");
    }

    #[test]
    fn cycle_block() {
        let plan = SamplingPlan::new(60, 240, 25_000, 2_500).unwrap();
        let samples = [0, 1_000, 0, 1_000];
        let stats = CycleStatistics::from_samples(&samples).unwrap();

        let mut out = String::new();
        write_cycle(&mut out, &plan, &samples, &stats).unwrap();

        assert_eq!(
            out,
            "F: 60, Fs: 240, N: 4 \n\n\
             Samples:[\n\n\
             0,1000,0,1000,\n\n \
             V_rms: 707.106781 mV, V_dc: 500.000000 mV, Diff: 207.106781 mV\n\n"
        );
    }
}
