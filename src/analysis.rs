//! RMS and DC estimates over one burst

/// Voltage estimates for one signal period, in millivolts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStatistics {
    pub rms_mv: f64,
    pub dc_mv: f64,
}

impl CycleStatistics {
    /// `None` for an empty burst.
    ///
    /// Accumulates in f64: 540 squares of a few thousand mV stay far below
    /// the 2^53 exact-integer limit.
    pub fn from_samples(samples: &[u32]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let (sum, sum_sq) = samples.iter().fold((0.0f64, 0.0f64), |(sum, sum_sq), &mv| {
            let mv = mv as f64;
            (sum + mv, sum_sq + mv * mv)
        });
        let n = samples.len() as f64;

        Some(Self {
            rms_mv: libm::sqrt(sum_sq / n),
            dc_mv: sum / n,
        })
    }

    /// RMS - DC, reported as a diagnostic
    #[inline]
    pub fn diff_mv(&self) -> f64 {
        self.rms_mv - self.dc_mv
    }
}
