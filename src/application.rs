//! Acquire, reduce, report, idle, forever

use core::fmt::Debug;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use log::{debug, warn};
use ufmt::uWrite;

use crate::analysis::CycleStatistics;
use crate::drivers::VoltageReader;
use crate::error::CycleError;
use crate::os::Uninterruptible;
use crate::report;
use crate::sampler::{SampleBurst, Sampler};

/// Drives the sampler through its cycles and reports each one.
pub struct Analyzer<R, PIN, D, S, const N: usize> {
    sampler: Sampler<R, PIN, D, S, N>,
    cycles: u32,
}

impl<R, PIN, D, S, const N: usize> Analyzer<R, PIN, D, S, N>
where
    R: VoltageReader<PIN>,
    D: DelayUs<u32> + DelayMs<u32>,
    S: Uninterruptible,
{
    pub fn new(sampler: Sampler<R, PIN, D, S, N>) -> Self {
        Self { sampler, cycles: 0 }
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Acquire one burst, reduce it and print the report. The burst is
    /// dropped when this returns.
    pub fn run_cycle<W>(
        &mut self,
        console: &mut W,
    ) -> Result<CycleStatistics, CycleError<R::Error, W::Error>>
    where
        W: uWrite + ?Sized,
    {
        self.cycles = self.cycles.wrapping_add(1);

        let burst = self.sampler.acquire().map_err(CycleError::Read)?;
        let stats = reduce(&burst);
        report::write_cycle(console, self.sampler.plan(), burst.samples(), &stats)
            .map_err(CycleError::Console)?;

        debug!(
            "cycle {}: rms={} dc={}",
            self.cycles, stats.rms_mv, stats.dc_mv
        );
        Ok(stats)
    }

    /// Fixed wait between two cycles, independent of how long reporting took.
    pub fn idle(&mut self) {
        let idle_ms = self.sampler.plan().idle_ms();
        self.sampler.delay_mut().delay_ms(idle_ms);
    }

    pub fn run<W>(&mut self, console: &mut W) -> !
    where
        W: uWrite + ?Sized,
        R::Error: Debug,
        W::Error: Debug,
    {
        loop {
            if let Err(err) = self.run_cycle(console) {
                warn!("cycle {} dropped: {}", self.cycles, err);
            }
            self.idle();
        }
    }
}

fn reduce<const N: usize>(burst: &SampleBurst<N>) -> CycleStatistics {
    // a sampler never builds an empty burst
    CycleStatistics::from_samples(burst.samples()).unwrap_or(CycleStatistics {
        rms_mv: 0.0,
        dc_mv: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::testing::{CountingSection, ReadFault, RecordingDelay, ScriptedReader};

    type TestAnalyzer<const N: usize> =
        Analyzer<ScriptedReader, (), RecordingDelay, CountingSection, N>;

    fn analyzer(reader: ScriptedReader) -> TestAnalyzer<{ config::BURST_LEN }> {
        let sampler = Sampler::new(
            reader,
            (),
            RecordingDelay::default(),
            CountingSection::default(),
            config::PLAN,
        )
        .unwrap();
        Analyzer::new(sampler)
    }

    #[test]
    fn constant_signal_cycle() {
        let mut analyzer = analyzer(ScriptedReader::new(&[100]));
        let mut out = String::new();

        let stats = analyzer.run_cycle(&mut out).unwrap();
        assert_eq!(stats.dc_mv, 100.0);
        assert_eq!(stats.rms_mv, 100.0);

        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("F: 60, Fs: 32400, N: 540 "));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("Samples:["));
        let samples = out.lines().find(|l| l.starts_with("100,")).unwrap();
        assert_eq!(samples.matches("100,").count(), 540);
        assert!(out.contains(" V_rms: 100.000000 mV, V_dc: 100.000000 mV, Diff: 0.000000 mV"));
    }

    #[test]
    fn each_cycle_reads_exactly_one_burst() {
        let mut analyzer = analyzer(ScriptedReader::new(&[0, 1_000]));
        let mut out = String::new();
        for cycle in 1..=3 {
            let stats = analyzer.run_cycle(&mut out).unwrap();
            assert!((stats.dc_mv - 500.0).abs() < 1e-9);
            assert_eq!(analyzer.sampler.reader().reads(), cycle * config::BURST_LEN);
        }
        assert_eq!(analyzer.cycles(), 3);
    }

    #[test]
    fn idle_is_fixed() {
        let mut analyzer = analyzer(ScriptedReader::new(&[0, 1_000]));
        let mut long_report = String::new();
        analyzer.run_cycle(&mut long_report).unwrap();
        analyzer.idle();

        let mut sink = String::new();
        analyzer.idle();
        analyzer.run_cycle(&mut sink).unwrap();
        analyzer.idle();

        assert_eq!(analyzer.sampler.delay_mut().ms_calls(), &[2_500, 2_500, 2_500]);
    }

    #[test]
    fn failed_read_skips_report() {
        let mut analyzer = analyzer(ScriptedReader::new(&[100]).failing_at(10));
        let mut out = String::new();

        match analyzer.run_cycle(&mut out) {
            Err(CycleError::Read(ReadFault)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(out.is_empty());

        // next cycle proceeds normally
        assert!(analyzer.run_cycle(&mut out).is_ok());
        assert!(out.starts_with("F: 60"));
    }
}
