//! Test doubles for the hardware seams

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::drivers::VoltageReader;
use crate::os::Uninterruptible;

/// Delay source that returns immediately and remembers what it was asked.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    us: Vec<u32>,
    ms: Vec<u32>,
}

impl RecordingDelay {
    pub fn us_calls(&self) -> &[u32] {
        &self.us
    }

    pub fn ms_calls(&self) -> &[u32] {
        &self.ms
    }
}

impl DelayUs<u32> for RecordingDelay {
    fn delay_us(&mut self, us: u32) {
        self.us.push(us);
    }
}

impl DelayMs<u32> for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}

/// Counts entries and exits; clones share the counters.
#[derive(Debug, Default, Clone)]
pub struct CountingSection {
    entered: Rc<Cell<u32>>,
    exited: Rc<Cell<u32>>,
}

impl CountingSection {
    pub fn entered(&self) -> u32 {
        self.entered.get()
    }

    pub fn exited(&self) -> u32 {
        self.exited.get()
    }
}

impl Uninterruptible for CountingSection {
    fn run<T>(&mut self, f: impl FnOnce() -> T) -> T {
        self.entered.set(self.entered.get() + 1);
        let out = f();
        self.exited.set(self.exited.get() + 1);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadFault;

/// Replays a fixed list of readings, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedReader {
    values: Vec<u32>,
    reads: usize,
    fail_at: Option<usize>,
}

impl ScriptedReader {
    pub fn new(values: &[u32]) -> Self {
        assert!(!values.is_empty());
        Self {
            values: values.to_vec(),
            reads: 0,
            fail_at: None,
        }
    }

    /// Fails the read with zero-based index `index`.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl<PIN> VoltageReader<PIN> for ScriptedReader {
    type Error = ReadFault;

    fn read_voltage(&mut self, _channel: &mut PIN) -> Result<u32, ReadFault> {
        let index = self.reads;
        self.reads += 1;
        if self.fail_at == Some(index) {
            return Err(ReadFault);
        }
        Ok(self.values[index % self.values.len()])
    }
}
