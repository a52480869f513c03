//! Hosted stand-ins for the board peripherals

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use ufmt::uWrite;

use crate::drivers::calibration::{NonVolatile, TWO_POINT_ADDR, TWO_POINT_TAG, VREF_ADDR, VREF_TAG};

/// Microsecond waits spin on the monotonic clock, millisecond waits sleep.
#[derive(Debug, Default)]
pub struct SpinDelay;

impl DelayUs<u32> for SpinDelay {
    fn delay_us(&mut self, us: u32) {
        spin_for(Duration::from_micros(us as u64));
    }
}

impl DelayMs<u32> for SpinDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

pub(crate) fn spin_for(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        core::hint::spin_loop();
    }
}

/// Console on standard output.
pub struct StdoutConsole {
    out: Stdout,
}

impl StdoutConsole {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for StdoutConsole {
    type Error = io::Error;

    fn write_str(&mut self, s: &str) -> Result<(), io::Error> {
        self.out.write_all(s.as_bytes())
    }
}

/// Sixteen bytes of EEPROM held in RAM, erased to 0xFF.
#[derive(Debug, Clone)]
pub struct EmulatedEeprom {
    bytes: [u8; 16],
}

impl EmulatedEeprom {
    pub fn erased() -> Self {
        Self { bytes: [0xFF; 16] }
    }

    pub fn with_two_point(mut self, low_raw: u16, high_raw: u16) -> Self {
        let at = TWO_POINT_ADDR as usize;
        self.bytes[at] = TWO_POINT_TAG;
        self.bytes[at + 1..at + 3].copy_from_slice(&low_raw.to_le_bytes());
        self.bytes[at + 3..at + 5].copy_from_slice(&high_raw.to_le_bytes());
        self
    }

    pub fn with_vref(mut self, vref_mv: u16) -> Self {
        let at = VREF_ADDR as usize;
        self.bytes[at] = VREF_TAG;
        self.bytes[at + 1..at + 3].copy_from_slice(&vref_mv.to_le_bytes());
        self
    }
}

impl NonVolatile for EmulatedEeprom {
    fn read(&mut self, address: u16, buf: &mut [u8]) {
        let start = address as usize;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_delay_waits_at_least_requested() {
        let mut delay = SpinDelay;
        let start = Instant::now();
        delay.delay_us(200);
        assert!(start.elapsed() >= Duration::from_micros(200));
    }

    #[test]
    fn eeprom_reads_back_records() {
        let mut eeprom = EmulatedEeprom::erased().with_vref(1_100);
        let mut record = [0u8; 3];
        eeprom.read(VREF_ADDR, &mut record);
        assert_eq!(record, [VREF_TAG, 0x4C, 0x04]);

        let mut untouched = [0u8; 2];
        eeprom.read(TWO_POINT_ADDR, &mut untouched);
        assert_eq!(untouched, [0xFF, 0xFF]);
    }
}
