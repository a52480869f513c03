use avr_device::atmega128a::TC0;
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::config::CPU_FREQ_HZ;

const PRESCALER_MASK: u8 = 0x07;
// CS0[2:0] = 0b010, clk/8
const PRESCALER_DIV8: u8 = 0x02;

/// Timer0 ticks per microsecond with the Div8 prescaler
const TICKS_PER_US: u32 = CPU_FREQ_HZ / 8 / 1_000_000;

/// Busy-wait delays counted on free-running Timer0. Safe to use with
/// interrupts disabled.
pub struct TickDelay {
    _private: (),
}

impl TickDelay {
    pub fn new() -> Self {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
            (*p).tccr0.modify(|r, w| {
                w.bits((r.bits() & !PRESCALER_MASK) | PRESCALER_DIV8)
            });
        }
        Self { _private: () }
    }

    #[inline]
    fn counter(&self) -> u8 {
        unsafe { (*TC0::ptr()).tcnt0.read().bits() }
    }
}

impl Default for TickDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayUs<u32> for TickDelay {
    fn delay_us(&mut self, us: u32) {
        let mut remaining = us.saturating_mul(TICKS_PER_US);
        let mut last = self.counter();
        while remaining > 0 {
            let now = self.counter();
            let elapsed = now.wrapping_sub(last) as u32;
            remaining = remaining.saturating_sub(elapsed);
            last = now;
        }
    }
}

impl DelayMs<u32> for TickDelay {
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}
