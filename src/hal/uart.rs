use avr_device::atmega128a::USART0;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

const UDRE: u8 = 0x20;
const TXEN: u8 = 0x08;
const RXEN: u8 = 0x10;
// asynchronous, 8N1
const FRAME_8N1: u8 = 0x06;

/// Polled USART0. Transmission never depends on interrupts, so the console
/// keeps working while the sampler holds the critical section.
pub struct Uart {
    _private: (),
}

impl Uart {
    pub fn new() -> Self {
        unsafe {
            let p = USART0::ptr();
            (*p).ubrr0h.write(|w| w.bits((UBRR >> 8) as u8));
            (*p).ubrr0l.write(|w| w.bits(UBRR as u8));
            (*p).ucsr0c.write(|w| w.bits(FRAME_8N1));
            (*p).ucsr0b.write(|w| w.bits(RXEN | TXEN));
        }
        Self { _private: () }
    }

    pub fn write_byte(&mut self, byte: u8) {
        unsafe {
            let p = USART0::ptr();
            while (*p).ucsr0a.read().bits() & UDRE == 0 {}
            (*p).udr0.write(|w| w.bits(byte));
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}
