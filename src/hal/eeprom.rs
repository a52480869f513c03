use avr_device::atmega128a::EEPROM;

use crate::drivers::calibration::NonVolatile;

const EERE: u8 = 0x01;
const EEWE: u8 = 0x02;

/// On-chip EEPROM, read-only access.
pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn read_byte(&mut self, address: u16) -> u8 {
        unsafe {
            let p = EEPROM::ptr();
            // a pending write blocks reads
            while (*p).eecr.read().bits() & EEWE != 0 {}
            (*p).eear.write(|w| w.bits(address));
            (*p).eecr.modify(|r, w| w.bits(r.bits() | EERE));
            (*p).eedr.read().bits()
        }
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl NonVolatile for Eeprom {
    fn read(&mut self, address: u16, buf: &mut [u8]) {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(address + offset as u16);
        }
    }
}
