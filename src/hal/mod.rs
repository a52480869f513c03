#[cfg(target_arch = "avr")]
pub mod adc;
#[cfg(target_arch = "avr")]
pub mod eeprom;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

#[cfg(not(target_arch = "avr"))]
pub mod host;

#[cfg(target_arch = "avr")]
pub use adc::{Adc, AdcPrescaler, AdcReference};
#[cfg(target_arch = "avr")]
pub use eeprom::Eeprom;
#[cfg(target_arch = "avr")]
pub use timer::TickDelay;
#[cfg(target_arch = "avr")]
pub use uart::Uart;

#[cfg(not(target_arch = "avr"))]
pub use host::{EmulatedEeprom, SpinDelay, StdoutConsole};
