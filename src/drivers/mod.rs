pub mod calibration;
pub mod voltage_reader;

#[cfg(target_arch = "avr")]
pub mod serial_console;
#[cfg(not(target_arch = "avr"))]
pub mod signal_source;

pub use calibration::{
    CalibrationMethod, CalibrationStore, Characteristics, NonVolatile, StoredCalibration,
};
pub use voltage_reader::{CalibratedAdc, VoltageReader};

#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
#[cfg(not(target_arch = "avr"))]
pub use signal_source::{MainsInput, SyntheticMains};
