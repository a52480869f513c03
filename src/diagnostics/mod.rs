//! Startup calibration diagnostics

use ufmt::{uWrite, uwriteln};

use crate::drivers::calibration::{CalibrationMethod, CalibrationStore};

/// What the calibration store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationSupport {
    pub two_point: bool,
    pub vref: bool,
}

impl CalibrationSupport {
    pub fn probe<S: CalibrationStore>(store: &mut S) -> Self {
        Self {
            two_point: store.two_point().is_some(),
            vref: store.reference_mv().is_some(),
        }
    }
}

fn supported(present: bool) -> &'static str {
    if present {
        "Supported"
    } else {
        "NOT supported"
    }
}

pub fn write_support<W>(w: &mut W, support: &CalibrationSupport) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwriteln!(w, "Two Point: {}", supported(support.two_point))?;
    uwriteln!(w, "Vref: {}", supported(support.vref))
}

pub fn write_method<W>(w: &mut W, method: CalibrationMethod) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    let source = match method {
        CalibrationMethod::TwoPoint => "Two Point Value",
        CalibrationMethod::StoredVref => "stored Vref",
        CalibrationMethod::DefaultVref => "Default Vref",
    };
    uwriteln!(w, "Characterized using {}", source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::calibration::StoredCalibration;
    use crate::hal::host::EmulatedEeprom;

    #[test]
    fn reports_missing_calibration() {
        let mut store = StoredCalibration::new(EmulatedEeprom::erased());
        let support = CalibrationSupport::probe(&mut store);

        let mut out = String::new();
        write_support(&mut out, &support).unwrap();
        write_method(&mut out, CalibrationMethod::DefaultVref).unwrap();
        assert_eq!(
            out,
            "Two Point: NOT supported\nVref: NOT supported\nCharacterized using Default Vref\n"
        );
    }

    #[test]
    fn reports_stored_records() {
        let mut store =
            StoredCalibration::new(EmulatedEeprom::erased().with_two_point(200, 3_600).with_vref(1_100));
        let support = CalibrationSupport::probe(&mut store);
        assert_eq!(support, CalibrationSupport { two_point: true, vref: true });

        let mut out = String::new();
        write_support(&mut out, &support).unwrap();
        write_method(&mut out, CalibrationMethod::TwoPoint).unwrap();
        assert_eq!(
            out,
            "Two Point: Supported\nVref: Supported\nCharacterized using Two Point Value\n"
        );
    }
}
