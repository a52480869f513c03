//! Calibrated single-channel voltage reads

use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};

use super::calibration::Characteristics;

/// One calibrated reading per call, in millivolts, with a bounded and
/// roughly constant latency.
pub trait VoltageReader<PIN> {
    type Error;

    fn read_voltage(&mut self, channel: &mut PIN) -> Result<u32, Self::Error>;
}

/// A one-shot converter paired with the calibration built at startup.
pub struct CalibratedAdc<'c, A, ADC> {
    adc: A,
    calibration: &'c Characteristics,
    _adc: PhantomData<ADC>,
}

impl<'c, A, ADC> CalibratedAdc<'c, A, ADC> {
    pub fn new(adc: A, calibration: &'c Characteristics) -> Self {
        Self {
            adc,
            calibration,
            _adc: PhantomData,
        }
    }
}

impl<'c, A, ADC, PIN> VoltageReader<PIN> for CalibratedAdc<'c, A, ADC>
where
    A: OneShot<ADC, u16, PIN>,
    PIN: Channel<ADC>,
{
    type Error = A::Error;

    #[inline]
    fn read_voltage(&mut self, channel: &mut PIN) -> Result<u32, Self::Error> {
        let raw = nb::block!(self.adc.read(channel))?;
        Ok(self.calibration.raw_to_millivolts(raw))
    }
}
