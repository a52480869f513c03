use avr_device::atmega128a::ADC;
use embedded_hal::adc::{Channel, OneShot};

/// Single-ended input `CH` of the converter
pub struct Pin<const CH: u8>;

impl<const CH: u8> Channel<Adc> for Pin<CH> {
    type ID = u8;

    fn channel() -> u8 {
        CH
    }
}

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcReference {
    Aref = 0,            // External AREF
    Avcc = 1,            // AVCC with external cap at AREF
    Internal2_56V = 3,   // Internal 2.56V with external cap at AREF
}

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcPrescaler {
    Div2 = 0,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
}

const ADEN: u8 = 0x80;
const ADSC: u8 = 0x40;
const MUX_MASK: u8 = 0x1F;

pub struct Adc {
    _private: (),
}

impl Adc {
    /// Enable the converter. Conversion time is 13 ADC clocks, so the
    /// prescaler sets the read latency.
    pub fn new(reference: AdcReference, prescaler: AdcPrescaler) -> Self {
        unsafe {
            let p = ADC::ptr();
            (*p).adcsra.write(|w| w.bits(ADEN | prescaler as u8));
            (*p).admux.write(|w| w.bits((reference as u8) << 6));
        }
        Self { _private: () }
    }

    fn convert(&mut self, channel: u8) -> u16 {
        unsafe {
            let p = ADC::ptr();

            (*p).admux.modify(|r, w| {
                w.bits((r.bits() & !MUX_MASK) | (channel & MUX_MASK))
            });
            (*p).adcsra.modify(|r, w| w.bits(r.bits() | ADSC));

            while (*p).adcsra.read().bits() & ADSC != 0 {}

            // ADCL must be read first
            let low = (*p).adcl.read().bits() as u16;
            let high = (*p).adch.read().bits() as u16;

            (high << 8) | low
        }
    }
}

impl<PIN> OneShot<Adc, u16, PIN> for Adc
where
    PIN: Channel<Adc, ID = u8>,
{
    type Error = core::convert::Infallible;

    fn read(&mut self, _pin: &mut PIN) -> nb::Result<u16, Self::Error> {
        Ok(self.convert(PIN::channel()))
    }
}
