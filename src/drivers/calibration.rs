//! ADC calibration: raw conversion codes to millivolts
//!
//! The transform is linear, `mv = a * raw + b`, with `a` held as a 16.16
//! fixed-point factor. Coefficients come from, in order of preference, a
//! two-point measurement stored in non-volatile memory, a stored reference
//! voltage, or the compiled-in default reference.

use log::{debug, warn};

const COEFF_A_SCALE: u64 = 65_536;
const ADC_12_BIT_RES: u64 = 4_096;
const ADC_12_BIT_MAX: u16 = 4_095;

/// Full-scale factor per attenuation, relative to the reference voltage
const ATTEN_SCALES: [u64; 4] = [57_431, 76_236, 105_481, 196_602];
/// Zero-code offset per attenuation, mV
const ATTEN_OFFSETS: [i32; 4] = [75, 78, 88, 142];
/// Voltages the two-point codes were measured at, mV
const TWO_POINT_LOW_MV: [u32; 4] = [150, 150, 150, 150];
const TWO_POINT_HIGH_MV: [u32; 4] = [850, 850, 850, 2_450];

const VREF_RANGE_MV: core::ops::RangeInclusive<u16> = 1_000..=1_200;

/// EEPROM layout of the calibration records
pub const TWO_POINT_ADDR: u16 = 0x00;
pub const TWO_POINT_TAG: u8 = b'T';
pub const VREF_ADDR: u16 = 0x08;
pub const VREF_TAG: u8 = b'V';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Attenuation {
    Db0 = 0,
    Db2_5 = 1,
    Db6 = 2,
    Db11 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Width {
    Bits9 = 9,
    Bits10 = 10,
    Bits11 = 11,
    Bits12 = 12,
}

impl Width {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Left shift bringing a code of this width onto the 12-bit scale
    #[inline]
    const fn shift(self) -> u8 {
        12 - self.bits()
    }
}

/// Conversion codes measured at the two reference voltages, on the 12-bit
/// scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoPoint {
    pub low_raw: u16,
    pub high_raw: u16,
}

/// Where the coefficients in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMethod {
    TwoPoint,
    StoredVref,
    DefaultVref,
}

/// Source of factory calibration data.
pub trait CalibrationStore {
    fn two_point(&mut self) -> Option<TwoPoint>;
    fn reference_mv(&mut self) -> Option<u16>;
}

/// Byte-addressed non-volatile memory.
pub trait NonVolatile {
    fn read(&mut self, address: u16, buf: &mut [u8]);
}

/// Calibration records kept in non-volatile memory.
///
/// Layout: `'T' low:u16le high:u16le` at [`TWO_POINT_ADDR`] and
/// `'V' vref:u16le` at [`VREF_ADDR`]. Erased or implausible records read as
/// absent.
pub struct StoredCalibration<M> {
    memory: M,
}

impl<M: NonVolatile> StoredCalibration<M> {
    pub fn new(memory: M) -> Self {
        Self { memory }
    }
}

impl<M: NonVolatile> CalibrationStore for StoredCalibration<M> {
    fn two_point(&mut self) -> Option<TwoPoint> {
        let mut record = [0u8; 5];
        self.memory.read(TWO_POINT_ADDR, &mut record);
        if record[0] != TWO_POINT_TAG {
            return None;
        }

        let low_raw = u16::from_le_bytes([record[1], record[2]]);
        let high_raw = u16::from_le_bytes([record[3], record[4]]);
        if low_raw >= high_raw || high_raw > ADC_12_BIT_MAX {
            warn!("ignoring two-point record: low={} high={}", low_raw, high_raw);
            return None;
        }
        Some(TwoPoint { low_raw, high_raw })
    }

    fn reference_mv(&mut self) -> Option<u16> {
        let mut record = [0u8; 3];
        self.memory.read(VREF_ADDR, &mut record);
        if record[0] != VREF_TAG {
            return None;
        }

        let vref = u16::from_le_bytes([record[1], record[2]]);
        if !VREF_RANGE_MV.contains(&vref) {
            warn!("ignoring stored vref of {} mV", vref);
            return None;
        }
        Some(vref)
    }
}

/// Immutable raw-to-millivolt transform, built once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Characteristics {
    coeff_a: u32,
    coeff_b: i32,
    width: Width,
    attenuation: Attenuation,
}

impl Characteristics {
    /// Pick the best available calibration data.
    pub fn characterize<S: CalibrationStore>(
        store: &mut S,
        attenuation: Attenuation,
        width: Width,
        default_vref_mv: u16,
    ) -> (Self, CalibrationMethod) {
        if let Some(points) = store.two_point() {
            return (
                Self::from_two_point(points, attenuation, width),
                CalibrationMethod::TwoPoint,
            );
        }
        if let Some(vref) = store.reference_mv() {
            return (
                Self::from_reference(vref, attenuation, width),
                CalibrationMethod::StoredVref,
            );
        }
        (
            Self::from_reference(default_vref_mv, attenuation, width),
            CalibrationMethod::DefaultVref,
        )
    }

    pub fn from_reference(vref_mv: u16, attenuation: Attenuation, width: Width) -> Self {
        let index = attenuation as usize;
        let coeff_a = (vref_mv as u64 * ATTEN_SCALES[index]) / ADC_12_BIT_RES;
        debug!("reference {} mV: a={} b={}", vref_mv, coeff_a, ATTEN_OFFSETS[index]);
        Self {
            coeff_a: coeff_a as u32,
            coeff_b: ATTEN_OFFSETS[index],
            width,
            attenuation,
        }
    }

    pub fn from_two_point(points: TwoPoint, attenuation: Attenuation, width: Width) -> Self {
        let index = attenuation as usize;
        let low_mv = TWO_POINT_LOW_MV[index];
        let delta_mv = (TWO_POINT_HIGH_MV[index] - low_mv) as u64;
        let delta_raw = points.high_raw.saturating_sub(points.low_raw).max(1) as u64;

        let coeff_a = (COEFF_A_SCALE * delta_mv) / delta_raw;
        let at_low = (coeff_a * points.low_raw as u64 + COEFF_A_SCALE / 2) / COEFF_A_SCALE;
        let coeff_b = low_mv as i32 - at_low as i32;
        debug!("two-point {:?}: a={} b={}", points, coeff_a, coeff_b);
        Self {
            coeff_a: coeff_a as u32,
            coeff_b,
            width,
            attenuation,
        }
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    /// Calibrated voltage for a raw code of the configured width.
    #[inline]
    pub fn raw_to_millivolts(&self, raw: u16) -> u32 {
        let raw = (raw as u64) << self.width.shift();
        let scaled = (self.coeff_a as u64 * raw + COEFF_A_SCALE / 2) / COEFF_A_SCALE;
        (scaled as i64 + self.coeff_b as i64).max(0) as u32
    }
}
