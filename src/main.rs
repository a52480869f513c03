#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
use panic_halt as _;

use wave_sampling::config;
use wave_sampling::diagnostics::{self, CalibrationSupport};
use wave_sampling::drivers::{CalibratedAdc, Characteristics, StoredCalibration};
use wave_sampling::{Analyzer, Sampler};

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    use wave_sampling::drivers::SerialConsole;
    use wave_sampling::hal::adc::Pin;
    use wave_sampling::hal::{Adc, AdcPrescaler, AdcReference, Eeprom, TickDelay};
    use wave_sampling::os::InterruptFree;

    let mut console = SerialConsole::new();
    console.write_line("Mains sampler v0.1.0");

    let mut store = StoredCalibration::new(Eeprom::new());
    let support = CalibrationSupport::probe(&mut store);
    diagnostics::write_support(&mut console, &support).ok();

    let (calibration, method) = Characteristics::characterize(
        &mut store,
        config::ADC_ATTENUATION,
        config::ADC_WIDTH,
        config::DEFAULT_VREF_MV,
    );
    diagnostics::write_method(&mut console, method).ok();

    // 1 MHz ADC clock: 13 us per conversion
    let adc = Adc::new(AdcReference::Internal2_56V, AdcPrescaler::Div16);
    let reader = CalibratedAdc::new(adc, &calibration);

    let sampler = match Sampler::<_, _, _, _, { config::BURST_LEN }>::new(
        reader,
        Pin::<{ config::ADC_CHANNEL }>,
        TickDelay::new(),
        InterruptFree::new(),
        config::PLAN,
    ) {
        Ok(sampler) => sampler.with_trigger(config::TRIGGER),
        Err(_) => {
            console.write_line("Invalid sampling plan");
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };

    unsafe { avr_device::interrupt::enable() };

    Analyzer::new(sampler).run(&mut console)
}

#[cfg(not(target_arch = "avr"))]
fn main() -> anyhow::Result<()> {
    use wave_sampling::os::DedicatedThread;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let sampler = std::thread::Builder::new()
        .name(DedicatedThread::NAME.into())
        .spawn(run_sampler)?;

    sampler
        .join()
        .map_err(|_| anyhow::anyhow!("sampler thread panicked"))?
}

#[cfg(not(target_arch = "avr"))]
fn run_sampler() -> anyhow::Result<()> {
    use std::time::Duration;

    use anyhow::Context;
    use log::info;
    use wave_sampling::drivers::{MainsInput, SyntheticMains};
    use wave_sampling::hal::{EmulatedEeprom, SpinDelay, StdoutConsole};
    use wave_sampling::os::DedicatedThread;

    let section = DedicatedThread::current().context("not running on the sampler thread")?;
    info!("sampler scheduling: {:?}", section.scheduling());
    let mut console = StdoutConsole::new();

    let mut store = StoredCalibration::new(EmulatedEeprom::erased().with_vref(1_100));
    let support = CalibrationSupport::probe(&mut store);
    diagnostics::write_support(&mut console, &support)?;

    let (calibration, method) = Characteristics::characterize(
        &mut store,
        config::ADC_ATTENUATION,
        config::ADC_WIDTH,
        config::DEFAULT_VREF_MV,
    );
    diagnostics::write_method(&mut console, method)?;

    info!(
        "sampling {} Hz at {} Hz, {} samples per burst",
        config::PLAN.frequency_hz(),
        config::PLAN.rate_hz(),
        config::PLAN.burst_len()
    );

    let source = SyntheticMains::new(config::TARGET_FREQUENCY_HZ, 0.5, 0.25, config::ADC_WIDTH)
        .with_conversion_time(Duration::from_nanos(config::READ_LATENCY_NS as u64));
    let reader = CalibratedAdc::new(source, &calibration);

    let sampler = Sampler::<_, _, _, _, { config::BURST_LEN }>::new(
        reader,
        MainsInput,
        SpinDelay,
        section,
        config::PLAN,
    )?
    .with_trigger(config::TRIGGER);

    Analyzer::new(sampler).run(&mut console)
}
