// Action GBA: WS2812 Status LED
//
// One pixel driven through an RMT TX channel. Bits go out MSB first in GRB order.

use std::time::Duration;

use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse, RmtChannel, TxRmtDriver};

use crate::hal::PixelSink;
use crate::lights::Rgb;

// WS2812 bit timings
const T0H_NS: u64 = 350;
const T0L_NS: u64 = 800;
const T1H_NS: u64 = 700;
const T1L_NS: u64 = 600;

pub struct Ws2812 {
    tx: TxRmtDriver<'static>,
    zero: (Pulse, Pulse),
    one: (Pulse, Pulse),
}

impl Ws2812 {
    pub fn new<C: RmtChannel>(
        channel: impl Peripheral<P = C> + 'static,
        pin: impl Peripheral<P = impl OutputPin> + 'static,
    ) -> anyhow::Result<Self> {
        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config)?;

        let ticks_hz = tx.counter_clock()?;
        let pulse = |state: PinState, ns: u64| {
            Pulse::new_with_duration(ticks_hz, state, &Duration::from_nanos(ns))
        };
        let zero = (pulse(PinState::High, T0H_NS)?, pulse(PinState::Low, T0L_NS)?);
        let one = (pulse(PinState::High, T1H_NS)?, pulse(PinState::Low, T1L_NS)?);

        Ok(Self { tx, zero, one })
    }
}

impl PixelSink for Ws2812 {
    fn write(&mut self, color: Rgb) -> anyhow::Result<()> {
        let grb = (u32::from(color.g) << 16) | (u32::from(color.r) << 8) | u32::from(color.b);

        let mut signal = FixedLengthSignal::<24>::new();
        for bit in 0..24 {
            let set = grb & (1 << (23 - bit)) != 0;
            let pulses = if set { &self.one } else { &self.zero };
            signal.set(bit, pulses)?;
        }
        self.tx.start_blocking(&signal)?;
        Ok(())
    }
}
