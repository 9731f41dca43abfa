// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::hw::{mcu, reset_system};
use afrsys::{CriticalSection, MutexOnce};

const REFS0: u8 = 1 << 6;
const MUX_MASK: u8 = 0x0F;

const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
/// clk/8 -> 125 kHz ADC clock at 1 MHz.
const ADPS_DIV8: u8 = 0x03;

/// Number of single ended input channels.
pub const NR_CHANNELS: u8 = 8;

static ADC: MutexOnce<mcu::ADC> = MutexOnce::new();

/// Single conversion mode. AVcc reference. Right adjusted result.
pub fn init(cs: CriticalSection<'_>, adc: mcu::ADC) {
    // SAFETY: All bit patterns are valid for ADMUX and ADCSRA.
    adc.admux().write(|w| unsafe { w.bits(REFS0) });
    // SAFETY: See above.
    adc.adcsra().write(|w| unsafe { w.bits(ADEN | ADPS_DIV8) });
    if ADC.set(cs, adc).is_err() {
        reset_system();
    }
}

/// Convert one channel and wait for the result.
///
/// Channels above 7 are wrapped into the valid range.
pub fn read(cs: CriticalSection<'_>, channel: u8) -> u16 {
    let Some(adc) = ADC.get(cs) else {
        return 0;
    };
    let channel = channel % NR_CHANNELS;
    // SAFETY: Only the MUX bits are changed.
    adc.admux()
        .modify(|r, w| unsafe { w.bits((r.bits() & !MUX_MASK) | channel) });
    // SAFETY: ADSC starts the conversion. The other bits are kept.
    adc.adcsra()
        .modify(|r, w| unsafe { w.bits(r.bits() | ADSC) });
    while adc.adcsra().read().bits() & ADSC != 0 {
        // Conversion takes 13 ADC clocks, about 100 us.
    }
    adc.adc().read().bits()
}

// vim: ts=4 sw=4 expandtab
