// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::{dio, hw::mcu};
use afrsys::{
    CriticalSection,
    pin::{Pin, PinMode},
};

const SPE: u8 = 1 << 6;
const MSTR: u8 = 1 << 4;
/// f_osc/128
const SPR_DIV128: u8 = 0x03;
const SPIF: u8 = 1 << 7;

/// Busy-wait limit for one byte.
///
/// One byte takes 8 * 128 CPU cycles at f_osc/128.
/// A poll iteration takes at least 4 cycles.
const TIMEOUT: u16 = 512;

const PIN_SS: Pin = Pin::PB2;
const PIN_MOSI: Pin = Pin::PB3;
const PIN_MISO: Pin = Pin::PB4;
const PIN_SCK: Pin = Pin::PB5;

#[derive(Copy, Clone, PartialEq, Eq, Debug, derive_more::Display)]
pub enum SpiError {
    #[display("SPI transfer timeout")]
    Timeout,
}

/// SPI master. MSB first, mode 0.
pub struct Spi {
    spi: mcu::SPI,
}

impl Spi {
    pub fn new(cs: CriticalSection<'_>, spi: mcu::SPI) -> Self {
        dio::set_mode(cs, PIN_SS, PinMode::Output);
        dio::set_mode(cs, PIN_MOSI, PinMode::Output);
        dio::set_mode(cs, PIN_SCK, PinMode::Output);
        dio::set_mode(cs, PIN_MISO, PinMode::InputPullup);

        // SAFETY: All bit patterns are valid for SPSR and SPCR.
        spi.spsr().write(|w| unsafe { w.bits(0) });
        // SAFETY: See above.
        spi.spcr()
            .write(|w| unsafe { w.bits(SPE | MSTR | SPR_DIV128) });
        Self { spi }
    }

    /// Send one byte and return the byte received at the same time.
    pub fn transfer(&self, data: u8) -> Result<u8, SpiError> {
        // SAFETY: All bit patterns are valid for SPDR.
        self.spi.spdr().write(|w| unsafe { w.bits(data) });
        for _ in 0..TIMEOUT {
            if self.spi.spsr().read().bits() & SPIF != 0 {
                return Ok(self.spi.spdr().read().bits());
            }
        }
        Err(SpiError::Timeout)
    }
}

// vim: ts=4 sw=4 expandtab
