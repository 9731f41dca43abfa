// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Digital I/O pin numbering of the ATmega8.

/// I/O port.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Port {
    B,
    C,
    D,
}

/// Direction and pull-up configuration of a pin.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PinMode {
    Input,
    Output,
    InputPullup,
}

impl PinMode {
    /// DDR bit value.
    #[inline]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Output)
    }

    /// PORT bit value, if the mode determines it.
    ///
    /// Output mode keeps the current output level.
    #[inline]
    pub const fn port_bit(self) -> Option<bool> {
        match self {
            Self::Input => Some(false),
            Self::InputPullup => Some(true),
            Self::Output => None,
        }
    }
}

/// Digital pin.
///
/// The discriminant is the linear pin number.
#[rustfmt::skip]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Pin {
    PB0 = 0, PB1, PB2, PB3, PB4, PB5, PB6, PB7,
    PC0 = 8, PC1, PC2, PC3, PC4, PC5, PC6,
    PD0 = 15, PD1, PD2, PD3, PD4, PD5, PD6, PD7,
}

const PC_BASE: u8 = Pin::PC0 as u8;
const PD_BASE: u8 = Pin::PD0 as u8;

impl Pin {
    pub const COUNT: u8 = 23;

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn port(self) -> Port {
        let index = self.index();
        if index < PC_BASE {
            Port::B
        } else if index < PD_BASE {
            Port::C
        } else {
            Port::D
        }
    }

    /// Bit number within the port registers.
    pub const fn bit(self) -> u8 {
        let index = self.index();
        match self.port() {
            Port::B => index,
            Port::C => index - PC_BASE,
            Port::D => index - PD_BASE,
        }
    }

    #[inline]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }
}


// vim: ts=4 sw=4 expandtab
