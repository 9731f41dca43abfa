// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::hw::mcu;
use afrsys::{
    CriticalSection, MutexOnce,
    pin::{Pin, PinMode, Port},
};

static PORTB: MutexOnce<mcu::PORTB> = MutexOnce::new();
static PORTC: MutexOnce<mcu::PORTC> = MutexOnce::new();
static PORTD: MutexOnce<mcu::PORTD> = MutexOnce::new();

macro_rules! with_port {
    ($cs:expr, $pin:expr, |$p:ident| $port:ident, $ddr:ident, $pinreg:ident => $body:expr) => {
        match $pin.port() {
            Port::B => {
                if let Some($p) = PORTB.get($cs) {
                    with_port!(@regs $p, portb, ddrb, pinb, $port, $ddr, $pinreg, $body)
                }
            }
            Port::C => {
                if let Some($p) = PORTC.get($cs) {
                    with_port!(@regs $p, portc, ddrc, pinc, $port, $ddr, $pinreg, $body)
                }
            }
            Port::D => {
                if let Some($p) = PORTD.get($cs) {
                    with_port!(@regs $p, portd, ddrd, pind, $port, $ddr, $pinreg, $body)
                }
            }
        }
    };
    (@regs $p:ident, $portr:ident, $ddrr:ident, $pinr:ident, $port:ident, $ddr:ident, $pinreg:ident, $body:expr) => {{
        let $port = $p.$portr();
        let $ddr = $p.$ddrr();
        let $pinreg = $p.$pinr();
        $body
    }};
}

/// Hand the ports over to the driver.
pub fn init(cs: CriticalSection<'_>, pb: mcu::PORTB, pc: mcu::PORTC, pd: mcu::PORTD) {
    let ok = PORTB.set(cs, pb).is_ok() && PORTC.set(cs, pc).is_ok() && PORTD.set(cs, pd).is_ok();
    if !ok {
        crate::hw::reset_system();
    }
}

pub fn set_mode(cs: CriticalSection<'_>, pin: Pin, mode: PinMode) {
    let mask = pin.mask();
    with_port!(cs, pin, |p| port, ddr, _pinreg => {
        if mode.is_output() {
            // SAFETY: All bit patterns are valid for the port registers.
            ddr.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        } else {
            // SAFETY: All bit patterns are valid for the port registers.
            ddr.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
        }
        match mode.port_bit() {
            Some(true) => {
                // SAFETY: All bit patterns are valid for the port registers.
                port.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
            }
            Some(false) => {
                // SAFETY: All bit patterns are valid for the port registers.
                port.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
            }
            None => (),
        }
    });
}

pub fn write(cs: CriticalSection<'_>, pin: Pin, value: bool) {
    let mask = pin.mask();
    with_port!(cs, pin, |p| port, _ddr, _pinreg => {
        if value {
            // SAFETY: All bit patterns are valid for the port registers.
            port.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        } else {
            // SAFETY: All bit patterns are valid for the port registers.
            port.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
        }
    });
}

pub fn toggle(cs: CriticalSection<'_>, pin: Pin) {
    let mask = pin.mask();
    with_port!(cs, pin, |p| port, _ddr, _pinreg => {
        // SAFETY: All bit patterns are valid for the port registers.
        port.modify(|r, w| unsafe { w.bits(r.bits() ^ mask) });
    });
}

pub fn read(cs: CriticalSection<'_>, pin: Pin) -> bool {
    let mask = pin.mask();
    let mut value = false;
    with_port!(cs, pin, |p| _port, _ddr, pinreg => {
        value = pinreg.read().bits() & mask != 0;
    });
    value
}

// vim: ts=4 sw=4 expandtab
