// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::hw::{F_CPU, interrupt, mcu};
use afrsys::{CriticalSection, MutexCell, MutexOnce, clock::ubrr_double_speed, ring::Ring};
use avr_atomic::AvrAtomic;
use avr_context::IrqCtx;

pub const BAUD: u32 = 9600;

const UBRR: u16 = match ubrr_double_speed(F_CPU, BAUD) {
    Ok(ubrr) => ubrr,
    Err(e) => e.const_panic(),
};

// UCSRA
const RXC: u8 = 1 << 7;
const UDRE: u8 = 1 << 5;
const FE: u8 = 1 << 4;
const DOR: u8 = 1 << 3;
const U2X: u8 = 1 << 1;
// UCSRB
const RXCIE: u8 = 1 << 7;
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;
// UCSRC
const URSEL: u8 = 1 << 7;
const UCSZ_8BIT: u8 = 0x06;

const RX_SIZE: usize = 32;

static USART: MutexOnce<mcu::USART> = MutexOnce::new();
static READY: AvrAtomic<bool> = AvrAtomic::new();
static RX: Ring<u8, RX_SIZE> = Ring::new([const { MutexCell::new(0) }; RX_SIZE]);

/// Hand the USART over to the driver.
///
/// The USART is configured on first use.
pub fn init(cs: CriticalSection<'_>, usart: mcu::USART) {
    if USART.set(cs, usart).is_err() {
        crate::hw::reset_system();
    }
}

/// 8N1, double speed, receive interrupt.
/// Drops everything received before.
fn configure(cs: CriticalSection<'_>, usart: &mcu::USART) {
    RX.clear(cs);
    // UBRRH and UCSRC share one address. URSEL selects UCSRC.
    // SAFETY: URSEL is clear. This writes UBRRH.
    usart.ucsrc().write(|w| unsafe { w.bits((UBRR >> 8) as u8 & 0x0F) });
    // SAFETY: All bit patterns are valid for UBRRL.
    usart.ubrrl().write(|w| unsafe { w.bits(UBRR as u8) });
    // SAFETY: Only U2X is writable. The flags are read-only or cleared by writing 0.
    usart.ucsra().write(|w| unsafe { w.bits(U2X) });
    // SAFETY: URSEL is set. This writes UCSRC.
    usart.ucsrc().write(|w| unsafe { w.bits(URSEL | UCSZ_8BIT) });
    // SAFETY: Enable receiver, transmitter and receive interrupt.
    usart.ucsrb().write(|w| unsafe { w.bits(RXCIE | RXEN | TXEN) });
}

fn configure_once(cs: CriticalSection<'_>, usart: &mcu::USART) {
    if !READY.load() {
        configure(cs, usart);
        READY.store(true);
    }
}

/// Configure the USART, if not done yet.
pub fn setup(cs: CriticalSection<'_>) {
    if let Some(usart) = USART.get(cs) {
        configure_once(cs, usart);
    }
}

/// Send one byte. Waits for the transmit buffer to become free.
///
/// Configures the USART on first use.
/// Interrupts are only disabled while polling the status register.
pub fn send_byte(data: u8) {
    loop {
        let sent = interrupt::free(|cs| {
            let Some(usart) = USART.get(cs) else {
                // No USART. Drop the byte.
                return true;
            };
            configure_once(cs, usart);
            if usart.ucsra().read().bits() & UDRE == 0 {
                return false;
            }
            // SAFETY: All bit patterns are valid for UDR.
            usart.udr().write(|w| unsafe { w.bits(data) });
            true
        });
        if sent {
            break;
        }
    }
}

pub fn send_str(s: &str) {
    for &b in s.as_bytes() {
        send_byte(b);
    }
}

/// Fetch the oldest received byte.
pub fn read_byte(cs: CriticalSection<'_>) -> Option<u8> {
    RX.get(cs)
}

pub fn irq_handler_usart_rxc(c: &IrqCtx<'_>) {
    let cs = c.cs();
    let Some(usart) = USART.get(cs) else {
        return;
    };
    while usart.ucsra().read().bits() & RXC != 0 {
        let status = usart.ucsra().read().bits();
        let data = usart.udr().read().bits();
        if status & (FE | DOR) != 0 {
            continue;
        }
        if data == b'\r' || data == b'\n' {
            continue;
        }
        // Bytes are dropped while the queue is full.
        let _ = RX.insert(cs, data);
    }
}

// vim: ts=4 sw=4 expandtab
