// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

pub use avr_device::{
    atmega8::{self as mcu, Peripherals},
    interrupt,
};

use crate::{timer::irq_handler_timer0_ovf, uart::irq_handler_usart_rxc};
use afrsys::GlobalIrq;

/// CPU clock frequency.
pub const F_CPU: u32 = 1_000_000;

/// I/O address of the status register.
const SREG: u8 = 0x3F;
/// Global interrupt enable flag in SREG.
const SREG_I: u8 = 1 << 7;

avr_context::define_isr! {
    device: atmega8,
    interrupt: TIMER0_OVF,
    isr: irq_handler_timer0_ovf,
}

avr_context::define_isr! {
    device: atmega8,
    interrupt: USART_RXC,
    isr: irq_handler_usart_rxc,
}

/// The I flag of SREG.
pub struct Sreg;

impl GlobalIrq for Sreg {
    #[inline(always)]
    fn disable(&self) -> bool {
        let sreg: u8;
        // SAFETY: Reads SREG and clears the I flag.
        //         The asm block is a compiler memory barrier.
        unsafe {
            core::arch::asm!(
                "in {sreg}, {SREG}",
                "cli",
                sreg = out(reg) sreg,
                SREG = const SREG,
                options(nostack)
            );
        }
        sreg & SREG_I != 0
    }

    #[inline(always)]
    unsafe fn enable(&self) {
        // SAFETY: The caller upholds the contract of GlobalIrq::enable.
        unsafe { avr_device::interrupt::enable() };
    }
}

/// Cheaper Option::unwrap() alternative.
///
/// This is cheaper, because it doesn't call into the panic unwind path.
#[inline(always)]
pub fn unwrap_option<T>(value: Option<T>) -> T {
    match value {
        Some(value) => value,
        None => reset_system(),
    }
}

/// Reset the system.
#[inline(always)]
#[allow(clippy::empty_loop)]
pub fn reset_system() -> ! {
    loop {
        // Wait for the watchdog timer to trigger and reset the system.
        // No interrupt pokes the watchdog.
    }
}

#[inline(always)]
#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    reset_system();
}

// vim: ts=4 sw=4 expandtab
