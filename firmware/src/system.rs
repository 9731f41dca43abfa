// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::hw::{F_CPU, interrupt, mcu, reset_system};
use afrsys::reset::ResetCause;

/// WDTCR I/O address.
const WDTCR: u8 = 0x21;

/// Enable the watchdog with a timeout of about one second.
pub fn wdt_init() {
    // SAFETY: The asm code only accesses the WDT registers
    //         which are not accessed from anywhere else in the program.
    unsafe {
        core::arch::asm!(
            "ldi {tmp}, 0x18", // WDCE=1, WDE=1
            "out {WDTCR}, {tmp}",
            "ldi {tmp}, 0x0E", // WDCE=0, WDE=1, WDP2=1, WDP1=1, WDP0=0
            "out {WDTCR}, {tmp}",
            tmp = out(reg_upper) _,
            WDTCR = const WDTCR,
            options(nostack, preserves_flags)
        );
    }
}

#[inline(always)]
pub fn wdt_poke(_wp: &mcu::WDT) {
    avr_device::asm::wdr();
}

/// Reset the CPU through the watchdog with the shortest timeout.
pub fn reset_cpu() -> ! {
    interrupt::disable();
    // SAFETY: The asm code only accesses the WDT registers.
    //         Interrupts are disabled and we never return.
    unsafe {
        core::arch::asm!(
            "ldi {tmp}, 0x18", // WDCE=1, WDE=1
            "out {WDTCR}, {tmp}",
            "ldi {tmp}, 0x08", // WDCE=0, WDE=1, WDP2=0, WDP1=0, WDP0=0
            "out {WDTCR}, {tmp}",
            tmp = out(reg_upper) _,
            WDTCR = const WDTCR,
            options(nostack, preserves_flags)
        );
    }
    reset_system();
}

/// Busy wait for at least `us` microseconds.
///
/// The resolution is one loop iteration of 4 CPU cycles.
pub fn delay_us(us: u16) {
    const CYCLES_PER_LOOP: u32 = 4;
    let loops = us as u32 * (F_CPU / 1_000_000) / CYCLES_PER_LOOP;
    let loops = loops.clamp(1, u16::MAX as u32) as u16;
    // SAFETY: The loop only modifies the counter register pair.
    unsafe {
        core::arch::asm!(
            "1: sbiw {n}, 1",
            "brne 1b",
            n = inout(reg_iw) loops => _,
            options(nomem, nostack)
        );
    }
}

/// Read and clear the reset flags.
pub fn reset_cause(cpu: &mcu::CPU) -> ResetCause {
    let mcucsr = cpu.mcucsr().read().bits();
    // SAFETY: Only the reset flags are written.
    cpu.mcucsr()
        .write(|w| unsafe { w.bits(mcucsr & !ResetCause::MASK) });
    ResetCause::from_mcucsr(mcucsr)
}

// vim: ts=4 sw=4 expandtab
