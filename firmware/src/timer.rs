// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::{
    hw::{F_CPU, mcu, reset_system},
    tasks::TICK,
};
use afrsys::{
    CriticalSection, MutexCell, MutexOnce, TickTimer,
    clock::{Prescaler, timer8_reload},
};
use avr_context::IrqCtx;

// TIMSK, TIFR
const TOIE0: u8 = 1 << 0;
const TOV0: u8 = 1 << 0;

const TIMER0_PRESCALER: Prescaler = Prescaler::Div8;

static TC0: MutexOnce<mcu::TC0> = MutexOnce::new();
static TC0_RELOAD: MutexCell<u8> = MutexCell::new(0);

/// Clock select bits of the timer control registers.
const fn cs_bits(prescaler: Prescaler) -> u8 {
    match prescaler {
        Prescaler::Div1 => 1,
        Prescaler::Div8 => 2,
        Prescaler::Div64 => 3,
        Prescaler::Div256 => 4,
        Prescaler::Div1024 => 5,
    }
}

/// Hand timer 0 over to the tick driver.
pub fn init(cs: CriticalSection<'_>, tc0: mcu::TC0) {
    // SAFETY: Stop the timer. All bit patterns are valid for TCCR0.
    tc0.tccr0().write(|w| unsafe { w.bits(0) });
    if TC0.set(cs, tc0).is_err() {
        reset_system();
    }
}

/// Timer 0 as overflow interrupt source for the system tick.
pub struct Timer0;

impl TickTimer for Timer0 {
    fn start_periodic(&self, cs: CriticalSection<'_>, period_us: u32) {
        let Ok(reload) = timer8_reload(F_CPU, TIMER0_PRESCALER, period_us) else {
            reset_system();
        };
        let Some(tc0) = TC0.get(cs) else {
            reset_system();
        };
        TC0_RELOAD.set(cs, reload);

        // SAFETY: All bit patterns are valid for TCCR0 and TCNT0.
        tc0.tccr0().write(|w| unsafe { w.bits(0) });
        // SAFETY: See above.
        tc0.tcnt0().write(|w| unsafe { w.bits(reload) });
        // SAFETY: Writing TOV0 clears a pending overflow. Other flags are not touched.
        tc0.tifr().write(|w| unsafe { w.bits(TOV0) });
        // SAFETY: TIMSK is shared between the timers. Only TOIE0 is changed.
        tc0.timsk().modify(|r, w| unsafe { w.bits(r.bits() | TOIE0) });
        // SAFETY: Start the timer.
        tc0.tccr0()
            .write(|w| unsafe { w.bits(cs_bits(TIMER0_PRESCALER)) });
    }
}

pub fn irq_handler_timer0_ovf(c: &IrqCtx<'_>) {
    let cs = c.cs();
    if let Some(tc0) = TC0.get(cs) {
        // Keep the counts that passed since the overflow.
        let elapsed = tc0.tcnt0().read().bits();
        let reload = TC0_RELOAD.get(cs).wrapping_add(elapsed);
        // SAFETY: All bit patterns are valid for TCNT0.
        tc0.tcnt0().write(|w| unsafe { w.bits(reload) });
    }
    TICK.timer_expired(cs);
}

const TIMER1_PRESCALER: Prescaler = Prescaler::Div1024;

/// Timer 1 as 8 bit fast PWM on OC1A (PB1) and OC1B (PB2).
pub struct Pwm {
    tc1: mcu::TC1,
}

impl Pwm {
    /// Non-inverting output on both channels. Starts with duty 0.
    #[rustfmt::skip]
    pub fn new(tc1: mcu::TC1) -> Self {
        tc1.ocr1a().write(|w| w.set(0));
        tc1.ocr1b().write(|w| w.set(0));
        tc1.tccr1a().write(|w| {
            w.com1a().match_clear()
             .com1b().match_clear()
             .wgm1().set(1)
        });
        let pwm = Self { tc1 };
        pwm.on();
        pwm
    }

    /// Start the timer clock.
    pub fn on(&self) {
        // WGM13:12 = 01 -> fast PWM 8 bit together with WGM11:10 = 01.
        // SAFETY: All bit patterns are valid for TCCR1B.
        self.tc1.tccr1b().write(|w| unsafe {
            w.bits((1 << 3) | cs_bits(TIMER1_PRESCALER))
        });
    }

    /// Stop the timer clock. The outputs hold their level.
    pub fn off(&self) {
        // SAFETY: All bit patterns are valid for TCCR1B.
        self.tc1.tccr1b().write(|w| unsafe { w.bits(1 << 3) });
    }

    pub fn set_duty_a(&self, duty: u8) {
        self.tc1.ocr1a().write(|w| w.set(duty.into()));
    }

    pub fn set_duty_b(&self, duty: u8) {
        self.tc1.ocr1b().write(|w| w.set(duty.into()));
    }
}

// vim: ts=4 sw=4 expandtab
