// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic application tasks.
//!
//! All tasks run in timer interrupt context.

use crate::{adc, dio, hw::interrupt};
use afrsys::{
    CriticalSection, Dispatcher, MutexCell, Period, Task, TaskTable, TickSource, pin::Pin,
};

pub const PIN_LED: Pin = Pin::PC2;
const ADC_CHANNEL: u8 = 0;

pub static TICK: TickSource<'static> = TickSource::new();

const TASKS: [Task<'static>; 3] = [
    Task::new(Period::from_millis(500), &task_led),
    Task::new(Period::from_millis(100), &task_adc),
    Task::new(Period::from_millis(1000), &task_second),
];

pub static DISPATCHER: Dispatcher<'static> = Dispatcher::new(TaskTable::checked(&TASKS));

static ADC_VALUE: MutexCell<u16> = MutexCell::new(0);
static SECOND: MutexCell<bool> = MutexCell::new(false);

fn task_led() {
    interrupt::free(|cs| dio::toggle(cs, PIN_LED));
}

fn task_adc() {
    interrupt::free(|cs| {
        let value = adc::read(cs, ADC_CHANNEL);
        ADC_VALUE.set(cs, value);
    });
}

fn task_second() {
    interrupt::free(|cs| SECOND.set(cs, true));
}

/// Latest ADC sample.
pub fn adc_value(cs: CriticalSection<'_>) -> u16 {
    ADC_VALUE.get(cs)
}

/// Whether a second passed since the last call.
pub fn second_passed(cs: CriticalSection<'_>) -> bool {
    SECOND.replace(cs, false)
}

// vim: ts=4 sw=4 expandtab
