// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # afrsys: millisecond tick and periodic task dispatch
//!
//! Hardware independent core of the AfrSys AVR firmware.
//!
//! A [TickSource] counts timer interrupts and forwards each tick to one
//! attached [TickHandler]. The [Dispatcher] is such a handler: it runs the
//! tasks of a fixed [TaskTable] whenever the tick count is a multiple of a
//! task's [Period].
//!
//! All state that is shared between interrupt and main context lives in
//! [bare_metal::Mutex] cells and can only be touched while holding a
//! [CriticalSection]. The [IrqNest] hands out nested critical sections.
//!
//! ```
//! use afrsys::{CriticalSection, Dispatcher, Period, Task, TaskTable, TickSource, TickTimer};
//! use core::sync::atomic::{AtomicU32, Ordering::Relaxed};
//!
//! struct NoTimer;
//! impl TickTimer for NoTimer {
//!     fn start_periodic(&self, _cs: CriticalSection<'_>, _period_us: u32) {}
//! }
//!
//! static BLINKS: AtomicU32 = AtomicU32::new(0);
//! fn blink() {
//!     BLINKS.fetch_add(1, Relaxed);
//! }
//!
//! const TASKS: [Task<'static>; 1] = [Task::new(Period::from_millis(500), &blink)];
//!
//! static TICK: TickSource<'static> = TickSource::new();
//! static DISPATCHER: Dispatcher<'static> = Dispatcher::new(TaskTable::checked(&TASKS));
//!
//! // SAFETY: Doc example, there is no interrupt context.
//! let cs = unsafe { CriticalSection::new() };
//! DISPATCHER.init(cs, &TICK, &NoTimer);
//! for _ in 0..1000 {
//!     TICK.timer_expired(cs);
//! }
//! assert_eq!(BLINKS.load(Relaxed), 2);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod cell;
pub mod clock;
pub mod error;
pub mod irq;
pub mod log;
pub mod pin;
pub mod reset;
pub mod ring;
pub mod sched;
pub mod tick;

pub use crate::{
    cell::{MutexCell, MutexOnce},
    error::ConfigError,
    irq::{GlobalIrq, IrqGuard, IrqNest},
    sched::{Dispatcher, Period, Task, TaskTable},
    tick::{RelTicks, TICK_PERIOD_US, TickHandler, TickSource, TickTimer, Ticks},
};

/// Re-export of `bare_metal::CriticalSection`.
pub type CriticalSection<'cs> = bare_metal::CriticalSection<'cs>;
/// Re-export of `bare_metal::Mutex`.
pub type Mutex<T> = bare_metal::Mutex<T>;

// vim: ts=4 sw=4 expandtab
