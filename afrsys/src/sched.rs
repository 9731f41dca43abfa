// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic task dispatch.
//!
//! A [Dispatcher] owns a static [TaskTable] and runs each task whenever the
//! tick count is a multiple of the task's [Period]. Tasks run in interrupt
//! context, in table order, one after the other. A task that runs for longer
//! than a tick delays all following ticks.

use crate::{
    CriticalSection,
    cell::MutexCell,
    error::ConfigError,
    tick::{TickHandler, TickSource, TickTimer, Ticks},
};
use core::num::NonZeroU32;

/// Task period in ticks. Never zero.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Period(NonZeroU32);

impl Period {
    pub const fn new(ticks: u32) -> Result<Self, ConfigError> {
        match NonZeroU32::new(ticks) {
            Some(ticks) => Ok(Self(ticks)),
            None => Err(ConfigError::ZeroPeriod),
        }
    }

    /// Period from milliseconds.
    ///
    /// Fails const evaluation, if the period is zero.
    pub const fn from_millis(ms: u32) -> Self {
        match Self::new(Ticks::from_millis(ms).count()) {
            Ok(period) => period,
            Err(e) => e.const_panic(),
        }
    }

    #[inline]
    pub const fn ticks(self) -> u32 {
        self.0.get()
    }
}

/// One periodic job.
#[derive(Copy, Clone)]
pub struct Task<'a> {
    period: Period,
    action: &'a (dyn Fn() + Sync),
}

impl<'a> Task<'a> {
    pub const fn new(period: Period, action: &'a (dyn Fn() + Sync)) -> Self {
        Self { period, action }
    }

    #[inline]
    pub const fn period(&self) -> Period {
        self.period
    }
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Fixed set of tasks, in execution order.
#[derive(Copy, Clone)]
pub struct TaskTable<'a> {
    tasks: &'a [Task<'a>],
    hyperperiod: u32,
}

impl<'a> TaskTable<'a> {
    /// Build a task table.
    ///
    /// The least common multiple of all task periods must fit into `u32`.
    pub const fn new(tasks: &'a [Task<'a>]) -> Result<Self, ConfigError> {
        let mut hyperperiod: u32 = 1;
        let mut i = 0;
        while i < tasks.len() {
            let period = tasks[i].period.ticks();
            let lcm = (hyperperiod / gcd(hyperperiod, period)) as u64 * period as u64;
            if lcm > u32::MAX as u64 {
                return Err(ConfigError::HyperperiodOverflow);
            }
            hyperperiod = lcm as u32;
            i += 1;
        }
        Ok(Self { tasks, hyperperiod })
    }

    /// Build a task table in const context.
    ///
    /// Fails const evaluation on an invalid table.
    pub const fn checked(tasks: &'a [Task<'a>]) -> Self {
        match Self::new(tasks) {
            Ok(table) => table,
            Err(e) => e.const_panic(),
        }
    }

    #[inline]
    pub const fn tasks(&self) -> &'a [Task<'a>] {
        self.tasks
    }

    /// Least common multiple of all periods.
    /// After this many ticks the schedule repeats.
    #[inline]
    pub const fn hyperperiod(&self) -> u32 {
        self.hyperperiod
    }
}

/// Runs the tasks of a [TaskTable] from a [TickSource].
pub struct Dispatcher<'a> {
    table: TaskTable<'a>,
    /// Unwrapped tick count modulo the hyperperiod.
    phase: MutexCell<u32>,
    last: MutexCell<Ticks>,
    armed: MutexCell<bool>,
}

impl<'a> Dispatcher<'a> {
    pub const fn new(table: TaskTable<'a>) -> Self {
        Self {
            table,
            phase: MutexCell::new(0),
            last: MutexCell::new(Ticks::new()),
            armed: MutexCell::new(false),
        }
    }

    #[inline]
    pub const fn table(&self) -> &TaskTable<'a> {
        &self.table
    }

    /// Start the tick source and attach to it.
    ///
    /// The first task activations happen on tick 1.
    pub fn init<'h, T: TickTimer>(
        &'h self,
        cs: CriticalSection<'_>,
        source: &TickSource<'h>,
        timer: &T,
    ) where
        'a: 'h,
    {
        source.init(cs, timer);
        self.phase.set(cs, 0);
        self.last.set(cs, source.elapsed(cs));
        self.armed.set(cs, true);
        source.attach(cs, self);
    }

    /// Detach from the tick source. No task runs afterwards.
    pub fn teardown(&self, cs: CriticalSection<'_>, source: &TickSource<'_>) {
        source.detach(cs);
        self.armed.set(cs, false);
    }

    pub fn is_armed(&self, cs: CriticalSection<'_>) -> bool {
        self.armed.get(cs)
    }
}

impl TickHandler for Dispatcher<'_> {
    fn on_tick(&self, cs: CriticalSection<'_>, now: Ticks) {
        if !self.armed.get(cs) {
            return;
        }

        let last = self.last.replace(cs, now);
        let delta = now.count().wrapping_sub(last.count());
        let phase = (self.phase.get(cs) as u64 + delta as u64) % self.table.hyperperiod as u64;
        let phase = phase as u32;
        self.phase.set(cs, phase);

        for task in self.table.tasks {
            if phase % task.period.ticks() == 0 {
                (task.action)();
            }
        }
    }
}


// vim: ts=4 sw=4 expandtab
