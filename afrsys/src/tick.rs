// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{CriticalSection, cell::MutexCell};

/// Real time between two ticks.
pub const TICK_PERIOD_US: u32 = 1000;

/// Absolute tick count.
///
/// Wraps around after 2^32 ticks (about 49.7 days).
/// Comparison is done in serial number arithmetic, so that an earlier
/// stamp compares as less than a later one across the wraparound,
/// as long as both are less than 2^31 ticks apart.
#[derive(PartialEq, Eq, Copy, Clone, Debug, derive_more::Display, derive_more::From, derive_more::Into)]
pub struct Ticks(pub u32);

/// Signed distance between two [Ticks].
#[derive(
    PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Debug, derive_more::Display, derive_more::From, derive_more::Into,
)]
pub struct RelTicks(pub i32);

impl Ticks {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        Self(((ms as u64 * 1000) / TICK_PERIOD_US as u64) as u32)
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0
    }

    /// The next tick.
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl Default for Ticks {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Ord for Ticks {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        if self.0 == other.0 {
            core::cmp::Ordering::Equal
        } else if self.0.wrapping_sub(other.0) & (1 << (u32::BITS - 1)) == 0 {
            core::cmp::Ordering::Greater
        } else {
            core::cmp::Ordering::Less
        }
    }
}

impl PartialOrd for Ticks {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::ops::Add<RelTicks> for Ticks {
    type Output = Self;

    #[inline]
    fn add(self, other: RelTicks) -> Self::Output {
        Self(self.0.wrapping_add(other.0 as u32))
    }
}

impl core::ops::Sub for Ticks {
    type Output = RelTicks;

    #[inline]
    fn sub(self, other: Self) -> Self::Output {
        RelTicks(self.0.wrapping_sub(other.0) as i32)
    }
}

impl RelTicks {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn from_millis(ms: i32) -> Self {
        Self(((ms as i64 * 1000) / TICK_PERIOD_US as i64) as i32)
    }
}

impl Default for RelTicks {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// The hardware timer that drives a [TickSource].
pub trait TickTimer {
    /// Start generating one interrupt every `period_us` microseconds.
    ///
    /// The interrupt handler must call [TickSource::timer_expired].
    fn start_periodic(&self, cs: CriticalSection<'_>, period_us: u32);
}

/// Receiver of ticks.
///
/// Runs in interrupt context. Implementations must return quickly,
/// because the next tick can't be processed before they return.
pub trait TickHandler: Sync {
    fn on_tick(&self, cs: CriticalSection<'_>, now: Ticks);
}

/// Millisecond tick counter with one attachable tick callback.
pub struct TickSource<'h> {
    ticks: MutexCell<Ticks>,
    handler: MutexCell<Option<&'h dyn TickHandler>>,
}

impl<'h> TickSource<'h> {
    pub const fn new() -> Self {
        Self {
            ticks: MutexCell::new(Ticks::new()),
            handler: MutexCell::new(None),
        }
    }

    /// Start the timer and reset the tick count to zero.
    ///
    /// Any attached handler is detached.
    pub fn init<T: TickTimer>(&self, cs: CriticalSection<'_>, timer: &T) {
        self.ticks.set(cs, Ticks::new());
        self.handler.set(cs, None);
        timer.start_periodic(cs, TICK_PERIOD_US);
    }

    /// Attach the tick handler.
    ///
    /// A previously attached handler is replaced.
    pub fn attach(&self, cs: CriticalSection<'_>, handler: &'h dyn TickHandler) {
        self.handler.set(cs, Some(handler));
    }

    /// Detach the tick handler.
    ///
    /// Takes effect from the next tick on.
    pub fn detach(&self, cs: CriticalSection<'_>) {
        self.handler.set(cs, None);
    }

    pub fn is_attached(&self, cs: CriticalSection<'_>) -> bool {
        self.handler.get(cs).is_some()
    }

    /// Number of ticks since [Self::init].
    #[inline]
    pub fn elapsed(&self, cs: CriticalSection<'_>) -> Ticks {
        self.ticks.get(cs)
    }

    /// Timer interrupt body.
    ///
    /// Counts the tick and runs the attached handler to completion.
    pub fn timer_expired(&self, cs: CriticalSection<'_>) {
        let now = self.ticks.get(cs).next();
        self.ticks.set(cs, now);
        if let Some(handler) = self.handler.get(cs) {
            handler.on_tick(cs, now);
        }
    }
}

impl Default for TickSource<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::undocumented_unsafe_blocks)]
mod test {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct TestTimer {
        started: StdMutex<Vec<u32>>,
    }

    impl TestTimer {
        fn new() -> Self {
            Self {
                started: StdMutex::new(Vec::new()),
            }
        }
    }

    impl TickTimer for TestTimer {
        fn start_periodic(&self, _cs: CriticalSection<'_>, period_us: u32) {
            self.started.lock().unwrap().push(period_us);
        }
    }

    struct Recorder {
        name: &'static str,
        log: StdMutex<Vec<(&'static str, u32)>>,
    }

    impl Recorder {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                log: StdMutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<(&'static str, u32)> {
            self.log.lock().unwrap().clone()
        }
    }

    impl TickHandler for Recorder {
        fn on_tick(&self, _cs: CriticalSection<'_>, now: Ticks) {
            self.log.lock().unwrap().push((self.name, now.count()));
        }
    }

    #[test]
    fn test_ticks_ord() {
        assert!(Ticks(1) > Ticks(0));
        assert!(Ticks(0) < Ticks(1));
        assert_eq!(Ticks(7).cmp(&Ticks(7)), core::cmp::Ordering::Equal);
        // Across the wraparound.
        assert!(Ticks(2) > Ticks(u32::MAX - 2));
        assert!(Ticks(u32::MAX) < Ticks(0));
        assert_eq!(Ticks(3) - Ticks(u32::MAX), RelTicks(4));
        assert_eq!(Ticks(u32::MAX) + RelTicks(2), Ticks(1));
        assert_eq!(Ticks(10) + RelTicks(-11), Ticks(u32::MAX));
        assert_eq!(Ticks::from_millis(250), Ticks(250));
        assert_eq!(RelTicks::from_millis(-5), RelTicks(-5));
    }

    #[test]
    fn test_init() {
        let cs = unsafe { CriticalSection::new() };
        let timer = TestTimer::new();
        let rec = Recorder::new("a");
        let src = TickSource::new();

        src.init(cs, &timer);
        assert_eq!(*timer.started.lock().unwrap(), [TICK_PERIOD_US]);
        assert_eq!(src.elapsed(cs), Ticks(0));

        src.attach(cs, &rec);
        for _ in 0..5 {
            src.timer_expired(cs);
        }
        assert_eq!(src.elapsed(cs), Ticks(5));

        // Re-init zeroes the counter and drops the handler.
        src.init(cs, &timer);
        assert_eq!(timer.started.lock().unwrap().len(), 2);
        assert_eq!(src.elapsed(cs), Ticks(0));
        assert!(!src.is_attached(cs));
        src.timer_expired(cs);
        assert_eq!(rec.seen().len(), 5);
    }

    #[test]
    fn test_callback_per_tick() {
        let cs = unsafe { CriticalSection::new() };
        let rec = Recorder::new("a");
        let src = TickSource::new();
        src.init(cs, &TestTimer::new());

        // Attaching twice doesn't double dispatch.
        src.attach(cs, &rec);
        src.attach(cs, &rec);
        for _ in 0..3 {
            src.timer_expired(cs);
        }
        assert_eq!(rec.seen(), [("a", 1), ("a", 2), ("a", 3)]);
    }

    #[test]
    fn test_attach_replaces() {
        let cs = unsafe { CriticalSection::new() };
        let a = Recorder::new("a");
        let b = Recorder::new("b");
        let src = TickSource::new();
        src.init(cs, &TestTimer::new());

        src.attach(cs, &a);
        src.timer_expired(cs);
        src.attach(cs, &b);
        src.timer_expired(cs);
        assert_eq!(a.seen(), [("a", 1)]);
        assert_eq!(b.seen(), [("b", 2)]);
    }

    #[test]
    fn test_detach() {
        let cs = unsafe { CriticalSection::new() };
        let rec = Recorder::new("a");
        let src = TickSource::new();
        src.init(cs, &TestTimer::new());

        src.attach(cs, &rec);
        assert!(src.is_attached(cs));
        src.timer_expired(cs);
        src.detach(cs);
        assert!(!src.is_attached(cs));
        src.timer_expired(cs);
        src.timer_expired(cs);
        assert_eq!(src.elapsed(cs), Ticks(3));
        assert_eq!(rec.seen(), [("a", 1)]);
    }

    #[test]
    fn test_counter_wraps() {
        let cs = unsafe { CriticalSection::new() };
        let rec = Recorder::new("a");
        let src = TickSource::new();
        src.init(cs, &TestTimer::new());
        src.ticks.set(cs, Ticks(u32::MAX - 1));

        src.attach(cs, &rec);
        src.timer_expired(cs);
        src.timer_expired(cs);
        assert_eq!(src.elapsed(cs), Ticks(0));
        assert_eq!(rec.seen(), [("a", u32::MAX), ("a", 0)]);
    }
}

// vim: ts=4 sw=4 expandtab
