// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::CriticalSection;
use core::cell::Cell;

/// Global interrupt enable flag of the CPU.
pub trait GlobalIrq {
    /// Mask all interrupts.
    ///
    /// Returns whether interrupts were enabled before the call.
    fn disable(&self) -> bool;

    /// Unmask all interrupts.
    ///
    /// # Safety
    ///
    /// Interrupt handlers may run right after this call.
    /// Everything they touch must be initialized.
    unsafe fn enable(&self);
}

/// Nesting counter for critical sections.
///
/// Interrupts are masked on the outermost disable and unmasked again when the
/// nesting depth returns to zero. An inner enable never unmasks interrupts for
/// an outer critical section that is still active.
///
/// Explicit [Self::disable]/[Self::enable] levels are counted apart from the
/// levels held by [IrqGuard]s. [Self::enable] only ever releases an explicit
/// level, so interrupts stay masked while any guard is alive.
///
/// There is one `IrqNest` per CPU. It is owned by the main context and passed
/// by reference to everything that needs a critical section.
/// Interrupt handlers don't use it. They already run with interrupts masked.
pub struct IrqNest<I> {
    irq: I,
    explicit: Cell<u8>,
    guards: Cell<u8>,
    outer_enabled: Cell<bool>,
}

#[inline(never)]
#[cold]
fn nesting_overflow() -> ! {
    panic!("IrqNest: nesting overflow");
}

impl<I: GlobalIrq> IrqNest<I> {
    pub const fn new(irq: I) -> Self {
        Self {
            irq,
            explicit: Cell::new(0),
            guards: Cell::new(0),
            outer_enabled: Cell::new(false),
        }
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> u16 {
        self.explicit.get() as u16 + self.guards.get() as u16
    }

    fn enter(&self, level: &Cell<u8>) {
        if self.depth() == 0 {
            self.outer_enabled.set(self.irq.disable());
        }
        match level.get().checked_add(1) {
            Some(l) => level.set(l),
            None => nesting_overflow(),
        }
    }

    /// Enter a critical section.
    ///
    /// Panics if more than 255 explicit levels are nested.
    pub fn disable(&self) {
        self.enter(&self.explicit);
    }

    /// Leave a critical section entered by [Self::disable].
    ///
    /// Interrupts are enabled when the outermost critical section is left.
    /// Called with no critical section active, this just enables interrupts.
    /// Called with no explicit level but a live [IrqGuard], this does nothing.
    pub fn enable(&self) {
        match self.explicit.get() {
            0 if self.guards.get() > 0 => return,
            0 => (),
            e => self.explicit.set(e - 1),
        }
        if self.depth() == 0 {
            // SAFETY: The caller is leaving its outermost critical section
            //         and no guard is alive.
            //         Interrupts are supposed to run from here on.
            unsafe { self.irq.enable() };
        }
    }

    /// Enter a critical section that is left when the returned guard is dropped.
    ///
    /// Leaving the outermost guard restores the interrupt state
    /// found when it was entered.
    /// Panics if more than 255 guards are nested.
    pub fn lock(&self) -> IrqGuard<'_, I> {
        self.enter(&self.guards);
        IrqGuard { nest: self }
    }

    /// Run `f` inside of a critical section.
    pub fn free<F, R>(&self, f: F) -> R
    where
        F: FnOnce(CriticalSection<'_>) -> R,
    {
        let guard = self.lock();
        f(guard.cs())
    }

    fn restore(&self) {
        // Every live guard holds one level.
        self.guards.set(self.guards.get().saturating_sub(1));
        if self.depth() == 0 && self.outer_enabled.get() {
            // SAFETY: Interrupts were enabled before the outermost guard was taken.
            unsafe { self.irq.enable() };
        }
    }
}

/// Scoped critical section token.
pub struct IrqGuard<'a, I: GlobalIrq> {
    nest: &'a IrqNest<I>,
}

impl<I: GlobalIrq> IrqGuard<'_, I> {
    /// The critical section that is held by this guard.
    #[inline]
    pub fn cs(&self) -> CriticalSection<'_> {
        // SAFETY: Interrupts are masked for as long as this guard lives.
        //         IrqNest::enable can't release a guard's level.
        //         The returned token can't outlive the guard.
        unsafe { CriticalSection::new() }
    }
}

impl<I: GlobalIrq> Drop for IrqGuard<'_, I> {
    #[inline]
    fn drop(&mut self) {
        self.nest.restore();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct TestIrq {
        enabled: Cell<bool>,
        nr_disable: Cell<u32>,
        nr_enable: Cell<u32>,
    }

    impl TestIrq {
        fn new(enabled: bool) -> Self {
            Self {
                enabled: Cell::new(enabled),
                ..Default::default()
            }
        }
    }

    impl GlobalIrq for &TestIrq {
        fn disable(&self) -> bool {
            self.nr_disable.set(self.nr_disable.get() + 1);
            self.enabled.replace(false)
        }

        unsafe fn enable(&self) {
            self.nr_enable.set(self.nr_enable.get() + 1);
            self.enabled.set(true);
        }
    }

    #[test]
    fn test_nested_disable() {
        let irq = TestIrq::new(true);
        let nest = IrqNest::new(&irq);

        nest.disable();
        nest.disable();
        assert_eq!(nest.depth(), 2);
        assert!(!irq.enabled.get());

        nest.enable();
        assert_eq!(nest.depth(), 1);
        assert!(!irq.enabled.get());

        nest.enable();
        assert_eq!(nest.depth(), 0);
        assert!(irq.enabled.get());

        // Only the outermost level touches the hardware.
        assert_eq!(irq.nr_disable.get(), 1);
        assert_eq!(irq.nr_enable.get(), 1);
    }

    #[test]
    fn test_unbalanced_enable() {
        let irq = TestIrq::new(false);
        let nest = IrqNest::new(&irq);

        nest.enable();
        assert_eq!(nest.depth(), 0);
        assert!(irq.enabled.get());
    }

    #[test]
    fn test_startup_sequence() {
        // Disable during init, enable when done.
        let irq = TestIrq::new(false);
        let nest = IrqNest::new(&irq);

        nest.disable();
        nest.free(|_cs| {
            assert_eq!(nest.depth(), 2);
        });
        assert_eq!(nest.depth(), 1);
        assert!(!irq.enabled.get());
        nest.enable();
        assert!(irq.enabled.get());
    }

    #[test]
    fn test_guard_nesting() {
        let irq = TestIrq::new(true);
        let nest = IrqNest::new(&irq);

        {
            let outer = nest.lock();
            assert!(!irq.enabled.get());
            {
                let _inner = nest.lock();
                assert_eq!(nest.depth(), 2);
            }
            assert_eq!(nest.depth(), 1);
            assert!(!irq.enabled.get());
            let _ = outer.cs();
        }
        assert_eq!(nest.depth(), 0);
        assert!(irq.enabled.get());
    }

    #[test]
    fn test_guard_restores_disabled() {
        let irq = TestIrq::new(false);
        let nest = IrqNest::new(&irq);

        let value = nest.free(|_cs| 42);
        assert_eq!(value, 42);
        assert_eq!(nest.depth(), 0);
        assert!(!irq.enabled.get());
        assert_eq!(irq.nr_enable.get(), 0);
    }

    #[test]
    fn test_guard_inside_explicit() {
        let irq = TestIrq::new(true);
        let nest = IrqNest::new(&irq);

        nest.disable();
        drop(nest.lock());
        assert_eq!(nest.depth(), 1);
        assert!(!irq.enabled.get());
        nest.enable();
        assert!(irq.enabled.get());
    }

    #[test]
    fn test_enable_keeps_guard_masked() {
        let irq = TestIrq::new(true);
        let nest = IrqNest::new(&irq);

        {
            let guard = nest.lock();
            let _cs = guard.cs();
            nest.enable();
            assert_eq!(nest.depth(), 1);
            assert!(!irq.enabled.get());
        }
        assert_eq!(nest.depth(), 0);
        assert!(irq.enabled.get());
    }

    #[test]
    fn test_explicit_inside_guard() {
        let irq = TestIrq::new(true);
        let nest = IrqNest::new(&irq);

        let guard = nest.lock();
        nest.disable();
        nest.enable();
        nest.enable();
        assert_eq!(nest.depth(), 1);
        assert!(!irq.enabled.get());
        drop(guard);
        assert!(irq.enabled.get());
        assert_eq!(irq.nr_enable.get(), 1);
    }

    #[test]
    fn test_deep_nesting() {
        let irq = TestIrq::new(true);
        let nest = IrqNest::new(&irq);

        for _ in 0..255 {
            nest.disable();
        }
        assert_eq!(nest.depth(), 255);
        for _ in 0..254 {
            nest.enable();
        }
        assert!(!irq.enabled.get());
        nest.enable();
        assert!(irq.enabled.get());
    }

    #[test]
    #[should_panic(expected = "nesting overflow")]
    fn test_nesting_overflow() {
        let irq = TestIrq::new(true);
        let nest = IrqNest::new(&irq);

        for _ in 0..256 {
            nest.disable();
        }
    }
}

// vim: ts=4 sw=4 expandtab
