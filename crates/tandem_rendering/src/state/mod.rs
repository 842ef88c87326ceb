//! # Render State
//!
//! Shared description of what is visible and what is being drawn.
//!
//! ## The Problem
//!
//! ```text
//! Producer:  draws into a back buffer, wants to publish it
//! Consumer:  samples/presents the actual target, clears and blits
//!
//! Lock held across GPU work:  PRODUCER STALLS ON THE BACKEND
//! No lock at all:             TORN PUBLISH (target and screen disagree)
//! ```
//!
//! ## The Solution: Two Narrow Locks
//!
//! ```text
//! slots   ─ actual_target, back_buffer_layers        (pointer swap only)
//! screens ─ current_screen, published screen+target  (copy only)
//! ```
//!
//! Lock order is always `slots` then `screens`. The publish command takes
//! only `screens`, so it can run inline on the producer thread while the
//! producer still holds `slots`.
//!
//! `actual_target` in the slots moves as soon as the producer swaps. The
//! presenting side reads the *published* pair instead, which the publish
//! command writes in one step once the target's drawing has finished.

mod screen;
mod slots;

pub use screen::Screen;
pub use slots::TargetSlots;

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::error::{RenderStateError, RenderStateResult};
use crate::target::{RenderTarget, SharedTarget};

/// Callback run by [`RenderState::invalidate`] with the new generation.
pub type InvalidateFn = Box<dyn Fn(u64) + Send + Sync>;

#[derive(Debug, Clone)]
struct Screens {
    current: Screen,
    actual: Screen,
    published_target: SharedTarget,
}

/// Consistent view of the published frame.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    /// Transform the actual target was drawn with.
    pub actual_screen: Screen,
    /// Target safe to sample or present, drawn with `actual_screen`.
    pub actual_target: SharedTarget,
    /// Invalidation generation at the time of the snapshot.
    pub generation: u64,
}

/// Double-buffered render state shared by producer and consumer.
///
/// ## Usage
///
/// ```rust,ignore
/// let state = Arc::new(RenderState::with_surface(1024, 768, 1, Screen::default())?);
///
/// // Presenting side
/// let frame = state.snapshot();
/// present(&frame.actual_target, &frame.actual_screen);
///
/// // Dependent caches
/// state.add_invalidate_fn(Box::new(|generation| cache.mark_stale(generation)));
/// ```
pub struct RenderState {
    slots: Mutex<TargetSlots>,
    screens: Mutex<Screens>,
    generation: AtomicU64,
    targets_epoch: AtomicU64,
    listeners: Mutex<Vec<InvalidateFn>>,
}

impl RenderState {
    /// Creates a render state from existing targets.
    ///
    /// # Errors
    ///
    /// Fails if the pool is empty, a target is zero-sized, sizes differ, or
    /// the same target is supplied twice.
    pub fn new(
        actual_target: SharedTarget,
        back_buffer_layers: impl IntoIterator<Item = SharedTarget>,
        screen: Screen,
    ) -> RenderStateResult<Self> {
        let back_buffer_layers: VecDeque<SharedTarget> = back_buffer_layers.into_iter().collect();
        validate_targets(&actual_target, &back_buffer_layers)?;

        Ok(Self {
            screens: Mutex::new(Screens {
                current: screen,
                actual: screen,
                published_target: actual_target.clone(),
            }),
            slots: Mutex::new(TargetSlots {
                actual_target,
                back_buffer_layers,
            }),
            generation: AtomicU64::new(0),
            targets_epoch: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// Creates a render state with freshly allocated targets.
    ///
    /// # Errors
    ///
    /// Fails if `back_buffer_count` is zero or the surface is zero-sized.
    pub fn with_surface(
        width: u32,
        height: u32,
        back_buffer_count: usize,
        screen: Screen,
    ) -> RenderStateResult<Self> {
        let actual = RenderTarget::shared(width, height);
        let back = (0..back_buffer_count).map(|_| RenderTarget::shared(width, height));
        Self::new(actual, back, screen)
    }

    /// Locks the target slots.
    ///
    /// Keep the guard for pointer moves only; never issue GPU work or wait
    /// on the command queue while holding it.
    #[inline]
    pub fn lock_slots(&self) -> MutexGuard<'_, TargetSlots> {
        self.slots.lock()
    }

    /// Returns the producer-side actual target.
    ///
    /// This moves at swap time, before the target's drawing has executed.
    /// Presenters should use [`RenderState::snapshot`].
    #[must_use]
    pub fn actual_target(&self) -> SharedTarget {
        self.slots.lock().actual_target.clone()
    }

    /// Returns the number of spare targets.
    #[must_use]
    pub fn back_buffer_count(&self) -> usize {
        self.slots.lock().back_buffer_layers.len()
    }

    /// Returns the surface size shared by all targets.
    #[must_use]
    pub fn surface_size(&self) -> (u32, u32) {
        self.slots.lock().actual_target.size()
    }

    /// Returns the in-progress transform.
    #[must_use]
    pub fn current_screen(&self) -> Screen {
        self.screens.lock().current
    }

    /// Replaces the in-progress transform.
    pub fn set_current_screen(&self, screen: Screen) {
        self.screens.lock().current = screen;
    }

    /// Returns the transform of the published frame.
    #[must_use]
    pub fn actual_screen(&self) -> Screen {
        self.screens.lock().actual
    }

    /// Makes `target`, drawn with `screen`, the published frame.
    ///
    /// Ignored if the targets were reset after the swap that produced it.
    pub(crate) fn publish(&self, screen: Screen, target: SharedTarget, targets_epoch: u64) {
        let mut screens = self.screens.lock();
        if targets_epoch != self.targets_epoch() {
            tracing::debug!("Dropping publish of {} from before a target reset", target.id());
            return;
        }
        screens.actual = screen;
        screens.published_target = target;
    }

    /// Returns the published target and its transform as one consistent pair.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        let screens = self.screens.lock();
        RenderSnapshot {
            actual_screen: screens.actual,
            actual_target: screens.published_target.clone(),
            generation: self.generation(),
        }
    }

    /// Returns how many times the targets have been replaced wholesale.
    #[inline]
    #[must_use]
    pub fn targets_epoch(&self) -> u64 {
        self.targets_epoch.load(Ordering::Acquire)
    }

    /// Returns how many times the state has been invalidated.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Registers a callback run on every invalidation.
    ///
    /// Callbacks run on whichever thread invalidates (usually the command
    /// queue worker) and must not register further callbacks.
    pub fn add_invalidate_fn(&self, callback: InvalidateFn) {
        self.listeners.lock().push(callback);
    }

    /// Marks everything derived from the render state as stale.
    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        for listener in self.listeners.lock().iter() {
            listener(generation);
        }
    }

    /// Replaces every target at once (surface resize, context loss).
    ///
    /// An attached updater moves its drawing onto the new pool before its
    /// next draw or flush.
    ///
    /// # Errors
    ///
    /// Same validation as [`RenderState::new`]; on error nothing changes.
    pub fn reset_targets(
        &self,
        actual_target: SharedTarget,
        back_buffer_layers: impl IntoIterator<Item = SharedTarget>,
    ) -> RenderStateResult<()> {
        let back_buffer_layers: VecDeque<SharedTarget> = back_buffer_layers.into_iter().collect();
        validate_targets(&actual_target, &back_buffer_layers)?;

        {
            let mut slots = self.slots.lock();
            let mut screens = self.screens.lock();
            screens.published_target = actual_target.clone();
            slots.actual_target = actual_target;
            slots.back_buffer_layers = back_buffer_layers;
            self.targets_epoch.fetch_add(1, Ordering::AcqRel);
        }

        tracing::debug!("Render state targets reset");
        self.invalidate();
        Ok(())
    }
}

impl std::fmt::Debug for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderState")
            .field("slots", &*self.slots.lock())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

fn validate_targets(actual: &SharedTarget, back: &VecDeque<SharedTarget>) -> RenderStateResult<()> {
    if back.is_empty() {
        return Err(RenderStateError::EmptyBackBufferPool);
    }

    let expected = actual.size();
    let mut seen = HashSet::with_capacity(back.len() + 1);

    for target in std::iter::once(actual).chain(back.iter()) {
        if target.is_empty() {
            return Err(RenderStateError::ZeroSizedTarget {
                id: target.id(),
                width: target.width(),
                height: target.height(),
            });
        }
        if target.size() != expected {
            return Err(RenderStateError::SizeMismatch {
                id: target.id(),
                expected,
                found: target.size(),
            });
        }
        if !seen.insert(target.id()) {
            return Err(RenderStateError::DuplicateTarget(target.id()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::ClipRect;
    use std::sync::Arc;

    fn state() -> RenderState {
        RenderState::with_surface(64, 32, 2, Screen::new(ClipRect::surface(64, 32))).unwrap()
    }

    #[test]
    fn test_with_surface() {
        let state = state();
        assert_eq!(state.back_buffer_count(), 2);
        assert_eq!(state.surface_size(), (64, 32));
        assert_eq!(state.generation(), 0);
        assert_eq!(state.current_screen(), state.actual_screen());
    }

    #[test]
    fn test_empty_pool_rejected() {
        let result = RenderState::new(RenderTarget::shared(8, 8), Vec::new(), Screen::default());
        assert_eq!(result.unwrap_err(), RenderStateError::EmptyBackBufferPool);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let odd = RenderTarget::shared(8, 9);
        let result = RenderState::new(RenderTarget::shared(8, 8), vec![Arc::clone(&odd)], Screen::default());
        assert_eq!(
            result.unwrap_err(),
            RenderStateError::SizeMismatch {
                id: odd.id(),
                expected: (8, 8),
                found: (8, 9),
            }
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let actual = RenderTarget::shared(8, 8);
        let result = RenderState::new(Arc::clone(&actual), vec![Arc::clone(&actual)], Screen::default());
        assert_eq!(result.unwrap_err(), RenderStateError::DuplicateTarget(actual.id()));
    }

    #[test]
    fn test_zero_sized_rejected() {
        let result = RenderState::with_surface(0, 8, 1, Screen::default());
        assert!(matches!(result, Err(RenderStateError::ZeroSizedTarget { width: 0, .. })));
    }

    #[test]
    fn test_snapshot_ignores_unpublished_swap() {
        let state = state();
        let published = state.actual_target();

        state.lock_slots().swap_front();

        assert!(!Arc::ptr_eq(&state.actual_target(), &published));
        assert!(Arc::ptr_eq(&state.snapshot().actual_target, &published));
    }

    #[test]
    fn test_current_screen_not_visible_until_published() {
        let state = state();
        let moved = state.current_screen().translated(5.0, 0.0);

        state.set_current_screen(moved);
        assert_ne!(state.actual_screen(), moved);

        let target = state.lock_slots().front().clone();
        state.publish(moved, Arc::clone(&target), state.targets_epoch());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.actual_screen, moved);
        assert!(Arc::ptr_eq(&snapshot.actual_target, &target));
    }

    #[test]
    fn test_invalidate_runs_listeners() {
        let state = state();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        state.add_invalidate_fn(Box::new(move |generation| sink.lock().push(generation)));

        state.invalidate();
        state.invalidate();

        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(state.generation(), 2);
    }

    #[test]
    fn test_reset_targets_replaces_and_invalidates() {
        let state = state();
        let actual = RenderTarget::shared(128, 64);
        let back = RenderTarget::shared(128, 64);

        state.reset_targets(Arc::clone(&actual), vec![back]).unwrap();

        assert!(Arc::ptr_eq(&state.actual_target(), &actual));
        assert_eq!(state.surface_size(), (128, 64));
        assert_eq!(state.back_buffer_count(), 1);
        assert_eq!(state.generation(), 1);
        assert_eq!(state.targets_epoch(), 1);
        assert!(Arc::ptr_eq(&state.snapshot().actual_target, &actual));
    }

    #[test]
    fn test_publish_from_before_reset_is_dropped() {
        let state = state();
        let stale_epoch = state.targets_epoch();
        let stale = state.lock_slots().front().clone();

        let actual = RenderTarget::shared(64, 32);
        state.reset_targets(Arc::clone(&actual), vec![RenderTarget::shared(64, 32)]).unwrap();
        state.publish(Screen::default().translated(1.0, 1.0), stale, stale_epoch);

        let snapshot = state.snapshot();
        assert!(Arc::ptr_eq(&snapshot.actual_target, &actual));
        assert_eq!(snapshot.actual_screen, Screen::new(ClipRect::surface(64, 32)));
    }

    #[test]
    fn test_failed_reset_changes_nothing() {
        let state = state();
        let before = state.actual_target();

        let result = state.reset_targets(RenderTarget::shared(16, 16), Vec::new());

        assert!(result.is_err());
        assert!(Arc::ptr_eq(&state.actual_target(), &before));
        assert_eq!(state.generation(), 0);
        assert_eq!(state.targets_epoch(), 0);
    }
}
