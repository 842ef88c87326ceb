//! Target slots: the only render-state data the swap critical section touches.

use std::collections::VecDeque;

use crate::target::SharedTarget;

/// Which target is visible and which are spare.
///
/// Obtained through [`RenderState::lock_slots`](super::RenderState::lock_slots).
/// Everything in here is an `Arc`, so every mutation is a pointer move.
#[derive(Debug)]
pub struct TargetSlots {
    /// Target that is complete and safe to sample or present.
    pub actual_target: SharedTarget,
    /// Spare targets; the front one is the next to be used.
    pub back_buffer_layers: VecDeque<SharedTarget>,
}

impl TargetSlots {
    /// Returns the next back buffer.
    ///
    /// # Panics
    ///
    /// Panics if the pool is empty.
    #[must_use]
    pub fn front(&self) -> &SharedTarget {
        let Some(front) = self.back_buffer_layers.front() else {
            panic!("back buffer pool is empty");
        };
        front
    }

    /// Exchanges the actual target with the front back buffer.
    ///
    /// After the call the finished drawing is actual, and the previously
    /// visible target sits at the front of the pool. The pool never shrinks.
    ///
    /// # Panics
    ///
    /// Panics if the pool is empty at swap time.
    pub fn swap_front(&mut self) {
        let Some(front) = self.back_buffer_layers.front_mut() else {
            panic!("back buffer pool is empty at swap time");
        };
        std::mem::swap(&mut self.actual_target, front);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::RenderTarget;
    use std::sync::Arc;

    #[test]
    fn test_swap_front_is_pointer_exchange() {
        let a = RenderTarget::shared(8, 8);
        let b = RenderTarget::shared(8, 8);
        let mut slots = TargetSlots {
            actual_target: Arc::clone(&a),
            back_buffer_layers: VecDeque::from([Arc::clone(&b)]),
        };

        slots.swap_front();
        assert!(Arc::ptr_eq(&slots.actual_target, &b));
        assert!(Arc::ptr_eq(slots.front(), &a));
        assert_eq!(slots.back_buffer_layers.len(), 1);
    }

    #[test]
    #[should_panic(expected = "back buffer pool is empty at swap time")]
    fn test_swap_with_empty_pool_panics() {
        let mut slots = TargetSlots {
            actual_target: RenderTarget::shared(8, 8),
            back_buffer_layers: VecDeque::new(),
        };
        slots.swap_front();
    }
}
