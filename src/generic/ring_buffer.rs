//! A bounded buffer which forgets the oldest element when full.

use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    elements: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        RingBuffer {
            elements: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Pushes `element`, dropping the oldest element if the buffer is at capacity.
    pub fn push(&mut self, element: T) {
        if self.capacity == 0 {
            return;
        }
        if self.elements.len() == self.capacity {
            self.elements.pop_front();
        }
        self.elements.push_back(element);
    }

    /// Elements, from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear()
    }
}
