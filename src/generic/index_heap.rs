/*!
A max heap on a subset of a fixed set of indicies.

Each index is associated with a value which persists while the index is off the heap, so the heap doubles as a store.
In the solver the indicies are variables and the values are activities: a variable without a value is *active* on the heap, and the most active variable is popped when a decision is to be made.

```rust
# use fm_sat::generic::index_heap::IndexHeap;
let mut heap = IndexHeap::default();
heap.add(6, 10);
heap.add(0, 70);

heap.activate(6);
heap.activate(0);

assert_eq!(heap.count(), 7);
assert_eq!(heap.value_at(3), &i32::default());

assert_eq!(heap.pop_max(), Some(0));
assert_eq!(heap.pop_max(), Some(6));
assert!(heap.pop_max().is_none());
```
*/

/// The index heap struct.
#[derive(Clone, Debug)]
pub struct IndexHeap<V: PartialOrd + Default> {
    /// Values, indexed by value index.
    values: Vec<V>,

    /// The position of a value index on the heap, if active.
    position: Vec<Option<usize>>,

    /// The heap of active value indicies.
    heap: Vec<usize>,
}

impl<V: PartialOrd + Default> Default for IndexHeap<V> {
    fn default() -> Self {
        IndexHeap {
            values: Vec::default(),
            position: Vec::default(),
            heap: Vec::default(),
        }
    }
}

impl<V: PartialOrd + Default> IndexHeap<V> {
    /// Index `value` with `value_index`, growing the structure as required.
    ///
    /// Returns true if `value_index` was a fresh index, false otherwise.
    /// The index is not placed on the heap until [activate](IndexHeap::activate) is called.
    pub fn add(&mut self, value_index: usize, value: V) -> bool {
        let fresh = self.values.len() <= value_index;
        while self.values.len() <= value_index {
            self.values.push(V::default());
            self.position.push(None);
        }
        self.revalue(value_index, value);
        fresh
    }

    /// Place `value_index` on the heap, if not already active.
    ///
    /// Returns true if the index was placed on the heap.
    pub fn activate(&mut self, value_index: usize) -> bool {
        match self.position.get(value_index) {
            Some(None) => {
                self.position[value_index] = Some(self.heap.len());
                self.heap.push(value_index);
                self.heapify_up(self.heap.len() - 1);
                true
            }
            _ => false,
        }
    }

    /// Remove `value_index` from the heap, if present.
    pub fn remove(&mut self, value_index: usize) -> bool {
        let Some(Some(heap_index)) = self.position.get(value_index).copied() else {
            return false;
        };

        let last = self.heap.len() - 1;
        self.swap(heap_index, last);
        self.heap.pop();
        self.position[value_index] = None;

        if heap_index < self.heap.len() {
            self.heapify_down(heap_index);
            self.heapify_up(heap_index);
        }
        true
    }

    /// Peek at the index with the maximum value on the heap.
    pub fn peek_max(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    /// Pop the index with the maximum value off the heap.
    pub fn pop_max(&mut self) -> Option<usize> {
        let max = self.peek_max()?;
        self.remove(max);
        Some(max)
    }

    /// Restore the heap invariant over all active indicies.
    pub fn heapify(&mut self) {
        for heap_index in (0..self.heap.len() / 2).rev() {
            self.heapify_down(heap_index);
        }
    }

    /// Restore the heap invariant for `value_index`, if active.
    pub fn heapify_if_active(&mut self, value_index: usize) {
        if let Some(Some(heap_index)) = self.position.get(value_index).copied() {
            self.heapify_up(heap_index);
            if let Some(Some(heap_index)) = self.position.get(value_index).copied() {
                self.heapify_down(heap_index);
            }
        }
    }

    /// The value indexed by `value_index`.
    pub fn value_at(&self, value_index: usize) -> &V {
        &self.values[value_index]
    }

    /// Apply `f` to the value at `value_index`, without restoring the heap.
    pub fn apply_to_value_at_value_index(&mut self, value_index: usize, f: impl Fn(&V) -> V) {
        self.values[value_index] = f(&self.values[value_index]);
    }

    /// Apply `f` to all (indexed) values.
    ///
    /// `f` should preserve the order of values, otherwise [heapify](IndexHeap::heapify) is required.
    pub fn apply_to_all(&mut self, f: impl Fn(&V) -> V) {
        for value in self.values.iter_mut() {
            *value = f(value)
        }
    }

    /// Set the value of `value_index` to `value`, without restoring the heap.
    pub fn revalue(&mut self, value_index: usize, value: V) {
        self.values[value_index] = value
    }

    /// A count of values indexed by the structure.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// A count of the active indicies.
    pub fn active_count(&self) -> usize {
        self.heap.len()
    }

    /// True if no index is active, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<V: PartialOrd + Default> IndexHeap<V> {
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = Some(a);
        self.position[self.heap[b]] = Some(b);
    }

    fn greater(&self, a: usize, b: usize) -> bool {
        self.values[self.heap[a]] > self.values[self.heap[b]]
    }

    fn heapify_up(&mut self, mut heap_index: usize) {
        while heap_index > 0 {
            let parent = (heap_index - 1) / 2;
            if self.greater(heap_index, parent) {
                self.swap(heap_index, parent);
                heap_index = parent;
            } else {
                break;
            }
        }
    }

    fn heapify_down(&mut self, mut heap_index: usize) {
        loop {
            let left = 2 * heap_index + 1;
            let right = left + 1;
            let mut largest = heap_index;

            if left < self.heap.len() && self.greater(left, largest) {
                largest = left;
            }
            if right < self.heap.len() && self.greater(right, largest) {
                largest = right;
            }
            if largest == heap_index {
                break;
            }
            self.swap(heap_index, largest);
            heap_index = largest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_simple() {
        let mut test_heap = IndexHeap::default();
        for (index, value) in [(6, 10), (5, 20), (4, 30), (1, 60), (0, 70)] {
            test_heap.add(index, value);
            test_heap.activate(index);
        }

        assert_eq!(test_heap.pop_max(), Some(0));
        assert_eq!(test_heap.pop_max(), Some(1));
        assert_eq!(test_heap.pop_max(), Some(4));
        assert_eq!(test_heap.pop_max(), Some(5));
        assert_eq!(test_heap.pop_max(), Some(6));
        assert!(test_heap.pop_max().is_none());
    }

    #[test]
    fn heap_revalue() {
        let mut test_heap = IndexHeap::default();
        for (index, value) in [(6, 10), (4, 30), (1, 60), (0, 70)] {
            test_heap.add(index, value);
            test_heap.activate(index);
        }

        for index in [0, 1, 4, 6] {
            test_heap.revalue(index, index as i32);
        }
        test_heap.heapify();

        assert_eq!(test_heap.pop_max(), Some(6));
        assert_eq!(test_heap.pop_max(), Some(4));
        assert_eq!(test_heap.pop_max(), Some(1));
        assert_eq!(test_heap.pop_max(), Some(0));
    }

    #[test]
    fn heap_remove_and_reactivate() {
        let mut test_heap = IndexHeap::default();
        for index in 0..10 {
            test_heap.add(index, index);
            test_heap.activate(index);
        }

        assert!(test_heap.remove(9));
        assert!(test_heap.remove(3));
        assert!(!test_heap.remove(3));
        assert_eq!(test_heap.active_count(), 8);
        assert_eq!(test_heap.peek_max(), Some(8));

        test_heap.apply_to_value_at_value_index(3, |v| v + 100);
        assert!(test_heap.activate(3));
        assert!(!test_heap.activate(3));
        assert_eq!(test_heap.pop_max(), Some(3));
        assert_eq!(test_heap.pop_max(), Some(8));
    }

    #[test]
    fn heap_bump_active() {
        let mut test_heap = IndexHeap::default();
        for index in 0..5 {
            test_heap.add(index, 1.0);
            test_heap.activate(index);
        }
        test_heap.apply_to_value_at_value_index(2, |v| v * 4.0);
        test_heap.heapify_if_active(2);
        assert_eq!(test_heap.pop_max(), Some(2));
    }
}
