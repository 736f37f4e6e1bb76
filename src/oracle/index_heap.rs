/*!
A max heap on some subset of elements with fixed indices.

Values are stored by index, and an index may be *active* (on the heap) or not.
Values of inactive indices are kept, so an index may leave the heap and return with the same value.

The oracle stores the activity of each atom in an index heap, and takes the most active atom without a value when deciding.
Atoms leave the heap when popped, and return when their value is dropped on a backjump.

```rust
# use undertaker::oracle::index_heap::IndexHeap;
let mut heap = IndexHeap::default();
heap.add(6, 1.0);
heap.add(0, 7.0);
heap.activate(6);
heap.activate(0);

assert_eq!(heap.pop_max(), Some(0));
assert_eq!(heap.pop_max(), Some(6));
assert!(heap.pop_max().is_none());
```
*/

pub struct IndexHeap<V: PartialOrd + Default + Clone> {
    values: Vec<V>,
    position: Vec<Option<usize>>,
    heap: Vec<usize>,
}

impl<V: PartialOrd + Default + Clone> Default for IndexHeap<V> {
    fn default() -> Self {
        IndexHeap {
            values: Vec::default(),
            position: Vec::default(),
            heap: Vec::default(),
        }
    }
}

impl<V: PartialOrd + Default + Clone> IndexHeap<V> {
    /// Sets the value at `index`, growing the structure if required.
    /// Returns true if `index` was fresh.
    ///
    /// Note, this does not activate `index`.
    pub fn add(&mut self, index: usize, value: V) -> bool {
        let fresh = self.values.len() <= index;
        if fresh {
            self.values.resize(index + 1, V::default());
            self.position.resize(index + 1, None);
        }
        self.revalue(index, value);
        fresh
    }

    /// Places `index` on the heap, if not already present.
    pub fn activate(&mut self, index: usize) -> bool {
        match self.position.get(index) {
            Some(None) => {
                let at = self.heap.len();
                self.heap.push(index);
                self.position[index] = Some(at);
                self.sift_up(at);
                true
            }
            _ => false,
        }
    }

    /// Removes `index` from the heap, if present.
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(Some(at)) = self.position.get(index).copied() else {
            return false;
        };
        let last = self.heap.len() - 1;
        self.swap(at, last);
        self.heap.pop();
        self.position[index] = None;
        if at < self.heap.len() {
            self.sift_down(at);
            self.sift_up(at);
        }
        true
    }

    pub fn pop_max(&mut self) -> Option<usize> {
        let max = *self.heap.first()?;
        self.remove(max);
        Some(max)
    }

    pub fn value_at(&self, index: usize) -> &V {
        &self.values[index]
    }

    /// Applies `f` to the value at `index`, and restores the heap.
    pub fn apply_to_index(&mut self, index: usize, f: impl Fn(&V) -> V) {
        let value = f(&self.values[index]);
        self.revalue(index, value);
    }

    /// Applies `f` to every value.
    /// `f` should preserve order, as the heap is not restored.
    pub fn apply_to_all(&mut self, f: impl Fn(&V) -> V) {
        for value in self.values.iter_mut() {
            *value = f(value);
        }
    }

    pub fn revalue(&mut self, index: usize, value: V) {
        self.values[index] = value;
        if let Some(at) = self.position[index] {
            self.sift_up(at);
            self.sift_down(at);
        }
    }

    /// A count of indices on the heap.
    pub fn count(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn greater(&self, a: usize, b: usize) -> bool {
        self.values[self.heap[a]] > self.values[self.heap[b]]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = Some(a);
        self.position[self.heap[b]] = Some(b);
    }

    fn sift_up(&mut self, mut at: usize) {
        while at > 0 {
            let parent = (at - 1) / 2;
            if !self.greater(at, parent) {
                break;
            }
            self.swap(at, parent);
            at = parent;
        }
    }

    fn sift_down(&mut self, mut at: usize) {
        loop {
            let (left, right) = (2 * at + 1, 2 * at + 2);
            let mut largest = at;
            if left < self.heap.len() && self.greater(left, largest) {
                largest = left;
            }
            if right < self.heap.len() && self.greater(right, largest) {
                largest = right;
            }
            if largest == at {
                break;
            }
            self.swap(at, largest);
            at = largest;
        }
    }
}
