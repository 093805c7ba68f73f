//! Heap-object list
//!
//! Object slots on the evaluation stack hold an index into this list. The
//! list is shared by every frame of an interpreter thread; entries are
//! released by the frame that owns the slot.

use crate::error::{VmError, VmResult};
use crate::value::NativeValue;

/// Heap-object list addressed by `ObjectReference` slots.
#[derive(Debug, Clone, Default)]
pub struct HeapObjects {
    entries: Vec<NativeValue>,
    // Parallel to `entries`; set for entries nulled by a non-top release
    released: Vec<bool>,
}

impl HeapObjects {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value and return its index
    pub fn push(&mut self, value: NativeValue) -> usize {
        self.entries.push(value);
        self.released.push(false);
        self.entries.len() - 1
    }

    /// Value at `index`
    pub fn get(&self, index: usize) -> VmResult<&NativeValue> {
        self.entries.get(index).ok_or(VmError::InvalidObject(index))
    }

    /// Replace the value at `index`
    pub fn set(&mut self, index: usize, value: NativeValue) -> VmResult<()> {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = value;
                self.released[index] = false;
                Ok(())
            }
            None => Err(VmError::InvalidObject(index)),
        }
    }

    /// Release interpreter ownership of `index`.
    ///
    /// Any entry other than the topmost is nulled in place and marked
    /// released. Releasing the topmost entry pops it together with the
    /// released entries directly below it. A `Null` pushed as a live value
    /// is never reclaimed this way.
    pub fn release(&mut self, index: usize) {
        if index + 1 == self.entries.len() {
            self.entries.pop();
            self.released.pop();
            while self.released.last() == Some(&true) {
                self.entries.pop();
                self.released.pop();
            }
        } else if let Some(entry) = self.entries.get_mut(index) {
            *entry = NativeValue::Null;
            self.released[index] = true;
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_top_pops() {
        let mut heap = HeapObjects::new();
        let a = heap.push(NativeValue::string("a"));
        let b = heap.push(NativeValue::string("b"));
        heap.release(b);
        assert_eq!(heap.len(), 1);
        heap.release(a);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_release_middle_nulls() {
        let mut heap = HeapObjects::new();
        let a = heap.push(NativeValue::I32(1));
        heap.push(NativeValue::I32(2));
        heap.release(a);
        assert_eq!(heap.len(), 2);
        assert!(heap.get(a).unwrap().is_null());
    }

    #[test]
    fn test_out_of_order_release_reclaims() {
        let mut heap = HeapObjects::new();
        let a = heap.push(NativeValue::I32(1));
        let b = heap.push(NativeValue::I32(2));
        let c = heap.push(NativeValue::I32(3));
        heap.release(a);
        heap.release(b);
        assert_eq!(heap.len(), 3);
        heap.release(c);
        assert!(heap.is_empty());

        for _ in 0..100 {
            let x = heap.push(NativeValue::I32(1));
            let y = heap.push(NativeValue::I32(2));
            heap.release(x);
            heap.release(y);
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn test_live_null_survives_reclaim() {
        let mut heap = HeapObjects::new();
        let live = heap.push(NativeValue::Null);
        let a = heap.push(NativeValue::I32(1));
        let b = heap.push(NativeValue::I32(2));
        heap.release(a);
        heap.release(b);
        assert_eq!(heap.len(), 1);
        assert!(heap.get(live).unwrap().is_null());
    }

    #[test]
    fn test_invalid_index() {
        let heap = HeapObjects::new();
        assert_eq!(heap.get(3), Err(VmError::InvalidObject(3)));
    }
}
