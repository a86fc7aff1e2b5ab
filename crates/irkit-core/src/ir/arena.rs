//! Slot arena with tombstones
//!
//! Indices are handed out in increasing order and never reused, so an index taken
//! from a removed entry keeps pointing at a vacant slot.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    live: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn alloc(&mut self, value: T) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Some(value));
        self.live += 1;
        index
    }

    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slots.get_mut(index as usize).and_then(Option::as_mut)
    }

    pub(crate) fn contains(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    pub(crate) fn remove(&mut self, index: u32) -> Option<T> {
        let taken = self.slots.get_mut(index as usize).and_then(Option::take);
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    /// Number of live entries
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Number of indices ever handed out
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live entries in index order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }
}

impl<T> Index<u32> for Arena<T> {
    type Output = T;

    fn index(&self, index: u32) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("arena slot {} is vacant", index),
        }
    }
}

impl<T> IndexMut<u32> for Arena<T> {
    fn index_mut(&mut self, index: u32) -> &mut T {
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("arena slot {} is vacant", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_not_reused() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(arena.remove(a), Some("a"));
        let c = arena.alloc("c");

        assert_ne!(a, c);
        assert!(!arena.contains(a));
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.capacity(), 3);
    }

    #[test]
    fn test_iter_skips_vacant() {
        let mut arena = Arena::new();
        for i in 0..5 {
            arena.alloc(i);
        }
        arena.remove(1);
        arena.remove(3);
        let live: Vec<u32> = arena.iter().map(|(i, _)| i).collect();
        assert_eq!(live, vec![0, 2, 4]);
        assert_eq!(arena.remove(3), None);
    }
}
