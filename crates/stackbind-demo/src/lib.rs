//! Native demo types with build-time generated bindings
//!
//! `build.rs` renders `catalogue.json` into `OUT_DIR/bindings.rs`, which is
//! included below as [`bindings`]. Generated code names native types by
//! their catalogue paths (`demo::Math`, `demo::collections::Table<String>`),
//! so the crate root is also reachable as `demo`.

#![allow(non_snake_case)]

extern crate self as demo;

use std::ops::Add;

/// Static arithmetic helpers
pub struct Math;

impl Math {
    pub fn Add(a: i32, b: i32) -> i32 {
        a.wrapping_add(b)
    }

    pub fn Swap(a: &mut f64, b: &mut f64) {
        std::mem::swap(a, b);
    }
}

/// Two-component vector, bound as a value type
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn Length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

pub mod collections {
    use std::collections::BTreeMap;
    use std::ops::{Index, IndexMut};

    /// String-keyed table with an indexer
    #[derive(Debug, Clone, Default)]
    pub struct Table<T> {
        entries: BTreeMap<String, T>,
    }

    impl<T> Table<T> {
        /// Entry for `key`, if any
        pub fn get(&self, key: &str) -> Option<&T> {
            self.entries.get(key)
        }

        /// Number of entries
        pub fn len(&self) -> usize {
            self.entries.len()
        }

        /// Check if the table is empty
        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }

    impl<T> Index<String> for Table<T> {
        type Output = T;

        fn index(&self, key: String) -> &T {
            match self.entries.get(&key) {
                Some(value) => value,
                None => panic!("no entry for key {:?}", key),
            }
        }
    }

    impl<T: Default> IndexMut<String> for Table<T> {
        fn index_mut(&mut self, key: String) -> &mut T {
            self.entries.entry(key).or_default()
        }
    }
}

/// Trampolines generated from `catalogue.json`
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}
