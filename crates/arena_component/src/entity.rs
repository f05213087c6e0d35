//! Object ids.
//!
//! Components name other objects (targets, hit lists, sweep exclusions) by
//! [`Entity`] only. The world hands ids out from an [`EntityAllocator`] when
//! an object is inserted; an id is never handed out twice by one allocator,
//! so a stale id simply stops resolving once its object is gone.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u64);

impl Entity {
    /// Carried by objects that no world has adopted yet.
    pub const UNBOUND: Entity = Entity(0);

    /// Wraps a raw id, mostly for tests and logs.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The underlying counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `false` only for [`Entity::UNBOUND`].
    #[must_use]
    pub const fn is_bound(self) -> bool {
        self.0 != Self::UNBOUND.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bound() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#unbound")
        }
    }
}

/// Hands out ids counting up from 1.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    issued: u64,
}

impl EntityAllocator {
    /// Allocator whose first id is `#1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id; never repeats.
    pub fn allocate(&mut self) -> Entity {
        self.issued += 1;
        Entity(self.issued)
    }

    /// How many ids this allocator has handed out.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_is_zero() {
        assert!(!Entity::UNBOUND.is_bound());
        assert_eq!(Entity::UNBOUND.to_string(), "#unbound");
        assert_eq!(Entity::from_raw(0), Entity::UNBOUND);
    }

    #[test]
    fn test_allocator_never_repeats() {
        let mut ids = EntityAllocator::new();
        let first = ids.allocate();
        let second = ids.allocate();
        assert_eq!(first.raw(), 1);
        assert_eq!(second.to_string(), "#2");
        assert!(first.is_bound() && second.is_bound());
        assert_eq!(ids.issued(), 2);
    }
}
