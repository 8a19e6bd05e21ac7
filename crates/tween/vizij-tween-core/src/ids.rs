//! Identifiers for channels, curves, and keys, plus a simple allocator.

use serde::{Deserialize, Serialize};

/// Logical channel (one animated scalar property) as seen by the selection source.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChannelId(pub u32);

/// Host-side curve resolved from a [`ChannelId`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CurveId(pub u32);

/// Opaque host key identifier. Only meaningful to the host that produced it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyHandle(pub u64);

/// Monotonic allocator for CurveId and KeyHandle.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_curve: u32,
    next_key: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_curve(&mut self) -> CurveId {
        let id = CurveId(self.next_curve);
        self.next_curve = self.next_curve.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_key(&mut self) -> KeyHandle {
        let id = KeyHandle(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
