//! Core type definitions used throughout the codebase

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Arena index of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena index of a place in the place registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaceId(pub u32);

impl PlaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Vertical transport bank (a group of lifts sharing doors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BankId(pub u32);

impl BankId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// 3D point in building coordinates (metres, z up)
pub type Point = DVec3;

/// Distance in the floor plane, ignoring height
pub fn horizontal_distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Absolute height difference
pub fn vertical_distance(a: Point, b: Point) -> f64 {
    (a.z - b.z).abs()
}

/// Returns (a, b) as two mutable borrows of distinct slice elements
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "pair_mut requires distinct indices");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
