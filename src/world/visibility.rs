//! Visibility and space classification interface

use serde::{Deserialize, Serialize};

use crate::core::types::Point;

/// Space-type tags at a point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceTypeFlags {
    pub navigable: bool,
    pub journey: bool,
    pub pause: bool,
    pub private: bool,
    pub public: bool,
    pub semi_private: bool,
    pub outside: bool,
    pub undercover: bool,
}

impl SpaceTypeFlags {
    /// Tags present in either set
    pub fn union(self, other: SpaceTypeFlags) -> SpaceTypeFlags {
        SpaceTypeFlags {
            navigable: self.navigable || other.navigable,
            journey: self.journey || other.journey,
            pause: self.pause || other.pause,
            private: self.private || other.private,
            public: self.public || other.public,
            semi_private: self.semi_private || other.semi_private,
            outside: self.outside || other.outside,
            undercover: self.undercover || other.undercover,
        }
    }
}

/// Point classification and line-of-sight queries
pub trait VisibilityClassifier: Send + Sync {
    /// Is the straight segment between two points unobstructed?
    fn line_of_sight(&self, a: Point, b: Point) -> bool;

    fn space_type_at(&self, point: Point) -> SpaceTypeFlags;

    /// Nearest precomputed pause-space attractor, if any
    fn nearest_pause_space(&self, point: Point) -> Option<Point>;
}

/// Open floor with no walls, tags or pause spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFloor;

impl VisibilityClassifier for OpenFloor {
    fn line_of_sight(&self, _a: Point, _b: Point) -> bool {
        true
    }

    fn space_type_at(&self, _point: Point) -> SpaceTypeFlags {
        SpaceTypeFlags {
            navigable: true,
            ..SpaceTypeFlags::default()
        }
    }

    fn nearest_pause_space(&self, _point: Point) -> Option<Point> {
        None
    }
}
