//! Polygon zone classifier
//!
//! A lightweight visibility classifier for scenario files: floor-plan
//! polygons tagged with space types, wall segments that block sight, and a
//! list of pause-space attractor points. Each zone and wall applies to a
//! height band so storeys can be described independently.

use geo::{coord, Contains, Intersects, Line, LineString, Polygon};

use crate::core::error::{Result, SimError};
use crate::core::types::Point;
use crate::world::visibility::{SpaceTypeFlags, VisibilityClassifier};

#[derive(Debug, Clone)]
struct Zone {
    outline: Polygon<f64>,
    z_min: f64,
    z_max: f64,
    flags: SpaceTypeFlags,
}

#[derive(Debug, Clone)]
struct Wall {
    segment: Line<f64>,
    z_min: f64,
    z_max: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneClassifier {
    zones: Vec<Zone>,
    walls: Vec<Wall>,
    pause_spaces: Vec<Point>,
}

fn in_band(z: f64, z_min: f64, z_max: f64) -> bool {
    z >= z_min && z <= z_max
}

impl ZoneClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tagged zone from its [x, y] outline
    pub fn add_zone(&mut self, outline: &[[f64; 2]], z_min: f64, z_max: f64, flags: SpaceTypeFlags) -> Result<()> {
        if outline.len() < 3 {
            return Err(SimError::InvalidScenario(format!(
                "zone outline needs at least 3 vertices, got {}",
                outline.len()
            )));
        }
        if z_min > z_max {
            return Err(SimError::InvalidScenario(format!("zone band {}..{} is inverted", z_min, z_max)));
        }

        let ring: Vec<(f64, f64)> = outline.iter().map(|[x, y]| (*x, *y)).collect();
        self.zones.push(Zone {
            outline: Polygon::new(LineString::from(ring), vec![]),
            z_min,
            z_max,
            flags,
        });
        Ok(())
    }

    pub fn add_wall(&mut self, from: [f64; 2], to: [f64; 2], z_min: f64, z_max: f64) {
        self.walls.push(Wall {
            segment: Line::new(coord! { x: from[0], y: from[1] }, coord! { x: to[0], y: to[1] }),
            z_min,
            z_max,
        });
    }

    pub fn add_pause_space(&mut self, point: Point) {
        self.pause_spaces.push(point);
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}

impl VisibilityClassifier for ZoneClassifier {
    fn line_of_sight(&self, a: Point, b: Point) -> bool {
        let sight = Line::new(coord! { x: a.x, y: a.y }, coord! { x: b.x, y: b.y });
        let eye = (a.z + b.z) * 0.5;
        !self
            .walls
            .iter()
            .any(|w| in_band(eye, w.z_min, w.z_max) && w.segment.intersects(&sight))
    }

    fn space_type_at(&self, point: Point) -> SpaceTypeFlags {
        let p = geo::Point::new(point.x, point.y);
        self.zones
            .iter()
            .filter(|z| in_band(point.z, z.z_min, z.z_max) && z.outline.contains(&p))
            .fold(SpaceTypeFlags::default(), |acc, z| acc.union(z.flags))
    }

    fn nearest_pause_space(&self, point: Point) -> Option<Point> {
        self.pause_spaces
            .iter()
            .map(|p| (p.distance(point), *p))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }
}
