//! Places: named, classed locations where activities start or dwell

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{PlaceId, Point};
use crate::world::weather::Exposure;

/// Whether agents dwelling at a place remain inside the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    /// Dwelling here keeps the agent present and positioned
    #[default]
    Interior,
    /// Dwelling here means leaving the building (work, school, errands)
    Exit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    /// Semantic class used by use-case propensities ("cafe", "mailroom", ...)
    pub class: String,
    pub position: Point,
    pub exposure: Exposure,
    pub kind: PlaceKind,
    /// Intrinsic openness applied while agents stand still here
    pub openness: Option<f64>,
}

/// Arena of all places, addressable by id or name
#[derive(Debug, Clone, Default)]
pub struct PlaceRegistry {
    places: Vec<Place>,
    by_name: AHashMap<String, PlaceId>,
}

impl PlaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a place, assigning the next id
    pub fn add(
        &mut self,
        name: impl Into<String>,
        class: impl Into<String>,
        position: Point,
        exposure: Exposure,
        kind: PlaceKind,
        openness: Option<f64>,
    ) -> PlaceId {
        let id = PlaceId(self.places.len() as u32);
        let name = name.into();
        self.by_name.insert(name.clone(), id);
        self.places.push(Place {
            id,
            name,
            class: class.into(),
            position,
            exposure,
            kind,
            openness,
        });
        id
    }

    pub fn get(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<PlaceId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.places.iter()
    }

    pub fn with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Place> + 'a {
        self.places.iter().filter(move |p| p.class == class)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_assigns_sequential_ids() {
        let mut reg = PlaceRegistry::new();
        let a = reg.add("apt-1", "home", Point::ZERO, Exposure::Inside, PlaceKind::Interior, None);
        let b = reg.add("lobby", "lobby", Point::new(5.0, 0.0, 0.0), Exposure::Inside, PlaceKind::Interior, Some(0.8));
        assert_eq!(a, PlaceId(0));
        assert_eq!(b, PlaceId(1));
        assert_eq!(reg.lookup("lobby"), Some(b));
        assert_eq!(reg.get(b).and_then(|p| p.openness), Some(0.8));
        assert_eq!(reg.with_class("home").count(), 1);
        assert_eq!(reg.len(), 2);
    }
}
