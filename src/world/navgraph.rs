//! Waypoint graph route provider
//!
//! A hand-authored graph of 3D waypoints joined by walkable edges. Places
//! attach to a waypoint; transport banks list their door waypoints, one per
//! served floor. Shortest paths use A* and skip intermediate waypoints whose
//! exposure is not walkable in the current weather.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::sync::Arc;

use ahash::AHashMap;

use crate::core::error::{Result, SimError};
use crate::core::types::{BankId, PlaceId, Point};
use crate::world::route::{polyline_length, Polyline, RouteProvider};
use crate::world::weather::{Exposure, WeatherCondition};

#[derive(Debug, Clone)]
pub struct Waypoint {
    pub position: Point,
    pub exposure: Exposure,
}

#[derive(Debug, Clone)]
pub struct TransportBank {
    pub id: BankId,
    pub name: String,
    /// Door waypoints, one per floor served
    pub doors: Vec<usize>,
}

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    node: usize,
    f_cost: f64, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap, node index breaks ties deterministically
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaypointGraph {
    waypoints: Vec<Waypoint>,
    adjacency: Vec<Vec<(usize, f64)>>,
    /// Indexed by PlaceId: (waypoint, class)
    places: Vec<Option<(usize, String)>>,
    banks: Vec<TransportBank>,
}

impl WaypointGraph {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        let adjacency = vec![Vec::new(); waypoints.len()];
        Self {
            waypoints,
            adjacency,
            places: Vec::new(),
            banks: Vec::new(),
        }
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.waypoints.len() {
            return Err(SimError::InvalidScenario(format!(
                "waypoint {} out of range ({} waypoints)",
                node,
                self.waypoints.len()
            )));
        }
        Ok(())
    }

    /// Join two waypoints with an undirected edge
    pub fn connect(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_node(a)?;
        self.check_node(b)?;
        let cost = self.waypoints[a].position.distance(self.waypoints[b].position);
        self.adjacency[a].push((b, cost));
        self.adjacency[b].push((a, cost));
        Ok(())
    }

    pub fn attach_place(&mut self, place: PlaceId, class: impl Into<String>, node: usize) -> Result<()> {
        self.check_node(node)?;
        if self.places.len() <= place.index() {
            self.places.resize(place.index() + 1, None);
        }
        self.places[place.index()] = Some((node, class.into()));
        Ok(())
    }

    pub fn add_bank(&mut self, name: impl Into<String>, doors: Vec<usize>) -> Result<BankId> {
        for &door in &doors {
            self.check_node(door)?;
        }
        let id = BankId(self.banks.len() as u32);
        self.banks.push(TransportBank {
            id,
            name: name.into(),
            doors,
        });
        Ok(id)
    }

    pub fn bank(&self, id: BankId) -> Option<&TransportBank> {
        self.banks.get(id.index())
    }

    fn place_node(&self, place: PlaceId) -> Option<usize> {
        self.places.get(place.index())?.as_ref().map(|(node, _)| *node)
    }

    /// Find path using A*
    ///
    /// Start and goal are always usable; intermediate waypoints must be
    /// walkable in `weather`. Returns None if no path exists.
    pub fn find_path(&self, start: usize, goal: usize, weather: WeatherCondition) -> Option<Vec<usize>> {
        if start >= self.waypoints.len() || goal >= self.waypoints.len() {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }

        let goal_pos = self.waypoints[goal].position;
        let mut open_set = BinaryHeap::new();
        let mut came_from: AHashMap<usize, usize> = AHashMap::new();
        let mut g_scores: AHashMap<usize, f64> = AHashMap::new();

        g_scores.insert(start, 0.0);
        open_set.push(PathNode {
            node: start,
            f_cost: self.waypoints[start].position.distance(goal_pos),
        });

        while let Some(current) = open_set.pop() {
            if current.node == goal {
                return Some(reconstruct_path(&came_from, current.node));
            }

            let current_g = *g_scores.get(&current.node).unwrap_or(&f64::INFINITY);

            for &(neighbor, cost) in &self.adjacency[current.node] {
                if neighbor != goal && !self.waypoints[neighbor].exposure.walkable(weather) {
                    continue;
                }

                let tentative_g = current_g + cost;
                if tentative_g < *g_scores.get(&neighbor).unwrap_or(&f64::INFINITY) {
                    came_from.insert(neighbor, current.node);
                    g_scores.insert(neighbor, tentative_g);
                    open_set.push(PathNode {
                        node: neighbor,
                        f_cost: tentative_g + self.waypoints[neighbor].position.distance(goal_pos),
                    });
                }
            }
        }

        None
    }

    fn polyline(&self, path: &[usize]) -> Polyline {
        path.iter().map(|&n| self.waypoints[n].position).collect()
    }
}

fn reconstruct_path(came_from: &AHashMap<usize, usize>, mut current: usize) -> Vec<usize> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

impl RouteProvider for WaypointGraph {
    fn route(&self, from: PlaceId, to: PlaceId, weather: WeatherCondition) -> Option<Arc<Polyline>> {
        let start = self.place_node(from)?;
        let goal = self.place_node(to)?;
        let path = self.find_path(start, goal, weather)?;
        Some(Arc::new(self.polyline(&path)))
    }

    fn route_to_nearest_transport(
        &self,
        place: PlaceId,
        bank: BankId,
        weather: WeatherCondition,
        reverse: bool,
    ) -> Option<Arc<Polyline>> {
        let start = self.place_node(place)?;
        let bank = self.bank(bank)?;

        let mut best: Option<(f64, Polyline)> = None;
        for &door in &bank.doors {
            let Some(path) = self.find_path(start, door, weather) else {
                continue;
            };
            let line = self.polyline(&path);
            let length = polyline_length(&line);
            if best.as_ref().map_or(true, |(b, _)| length < *b) {
                best = Some((length, line));
            }
        }

        best.map(|(_, mut line)| {
            if reverse {
                line.reverse();
            }
            Arc::new(line)
        })
    }

    fn places_reachable_on_foot(&self, home: PlaceId, classes: &[String]) -> BTreeMap<PlaceId, Arc<Polyline>> {
        let mut reachable = BTreeMap::new();
        for (index, entry) in self.places.iter().enumerate() {
            let Some((_, class)) = entry else {
                continue;
            };
            if !classes.iter().any(|c| c == class) {
                continue;
            }
            let place = PlaceId(index as u32);
            if let Some(route) = self.route(home, place, WeatherCondition::FAIR) {
                reachable.insert(place, route);
            }
        }
        reachable
    }

    fn transport_banks(&self) -> Vec<BankId> {
        self.banks.iter().map(|b| b.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(x: f64, y: f64, z: f64, exposure: Exposure) -> Waypoint {
        Waypoint {
            position: Point::new(x, y, z),
            exposure,
        }
    }

    /// Two routes from 0 to 3: a short one through an outdoor courtyard
    /// (node 1) and a longer indoor corridor (node 2).
    fn courtyard_graph() -> WaypointGraph {
        let mut g = WaypointGraph::new(vec![
            wp(0.0, 0.0, 0.0, Exposure::Inside),
            wp(5.0, 0.0, 0.0, Exposure::Outside),
            wp(5.0, 8.0, 0.0, Exposure::Inside),
            wp(10.0, 0.0, 0.0, Exposure::Inside),
        ]);
        g.connect(0, 1).unwrap();
        g.connect(1, 3).unwrap();
        g.connect(0, 2).unwrap();
        g.connect(2, 3).unwrap();
        g.attach_place(PlaceId(0), "home", 0).unwrap();
        g.attach_place(PlaceId(1), "cafe", 3).unwrap();
        g
    }

    #[test]
    fn test_fair_weather_takes_courtyard() {
        let g = courtyard_graph();
        let route = g.route(PlaceId(0), PlaceId(1), WeatherCondition::FAIR).unwrap();
        assert_eq!(route.len(), 3);
        assert!((polyline_length(&route) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rain_avoids_outdoor_waypoints() {
        let g = courtyard_graph();
        let route = g.route(PlaceId(0), PlaceId(1), WeatherCondition::new(false, true)).unwrap();
        assert!(route.iter().all(|p| p.y >= 0.0));
        assert!(polyline_length(&route) > 10.0);
        assert!(route.contains(&Point::new(5.0, 8.0, 0.0)));
    }

    #[test]
    fn test_unreachable_returns_none() {
        let mut g = WaypointGraph::new(vec![wp(0.0, 0.0, 0.0, Exposure::Inside), wp(1.0, 0.0, 0.0, Exposure::Inside)]);
        g.attach_place(PlaceId(0), "a", 0).unwrap();
        g.attach_place(PlaceId(1), "b", 1).unwrap();
        assert!(g.route(PlaceId(0), PlaceId(1), WeatherCondition::FAIR).is_none());
        assert!(g.route(PlaceId(0), PlaceId(9), WeatherCondition::FAIR).is_none());
    }

    #[test]
    fn test_nearest_transport_door_and_reverse() {
        let mut g = WaypointGraph::new(vec![
            wp(0.0, 0.0, 0.0, Exposure::Inside),  // place on ground floor
            wp(4.0, 0.0, 0.0, Exposure::Inside),  // ground door
            wp(4.0, 0.0, 3.0, Exposure::Inside),  // first floor door
            wp(0.0, 0.0, 3.0, Exposure::Inside),  // place on first floor
        ]);
        g.connect(0, 1).unwrap();
        g.connect(2, 3).unwrap();
        g.attach_place(PlaceId(0), "home", 0).unwrap();
        g.attach_place(PlaceId(1), "gym", 3).unwrap();
        let bank = g.add_bank("core", vec![1, 2]).unwrap();

        let out = g.route_to_nearest_transport(PlaceId(0), bank, WeatherCondition::FAIR, false).unwrap();
        assert_eq!(out.first(), Some(&Point::new(0.0, 0.0, 0.0)));
        assert_eq!(out.last(), Some(&Point::new(4.0, 0.0, 0.0)));

        let back = g.route_to_nearest_transport(PlaceId(1), bank, WeatherCondition::FAIR, true).unwrap();
        assert_eq!(back.first(), Some(&Point::new(4.0, 0.0, 3.0)));
        assert_eq!(back.last(), Some(&Point::new(0.0, 0.0, 3.0)));

        assert_eq!(g.transport_banks(), vec![bank]);
    }

    #[test]
    fn test_reachable_places_filter_by_class() {
        let g = courtyard_graph();
        let cafes = g.places_reachable_on_foot(PlaceId(0), &["cafe".to_string()]);
        assert_eq!(cafes.keys().copied().collect::<Vec<_>>(), vec![PlaceId(1)]);
        let none = g.places_reachable_on_foot(PlaceId(0), &["gym".to_string()]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_bad_indices_rejected() {
        let mut g = WaypointGraph::new(vec![wp(0.0, 0.0, 0.0, Exposure::Inside)]);
        assert!(g.connect(0, 3).is_err());
        assert!(g.attach_place(PlaceId(0), "x", 2).is_err());
        assert!(g.add_bank("b", vec![5]).is_err());
    }
}
