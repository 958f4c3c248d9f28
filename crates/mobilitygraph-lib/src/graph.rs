use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::{EntityStore, Stop, StopId};
use crate::distance::{travel_minutes, Coordinates};
use crate::mode::{Mode, ModeFilter, WeightMetric};
use crate::spatial::{GridIndex, DEFAULT_CELL_DEGREES};

/// Position of a node inside a [`Graph`].
pub type NodeIndex = usize;

/// Label attached to proximity edges.
pub const PROXIMITY_LINE: &str = "TransJakarta";

/// Tunables for graph construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphBuildOptions {
    pub mrt_speed_kmh: f64,
    pub lrt_speed_kmh: f64,
    pub transjakarta_speed_kmh: f64,
    /// Grid cell size in degrees used to find proximity candidates.
    pub proximity_cell_degrees: f64,
    /// Maximum planar distance for a proximity edge.
    pub proximity_radius_km: f64,
    /// Maximum proximity edges created from each surface stop.
    pub proximity_max_neighbours: usize,
    /// Maximum great-circle distance between stops linked by a transfer.
    pub transfer_radius_km: f64,
    /// Minutes added to every transfer edge.
    pub transfer_penalty_minutes: f64,
    /// Approximate rupiah per kilometre on rail edges, before fare allocation.
    pub rail_cost_per_km: f64,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            mrt_speed_kmh: 40.0,
            lrt_speed_kmh: 35.0,
            transjakarta_speed_kmh: 20.0,
            proximity_cell_degrees: DEFAULT_CELL_DEGREES,
            proximity_radius_km: 1.5,
            proximity_max_neighbours: 3,
            transfer_radius_km: 0.5,
            transfer_penalty_minutes: 5.0,
            rail_cost_per_km: 1000.0,
        }
    }
}

impl GraphBuildOptions {
    /// Average speed of `mode`; non-transit modes use the surface speed.
    pub fn speed_kmh(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Mrt => self.mrt_speed_kmh,
            Mode::Lrt => self.lrt_speed_kmh,
            _ => self.transjakarta_speed_kmh,
        }
    }

    /// Distance, time and pre-fare cost for travelling `distance_km` on `mode`.
    fn weights(&self, distance_km: f64, mode: Mode, penalty_minutes: f64) -> EdgeWeights {
        let time = travel_minutes(distance_km, self.speed_kmh(mode)) + penalty_minutes;
        let cost = if mode.is_rail() {
            // Truncation toward zero; saturates on overflow.
            (distance_km * self.rail_cost_per_km) as u32
        } else {
            0
        };
        EdgeWeights {
            distance_km: round_to(distance_km, 3),
            time_minutes: round_to(time, 2),
            cost_idr: cost,
        }
    }
}

/// How an edge came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeKind {
    /// Consecutive stops of a declared route.
    Route,
    /// Nearby surface stops.
    Proximity,
    /// Stops of different modes close enough to change between.
    Transfer { from: Mode, to: Mode },
}

/// Directed edge of the routing graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    pub mode: Mode,
    pub line: String,
    pub distance_km: f64,
    pub time_minutes: f64,
    /// Approximate cost used only as a search weight; real fares are
    /// allocated per run after routing.
    pub cost_idr: u32,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn is_transfer(&self) -> bool {
        matches!(self.kind, EdgeKind::Transfer { .. })
    }

    /// Value of this edge under `metric`.
    pub fn weight(&self, metric: WeightMetric) -> f64 {
        match metric {
            WeightMetric::Time => self.time_minutes,
            WeightMetric::Distance => self.distance_km,
            WeightMetric::Cost => f64::from(self.cost_idr),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EdgeWeights {
    distance_km: f64,
    time_minutes: f64,
    cost_idr: u32,
}

/// Stop found by a nearest-stop query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestStop {
    #[serde(flatten)]
    pub stop: Stop,
    pub distance_km: f64,
}

/// Aggregate graph counts for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub route_edges: usize,
    pub proximity_edges: usize,
    pub transfer_edges: usize,
    pub nodes_by_mode: BTreeMap<String, usize>,
}

/// Immutable directed routing graph.
///
/// Node storage and adjacency live behind `Arc`, so clones are cheap and a
/// single graph can serve concurrent readers. At most one edge exists per
/// ordered node pair.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Arc<Vec<Stop>>,
    index: Arc<HashMap<StopId, NodeIndex>>,
    adjacency: Arc<Vec<Vec<Edge>>>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stops in node order.
    pub fn nodes(&self) -> &[Stop] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Stop> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.index_of(id).and_then(|index| self.node(index))
    }

    /// Outgoing edges of a node.
    pub fn neighbours(&self, node: NodeIndex) -> &[Edge] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn edge(&self, from: NodeIndex, to: NodeIndex) -> Option<&Edge> {
        self.neighbours(from).iter().find(|edge| edge.target == to)
    }

    /// Subgraph of the nodes and edges belonging to one mode.
    ///
    /// [`ModeFilter::All`] returns a cheap clone of the full graph.
    pub fn filtered(&self, filter: ModeFilter) -> Graph {
        let ModeFilter::Only(mode) = filter else {
            return self.clone();
        };

        let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut nodes = Vec::new();
        for (old, stop) in self.nodes.iter().enumerate() {
            if stop.mode == mode {
                remap.insert(old, nodes.len());
                nodes.push(stop.clone());
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (old, edges) in self.adjacency.iter().enumerate() {
            let Some(&new_from) = remap.get(&old) else {
                continue;
            };
            for edge in edges {
                if edge.mode != mode {
                    continue;
                }
                if let Some(&new_target) = remap.get(&edge.target) {
                    adjacency[new_from].push(Edge {
                        target: new_target,
                        ..edge.clone()
                    });
                }
            }
        }

        let graph = Graph::from_parts(nodes, adjacency);
        debug!(
            filter = %filter,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built filtered graph"
        );
        graph
    }

    /// Closest stop passing `filter`, by great-circle distance.
    pub fn nearest_stop(&self, position: Coordinates, filter: ModeFilter) -> Option<NearestStop> {
        self.nearest_stops(position, filter, 1).into_iter().next()
    }

    /// Up to `limit` stops passing `filter`, closest first.
    pub fn nearest_stops(
        &self,
        position: Coordinates,
        filter: ModeFilter,
        limit: usize,
    ) -> Vec<NearestStop> {
        let mut scored: Vec<(f64, NodeIndex)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, stop)| filter.allows(stop.mode))
            .map(|(index, stop)| (position.distance_km(&stop.position), index))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        scored
            .into_iter()
            .take(limit)
            .map(|(distance, index)| NearestStop {
                stop: self.nodes[index].clone(),
                distance_km: round_to(distance, 3),
            })
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let mut route_edges = 0;
        let mut proximity_edges = 0;
        let mut transfer_edges = 0;
        for edge in self.adjacency.iter().flatten() {
            match edge.kind {
                EdgeKind::Route => route_edges += 1,
                EdgeKind::Proximity => proximity_edges += 1,
                EdgeKind::Transfer { .. } => transfer_edges += 1,
            }
        }

        let mut nodes_by_mode = BTreeMap::new();
        for stop in self.nodes.iter() {
            *nodes_by_mode.entry(stop.mode.code().to_string()).or_insert(0) += 1;
        }

        GraphStats {
            nodes: self.node_count(),
            edges: route_edges + proximity_edges + transfer_edges,
            route_edges,
            proximity_edges,
            transfer_edges,
            nodes_by_mode,
        }
    }

    fn from_parts(nodes: Vec<Stop>, adjacency: Vec<Vec<Edge>>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, stop)| (stop.id.clone(), position))
            .collect();
        Self {
            nodes: Arc::new(nodes),
            index: Arc::new(index),
            adjacency: Arc::new(adjacency),
        }
    }
}

/// Mutable adjacency used while building.
struct GraphBuilder<'a> {
    options: &'a GraphBuildOptions,
    nodes: Vec<Stop>,
    index: HashMap<StopId, NodeIndex>,
    adjacency: Vec<Vec<Edge>>,
}

impl<'a> GraphBuilder<'a> {
    fn new(store: &EntityStore, options: &'a GraphBuildOptions) -> Self {
        let nodes: Vec<Stop> = store.stops().to_vec();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, stop)| (stop.id.clone(), position))
            .collect();
        let adjacency = vec![Vec::new(); nodes.len()];
        Self {
            options,
            nodes,
            index,
            adjacency,
        }
    }

    /// Insert `edge` from `from`, replacing any edge already joining the pair.
    fn insert(&mut self, from: NodeIndex, edge: Edge) {
        let edges = &mut self.adjacency[from];
        match edges.iter_mut().find(|existing| existing.target == edge.target) {
            Some(existing) => *existing = edge,
            None => edges.push(edge),
        }
    }

    fn add_route_edges(&mut self, store: &EntityStore) -> usize {
        let mut added = 0;
        let mut missing = 0;
        for route in store.list_routes() {
            let stops: Vec<NodeIndex> = route
                .stop_ids
                .iter()
                .filter_map(|id| {
                    let found = self.index.get(id).copied();
                    if found.is_none() {
                        missing += 1;
                    }
                    found
                })
                .collect();
            let Some(&first) = stops.first() else {
                continue;
            };
            let mode = route_mode(&route.id, self.nodes[first].mode);

            for pair in stops.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if a == b {
                    continue;
                }
                let distance = self.nodes[a]
                    .position
                    .distance_km(&self.nodes[b].position);
                let weights = self.options.weights(distance, mode, 0.0);
                self.insert(a, make_edge(b, mode, &route.name, weights, EdgeKind::Route));
                self.insert(b, make_edge(a, mode, &route.name, weights, EdgeKind::Route));
                added += 2;
            }
        }
        if missing > 0 {
            warn!(missing, "route stop references not present in the stop set");
        }
        added
    }

    fn add_proximity_edges(&mut self) -> usize {
        let surface: Vec<NodeIndex> = (0..self.nodes.len())
            .filter(|&index| self.nodes[index].mode == Mode::TransJakarta)
            .collect();
        if surface.is_empty() {
            return 0;
        }

        let grid = GridIndex::build(
            self.options.proximity_cell_degrees,
            surface
                .iter()
                .map(|&index| (index, self.nodes[index].position)),
        );

        let mut added = 0;
        for &from in &surface {
            let origin = self.nodes[from].position;
            let mut nearby: Vec<(f64, NodeIndex)> = grid
                .candidates(origin)
                .into_iter()
                .filter(|&to| self.nodes[to].id != self.nodes[from].id)
                .map(|to| (origin.approx_planar_km(&self.nodes[to].position), to))
                .filter(|(distance, _)| *distance <= self.options.proximity_radius_km)
                .collect();
            nearby.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            nearby.truncate(self.options.proximity_max_neighbours);

            for (distance, to) in nearby {
                let weights = self.options.weights(distance, Mode::TransJakarta, 0.0);
                self.insert(
                    from,
                    make_edge(
                        to,
                        Mode::TransJakarta,
                        PROXIMITY_LINE,
                        weights,
                        EdgeKind::Proximity,
                    ),
                );
                added += 1;
            }
        }
        added
    }

    // All-pairs scan; fine for city-sized stop sets.
    fn add_transfer_edges(&mut self) -> usize {
        let mut added = 0;
        let penalty = self.options.transfer_penalty_minutes;
        for a in 0..self.nodes.len() {
            for b in (a + 1)..self.nodes.len() {
                let (mode_a, mode_b) = (self.nodes[a].mode, self.nodes[b].mode);
                if mode_a == mode_b {
                    continue;
                }
                let distance = self.nodes[a]
                    .position
                    .distance_km(&self.nodes[b].position);
                if distance > self.options.transfer_radius_km {
                    continue;
                }

                let forward = self.options.weights(distance, mode_b, penalty);
                self.insert(
                    a,
                    make_edge(
                        b,
                        Mode::Transfer,
                        &transfer_line(mode_a, mode_b),
                        forward,
                        EdgeKind::Transfer {
                            from: mode_a,
                            to: mode_b,
                        },
                    ),
                );
                let reverse = self.options.weights(distance, mode_a, penalty);
                self.insert(
                    b,
                    make_edge(
                        a,
                        Mode::Transfer,
                        &transfer_line(mode_b, mode_a),
                        reverse,
                        EdgeKind::Transfer {
                            from: mode_b,
                            to: mode_a,
                        },
                    ),
                );
                added += 2;
            }
        }
        added
    }

    fn finish(self) -> Graph {
        Graph::from_parts(self.nodes, self.adjacency)
    }
}

/// Build the full multi-modal routing graph with default options.
pub fn build_graph(store: &EntityStore) -> Graph {
    build_graph_with(store, &GraphBuildOptions::default())
}

/// Build the routing graph: route edges first, then proximity edges, then
/// transfers. A later edge between the same ordered pair replaces an earlier
/// one.
pub fn build_graph_with(store: &EntityStore, options: &GraphBuildOptions) -> Graph {
    let mut builder = GraphBuilder::new(store, options);
    let route_edges = builder.add_route_edges(store);
    let proximity_edges = builder.add_proximity_edges();
    let transfer_edges = builder.add_transfer_edges();
    debug!(
        route_edges,
        proximity_edges, transfer_edges, "edge synthesis complete"
    );

    let graph = builder.finish();
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "routing graph built"
    );
    graph
}

/// Mode of a route: from its id markers, else from its first stop.
fn route_mode(route_id: &str, first_stop_mode: Mode) -> Mode {
    match Mode::from_stop_id(route_id) {
        Mode::TransJakarta => first_stop_mode,
        rail => rail,
    }
}

fn transfer_line(from: Mode, to: Mode) -> String {
    format!("Transfer {}-{}", from.code(), to.code())
}

fn make_edge(target: NodeIndex, mode: Mode, line: &str, weights: EdgeWeights, kind: EdgeKind) -> Edge {
    Edge {
        target,
        mode,
        line: line.to_string(),
        distance_km: weights.distance_km,
        time_minutes: weights.time_minutes,
        cost_idr: weights.cost_idr,
        kind,
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
