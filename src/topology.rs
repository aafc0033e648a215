// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The electrical topology of a [`ComponentState`]: which nodes are connected
//! through energized lines, and which appliances hang off each node.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use tracing::debug;

use crate::component::{Component, ComponentType};
use crate::grouped_index::{zip_groups, DenseGroupIndex, GroupedIndex, SparseGroupIndex};
use crate::state::ComponentState;
use crate::types::Id;
use crate::Error;

/// The appliances connected to a single node.
///
/// Appliances are given by their positions in the component state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeAppliances<'a> {
    pub node: usize,
    pub loads: &'a [usize],
    pub sources: &'a [usize],
}

/// A snapshot of the network topology.
///
/// Nodes, loads and sources are referred to by their positions in the
/// component state.  The topology is never updated in place: when connection
/// statuses change, a new one is built.
#[derive(Clone, Debug)]
pub struct Topology {
    /// Node ids as weights, energized line ids as edge weights.  Node indices
    /// are node positions.
    graph: UnGraph<Id, Id>,
    nodes_per_island: DenseGroupIndex,
    /// Node positions, sorted by island.
    node_order: Vec<usize>,
    /// The index of every node position in `node_order`.
    node_rank: Vec<usize>,
    loads_per_node: SparseGroupIndex,
    load_order: Vec<usize>,
    sources_per_node: SparseGroupIndex,
    source_order: Vec<usize>,
    energized: Vec<bool>,
}

/// `Topology` instantiation.
impl Topology {
    /// Builds the topology of the components in `state`.
    ///
    /// Returns an error if a line or an appliance refers to a node that doesn't
    /// exist.
    pub fn build(state: &ComponentState) -> Result<Self, Error> {
        let graph = Self::create_graph(state)?;
        let (island_of, island_count) = Self::find_islands(&graph);

        let mut node_order: Vec<usize> = (0..graph.node_count()).collect();
        node_order.sort_by_key(|&pos| island_of[pos]);
        let mut node_rank = vec![0; node_order.len()];
        for (rank, &pos) in node_order.iter().enumerate() {
            node_rank[pos] = rank;
        }
        let nodes_per_island = DenseGroupIndex::new(
            node_order.iter().map(|&pos| island_of[pos]).collect(),
            island_count,
        );

        let load_nodes = Self::appliance_nodes(state, ComponentType::SymLoad)?;
        let source_nodes = Self::appliance_nodes(state, ComponentType::Source)?;
        let (loads_per_node, load_order) =
            Self::group_by_node(&load_nodes, graph.node_count());
        let (sources_per_node, source_order) =
            Self::group_by_node(&source_nodes, graph.node_count());

        let mut energized = vec![false; island_count];
        for (component, &node) in state.components(ComponentType::Source).zip(&source_nodes) {
            if matches!(component, Component::Source(source) if source.status) {
                energized[island_of[node]] = true;
            }
        }

        debug!(
            "Built topology with {} nodes, {} energized lines and {island_count} islands.",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            graph,
            nodes_per_island,
            node_order,
            node_rank,
            loads_per_node,
            load_order,
            sources_per_node,
            source_order,
            energized,
        })
    }

    fn create_graph(state: &ComponentState) -> Result<UnGraph<Id, Id>, Error> {
        let mut graph = UnGraph::with_capacity(
            state.count(ComponentType::Node),
            state.count(ComponentType::Line),
        );
        for node in state.components(ComponentType::Node) {
            graph.add_node(node.id());
        }

        for component in state.components(ComponentType::Line) {
            let Component::Line(line) = component else {
                continue;
            };
            let from = state.location_of_type(ComponentType::Node, line.from_node)?;
            let to = state.location_of_type(ComponentType::Node, line.to_node)?;
            if line.is_energized() {
                graph.add_edge(NodeIndex::new(from.pos), NodeIndex::new(to.pos), line.id);
            }
        }

        Ok(graph)
    }

    /// Returns the island of every node, and the number of islands.
    ///
    /// Islands are numbered in the order of their first node.
    fn find_islands(graph: &UnGraph<Id, Id>) -> (Vec<usize>, usize) {
        let mut island_of = vec![usize::MAX; graph.node_count()];
        let mut island_count = 0;

        for start in graph.node_indices() {
            if island_of[start.index()] != usize::MAX {
                continue;
            }
            let mut bfs = Bfs::new(graph, start);
            while let Some(index) = bfs.next(graph) {
                island_of[index.index()] = island_count;
            }
            island_count += 1;
        }

        (island_of, island_count)
    }

    /// Returns the node position of every appliance of the given type.
    fn appliance_nodes(
        state: &ComponentState,
        component_type: ComponentType,
    ) -> Result<Vec<usize>, Error> {
        state
            .components(component_type)
            .map(|component| -> Result<usize, Error> {
                let node = match component {
                    Component::SymLoad(load) => load.node,
                    Component::Source(source) => source.node,
                    _ => {
                        return Err(Error::internal(format!(
                            "{} is not an appliance.",
                            component.component_type()
                        )))
                    }
                };
                Ok(state.location_of_type(ComponentType::Node, node)?.pos)
            })
            .collect()
    }

    /// Groups appliance positions by their node.
    fn group_by_node(nodes: &[usize], node_count: usize) -> (SparseGroupIndex, Vec<usize>) {
        let mut counts = vec![0; node_count];
        for &node in nodes {
            counts[node] += 1;
        }
        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by_key(|&pos| nodes[pos]);
        (SparseGroupIndex::from_counts(counts), order)
    }
}

/// `Topology` queries.
impl Topology {
    pub fn island_count(&self) -> usize {
        self.nodes_per_island.size()
    }

    /// Returns the island of the node at the given position.
    ///
    /// # Panics
    ///
    /// If there is no node at that position.
    pub fn island_of_node(&self, node: usize) -> usize {
        self.nodes_per_island.group_of(self.node_rank[node])
    }

    /// Returns the positions of the nodes in an island, in ascending order.
    pub fn nodes_in_island(&self, island: usize) -> &[usize] {
        &self.node_order[self.nodes_per_island.element_range(island)]
    }

    /// Returns the ids of the nodes in an island.
    pub fn node_ids_in_island(&self, island: usize) -> impl Iterator<Item = Id> + '_ {
        self.nodes_in_island(island)
            .iter()
            .map(|&pos| self.graph[NodeIndex::new(pos)])
    }

    /// Returns true if an island is fed by at least one connected source.
    pub fn is_energized(&self, island: usize) -> bool {
        self.energized[island]
    }

    /// Returns the ids of all lines that are connected at both ends.
    pub fn energized_lines(&self) -> impl Iterator<Item = Id> + '_ {
        self.graph.edge_weights().copied()
    }

    /// Returns the positions of the loads connected to a node.
    pub fn loads_at_node(&self, node: usize) -> &[usize] {
        &self.load_order[self.loads_per_node.element_range(node)]
    }

    /// Returns the positions of the sources connected to a node.
    pub fn sources_at_node(&self, node: usize) -> &[usize] {
        &self.source_order[self.sources_per_node.element_range(node)]
    }

    /// Returns the loads and sources of every node, in node order.
    pub fn appliances_per_node(&self) -> impl Iterator<Item = NodeAppliances<'_>> + '_ {
        zip_groups(&self.loads_per_node, &self.sources_per_node)
            .enumerate()
            .map(|(node, (loads, sources))| NodeAppliances {
                node,
                loads: &self.load_order[loads],
                sources: &self.source_order[sources],
            })
    }
}
