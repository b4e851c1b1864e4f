//! Graph topology analysis using CSR format.
//!
//! [`GraphTopology`] snapshots a genome's connection genes into Compressed
//! Sparse Row buffers for ordering and reachability queries.
//!
//! ## Disabled connections
//!
//! Unlike evaluation, structure checks use every gene. A disabled connection
//! still constrains the order and still blocks edges that would close a cycle,
//! so that re-enabling it in a descendant can never break the graph.
//!
//! ## Determinism
//!
//! Kahn's algorithm always releases the lowest ready node index first, so the
//! emitted program is stable regardless of gene order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet, VecDeque};

use crate::genome::ShaderGenome;

/// CSR-format snapshot of every connection of a genome.
#[derive(Debug, Clone)]
pub struct GraphTopology {
    /// Number of nodes owned by the genome.
    node_count: usize,
    /// CSR offsets for forward edges. Length = node_count + 1.
    fwd_offsets: Vec<usize>,
    /// fwd_targets[fwd_offsets[i]..fwd_offsets[i+1]] are successors of node i.
    fwd_targets: Vec<usize>,
    /// Number of incoming edges per node, parallel edges counted separately.
    in_degree: Vec<usize>,
    /// Edges with an endpoint outside the node list, kept out of the CSR buffers.
    dangling: Vec<(usize, usize)>,
}

impl GraphTopology {
    /// Build topology from all of a genome's connections, enabled or not.
    #[must_use]
    pub fn from_genome(genome: &ShaderGenome) -> Self {
        let node_count = genome.nodes.len();
        let (owned, dangling): (Vec<(usize, usize)>, Vec<(usize, usize)>) = genome
            .connections
            .iter()
            .map(|c| (c.source, c.target))
            .partition(|&(source, target)| source < node_count && target < node_count);

        let mut fwd_counts = vec![0usize; node_count];
        let mut in_degree = vec![0usize; node_count];
        for &(source, target) in &owned {
            fwd_counts[source] += 1;
            in_degree[target] += 1;
        }

        let mut fwd_offsets = Vec::with_capacity(node_count + 1);
        let mut total = 0;
        fwd_offsets.push(0);
        for &count in &fwd_counts {
            total += count;
            fwd_offsets.push(total);
        }

        let mut fwd_targets = vec![0usize; total];
        let mut fwd_write_pos = fwd_offsets[..node_count].to_vec();
        for &(source, target) in &owned {
            fwd_targets[fwd_write_pos[source]] = target;
            fwd_write_pos[source] += 1;
        }

        Self {
            node_count,
            fwd_offsets,
            fwd_targets,
            in_degree,
            dangling,
        }
    }

    /// Number of nodes owned by the genome.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Whether some gene references a node outside the genome's node list.
    #[inline]
    #[must_use]
    pub fn has_dangling_edges(&self) -> bool {
        !self.dangling.is_empty()
    }

    /// Iterate over successors of a node (forward edges), dangling ones included.
    pub fn successors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let (start, end) = if idx < self.node_count {
            (self.fwd_offsets[idx], self.fwd_offsets[idx + 1])
        } else {
            (0, 0)
        };
        self.fwd_targets[start..end].iter().copied().chain(
            self.dangling
                .iter()
                .filter(move |&&(source, _)| source == idx)
                .map(|&(_, target)| target),
        )
    }

    /// Whether a path of at least one edge leads from `from` to `to`.
    #[must_use]
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(from);
        visited.insert(from);

        while let Some(current) = queue.pop_front() {
            for succ in self.successors(current) {
                if succ == to {
                    return true;
                }
                if visited.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }

        false
    }

    /// Node indices in topological order, lowest ready index first.
    ///
    /// Returns None if the graph has cycles or dangling edges.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        if self.has_dangling_edges() {
            return None;
        }

        let mut in_degree = self.in_degree.clone();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(self.node_count);
        while let Some(Reverse(u)) = ready.pop() {
            order.push(u);
            let (start, end) = (self.fwd_offsets[u], self.fwd_offsets[u + 1]);
            for &v in &self.fwd_targets[start..end] {
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    ready.push(Reverse(v));
                }
            }
        }

        if order.len() != self.node_count {
            None
        } else {
            Some(order)
        }
    }

    /// Detect if the graph contains any cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        !self.has_dangling_edges() && self.topological_order().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::ConnectionGene;
    use crate::node::Node;

    fn chain() -> ShaderGenome {
        let mut genome = ShaderGenome::new();
        genome.add_node(Node::output("float"));
        genome.add_node(Node::input("uTime", "float"));
        genome.add_node(Node::function_call("sin", "float", ["float"]));
        genome.add_connection(ConnectionGene::new(1, 1, 2, 0, 1.0));
        genome.add_connection(ConnectionGene::new(2, 2, 0, 0, 1.0));
        genome
    }

    #[test]
    fn test_topology_basic() {
        let topo = GraphTopology::from_genome(&chain());
        assert_eq!(topo.node_count(), 3);
        assert!(!topo.has_cycle());
        assert!(!topo.has_dangling_edges());
        assert_eq!(topo.successors(1).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_topological_order() {
        let topo = GraphTopology::from_genome(&chain());
        assert_eq!(topo.topological_order(), Some(vec![1, 2, 0]));
    }

    #[test]
    fn test_ties_resolve_by_ascending_index() {
        let mut genome = ShaderGenome::new();
        for _ in 0..4 {
            genome.add_node(Node::input("1.0", "float"));
        }
        genome.add_connection(ConnectionGene::new(1, 3, 0, 0, 1.0));

        let topo = GraphTopology::from_genome(&genome);
        assert_eq!(topo.topological_order(), Some(vec![1, 2, 3, 0]));
    }

    #[test]
    fn test_disabled_edges_still_form_cycles() {
        let mut genome = chain();
        let mut back = ConnectionGene::new(3, 0, 1, 0, 1.0);
        back.enabled = false;
        genome.add_connection(back);

        let topo = GraphTopology::from_genome(&genome);
        assert!(topo.has_cycle());
        assert!(topo.topological_order().is_none());
        assert!(topo.reaches(0, 2));
    }

    #[test]
    fn test_dangling_edges_have_no_order() {
        let mut genome = chain();
        genome.add_connection(ConnectionGene::new(3, 2, 9, 0, 1.0));

        let topo = GraphTopology::from_genome(&genome);
        assert!(topo.has_dangling_edges());
        assert!(topo.topological_order().is_none());
        assert!(topo.reaches(1, 9));
        assert_eq!(topo.successors(2).collect::<Vec<_>>(), vec![0, 9]);
    }

    #[test]
    fn test_extreme_endpoint_stays_out_of_buffers() {
        let mut genome = chain();
        genome.add_connection(ConnectionGene::new(3, 1, usize::MAX, 0, 1.0));
        genome.add_connection(ConnectionGene::new(4, usize::MAX, 2, 0, 1.0));

        let topo = GraphTopology::from_genome(&genome);
        assert!(topo.has_dangling_edges());
        assert!(!topo.has_cycle());
        assert!(topo.topological_order().is_none());
        assert!(topo.reaches(1, usize::MAX));
        assert!(topo.reaches(usize::MAX, 0));
        assert!(!topo.reaches(0, usize::MAX));
    }
}
