use core::cmp::Ordering;
use core::hash::Hash;
use std::collections::{BinaryHeap, HashMap};

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    g: f64,
    node: usize,
    seq: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap on f; among equal f the earlier push wins.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Undirected adjacency graph over opaque node identities.
///
/// Every edge is stored as both ordered pairs. Adjacency lists are kept per node and updated on
/// every insertion, so neighbour lookups never rescan the edge list.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    edges: Vec<(N, N)>,
    adjacency: Vec<Vec<usize>>,
}

impl<N> Default for Graph<N>
where
    N: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Graph<N>
where
    N: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            adjacency: Vec::new(),
        }
    }

    /// Insert `node` if absent.
    pub fn add_node(&mut self, node: N) {
        self.slot(node);
    }

    pub fn add_edge(&mut self, a: N, b: N) {
        let ia = self.slot(a);
        let ib = self.slot(b);
        self.edges.push((a, b));
        self.edges.push((b, a));
        if !self.adjacency[ia].contains(&ib) {
            self.adjacency[ia].push(ib);
        }
        if !self.adjacency[ib].contains(&ia) {
            self.adjacency[ib].push(ia);
        }
    }

    pub fn contains(&self, node: N) -> bool {
        self.index.contains_key(&node)
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Directed edge list; every undirected edge appears once per direction.
    pub fn edges(&self) -> &[(N, N)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Neighbours in edge-insertion order.
    pub fn neighbors(&self, node: N) -> impl Iterator<Item = N> + '_ {
        self.index
            .get(&node)
            .map(|&i| self.adjacency[i].as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&j| self.nodes[j])
    }

    /// Cheapest path from `start` to `goal` (both inclusive), or `None` when unreachable.
    ///
    /// `cost` is charged per traversed edge and `heuristic` estimates the remaining cost from a node
    /// to the goal; with an admissible heuristic the returned path is optimal. Among open nodes with
    /// equal f-score the one pushed first is expanded first.
    pub fn a_star<C, H>(&self, start: N, goal: N, mut cost: C, mut heuristic: H) -> Option<Vec<N>>
    where
        C: FnMut(N, N) -> f64,
        H: FnMut(N) -> f64,
    {
        let start_idx = *self.index.get(&start)?;
        let goal_idx = *self.index.get(&goal)?;
        if start_idx == goal_idx {
            return Some(vec![start]);
        }

        let n = self.nodes.len();
        let mut g_score = vec![f64::INFINITY; n];
        let mut came_from: Vec<Option<usize>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut open = BinaryHeap::new();

        g_score[start_idx] = 0.0;
        open.push(OpenNode {
            f: heuristic(start),
            g: 0.0,
            node: start_idx,
            seq: 0,
        });
        let mut seq: u64 = 1;

        while let Some(current) = open.pop() {
            if current.node == goal_idx {
                let mut path = vec![self.nodes[goal_idx]];
                let mut at = goal_idx;
                while let Some(prev) = came_from[at] {
                    at = prev;
                    path.push(self.nodes[at]);
                }
                path.reverse();
                return Some(path);
            }
            if closed[current.node] || current.g > g_score[current.node] {
                continue;
            }
            closed[current.node] = true;

            let from = self.nodes[current.node];
            for &next in &self.adjacency[current.node] {
                if closed[next] {
                    continue;
                }
                let to = self.nodes[next];
                let tentative = current.g + cost(from, to);
                if tentative >= g_score[next] {
                    continue;
                }
                g_score[next] = tentative;
                came_from[next] = Some(current.node);
                open.push(OpenNode {
                    f: tentative + heuristic(to),
                    g: tentative,
                    node: next,
                    seq,
                });
                seq += 1;
            }
        }

        None
    }

    fn slot(&mut self, node: N) -> usize {
        if let Some(&i) = self.index.get(&node) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(node);
        self.index.insert(node, i);
        self.adjacency.push(Vec::new());
        i
    }
}
