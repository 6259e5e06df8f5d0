//! HDBSCAN over a precomputed distance matrix
//!
//! 1. Core distance of each point: distance to its min_samples-th nearest
//!    neighbour, the point itself not counted
//! 2. Mutual reachability distances
//! 3. Minimum spanning tree of the mutual reachability graph
//! 4. Single-linkage dendrogram from the sorted tree edges
//! 5. Condensed tree: splits smaller than `min_cluster_size` become points
//!    falling out of their parent cluster
//! 6. Excess-of-mass selection of the most stable clusters
//!
//! Clustered points get ids `0..k`, everything else is noise.

use std::collections::BTreeMap;

use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::graph::UnGraph;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::cluster::ClusterLabel;
use crate::controller::matrix::DistanceMatrix;

pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hdbscan {
    pub min_cluster_size: usize,
    /// Neighbourhood size for core distances
    pub min_samples: usize,
    /// Whether the root may be returned as the only cluster
    pub allow_single_cluster: bool,
}

impl Default for Hdbscan {
    fn default() -> Self {
        Hdbscan::new(DEFAULT_MIN_CLUSTER_SIZE)
    }
}

/// One merge of the single-linkage dendrogram. Node ids below `n` are points.
#[derive(Debug, Clone, Copy)]
struct Merge {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

/// Edge of the condensed tree. `child < n` is a point leaving `parent`,
/// otherwise `child` is a cluster born from `parent`.
#[derive(Debug, Clone, Copy)]
struct CondensedEdge {
    parent: usize,
    child: usize,
    lambda: f64,
    size: usize,
}

impl Hdbscan {
    /// `min_samples` defaults to `min_cluster_size`
    pub fn new(min_cluster_size: usize) -> Self {
        Hdbscan { min_cluster_size, min_samples: min_cluster_size, allow_single_cluster: false }
    }

    pub fn fit_precomputed(&self, matrix: &DistanceMatrix) -> Vec<ClusterLabel> {
        let n = matrix.size();
        if n <= 1 || n < self.min_cluster_size {
            return vec![ClusterLabel::Noise; n];
        }
        let core = self.core_distances(matrix);
        let mst = minimum_spanning_tree(matrix, &core);
        let merges = single_linkage(mst, n);
        let tree = self.condense(&merges, n);
        let stability = stabilities(&tree, n);
        let selected = self.select_clusters(&tree, stability, n);
        label_points(&tree, &selected, n)
    }

    fn core_distances(&self, matrix: &DistanceMatrix) -> Vec<f64> {
        let n = matrix.size();
        // Sorted rows start with the point's own zero
        let k = self.min_samples.min(n - 1);
        (0..n)
            .map(|i| {
                let mut row = matrix.row(i).to_vec();
                row.sort_by(|a, b| a.total_cmp(b));
                row[k]
            })
            .collect()
    }

    fn condense(&self, merges: &[Merge], n: usize) -> Vec<CondensedEdge> {
        let min_size = self.min_cluster_size.max(2);
        let root = 2 * n - 2;
        let node_size = |node: usize| if node < n { 1 } else { merges[node - n].size };

        let mut relabel = vec![0usize; 2 * n - 1];
        let mut ignore = vec![false; 2 * n - 1];
        relabel[root] = n;
        let mut next_label = n + 1;
        let mut tree = Vec::with_capacity(2 * n);

        for node in descendants(merges, n, root) {
            if node < n || ignore[node] {
                continue;
            }
            let merge = merges[node - n];
            let lambda = if merge.distance > 0.0 { 1.0 / merge.distance } else { f64::INFINITY };
            let parent = relabel[node];
            let (left_size, right_size) = (node_size(merge.left), node_size(merge.right));
            let left_big = left_size >= min_size;
            let right_big = right_size >= min_size;

            if left_big && right_big {
                for (child, size) in [(merge.left, left_size), (merge.right, right_size)] {
                    relabel[child] = next_label;
                    tree.push(CondensedEdge { parent, child: next_label, lambda, size });
                    next_label += 1;
                }
                continue;
            }
            // The larger side keeps the parent's label, small sides fall out
            let mut fall_out = Vec::with_capacity(2);
            match (left_big, right_big) {
                (true, false) => {
                    relabel[merge.left] = parent;
                    fall_out.push(merge.right);
                }
                (false, true) => {
                    relabel[merge.right] = parent;
                    fall_out.push(merge.left);
                }
                _ => {
                    fall_out.push(merge.left);
                    fall_out.push(merge.right);
                }
            }
            for side in fall_out {
                for sub in descendants(merges, n, side) {
                    if sub < n {
                        tree.push(CondensedEdge { parent, child: sub, lambda, size: 1 });
                    }
                    ignore[sub] = true;
                }
            }
        }
        tree
    }

    fn select_clusters(
        &self, tree: &[CondensedEdge], mut stability: BTreeMap<usize, f64>, n: usize,
    ) -> FxHashSet<usize> {
        let mut children: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for edge in tree.iter().filter(|e| e.child >= n) {
            children.entry(edge.parent).or_default().push(edge.child);
        }
        // Children carry larger labels than their parents
        let mut nodes: Vec<usize> = stability.keys().rev().copied().collect();
        if !self.allow_single_cluster {
            nodes.retain(|&c| c != n);
        }
        let mut is_cluster: FxHashMap<usize, bool> = nodes.iter().map(|&c| (c, true)).collect();

        for node in nodes {
            let kids = children.get(&node).cloned().unwrap_or_default();
            let subtree: f64 = kids.iter().map(|c| stability.get(c).copied().unwrap_or(0.0)).sum();
            let own = stability.get(&node).copied().unwrap_or(0.0);
            if subtree > own {
                is_cluster.insert(node, false);
                stability.insert(node, subtree);
            } else {
                let mut stack = kids;
                while let Some(sub) = stack.pop() {
                    is_cluster.insert(sub, false);
                    if let Some(grand) = children.get(&sub) {
                        stack.extend(grand.iter().copied());
                    }
                }
            }
        }
        is_cluster.into_iter().filter(|(_, keep)| *keep).map(|(c, _)| c).collect()
    }
}

fn minimum_spanning_tree(matrix: &DistanceMatrix, core: &[f64]) -> Vec<(usize, usize, f64)> {
    let n = matrix.size();
    let mut graph = UnGraph::<usize, f64>::with_capacity(n, n * (n - 1) / 2);
    let nodes: Vec<_> = (0..n).map(|i| graph.add_node(i)).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let reach = matrix.get(i, j).max(core[i]).max(core[j]);
            graph.add_edge(nodes[i], nodes[j], reach);
        }
    }
    min_spanning_tree(&graph)
        .filter_map(|element| match element {
            Element::Edge { source, target, weight } => Some((source, target, weight)),
            Element::Node { .. } => None,
        })
        .collect()
}

fn single_linkage(mut edges: Vec<(usize, usize, f64)>, n: usize) -> Vec<Merge> {
    edges.sort_by(|a, b| a.2.total_cmp(&b.2));
    let mut parent: Vec<usize> = (0..2 * n - 1).collect();
    let mut size = vec![1usize; 2 * n - 1];
    let mut next = n;
    let mut merges = Vec::with_capacity(n - 1);

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for (a, b, distance) in edges {
        let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
        if ra == rb {
            continue;
        }
        let merged = size[ra] + size[rb];
        merges.push(Merge { left: ra, right: rb, distance, size: merged });
        parent[ra] = next;
        parent[rb] = next;
        size[next] = merged;
        next += 1;
    }
    merges
}

/// `node` and everything below it in breadth-first order
fn descendants(merges: &[Merge], n: usize, node: usize) -> Vec<usize> {
    let mut order = vec![node];
    let mut head = 0;
    while head < order.len() {
        let current = order[head];
        head += 1;
        if current >= n {
            let merge = merges[current - n];
            order.push(merge.left);
            order.push(merge.right);
        }
    }
    order
}

/// `lambda - birth`, zero when a cluster born at distance zero loses points
/// at distance zero.
fn excess(lambda: f64, birth: f64) -> f64 {
    if lambda.is_infinite() && birth.is_infinite() {
        0.0
    } else {
        lambda - birth
    }
}

fn stabilities(tree: &[CondensedEdge], n: usize) -> BTreeMap<usize, f64> {
    let mut births: FxHashMap<usize, f64> = FxHashMap::default();
    births.insert(n, 0.0);
    let mut stability: BTreeMap<usize, f64> = BTreeMap::new();
    stability.insert(n, 0.0);
    for edge in tree.iter().filter(|e| e.child >= n) {
        births.insert(edge.child, edge.lambda);
        stability.insert(edge.child, 0.0);
    }
    for edge in tree {
        let birth = births.get(&edge.parent).copied().unwrap_or(0.0);
        if let Some(s) = stability.get_mut(&edge.parent) {
            *s += excess(edge.lambda, birth) * edge.size as f64;
        }
    }
    stability
}

fn label_points(tree: &[CondensedEdge], selected: &FxHashSet<usize>, n: usize) -> Vec<ClusterLabel> {
    let mut sorted: Vec<usize> = selected.iter().copied().collect();
    sorted.sort_unstable();
    let label_of: FxHashMap<usize, usize> = sorted.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let parent_of: FxHashMap<usize, usize> = tree.iter().map(|e| (e.child, e.parent)).collect();

    (0..n)
        .map(|point| {
            let mut current = parent_of.get(&point).copied();
            while let Some(cluster) = current {
                if let Some(&id) = label_of.get(&cluster) {
                    return ClusterLabel::Cluster(id);
                }
                current = parent_of.get(&cluster).copied();
            }
            ClusterLabel::Noise
        })
        .collect()
}
