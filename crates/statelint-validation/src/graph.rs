//! Identity-indexed directed graph with cycle detection
//!
//! Nodes live in an arena addressed by `usize` and edges are stored as index
//! lists, so cyclic inputs never become cyclic ownership. Cycle detection is
//! an iterative depth-first walk with three colours and runs in
//! O(nodes + edges) on any input, cyclic or not.
//!
//! Copyright (c) 2025 Statelint Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;
use std::fmt;

/// A directed graph over string identities
#[derive(Debug, Clone, Default)]
pub struct IdentityGraph {
    index: HashMap<String, usize>,
    labels: Vec<String>,
    edges: Vec<Vec<usize>>,
}

/// A cycle found by [`IdentityGraph::find_cycle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Identity whose revisit closed the cycle
    pub closing: String,
    /// Identities along the cycle, starting and ending with `closing`
    pub path: Vec<String>,
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join(" -> "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

impl IdentityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an adjacency list such as `{A: [B], B: [C]}`
    pub fn from_adjacency<I, K, N, T>(adjacency: I) -> Self
    where
        I: IntoIterator<Item = (K, N)>,
        K: AsRef<str>,
        N: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut graph = Self::new();
        for (from, neighbors) in adjacency {
            let from = graph.node(from.as_ref());
            for to in neighbors {
                let to = graph.node(to.as_ref());
                graph.add_edge_index(from, to);
            }
        }
        graph
    }

    /// Index of `id`, registering it if unseen
    pub fn node(&mut self, id: &str) -> usize {
        if let Some(&index) = self.index.get(id) {
            return index;
        }
        let index = self.labels.len();
        self.index.insert(id.to_string(), index);
        self.labels.push(id.to_string());
        self.edges.push(Vec::new());
        index
    }

    /// Index of `id` if registered
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Identity stored at `index`
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Add an edge, registering both endpoints
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.node(from);
        let to = self.node(to);
        self.add_edge_index(from, to);
    }

    /// Add an edge between registered nodes; duplicates are ignored
    pub fn add_edge_index(&mut self, from: usize, to: usize) {
        if let Some(out) = self.edges.get_mut(from) {
            if to < self.labels.len() && !out.contains(&to) {
                out.push(to);
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Outgoing neighbours of `id`, in insertion order
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .map(|i| self.edges[i].iter().map(|&n| self.labels[n].as_str()).collect())
            .unwrap_or_default()
    }

    /// First cycle reachable from any node, walking nodes in insertion order
    pub fn find_cycle(&self) -> Option<Cycle> {
        let count = self.labels.len();
        let mut state = vec![VisitState::Unvisited; count];
        // (node, next edge to follow)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..count {
            if state[start] != VisitState::Unvisited {
                continue;
            }
            state[start] = VisitState::OnStack;
            stack.push((start, 0));

            while let Some(top) = stack.last_mut() {
                let (node, next_edge) = *top;
                let Some(&next) = self.edges[node].get(next_edge) else {
                    state[node] = VisitState::Done;
                    stack.pop();
                    continue;
                };
                top.1 += 1;

                match state[next] {
                    VisitState::Unvisited => {
                        state[next] = VisitState::OnStack;
                        stack.push((next, 0));
                    }
                    VisitState::OnStack => return Some(self.cycle_from(&stack, next)),
                    VisitState::Done => {}
                }
            }
        }
        None
    }

    fn cycle_from(&self, stack: &[(usize, usize)], closing: usize) -> Cycle {
        let start = stack.iter().position(|&(n, _)| n == closing).unwrap_or(0);
        let mut path: Vec<String> = stack[start..]
            .iter()
            .map(|&(n, _)| self.labels[n].clone())
            .collect();
        path.push(self.labels[closing].clone());
        Cycle {
            closing: self.labels[closing].clone(),
            path,
        }
    }
}
