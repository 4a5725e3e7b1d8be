use itertools::Itertools;
use log::info;

use crate::diagram::{Diagram, Edge};
use crate::state::State;

/// Union-find over edge labels. The root of every class is its smallest
/// element.
pub(crate) struct Fuse { 
    parent: Vec<usize>
}

impl Fuse { 
    pub fn new(n: usize) -> Self { 
        Self { parent: (0..n).collect() }
    }

    pub fn find(&mut self, mut a: usize) -> usize {
        while self.parent[a] != a { 
            self.parent[a] = self.parent[self.parent[a]];
            a = self.parent[a];
        }
        a
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a < b { 
            self.parent[b] = a;
        } else if b < a {
            self.parent[a] = b;
        }
    }
}

/// The circles of a resolution. Real cycles are numbered by their smallest
/// edge, free loops follow them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleDecomp {
    edge_cycle: Vec<u16>,
    base: Vec<Edge>,
    free_loops: usize,
}

impl CycleDecomp { 
    pub fn new(d: &Diagram, v: State) -> Self { 
        let n = d.nedges();
        let mut fuse = Fuse::new(n + 1);

        for (k, x) in d.crossings().iter().enumerate() { 
            for (a, b) in x.arcs(v.is_set(k)) {
                fuse.union(a, b);
            }
        }

        let roots = d.edges().map(|e| fuse.find(e)).collect_vec();
        let base = roots.iter().cloned().sorted().dedup().collect_vec();
        let edge_cycle = roots.iter().map(|r|
            base.binary_search(r).unwrap_or(0) as u16
        ).collect();

        Self { edge_cycle, base, free_loops: d.free_loops() }
    }

    pub fn count(&self) -> usize { 
        self.base.len() + self.free_loops
    }

    pub fn nreal(&self) -> usize { 
        self.base.len()
    }

    pub fn cycle_of(&self, e: Edge) -> usize {
        self.edge_cycle[e - 1] as usize
    }

    pub fn base_edge(&self, c: usize) -> Option<Edge> { 
        self.base.get(c).cloned()
    }

    pub fn edges(&self, c: usize) -> Vec<Edge> {
        (1..=self.edge_cycle.len()).filter(|&e| self.cycle_of(e) == c).collect()
    }

    /// The cycle of `target` containing the base edge of cycle `c`.
    pub fn image(&self, c: usize, target: &CycleDecomp) -> usize {
        match self.base.get(c) {
            Some(&e) => target.cycle_of(e),
            None => c - self.nreal() + target.nreal()
        }
    }
}

/// Cycle decompositions of every vertex of the resolution cube.
#[derive(Clone, Debug)]
pub struct CycleCache { 
    dim: usize,
    decomps: Vec<CycleDecomp>
}

impl CycleCache {
    pub fn new(d: &Diagram) -> Self {
        let dim = d.ncrossings();
        let decomps = (0..1u64 << dim).map(|v|
            CycleDecomp::new(d, State::new(v))
        ).collect_vec();

        info!("cycle cache: {} vertices", decomps.len());

        Self { dim, decomps }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, v: State) -> &CycleDecomp {
        &self.decomps[v.bits() as usize]
    }

    pub fn count(&self, v: State) -> usize { 
        self.get(v).count()
    }

    pub fn max_count(&self) -> usize { 
        self.decomps.iter().map(|c| c.count()).max().unwrap_or(0)
    }
}
