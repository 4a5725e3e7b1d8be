use std::collections::HashSet;
use std::fmt::Display;

use itertools::Itertools;
use log::debug;

use crate::cycles::Fuse;
use crate::error::{bail, Result};

pub type Edge = usize;

/// A crossing in PD notation: the incoming under-strand first, the
/// remaining edges counter-clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Crossing {
    edges: [Edge; 4]
}

impl Crossing { 
    pub fn new(edges: [Edge; 4]) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[Edge; 4] { 
        &self.edges
    }

    pub fn edge(&self, slot: usize) -> Edge { 
        self.edges[slot % 4]
    }

    /// The two arcs of the 0- or 1-resolution.
    pub fn arcs(&self, r: bool) -> [(Edge, Edge); 2] {
        let [a, b, c, d] = self.edges;
        if r { 
            [(a, d), (b, c)]
        } else {
            [(a, b), (c, d)]
        }
    }
}

impl Display for Crossing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.edges;
        write!(f, "X[{a},{b},{c},{d}]")
    }
}

/// An oriented link diagram given by its PD code, together with a number
/// of trivial circles split from the rest.
///
/// Edges are numbered `1..=nedges`, crossings `0..ncrossings`.
/// Components are numbered by their smallest edge; free loops come last.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagram {
    crossings: Vec<Crossing>,
    nedges: usize,
    free_loops: usize,
    signs: Vec<i8>,
    components: Vec<usize>,
    ncomps: usize,
}

impl Diagram { 
    pub fn from_pd_code<I>(code: I) -> Result<Self>
    where I: IntoIterator<Item = [Edge; 4]> {
        let code = code.into_iter().collect_vec();

        let labels = code.iter().flatten().cloned().sorted().dedup_with_count().collect_vec();
        if let Some((n, e)) = labels.iter().find(|(n, _)| *n != 2) {
            bail!(InvalidDiagram, "edge {e} appears {n} times");
        }

        let relabel = |e: &Edge| labels.binary_search_by_key(e, |(_, e)| *e).map(|i| i + 1).unwrap_or(0);
        let crossings = code.iter().map(|x|
            Crossing::new(x.map(|e| relabel(&e)))
        ).collect_vec();

        Ok(Self::new_impl(crossings, labels.len(), 0))
    }

    /// The closure of a braid on `n` strands. A generator `k > 0` is the
    /// positive crossing of strands `k` and `k + 1`, and `-k` its inverse.
    pub fn from_braid(n: usize, word: &[isize]) -> Result<Self> {
        if let Some(g) = word.iter().find(|g| g.unsigned_abs() == 0 || g.unsigned_abs() >= n) { 
            bail!(InvalidDiagram, "generator {g} out of range for {n} strands");
        }

        let mut pos = (1..=n).collect_vec();
        let mut next = n + 1;
        let mut code = vec![];

        // strands run upwards: (a, b) below the crossing, (c, d) above.
        for &g in word { 
            let i = g.unsigned_abs() - 1;
            let (a, b, c, d) = (pos[i], pos[i + 1], next, next + 1);
            code.push(if g > 0 { [b, d, c, a] } else { [a, b, d, c] });
            (pos[i], pos[i + 1]) = (c, d);
            next += 2;
        }

        let close = |e: Edge| pos.iter().position(|&p| p == e).map_or(e, |i| i + 1);
        let code = code.into_iter().map(|x| x.map(|e| close(e))).collect_vec();
        let untouched = (0..n).filter(|&i| pos[i] == i + 1).count();

        Ok(Self::from_pd_code(code)?.with_free_loops(untouched))
    }

    fn new_impl(crossings: Vec<Crossing>, nedges: usize, free_loops: usize) -> Self { 
        let signs = crossing_signs(&crossings, nedges);
        let (components, ncomps) = components(&crossings, nedges);

        debug!("diagram: {} crossings, {} edges, signs: {:?}", crossings.len(), nedges, signs);

        Self { crossings, nedges, free_loops, signs, components, ncomps }
    }

    pub fn empty() -> Self {
        Self::new_impl(vec![], 0, 0)
    }

    pub fn unknot() -> Self { 
        Self::unlink(1)
    }

    pub fn unlink(n: usize) -> Self {
        Self::new_impl(vec![], 0, n)
    }

    pub fn with_free_loops(mut self, n: usize) -> Self {
        self.free_loops += n;
        self
    }

    pub fn load(name: &str) -> Result<Self> { 
        match name { 
            "0_1" | "unknot" => return Ok(Self::unknot()),
            "empty" => return Ok(Self::empty()),
            _ => ()
        }

        let Some((_, code)) = TABLE.iter().find(|(n, _)| *n == name) else { 
            bail!(InvalidDiagram, "unknown diagram: '{name}'");
        };

        Self::from_pd_code(code.iter().cloned())
    }

    pub fn crossings(&self) -> &[Crossing] { 
        &self.crossings
    }

    pub fn crossing(&self, k: usize) -> &Crossing {
        &self.crossings[k]
    }

    pub fn ncrossings(&self) -> usize {
        self.crossings.len()
    }

    pub fn nedges(&self) -> usize { 
        self.nedges
    }

    pub fn edges(&self) -> std::ops::RangeInclusive<Edge> {
        1 ..= self.nedges
    }

    pub fn free_loops(&self) -> usize { 
        self.free_loops
    }

    pub fn crossing_sign(&self, k: usize) -> i8 { 
        self.signs[k]
    }

    pub fn n_pos(&self) -> usize { 
        self.signs.iter().filter(|&&e| e > 0).count()
    }

    pub fn n_neg(&self) -> usize {
        self.signs.iter().filter(|&&e| e < 0).count()
    }

    pub fn writhe(&self) -> isize {
        self.signs.iter().map(|&e| e as isize).sum()
    }

    pub fn ncomponents(&self) -> usize {
        self.ncomps + self.free_loops
    }

    pub fn is_knot(&self) -> bool {
        self.ncomponents() == 1
    }

    pub fn component_of(&self, e: Edge) -> usize {
        self.components[e - 1]
    }

    pub fn linking_number(&self, a: usize, b: usize) -> isize {
        if a == b { 
            return 0
        }

        let total: isize = self.crossings.iter().zip(self.signs.iter()).filter(|(x, _)| {
            let (c0, c1) = (self.component_of(x.edge(0)), self.component_of(x.edge(1)));
            (c0 == a && c1 == b) || (c0 == b && c1 == a)
        }).map(|(_, &e)| e as isize).sum();

        total / 2
    }
}

impl Display for Diagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PD[{}]", self.crossings.iter().map(|x| x.to_string()).join(", "))?;
        if self.free_loops > 0 {
            write!(f, " + {} loop(s)", self.free_loops)?;
        }
        Ok(())
    }
}

// Orients every edge by walking along strands: a strand entering at slot s
// leaves at slot s + 2. Returns the (crossing, slot) at which each edge ends.
fn orient(crossings: &[Crossing], nedges: usize) -> Vec<Option<(usize, usize)>> { 
    let mut occ = vec![vec![]; nedges + 1];
    for (c, x) in crossings.iter().enumerate() { 
        for s in 0..4 {
            occ[x.edge(s)].push((c, s));
        }
    }

    let mut head = vec![None; nedges + 1];
    let mut visited = HashSet::new();

    let mut walk = |head: &mut Vec<Option<(usize, usize)>>, mut e: Edge, mut c: usize, mut s: usize| {
        while visited.insert((e, c, s)) { 
            head[e] = Some((c, s));
            let s2 = (s + 2) % 4;
            let e2 = crossings[c].edge(s2);
            let Some(&(c2, s3)) = occ[e2].iter().find(|&&p| p != (c, s2)) else {
                break
            };
            (e, c, s) = (e2, c2, s3);
        }
    };

    for e in 1..=nedges { 
        if head[e].is_some() { continue }
        if let Some(&(c, s)) = occ[e].iter().find(|(_, s)| *s == 0) {
            walk(&mut head, e, c, s);
        }
    }

    // components passing only over: follow increasing labels when possible.
    for e in 1..=nedges {
        if head[e].is_some() { continue }
        let next = occ[e].iter().find(|(c, s)|
            crossings[*c].edge(s + 2) == e + 1
        ).or(occ[e].last());

        if let Some(&(c, s)) = next { 
            walk(&mut head, e, c, s);
        }
    }

    head
}

fn crossing_signs(crossings: &[Crossing], nedges: usize) -> Vec<i8> { 
    let head = orient(crossings, nedges);

    crossings.iter().enumerate().map(|(c, x)| {
        if head[x.edge(3)] == Some((c, 3)) && x.edge(1) != x.edge(3) {
            1
        } else if head[x.edge(1)] == Some((c, 1)) {
            -1
        } else {
            1
        }
    }).collect()
}

fn components(crossings: &[Crossing], nedges: usize) -> (Vec<usize>, usize) {
    let mut fuse = Fuse::new(nedges + 1);
    for x in crossings { 
        fuse.union(x.edge(0), x.edge(2));
        fuse.union(x.edge(1), x.edge(3));
    }

    let roots = (1..=nedges).map(|e| fuse.find(e)).collect_vec();
    let ids = roots.iter().cloned().sorted().dedup().collect_vec();
    let comps = roots.iter().map(|r|
        ids.binary_search(r).unwrap_or(0)
    ).collect();

    (comps, ids.len())
}

const TABLE: [(&str, &[[Edge; 4]]); 12] = [
    ("3_1",  &[[1,4,2,5],[3,6,4,1],[5,2,6,3]]),
    ("4_1",  &[[4,2,5,1],[8,6,1,5],[6,3,7,4],[2,7,3,8]]),
    ("5_1",  &[[1,6,2,7],[3,8,4,9],[5,10,6,1],[7,2,8,3],[9,4,10,5]]),
    ("5_2",  &[[1,4,2,5],[3,8,4,9],[5,10,6,1],[9,6,10,7],[7,2,8,3]]),
    ("6_1",  &[[1,4,2,5],[7,10,8,11],[3,9,4,8],[9,3,10,2],[5,12,6,1],[11,6,12,7]]),
    ("6_2",  &[[1,4,2,5],[5,10,6,11],[3,9,4,8],[9,3,10,2],[7,12,8,1],[11,6,12,7]]),
    ("6_3",  &[[4,2,5,1],[8,4,9,3],[12,9,1,10],[10,5,11,6],[6,11,7,12],[2,8,3,7]]),
    ("7_1",  &[[1,8,2,9],[3,10,4,11],[5,12,6,13],[7,14,8,1],[9,2,10,3],[11,4,12,5],[13,6,14,7]]),
    ("7_2",  &[[1,4,2,5],[3,10,4,11],[5,14,6,1],[7,12,8,13],[11,8,12,9],[13,6,14,7],[9,2,10,3]]),
    ("7_3",  &[[6,2,7,1],[10,4,11,3],[14,8,1,7],[8,14,9,13],[12,6,13,5],[2,10,3,9],[4,12,5,11]]),
    ("8_19", &[[4,2,5,1],[8,4,9,3],[9,15,10,14],[5,13,6,12],[13,7,14,6],[11,1,12,16],[15,11,16,10],[2,8,3,7]]),
    ("L2a1", &[[4,1,3,2],[2,3,1,4]]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trefoil_signs() {
        let d = Diagram::load("3_1").unwrap();
        assert_eq!(d.ncrossings(), 3);
        assert_eq!(d.nedges(), 6);
        assert_eq!(d.writhe(), -3);
        assert_eq!(d.n_neg(), 3);
        assert!(d.is_knot());
    }

    #[test]
    fn right_trefoil_signs() { 
        let d = Diagram::from_pd_code([[1,5,2,4],[3,1,4,6],[5,3,6,2]]).unwrap();
        assert_eq!(d.writhe(), 3);
    }

    #[test]
    fn figure8_signs() {
        let d = Diagram::load("4_1").unwrap();
        assert_eq!(d.writhe(), 0);
        assert_eq!(d.n_pos(), 2);
    }

    #[test]
    fn kinks() { 
        let d = Diagram::from_pd_code([[1,1,2,2]]).unwrap();
        assert_eq!(d.writhe(), 1);

        let d = Diagram::from_pd_code([[1,2,2,1]]).unwrap();
        assert_eq!(d.writhe(), -1);
    }

    #[test]
    fn hopf_link() {
        let d = Diagram::load("L2a1").unwrap();
        assert_eq!(d.ncomponents(), 2);
        assert_eq!(d.writhe(), -2);
        assert_eq!(d.linking_number(0, 1), -1);
        assert_eq!(d.linking_number(1, 0), -1);
    }

    #[test]
    fn unlink_diagram() {
        let d = Diagram::from_pd_code([[1,2,3,4],[3,2,1,4]]).unwrap();
        assert_eq!(d.ncomponents(), 2);
        assert_eq!(d.writhe(), 0);
        assert_eq!(d.linking_number(0, 1), 0);
    }

    #[test]
    fn relabel() {
        let d = Diagram::from_pd_code([[10,40,20,50],[30,60,40,10],[50,20,60,30]]).unwrap();
        assert_eq!(d, Diagram::load("3_1").unwrap());
    }

    #[test]
    fn invalid() {
        let d = Diagram::from_pd_code([[1,4,2,5],[3,6,4,1],[5,2,6,7]]);
        assert!(d.is_err());
    }

    #[test]
    fn free_loops() {
        let d = Diagram::load("3_1").unwrap().with_free_loops(2);
        assert_eq!(d.ncomponents(), 3);
        assert_eq!(Diagram::unknot().ncomponents(), 1);
        assert_eq!(Diagram::empty().ncomponents(), 0);
    }

    #[test]
    fn braid_closures() { 
        let d = Diagram::from_braid(2, &[1, 1, 1]).unwrap();
        assert!(d.is_knot());
        assert_eq!(d.writhe(), 3);

        let d = Diagram::from_braid(2, &[-1, -1]).unwrap();
        assert_eq!(d.ncomponents(), 2);
        assert_eq!(d.linking_number(0, 1), -1);

        let d = Diagram::from_braid(3, &[1, 2, 1, 2, 1, 2, 1, 2]).unwrap();
        assert!(d.is_knot());
        assert_eq!(d.n_pos(), 8);

        let d = Diagram::from_braid(3, &[1, -2, 1, -2]).unwrap();
        assert!(d.is_knot());
        assert_eq!(d.writhe(), 0);
    }

    #[test]
    fn braid_with_kinks() {
        let d = Diagram::from_braid(2, &[1]).unwrap();
        assert_eq!(d, Diagram::from_pd_code([[2,2,1,1]]).unwrap());
        assert_eq!(d.writhe(), 1);

        let d = Diagram::from_braid(4, &[1, -2, 1, -2, -3]).unwrap();
        assert!(d.is_knot());
        assert_eq!(d.writhe(), -1);
    }

    #[test]
    fn braid_free_strands() {
        let d = Diagram::from_braid(3, &[1, 1]).unwrap();
        assert_eq!(d.free_loops(), 1);
        assert_eq!(d.ncomponents(), 3);

        assert_eq!(Diagram::from_braid(2, &[]).unwrap().ncomponents(), 2);
        assert!(Diagram::from_braid(2, &[2]).is_err());
        assert!(Diagram::from_braid(2, &[0]).is_err());
    }

    #[test]
    fn unknown_name() { 
        assert!(Diagram::load("9_99").is_err());
    }
}
