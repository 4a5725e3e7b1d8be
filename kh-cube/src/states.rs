use std::ops::RangeInclusive;

use log::info;

use crate::config::{HomologyType, KhConfig};
use crate::cycles::CycleCache;
use crate::diagram::Diagram;
use crate::error::{bail, Result};
use crate::packing::{PackedVec, Packing};
use crate::state::State;

/// Pascal's triangle, with `C(n, k) = 0` outside `0 <= k <= n`.
#[derive(Clone, Debug)]
pub struct Binomials { 
    table: Vec<Vec<usize>>
}

impl Binomials {
    pub fn new(n: usize) -> Self { 
        let mut table: Vec<Vec<usize>> = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let row = (0..=i).map(|k|
                if k == 0 || k == i {
                    1
                } else {
                    table[i - 1][k - 1] + table[i - 1][k]
                }
            ).collect();
            table.push(row);
        }
        Self { table }
    }

    pub fn get(&self, n: isize, k: isize) -> usize {
        if n < 0 || k < 0 || k > n { 
            return 0
        }
        self.table[n as usize][k as usize]
    }
}

/// The enhanced states of the cube, grouped into bigraded chain groups.
///
/// Every enhanced state `(v, mask)` has an index `local` within the
/// group `C^{i,j}` it lies in, stored packed as `j_index * base + local`.
/// Bit `c` of `mask` is set when cycle `c` is labelled `X`. For reduced
/// types cycle 0 always carries `X`.
#[derive(Clone, Debug)]
pub struct StateTable {
    htype: HomologyType,
    dim: usize,
    n_pos: usize,
    n_neg: usize,
    j_min: isize,
    j_size: usize,
    packing: Packing,
    offsets: Vec<usize>,
    ids: PackedVec,
    gens: Vec<Vec<usize>>,
    entries: Vec<Vec<usize>>,
}

impl StateTable { 
    pub fn build(d: &Diagram, cache: &CycleCache, htype: HomologyType, config: &KhConfig) -> Result<Self> { 
        let dim = d.ncrossings();
        let (n_pos, n_neg) = (d.n_pos(), d.n_neg());
        let reduced = htype.is_reduced();
        let mult = htype.theory().multiplicity();

        if reduced && d.ncomponents() == 0 { 
            bail!(InvalidDiagram, "reduced homology of the empty diagram");
        }

        let max_c = cache.max_count();
        if max_c >= 64 {
            bail!(CapacityExceeded, "{max_c} cycles in one resolution");
        }

        let q_shift = n_pos as isize - 2 * n_neg as isize + if reduced { 1 } else { 0 };
        let (j_min, j_max) = State::all(dim).fold((isize::MAX, isize::MIN), |(lo, hi), v| {
            let (w, c) = (v.weight() as isize, cache.count(v) as isize);
            let top = if reduced { c - 2 } else { c };
            (lo.min(w + q_shift - c), hi.max(w + q_shift + top))
        });

        let j_size = ((j_max - j_min) / 2 + 1) as usize;
        if j_size > config.max_q_size as usize { 
            bail!(CapacityExceeded, "{j_size} secondary gradings exceed max_q_size = {}", config.max_q_size);
        }

        let packing = config.packing();
        let base = packing.base() as usize;
        let mut offsets = vec![0; 1 << dim];
        let mut ids = PackedVec::new();
        let mut gens = vec![vec![0; j_size]; dim + 1];

        for w in 0..=dim {
            for v in State::of_weight(dim, w) { 
                let c = cache.count(v);
                offsets[v.bits() as usize] = ids.len();

                for mask in Self::labels_for(c, reduced) { 
                    let j = w as isize + q_shift + c as isize - 2 * mask.count_ones() as isize;
                    let jx = ((j - j_min) / 2) as usize;
                    let local = gens[w][jx];

                    if (local + 1) * mult > base { 
                        let i = w as isize - n_neg as isize;
                        bail!(CapacityExceeded, "too many generators in C^({i},{j}): limit {base}");
                    }

                    ids.push(packing.pack(jx, local));
                    gens[w][jx] += 1;
                }
            }
        }

        let mut table = Self { htype, dim, n_pos, n_neg, j_min, j_size, packing, offsets, ids, gens, entries: vec![] };
        table.entries = table.count_entries(d, cache, config)?;

        info!("states ({htype}): {} enhanced states, j: {j_min}..={j_max}", table.ids.len());

        Ok(table)
    }

    // Exact number of nonzero entries of each differential, counted from
    // the binomial distribution of labels over the cycles of each vertex.
    fn count_entries(&self, d: &Diagram, cache: &CycleCache, config: &KhConfig) -> Result<Vec<Vec<usize>>> { 
        let binom = Binomials::new(cache.max_count() + 1);
        let reduced = self.is_reduced();
        let mult = self.htype.theory().multiplicity();
        let mut entries = vec![vec![0; self.j_size]; self.dim];

        for w in 0..self.dim {
            for v in State::of_weight(self.dim, w) { 
                let cv = cache.get(v);
                let c = cv.count() as isize;

                for k in (0..self.dim).filter(|&k| !v.is_set(k)) { 
                    let x = d.crossing(k);
                    let (a, b) = (cv.cycle_of(x.edge(0)), cv.cycle_of(x.edge(2)));
                    let merge = a != b;
                    let based = a == 0 || (merge && b == 0);

                    let p_min = if reduced { 1 } else { 0 };
                    for p in p_min..=c { 
                        let n = match (merge, reduced, based) {
                            (true,  false, _)     => binom.get(c, p) - binom.get(c - 2, p - 2),
                            (true,  true,  true)  => binom.get(c - 1, p - 1) - binom.get(c - 2, p - 2),
                            (true,  true,  false) => binom.get(c - 1, p - 1) - binom.get(c - 3, p - 3),
                            (false, false, _)     => binom.get(c - 1, p - 1) + 2 * binom.get(c - 1, p),
                            (false, true,  true)  => binom.get(c - 1, p - 1),
                            (false, true,  false) => binom.get(c - 2, p - 2) + 2 * binom.get(c - 2, p - 1),
                        };
                        if n == 0 { continue }

                        let j = self.q_deg(w, c as usize, p as usize);
                        let jx = ((j - self.j_min) / 2) as usize;
                        entries[w][jx] += n;

                        if entries[w][jx] * mult > config.max_entries {
                            let i = w as isize - self.n_neg as isize;
                            bail!(CapacityExceeded, "differential at ({i},{j}) exceeds {} entries", config.max_entries);
                        }
                    }
                }
            }
        }

        Ok(entries)
    }

    fn labels_for(c: usize, reduced: bool) -> impl Iterator<Item = u64> { 
        let (start, step) = if reduced { (1, 2) } else { (0, 1) };
        (start..1u64 << c).step_by(step)
    }

    /// Labels of a vertex with `c` cycles, in increasing order.
    pub fn labels(&self, c: usize) -> impl Iterator<Item = u64> { 
        Self::labels_for(c, self.is_reduced())
    }

    pub fn homology_type(&self) -> HomologyType { 
        self.htype
    }

    pub fn is_reduced(&self) -> bool {
        self.htype.is_reduced()
    }

    pub fn dim(&self) -> usize { 
        self.dim
    }

    pub fn n_neg(&self) -> usize {
        self.n_neg
    }

    pub fn i_range(&self) -> RangeInclusive<isize> { 
        -(self.n_neg as isize) ..= self.n_pos as isize
    }

    pub fn j_range(&self) -> RangeInclusive<isize> { 
        self.j_min ..= self.j_at(self.j_size - 1)
    }

    pub fn j_size(&self) -> usize { 
        self.j_size
    }

    pub fn j_at(&self, jx: usize) -> isize {
        self.j_min + 2 * jx as isize
    }

    pub fn j_index(&self, j: isize) -> Option<usize> { 
        let d = j - self.j_min;
        (d >= 0 && d % 2 == 0 && ((d / 2) as usize) < self.j_size).then(|| (d / 2) as usize)
    }

    pub fn q_deg(&self, w: usize, c: usize, n_x: usize) -> isize {
        let red = if self.is_reduced() { 1 } else { 0 };
        (w + self.n_pos + c) as isize - 2 * (self.n_neg + n_x) as isize + red
    }

    pub fn packing(&self) -> Packing { 
        self.packing
    }

    /// `(j_index, local)` of an enhanced state.
    pub fn index_of(&self, v: State, mask: u64) -> (usize, usize) { 
        let l = if self.is_reduced() { mask >> 1 } else { mask };
        let p = self.ids.get(self.offsets[v.bits() as usize] + l as usize);
        self.packing.unpack(p)
    }

    fn w_of(&self, i: isize) -> Option<usize> { 
        let w = i + self.n_neg as isize;
        (0 <= w && w <= self.dim as isize).then_some(w as usize)
    }

    /// Number of enhanced states in `C^{i,j}`.
    pub fn gen_count(&self, i: isize, jx: usize) -> usize { 
        self.w_of(i).and_then(|w| self.gens[w].get(jx).cloned()).unwrap_or(0)
    }

    /// Rank of `C^{i,j}` over Z.
    pub fn rank(&self, i: isize, j: isize) -> usize { 
        self.j_index(j).map(|jx| self.gen_count(i, jx)).unwrap_or(0) * self.htype.theory().multiplicity()
    }

    /// Number of edge-map terms of `d: C^{i,j} -> C^{i+1,j}`.
    pub fn entry_count(&self, i: isize, jx: usize) -> usize {
        self.w_of(i).and_then(|w| self.entries.get(w)).and_then(|e| e.get(jx).cloned()).unwrap_or(0)
    }

    /// Number of nonzero entries of `d: C^{i,j} -> C^{i+1,j}` over Z.
    pub fn nnz(&self, i: isize, jx: usize) -> usize { 
        self.entry_count(i, jx) * self.htype.theory().multiplicity()
    }

    pub fn total(&self) -> usize { 
        self.ids.len() * self.htype.theory().multiplicity()
    }
}

#[cfg(test)]
mod tests { 
    use super::*;

    fn table(name: &str, t: HomologyType) -> StateTable { 
        let d = Diagram::load(name).unwrap();
        let c = CycleCache::new(&d);
        StateTable::build(&d, &c, t, &KhConfig::default()).unwrap()
    }

    #[test]
    fn binomials() { 
        let b = Binomials::new(6);
        assert_eq!(b.get(6, 3), 20);
        assert_eq!(b.get(4, 0), 1);
        assert_eq!(b.get(3, 4), 0);
        assert_eq!(b.get(-1, 0), 0);
        assert_eq!(b.get(3, -1), 0);
    }

    #[test]
    fn trefoil() { 
        let t = table("3_1", HomologyType::Standard);
        assert_eq!(t.i_range(), -3..=0);
        assert_eq!(t.j_range(), -9..=-1);
        assert_eq!(t.total(), 8 + 3 * 4 + 3 * 2 + 4);
        assert_eq!(t.rank(-3, -9), 1);
        assert_eq!(t.rank(0, -1), 1);
        assert_eq!(t.rank(0, -3), 2);
        assert_eq!(t.rank(0, 0), 0);
    }

    #[test]
    fn trefoil_reduced() { 
        let t = table("3_1", HomologyType::Reduced);
        assert_eq!(t.j_range(), -8..=-2);
        assert_eq!(t.total(), (8 + 3 * 4 + 3 * 2 + 4) / 2);
    }

    #[test]
    fn unified_doubles() { 
        let t = table("3_1", HomologyType::Unified);
        assert_eq!(t.total(), 2 * (8 + 3 * 4 + 3 * 2 + 4));
        assert_eq!(t.rank(-3, -9), 2);
    }

    #[test]
    fn indices_are_dense() { 
        let t = table("4_1", HomologyType::Standard);
        let d = Diagram::load("4_1").unwrap();
        let c = CycleCache::new(&d);

        for i in t.i_range() {
            for jx in 0..t.j_size() { 
                let n = t.gen_count(i, jx);
                let mut seen = vec![false; n];

                let w = (i + t.n_neg() as isize) as usize;
                for v in State::of_weight(t.dim(), w) { 
                    for mask in t.labels(c.count(v)) { 
                        let (jx2, l) = t.index_of(v, mask);
                        if jx2 == jx { 
                            assert!(!seen[l]);
                            seen[l] = true;
                        }
                    }
                }
                assert!(seen.into_iter().all(|b| b));
            }
        }
    }

    #[test]
    fn packed_gradings() {
        let kinked = Diagram::from_braid(4, &[1, -2, 1, -2, -3]).unwrap();
        let cases = [
            (Diagram::load("3_1").unwrap(), HomologyType::Standard),
            (Diagram::load("4_1").unwrap(), HomologyType::Reduced),
            (Diagram::load("L2a1").unwrap(), HomologyType::Odd),
            (Diagram::load("5_2").unwrap().with_free_loops(1), HomologyType::ReducedOdd),
            (kinked.clone(), HomologyType::Unified),
            (kinked, HomologyType::Reduced),
        ];

        for (d, htype) in cases { 
            let c = CycleCache::new(&d);
            let t = StateTable::build(&d, &c, htype, &KhConfig::default()).unwrap();
            let red = if htype.is_reduced() { 1 } else { 0 };
            let shift = d.n_pos() as isize - 2 * d.n_neg() as isize + red;

            for v in State::all(d.ncrossings()) { 
                let n = c.count(v);
                for mask in t.labels(n) { 
                    if htype.is_reduced() { 
                        assert_eq!(mask & 1, 1);
                    }
                    let (jx, local) = t.index_of(v, mask);
                    let j = v.weight() as isize + n as isize - 2 * mask.count_ones() as isize + shift;
                    assert_eq!(t.j_at(jx), j, "{d} {htype}: {v} {mask:b}");
                    assert_eq!(t.j_index(j), Some(jx));

                    let i = v.weight() as isize - d.n_neg() as isize;
                    assert!(local < t.gen_count(i, jx));
                }
            }
        }
    }

    #[test]
    fn too_many_generators() { 
        let d = Diagram::load("4_1").unwrap();
        let c = CycleCache::new(&d);
        let config = KhConfig { max_generators: 2, ..Default::default() };
        let res = StateTable::build(&d, &c, HomologyType::Standard, &config);
        assert!(matches!(res, Err(crate::KhError::CapacityExceeded(_))));
    }

    #[test]
    fn too_many_gradings() {
        let d = Diagram::load("4_1").unwrap();
        let c = CycleCache::new(&d);
        let config = KhConfig { max_q_size: 2, ..Default::default() };
        let res = StateTable::build(&d, &c, HomologyType::Standard, &config);
        assert!(matches!(res, Err(crate::KhError::CapacityExceeded(_))));
    }
}
