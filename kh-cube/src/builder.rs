use itertools::Itertools;
use log::{debug, info};

use crate::config::Theory;
use crate::cycles::CycleCache;
use crate::diagram::Diagram;
use crate::error::{bail, Result};
use crate::matrix::SpMat;
use crate::signs::SignCube;
use crate::state::State;
use crate::states::StateTable;
use crate::Int;

/// One term of an edge map: `tgt` receives `coef * src`, times the odd
/// unit when `unit` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub src: usize,
    pub tgt: usize,
    pub coef: i8,
    pub unit: bool,
}

// An edge map sends one generator to at most two.
#[derive(Clone, Copy, Debug, Default)]
struct Terms {
    items: [(u64, u32); 2],
    len: usize,
}

impl Terms {
    fn push(&mut self, mask: u64, e: u32) { 
        self.items[self.len] = (mask, e);
        self.len += 1;
    }

    fn iter(&self) -> impl Iterator<Item = &(u64, u32)> { 
        self.items[..self.len].iter()
    }
}

fn x_cycles(mask: u64) -> impl Iterator<Item = usize> { 
    let mut m = mask;
    std::iter::from_fn(move || { 
        (m != 0).then(|| { 
            let c = m.trailing_zeros() as usize;
            m &= m - 1;
            c
        })
    })
}

/// Builds the differentials `d: C^{i,j} -> C^{i+1,j}`.
///
/// A generator is the ordered product of its X-cycles. Reordering a
/// product, or passing the new factor of a split past it, costs the odd
/// unit `u` per transposition.
pub struct DiffBuilder<'a> { 
    diagram: &'a Diagram,
    cache: &'a CycleCache,
    table: &'a StateTable,
    signs: Option<&'a SignCube>,
    theory: Theory,
}

impl<'a> DiffBuilder<'a> {
    pub fn new(diagram: &'a Diagram, cache: &'a CycleCache, table: &'a StateTable, signs: Option<&'a SignCube>) -> Result<Self> { 
        let theory = table.homology_type().theory();
        if theory.needs_signs() && signs.is_none() { 
            bail!(InternalConsistency, "{theory} homology needs a sign cube");
        }
        Ok(Self { diagram, cache, table, signs, theory })
    }

    // returns (target label, power of u).
    fn edge_map(&self, v: State, k: usize, mask: u64) -> Terms { 
        let cv = self.cache.get(v);
        let cw = self.cache.get(v.with(k));
        let x = self.diagram.crossing(k);
        let (a, b) = (cv.cycle_of(x.edge(0)), cv.cycle_of(x.edge(2)));

        let mut terms = Terms::default();

        if a != b { 
            let mut out = 0u64;
            let mut inv = 0;
            for c in x_cycles(mask) { 
                let y = cv.image(c, cw);
                if (out >> y) & 1 == 1 { 
                    return terms // X·X = 0
                }
                inv += (out >> y >> 1).count_ones();
                out |= 1 << y;
            }
            terms.push(out, inv);
        } else { 
            let (t, h) = (cw.cycle_of(x.edge(0)), cw.cycle_of(x.edge(1)));
            let mut out = 0u64;
            let mut inv = 0;
            for c in x_cycles(mask) {
                let y = if c == a { t } else { cv.image(c, cw) };
                inv += (out >> y >> 1).count_ones();
                out |= 1 << y;
            }
            for (p, e) in [(t, 0), (h, 1)] { 
                if (out >> p) & 1 == 1 { continue }
                let below = (out & ((1 << p) - 1)).count_ones();
                terms.push(out | (1 << p), inv + below + e);
            }
        }

        terms
    }

    /// The edge-map terms of `d^i`, one list per secondary grading.
    pub fn entries(&self, i: isize) -> Result<Vec<Vec<Entry>>> { 
        let t = self.table;
        let range = t.i_range();
        let (lo, hi) = (*range.start(), *range.end());
        if i < lo || i >= hi { 
            bail!(InvalidReference, "primary grading {i} out of range [{lo}, {hi})");
        }

        let n = t.dim();
        let w = (i - lo) as usize;
        let mut bufs = (0..t.j_size()).map(|jx|
            Vec::with_capacity(t.entry_count(i, jx))
        ).collect_vec();

        for v in State::of_weight(n, w) { 
            let c = self.cache.count(v);
            for mask in t.labels(c) { 
                let (jx, src) = t.index_of(v, mask);

                for k in (0..n).filter(|&k| !v.is_set(k)) { 
                    let v1 = v.with(k);
                    let eps = v.sign_before(k);
                    let s = self.signs.map_or(0, |s| s.get(v, k) as u32);

                    for &(m, e) in self.edge_map(v, k, mask).iter() { 
                        let (jx1, tgt) = t.index_of(v1, m);
                        if jx1 != jx {
                            bail!(InternalConsistency, "edge map {v} -> {v1} does not preserve q-degree");
                        }

                        let odd = (e + s) % 2 == 1;
                        let (coef, unit) = match self.theory {
                            Theory::Even    => (eps, false),
                            Theory::Odd     => (if odd { -eps } else { eps }, false),
                            Theory::Unified => (eps, odd),
                        };

                        let buf = &mut bufs[jx];
                        if buf.len() >= t.entry_count(i, jx) { 
                            bail!(InternalConsistency, "entry buffer overflow at ({i}, {})", t.j_at(jx));
                        }
                        buf.push(Entry { src, tgt, coef, unit });
                    }
                }
            }
        }

        for (jx, buf) in bufs.iter().enumerate() { 
            if buf.len() != t.entry_count(i, jx) {
                bail!(InternalConsistency, "({i}, {}): expected {} entries, got {}", t.j_at(jx), t.entry_count(i, jx), buf.len());
            }
        }

        Ok(bufs)
    }

    /// The matrices of `d^i` over Z, one per secondary grading. Rows are
    /// indexed by `C^{i+1,j}`, columns by `C^{i,j}`.
    pub fn build(&self, i: isize) -> Result<Vec<SpMat>> { 
        let t = self.table;
        let entries = self.entries(i)?;
        let mult = self.theory.multiplicity();

        let mats = entries.into_iter().enumerate().map(|(jx, es)| {
            let j = t.j_at(jx);
            let (rows, cols) = (t.rank(i + 1, j), t.rank(i, j));

            let a = if mult == 1 { 
                SpMat::from_entries(rows, cols, es.iter().map(|e|
                    (e.tgt, e.src, Int::from(e.coef))
                ))
            } else {
                // basis {x, ux}: u * ux = x.
                SpMat::from_entries(rows, cols, es.iter().flat_map(|e|
                    (0..2).map(move |x| {
                        let y = x ^ (e.unit as usize);
                        (2 * e.tgt + y, 2 * e.src + x, Int::from(e.coef))
                    })
                ))
            };

            debug!("d({i}, {j}): {rows} x {cols}, nnz: {}", a.nnz());
            a
        }).collect_vec();

        info!("differential d^{i}: {} gradings", mats.len());

        Ok(mats)
    }
}
