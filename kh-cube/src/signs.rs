use log::{debug, info};

use crate::cycles::CycleCache;
use crate::diagram::Diagram;
use crate::error::{bail, Result};
use crate::state::State;

/// How the two paths around a square face `v -> v + e_j + e_k` (`j < k`)
/// change the cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceType { 
    MergeMerge,
    SplitSplit,
    /// One path merges first, the other splits first.
    Mixed,
    /// Both crossings merge at `v`, both split into `v11`.
    MergeSplit { same_tail: bool },
    /// Both crossings split at `v`, both merge into `v11`.
    SplitMerge { same_tail: bool },
}

impl FaceType {
    pub fn classify(d: &Diagram, cache: &CycleCache, v: State, j: usize, k: usize) -> FaceType { 
        let (v10, v01) = (v.with(j), v.with(k));
        let v11 = v10.with(k);

        let c00 = cache.count(v) as isize;
        let (c10, c01, c11) = (cache.count(v10) as isize, cache.count(v01) as isize, cache.count(v11) as isize);
        let (xj, xk) = (d.crossing(j), d.crossing(k));

        if c11 == c00 - 2 { 
            FaceType::MergeMerge
        } else if c11 == c00 + 2 {
            FaceType::SplitSplit
        } else if c10 != c01 { 
            FaceType::Mixed
        } else if c10 < c00 { 
            let m = cache.get(v11);
            FaceType::MergeSplit { same_tail: m.cycle_of(xj.edge(0)) == m.cycle_of(xk.edge(0)) }
        } else {
            let m = cache.get(v10);
            FaceType::SplitMerge { same_tail: m.cycle_of(xj.edge(0)) == m.cycle_of(xk.edge(0)) }
        }
    }

    /// True if the two composites around the face differ by the odd unit
    /// (before the standard signs are applied).
    pub fn is_twisted(&self) -> bool { 
        match self { 
            FaceType::MergeMerge | FaceType::Mixed => false,
            FaceType::SplitSplit => true,
            FaceType::MergeSplit { same_tail } |
            FaceType::SplitMerge { same_tail } => !same_tail
        }
    }
}

/// An assignment `s(v, k) ∈ {0, 1}` on the cube edges such that every face
/// of the odd cube anticommutes once edge maps are multiplied by
/// `u^{s(v, k)}`.
#[derive(Clone, Debug)]
pub struct SignCube {
    dim: usize,
    bits: Vec<u64>
}

impl SignCube {
    pub fn build(d: &Diagram, cache: &CycleCache) -> Self {
        let dim = d.ncrossings();
        let len = (1usize << dim) * dim;
        let mut cube = Self { dim, bits: vec![0; (len + 63) / 64] };

        // extend from the subcube spanned by the first k directions.
        for k in 0..dim { 
            for v in (0..1u64 << k).map(State::new) { 
                for j in (0..k).filter(|&j| !v.is_set(j)) { 
                    let t = FaceType::classify(d, cache, v, j, k).is_twisted();
                    let s = t ^ cube.get(v, j) ^ cube.get(v, k) ^ cube.get(v.with(j), k);
                    cube.set(v.with(k), j, s);
                }
            }
            debug!("sign cube: dim {}", k + 1);
        }

        info!("sign cube: {} edges", len);

        cube
    }

    pub fn dim(&self) -> usize { 
        self.dim
    }

    fn pos(&self, v: State, k: usize) -> usize { 
        v.bits() as usize * self.dim + k
    }

    pub fn get(&self, v: State, k: usize) -> bool { 
        let p = self.pos(v, k);
        (self.bits[p / 64] >> (p % 64)) & 1 == 1
    }

    fn set(&mut self, v: State, k: usize, b: bool) { 
        let p = self.pos(v, k);
        if b {
            self.bits[p / 64] |= 1 << (p % 64);
        } else {
            self.bits[p / 64] &= !(1 << (p % 64));
        }
    }

    /// Number of faces whose sign assignment disagrees with their type.
    pub fn count_bad_faces(&self, d: &Diagram, cache: &CycleCache) -> usize { 
        let n = self.dim;
        let mut bad = 0;

        for v in State::all(n) { 
            for k in (0..n).filter(|&k| !v.is_set(k)) { 
                for j in (0..k).filter(|&j| !v.is_set(j)) {
                    let t = FaceType::classify(d, cache, v, j, k).is_twisted();
                    let s = self.get(v, j) ^ self.get(v.with(j), k) ^ self.get(v, k) ^ self.get(v.with(k), j);
                    if s != t { 
                        bad += 1;
                    }
                }
            }
        }

        bad
    }

    pub fn check(&self, d: &Diagram, cache: &CycleCache) -> Result<()> {
        let bad = self.count_bad_faces(d, cache);
        if bad > 0 { 
            bail!(InternalConsistency, "sign cube: {bad} faces fail to anticommute");
        }
        Ok(())
    }
}
