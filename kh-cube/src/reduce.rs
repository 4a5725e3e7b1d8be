use std::collections::VecDeque;

use itertools::Itertools;
use log::{debug, trace};
use num_traits::{One, Signed};

use crate::error::{bail, Result};
use crate::matrix::SpMat;
use crate::snf::smith_diagonal;
use crate::Int;

/// A complex `C^0 -> C^1 -> ... -> C^{n-1}` (one secondary grading) after
/// unit cancellation and Smith normal form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReducedPiece { 
    ranks: Vec<usize>,
    reduced_ranks: Vec<usize>,
    cancelled: Vec<usize>,
    diagonals: Vec<Vec<Int>>,
}

impl ReducedPiece {
    pub fn len(&self) -> usize { 
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool { 
        self.ranks.is_empty()
    }

    pub fn rank(&self, t: usize) -> usize { 
        self.ranks[t]
    }

    pub fn reduced_rank(&self, t: usize) -> usize { 
        self.reduced_ranks[t]
    }

    /// Pairs cancelled along `d_t`.
    pub fn cancelled(&self, t: usize) -> usize { 
        self.cancelled.get(t).cloned().unwrap_or(0)
    }

    /// Smith diagonal of the reduced `d_t`.
    pub fn diagonal(&self, t: usize) -> &[Int] { 
        self.diagonals.get(t).map(|d| d.as_slice()).unwrap_or(&[])
    }

    /// Rank of the original `d_t`.
    pub fn diff_rank(&self, t: usize) -> usize { 
        self.cancelled(t) + self.diagonal(t).len()
    }

    fn diag_before(&self, t: usize) -> &[Int] {
        if t == 0 { &[] } else { self.diagonal(t - 1) }
    }

    pub fn homology_rank(&self, t: usize) -> usize { 
        self.reduced_ranks[t] - self.diagonal(t).len() - self.diag_before(t).len()
    }

    pub fn torsion(&self, t: usize) -> Vec<Int> {
        self.diag_before(t).iter().filter(|x| !x.is_one()).cloned().collect()
    }

    // Telescoping the original ranks against the homology must leave
    // exactly nothing for the last differential.
    fn check(&self) -> Result<()> { 
        let mut prev = 0isize;
        for t in 0..self.len() {
            let h = self.reduced_ranks[t] as isize
                - self.diagonal(t).len() as isize
                - self.diag_before(t).len() as isize;
            let r = self.ranks[t] as isize - h - prev;

            if h < 0 || r < 0 || (t + 1 < self.len() && r != self.diff_rank(t) as isize) { 
                bail!(InternalConsistency, "wrong complex ranks at {t}: h = {h}, r = {r}");
            }
            if t + 1 == self.len() && r != 0 { 
                bail!(InternalConsistency, "wrong complex ranks: {r} left at the top");
            }
            prev = r;
        }
        Ok(())
    }
}

//       a
//  v0 - - -> v1         .             .
//     \   / b
//       /         ==>
//     /   \ c              d - ca⁻¹b
//  w0 -----> w1         w0 ---------> w1
//       d
fn eliminate(diffs: &mut [SpMat], t: usize, y: usize, x: usize) { 
    let d = &mut diffs[t];
    let Some(u) = d.get(y, x).cloned() else { return };

    let col = d.col_support(x).iter().filter(|&&z| z != y).map(|&z|
        (z, d.get(z, x).cloned().unwrap_or_default())
    ).collect_vec();
    let row = d.row(y).iter().filter(|(&w, _)| w != x).map(|(&w, b)|
        (w, b.clone())
    ).collect_vec();

    // u = ±1, so u⁻¹ = u.
    for (z, c) in col.iter() { 
        let cu = c * &u;
        for (w, b) in row.iter() { 
            d.add_to(*z, *w, -(&cu * b));
        }
    }

    d.clear_row(y);
    d.clear_col(x);

    if t > 0 { 
        diffs[t - 1].clear_row(x);
    }
    if t + 1 < diffs.len() { 
        diffs[t + 1].clear_col(y);
    }
}

// Among the unit entries of column x, the one with the fewest fill-ins.
fn find_unit(d: &SpMat, x: usize) -> Option<usize> { 
    let ncol = d.col_support(x).len();
    d.col_support(x).iter().filter(|&&y|
        d.get(y, x).map_or(false, |a| a.abs().is_one())
    ).min_by_key(|&&y|
        ((d.row(y).len() - 1) * (ncol - 1), y)
    ).cloned()
}

/// Reduces the complex with the given chain ranks and differentials
/// `diffs[t]: C^t -> C^{t+1}`.
pub fn reduce_piece(ranks: Vec<usize>, mut diffs: Vec<SpMat>) -> Result<ReducedPiece> { 
    let n = ranks.len();
    if diffs.len() + 1 != n.max(1) { 
        bail!(InternalConsistency, "{} differentials for {} groups", diffs.len(), n);
    }
    for (t, d) in diffs.iter().enumerate() { 
        if d.shape() != (ranks[t + 1], ranks[t]) { 
            bail!(InternalConsistency, "d_{t} has shape {:?}, expected {:?}", d.shape(), (ranks[t + 1], ranks[t]));
        }
    }

    let mut alive = ranks.iter().map(|&r| vec![true; r]).collect_vec();
    let mut cancelled = vec![0; diffs.len()];

    for t in 0..diffs.len() { 
        let mut queue: VecDeque<usize> = (0..ranks[t]).collect();
        let mut queued = vec![true; ranks[t]];

        while let Some(x) = queue.pop_front() { 
            queued[x] = false;
            if !alive[t][x] { continue }

            let Some(y) = find_unit(&diffs[t], x) else { continue };

            // columns meeting row y receive fill-in
            let touched = diffs[t].row(y).keys().cloned().filter(|&w| w != x).collect_vec();

            trace!("eliminate d_{t}[{y}, {x}]");
            eliminate(&mut diffs, t, y, x);

            alive[t][x] = false;
            alive[t + 1][y] = false;
            cancelled[t] += 1;

            for w in touched {
                if !queued[w] && alive[t][w] { 
                    queued[w] = true;
                    queue.push_back(w);
                }
            }
        }
    }

    let reduced_ranks = alive.iter().map(|a| a.iter().filter(|&&b| b).count()).collect_vec();
    let indices = alive.iter().map(|a|
        a.iter().enumerate().filter(|(_, &b)| b).map(|(i, _)| i).collect_vec()
    ).collect_vec();

    let diagonals = diffs.iter().enumerate().map(|(t, d)| { 
        let a = d.submatrix(&indices[t + 1], &indices[t]);
        smith_diagonal(a)
    }).collect_vec();

    debug!("reduced ranks: {:?} -> {:?}", ranks, reduced_ranks);

    let piece = ReducedPiece { ranks, reduced_ranks, cancelled, diagonals };
    piece.check()?;

    Ok(piece)
}
