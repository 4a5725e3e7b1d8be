use num_traits::{Signed, Zero};

use crate::matrix::DnsMat;
use crate::Int;

/// The nonzero diagonal entries `d_1 | d_2 | ... | d_r` (all positive) of
/// the Smith normal form of `a`.
pub fn smith_diagonal(mut a: DnsMat) -> Vec<Int> { 
    let (m, n) = a.shape();
    let rows = a.rows_mut();
    let mut diag = vec![];

    for t in 0..m.min(n) { 
        let Some((i, j)) = find_pivot(rows, t..m, t..n) else { 
            break
        };
        rows.swap(t, i);
        swap_cols(rows, t, j);

        loop {
            let mut clean = true;

            for i in t + 1..m { 
                if rows[i][t].is_zero() { continue }
                let q = &rows[i][t] / &rows[t][t];
                let (top, bottom) = rows.split_at_mut(i);
                for (x, p) in bottom[0][t..].iter_mut().zip(top[t][t..].iter()) { 
                    *x -= &q * p;
                }
                clean &= rows[i][t].is_zero();
            }

            for j in t + 1..n { 
                if rows[t][j].is_zero() { continue }
                let q = &rows[t][j] / &rows[t][t];
                for r in rows[t..].iter_mut() { 
                    let y = &q * &r[t];
                    r[j] -= y;
                }
                clean &= rows[t][j].is_zero();
            }

            if !clean { 
                // a remainder is smaller than the pivot.
                let next = find_pivot(rows, t..m, t..t + 1).into_iter()
                    .chain(find_pivot(rows, t..t + 1, t..n))
                    .min_by_key(|&(i, j)| rows[i][j].abs());

                if let Some((i, j)) = next {
                    rows.swap(t, i);
                    swap_cols(rows, t, j);
                }
                continue
            }

            let p = rows[t][t].clone();
            let bad = (t + 1..m).find(|&i|
                rows[i][t + 1..].iter().any(|x| !(x % &p).is_zero())
            );

            if let Some(i) = bad { 
                let (top, bottom) = rows.split_at_mut(i);
                for (x, y) in top[t][t..].iter_mut().zip(bottom[0][t..].iter()) { 
                    *x += y;
                }
                continue
            }

            break
        }

        diag.push(rows[t][t].abs());
    }

    diag
}

fn find_pivot(rows: &[Vec<Int>], is: std::ops::Range<usize>, js: std::ops::Range<usize>) -> Option<(usize, usize)> { 
    let mut best: Option<(usize, usize, Int)> = None;
    for i in is { 
        for j in js.clone() { 
            let x = &rows[i][j];
            if x.is_zero() { continue }
            let a = x.abs();
            if best.as_ref().map_or(true, |(_, _, b)| &a < b) {
                best = Some((i, j, a));
            }
        }
    }
    best.map(|(i, j, _)| (i, j))
}

fn swap_cols(rows: &mut [Vec<Int>], j0: usize, j1: usize) { 
    if j0 == j1 { return }
    for r in rows.iter_mut() { 
        r.swap(j0, j1);
    }
}

#[cfg(test)]
mod tests {
    use num_traits::One;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    use super::*;

    fn diag(a: DnsMat) -> Vec<i64> { 
        smith_diagonal(a).into_iter().map(|x| x.to_string().parse().unwrap()).collect()
    }

    #[test]
    fn zero() {
        let a = DnsMat::from_i64([[0, 0], [0, 0]]);
        assert_eq!(diag(a), Vec::<i64>::new());
    }

    #[test]
    fn empty() {
        let a = DnsMat::from_rows(0, 3, vec![]);
        assert_eq!(diag(a), Vec::<i64>::new());
    }

    #[test]
    fn simple() { 
        let a = DnsMat::from_i64([[2, 4, 4], [-6, 6, 12], [10, -4, -16]]);
        assert_eq!(diag(a), vec![2, 6, 12]);
    }

    #[test]
    fn divisibility() { 
        // diag(2, 3) ~ diag(1, 6)
        let a = DnsMat::from_i64([[2, 0], [0, 3]]);
        assert_eq!(diag(a), vec![1, 6]);
    }

    #[test]
    fn rank_deficient() { 
        let a = DnsMat::from_i64([[1, 2, 3], [2, 4, 6], [1, 0, 1]]);
        assert_eq!(diag(a), vec![1, 2]);
    }

    #[test]
    fn z2_torsion() { 
        // boundary of RP^2
        let a = DnsMat::from_i64([[1, 1], [1, -1]]);
        assert_eq!(diag(a), vec![1, 2]);
    }

    #[test]
    fn large_entries() { 
        let p = Int::from(1_000_000_007i64);
        let a = DnsMat::from_rows(2, 2, vec![
            vec![p.clone(), Int::zero()],
            vec![Int::zero(), p.clone()],
        ]);
        assert_eq!(smith_diagonal(a), vec![p.clone(), p]);
    }

    fn unimodular(rng: &mut StdRng, n: usize) -> DnsMat { 
        let mut u = DnsMat::from_rows(n, n, (0..n).map(|i|
            (0..n).map(|j| if i == j { Int::one() } else { Int::zero() }).collect()
        ).collect());

        for _ in 0..3 * n {
            let (i, j) = (rng.gen_range(0..n), rng.gen_range(0..n));
            if i == j { continue }
            let c = Int::from(rng.gen_range(-3i64..=3));
            let rows = u.rows_mut();
            for k in 0..n { 
                let y = &c * &rows[j][k];
                rows[i][k] += y;
            }
        }
        u
    }

    #[test]
    fn random_conjugation() {
        let mut rng = StdRng::seed_from_u64(1);
        let d = [1i64, 2, 2, 6, 0];

        for _ in 0..10 { 
            let n = d.len();
            let s = DnsMat::from_rows(n, n, (0..n).map(|i|
                (0..n).map(|j| Int::from(if i == j { d[i] } else { 0 })).collect()
            ).collect());
            let a = unimodular(&mut rng, n).mul(&s).mul(&unimodular(&mut rng, n));
            assert_eq!(diag(a), vec![1, 2, 2, 6]);
        }
    }
}
