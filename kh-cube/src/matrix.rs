use std::collections::{HashMap, HashSet};
use std::ops::Index;

use itertools::Itertools;
use num_traits::Zero;

use crate::Int;

/// Sparse integer matrix with row-major storage and a column index.
#[derive(Clone, Debug, Default)]
pub struct SpMat { 
    nrows: usize,
    ncols: usize,
    rows: Vec<HashMap<usize, Int>>,
    cols: Vec<HashSet<usize>>,
}

impl SpMat { 
    pub fn zero(nrows: usize, ncols: usize) -> Self { 
        Self {
            nrows,
            ncols,
            rows: vec![HashMap::new(); nrows],
            cols: vec![HashSet::new(); ncols]
        }
    }

    pub fn from_entries<I>(nrows: usize, ncols: usize, entries: I) -> Self
    where I: IntoIterator<Item = (usize, usize, Int)> {
        let mut a = Self::zero(nrows, ncols);
        for (i, j, x) in entries { 
            a.add_to(i, j, x);
        }
        a
    }

    pub fn shape(&self) -> (usize, usize) { 
        (self.nrows, self.ncols)
    }

    pub fn nnz(&self) -> usize { 
        self.rows.iter().map(|r| r.len()).sum()
    }

    pub fn is_zero(&self) -> bool { 
        self.rows.iter().all(|r| r.is_empty())
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&Int> { 
        self.rows[i].get(&j)
    }

    pub fn row(&self, i: usize) -> &HashMap<usize, Int> {
        &self.rows[i]
    }

    pub fn col_support(&self, j: usize) -> &HashSet<usize> {
        &self.cols[j]
    }

    pub fn add_to(&mut self, i: usize, j: usize, x: Int) { 
        if x.is_zero() {
            return
        }

        let e = self.rows[i].entry(j).or_insert_with(Int::zero);
        *e += x;

        if e.is_zero() {
            self.rows[i].remove(&j);
            self.cols[j].remove(&i);
        } else { 
            self.cols[j].insert(i);
        }
    }

    pub fn clear_row(&mut self, i: usize) {
        for (j, _) in self.rows[i].drain() {
            self.cols[j].remove(&i);
        }
    }

    pub fn clear_col(&mut self, j: usize) { 
        for i in self.cols[j].drain() { 
            self.rows[i].remove(&j);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Int)> { 
        self.rows.iter().enumerate().flat_map(|(i, r)|
            r.iter().map(move |(&j, x)| (i, j, x))
        )
    }

    /// `next ∘ self`.
    pub fn compose(&self, next: &SpMat) -> SpMat { 
        assert_eq!(self.nrows, next.ncols);

        let mut res = SpMat::zero(next.nrows, self.ncols);
        for (k, j, x) in self.iter() {
            for &i in next.cols[k].iter() {
                let y = &next.rows[i][&k];
                res.add_to(i, j, x * y);
            }
        }
        res
    }

    /// The dense submatrix on the given rows and columns.
    pub fn submatrix(&self, rows: &[usize], cols: &[usize]) -> DnsMat { 
        let col_pos: HashMap<usize, usize> = cols.iter().enumerate().map(|(p, &j)| (j, p)).collect();
        let data = rows.iter().map(|&i| {
            let mut r = vec![Int::zero(); cols.len()];
            for (j, x) in self.rows[i].iter() {
                if let Some(&p) = col_pos.get(j) { 
                    r[p] = x.clone();
                }
            }
            r
        }).collect_vec();

        DnsMat::from_rows(rows.len(), cols.len(), data)
    }

    pub fn to_dense(&self) -> DnsMat { 
        self.submatrix(&(0..self.nrows).collect_vec(), &(0..self.ncols).collect_vec())
    }
}

/// Dense integer matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsMat {
    nrows: usize,
    ncols: usize,
    data: Vec<Vec<Int>>,
}

impl DnsMat { 
    pub fn from_rows(nrows: usize, ncols: usize, data: Vec<Vec<Int>>) -> Self { 
        assert_eq!(data.len(), nrows);
        assert!(data.iter().all(|r| r.len() == ncols));
        Self { nrows, ncols, data }
    }

    pub fn from_i64<const M: usize, const N: usize>(a: [[i64; N]; M]) -> Self { 
        let data = a.iter().map(|r| r.iter().map(|&x| Int::from(x)).collect()).collect();
        Self::from_rows(M, N, data)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn rows(&self) -> &Vec<Vec<Int>> {
        &self.data
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Int>> { 
        &mut self.data
    }

    pub fn mul(&self, other: &DnsMat) -> DnsMat { 
        assert_eq!(self.ncols, other.nrows);
        let data = (0..self.nrows).map(|i|
            (0..other.ncols).map(|j|
                (0..self.ncols).fold(Int::zero(), |acc, k| acc + &self.data[i][k] * &other.data[k][j])
            ).collect()
        ).collect();
        DnsMat::from_rows(self.nrows, other.ncols, data)
    }
}

impl Index<(usize, usize)> for DnsMat {
    type Output = Int;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output { 
        &self.data[i][j]
    }
}
