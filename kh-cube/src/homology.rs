use std::collections::HashMap;
use std::fmt::Display;
use std::ops::{Index, RangeInclusive};

use cartesian::cartesian;
use delegate::delegate;
use itertools::Itertools;
use num_traits::Zero;

use crate::config::HomologyType;
use crate::grid::{isize2, Grid2, GridTrait};
use crate::Int;

/// A finitely generated abelian group `Z^r ⊕ Z/d_1 ⊕ ... ⊕ Z/d_k`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KhSummand {
    rank: usize,
    tors: Vec<Int>,
}

impl KhSummand {
    pub fn new(rank: usize, mut tors: Vec<Int>) -> Self {
        tors.sort();
        Self { rank, tors }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn rank(&self) -> usize { 
        self.rank
    }

    pub fn tors(&self) -> &Vec<Int> {
        &self.tors
    }

    /// Number of `Z/p` summands.
    pub fn tors_count(&self, p: &Int) -> usize {
        self.tors.iter().filter(|&x| x == p).count()
    }

    pub fn is_free(&self) -> bool {
        self.tors.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.rank == 0 && self.tors.is_empty()
    }
}

impl Display for KhSummand { 
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { 
        if self.is_zero() {
            return write!(f, "0")
        }

        let free = match self.rank { 
            0 => None,
            1 => Some("Z".to_string()),
            r => Some(format!("Z^{r}")),
        };
        let tors = self.tors.iter().dedup_with_count().map(|(n, p)|
            if n == 1 { format!("Z/{p}") } else { format!("(Z/{p})^{n}") }
        );
        let s = free.into_iter().chain(tors).join(" ⊕ ");
        write!(f, "{s}")
    }
}

/// Bigraded Khovanov homology `H^{i,j}` of a diagram.
#[derive(Clone, Debug)]
pub struct KhHomology {
    htype: HomologyType,
    inner: Grid2<KhSummand>,
    h_range: RangeInclusive<isize>,
    q_range: RangeInclusive<isize>,
}

impl KhHomology {
    pub(crate) fn new_impl(htype: HomologyType, h_range: RangeInclusive<isize>, q_range: RangeInclusive<isize>, mut table: HashMap<isize2, KhSummand>) -> Self {
        let support = cartesian!(h_range.clone(), q_range.clone().step_by(2)).map(|(i, j)|
            isize2(i, j)
        );
        let inner = Grid2::generate(support, |idx|
            table.remove(&idx).unwrap_or_default()
        );
        Self { htype, inner, h_range, q_range }
    }

    pub fn homology_type(&self) -> HomologyType {
        self.htype
    }

    pub fn h_range(&self) -> RangeInclusive<isize> { 
        self.h_range.clone()
    }

    pub fn q_range(&self) -> RangeInclusive<isize> {
        self.q_range.clone()
    }

    pub fn inner(&self) -> &Grid2<KhSummand> { 
        &self.inner
    }

    /// Nonzero groups in increasing `(i, j)`.
    pub fn nonzero(&self) -> impl Iterator<Item = (isize2, &KhSummand)> {
        self.inner.iter().filter(|(_, h)| !h.is_zero()).map(|(&idx, h)| (idx, h)).sorted_by_key(|(idx, _)| *idx)
    }

    pub fn total_rank(&self) -> usize {
        self.inner.iter().map(|(_, h)| h.rank()).sum()
    }

    /// Distinct torsion orders, increasing.
    pub fn torsion_orders(&self) -> Vec<Int> {
        self.inner.iter().flat_map(|(_, h)| h.tors().iter().cloned()).filter(|p| !p.is_zero()).sorted().dedup().collect()
    }

    pub fn is_free(&self) -> bool {
        self.inner.iter().all(|(_, h)| h.is_free())
    }

    /// Table with columns `i` and rows `j` (top to bottom decreasing).
    pub fn display_table(&self) -> String { 
        let is = self.h_range().collect_vec();
        let js = self.q_range().step_by(2).collect_vec();

        let cell = |i: isize, j: isize| {
            let h = &self[(i, j)];
            if h.is_zero() { ".".to_string() } else { h.to_string() }
        };

        let head = std::iter::once("j\\i".to_string()).chain(is.iter().map(|i| i.to_string())).collect_vec();
        let body = js.iter().rev().map(|&j|
            std::iter::once(j.to_string()).chain(is.iter().map(|&i| cell(i, j))).collect_vec()
        ).collect_vec();

        let ncols = head.len();
        let widths = (0..ncols).map(|c|
            std::iter::once(&head).chain(body.iter()).map(|r| r[c].chars().count()).max().unwrap_or(0)
        ).collect_vec();

        let fmt_row = |r: &Vec<String>| r.iter().zip(widths.iter()).map(|(s, &w)|
            format!("{s:>w$}")
        ).join(" | ");

        let sep = widths.iter().map(|&w| "-".repeat(w)).join("-+-");

        std::iter::once(fmt_row(&head)).chain(std::iter::once(sep)).chain(body.iter().map(fmt_row)).join("\n")
    }
}

impl GridTrait<isize2> for KhHomology {
    type Itr = std::vec::IntoIter<isize2>;
    type Output = KhSummand;

    delegate! {
        to self.inner {
            fn support(&self) -> Self::Itr;
            fn is_supported(&self, i: isize2) -> bool;
            fn get(&self, i: isize2) -> &Self::Output;
        }
    }
}

impl Index<isize2> for KhHomology {
    type Output = KhSummand;

    fn index(&self, index: isize2) -> &Self::Output {
        self.inner.get(index)
    }
}

impl Index<(isize, isize)> for KhHomology {
    type Output = KhSummand;

    fn index(&self, index: (isize, isize)) -> &Self::Output {
        self.inner.get(index.into())
    }
}

impl Display for KhHomology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_table())
    }
}
