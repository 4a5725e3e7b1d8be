use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;
use num_traits::{One, Zero};

use crate::cycles::CycleCache;
use crate::diagram::Diagram;
use crate::error::ConjectureViolation;
use crate::homology::KhHomology;
use crate::poly::{Mono, Poly, Var};
use crate::state::State;
use crate::Int;

/// `Σ rank H^{i,j} · t^i q^j`.
pub fn rational_poly(h: &KhHomology) -> Poly { 
    Poly::from_terms(h.nonzero().map(|(idx, s)|
        (Mono::tq(idx.0, idx.1), Int::from(s.rank() as i64))
    ))
}

/// `Σ_p rank_p H^{i,j} · T_p t^i q^j`, summed over torsion orders `p`.
pub fn torsion_poly(h: &KhHomology) -> Poly { 
    Poly::from_terms(h.nonzero().flat_map(|(idx, s)|
        s.tors().iter().dedup_with_count().map(move |(n, p)| {
            let m = Mono::new([(Var::Tor(p.clone()), 1), (Var::T, idx.0), (Var::Q, idx.1)]);
            (m, Int::from(n as i64))
        })
    ))
}

/// `Σ (-1)^i rank H^{i,j} · q^j`.
pub fn euler_characteristic(h: &KhHomology) -> Poly { 
    rational_poly(h).subs(Var::T, -1, &Mono::one())
}

/// Polynomials as returned by `compute_polynomial`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolyOutput { 
    Combined(Poly),
    Split { rational: Poly, torsion: Poly },
    Terms(Vec<Poly>),
    SplitTerms { rational: Vec<Poly>, torsion: Vec<Poly> },
}

impl PolyOutput {
    pub fn new(h: &KhHomology, split: bool, as_vector: bool) -> Self {
        let (r, t) = (rational_poly(h), torsion_poly(h));
        match (split, as_vector) { 
            (false, false) => Self::Combined(&r + &t),
            (true,  false) => Self::Split { rational: r, torsion: t },
            (false, true)  => Self::Terms((&r + &t).split_terms()),
            (true,  true)  => Self::SplitTerms { rational: r.split_terms(), torsion: t.split_terms() },
        }
    }

    /// The combined polynomial, whatever the shape.
    pub fn total(&self) -> Poly {
        let sum = |ps: &[Poly]| ps.iter().fold(Poly::zero(), |acc, p| &acc + p);
        match self { 
            Self::Combined(p) => p.clone(),
            Self::Split { rational, torsion } => rational + torsion,
            Self::Terms(ps) => sum(ps),
            Self::SplitTerms { rational, torsion } => &sum(rational) + &sum(torsion),
        }
    }
}

impl Display for PolyOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = |ps: &[Poly]| format!("[{}]", ps.iter().join(", "));
        match self { 
            Self::Combined(p) => write!(f, "{p}"),
            Self::Split { rational, torsion } => write!(f, "rational: {rational}\ntorsion: {torsion}"),
            Self::Terms(ps) => write!(f, "{}", list(ps)),
            Self::SplitTerms { rational, torsion } => write!(f, "rational: {}\ntorsion: {}", list(rational), list(torsion)),
        }
    }
}

/// Result of a successful [`check_conjecture1`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conjecture1 {
    pub s: isize,
    pub remainder: Poly,
}

fn violation<T>(msg: String) -> Result<T, ConjectureViolation> {
    Err(ConjectureViolation::new(msg))
}

/// Splits the rational Khovanov polynomial as
///
/// ```text
///   Kh = q^{s-1} (1 + q^2) F + (1 + t q^4) Kh'
/// ```
///
/// with `F` the given linking factor and `Kh'` having nonnegative
/// coefficients.
pub fn check_conjecture1(kh: &Poly, factor: &Poly) -> Result<Conjecture1, ConjectureViolation> { 
    if kh.terms().any(|(m, _)| m.vars().any(|(v, _)| matches!(v, Var::Tor(_)))) { 
        return violation(format!("{kh} has torsion terms"))
    }

    let at = Mono::q(-4);
    let base = &(Poly::one() + Poly::from(Mono::q(2))) * factor;
    let x = kh.subs(Var::T, -1, &at);
    let y = base.subs(Var::T, -1, &at);

    let Some((c, m)) = x.div_by_multiple(&y) else { 
        return violation(format!("Kh(t = -q^-4) = {x} is not a monomial multiple of {y}"))
    };
    if !c.is_one() || m.vars().any(|(v, _)| *v != Var::Q) { 
        return violation(format!("Kh(t = -q^-4) = {x} is {c}·({m}) times {y}"))
    }

    let s = m.deg(Var::Q) + 1;
    let rest = kh - &base.mul_mono(&m, &Int::one());

    let Some(remainder) = rest.div_one_plus(&Mono::tq(1, 4), Var::T) else {
        return violation(format!("{rest} is not divisible by 1 + t q^4"))
    };
    if !remainder.is_nonnegative() { 
        return violation(format!("Kh' = {remainder} has negative coefficients"))
    }

    Ok(Conjecture1 { s, remainder })
}

fn delta(m: &Mono) -> isize { 
    m.deg(Var::Q) - 2 * m.deg(Var::T)
}

/// `Kh'` lies on a single diagonal `j - 2i = δ`. Returns `δ`, or `None`
/// when `Kh'` vanishes.
pub fn check_thin(remainder: &Poly) -> Result<Option<isize>, ConjectureViolation> {
    let ds = remainder.terms().map(|(m, _)| delta(m)).sorted().dedup().collect_vec();
    match ds.len() { 
        0 => Ok(None),
        1 => Ok(Some(ds[0])),
        _ => violation(format!("Kh' = {remainder} spans diagonals {ds:?}")),
    }
}

/// Torsion is all of order 2 and equals `T t q^2 Kh'`.
pub fn check_torsion_conjecture(torsion: &Poly, remainder: &Poly) -> Result<(), ConjectureViolation> { 
    let odd = torsion.terms().flat_map(|(m, _)| m.vars()).filter_map(|(v, _)|
        match v {
            Var::Tor(p) if p != &Int::from(2) => Some(p.clone()),
            _ => None
        }
    ).sorted().dedup().collect_vec();

    if !odd.is_empty() { 
        return violation(format!("torsion of orders {odd:?}"))
    }

    let m = Mono::new([(Var::tor(2), 1), (Var::T, 1), (Var::Q, 2)]);
    let expected = remainder.mul_mono(&m, &Int::one());

    if &expected != torsion { 
        return violation(format!("torsion {torsion} differs from {expected}"))
    }
    Ok(())
}

/// Range of diagonals `δ = j - 2i` of a rational polynomial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Width { 
    pub min: isize,
    pub max: isize,
    pub width: isize,
}

/// Torsion terms are ignored. `None` for the zero polynomial.
pub fn homological_width(p: &Poly) -> Option<Width> { 
    let (min, max) = p.terms().filter(|(m, _)|
        m.vars().all(|(v, _)| !matches!(v, Var::Tor(_)))
    ).map(|(m, _)| delta(m)).minmax().into_option()?;

    Some(Width { min, max, width: (max - min) / 2 })
}

/// `Σ_E (t q^2)^{2 lk(E, L - E)}` over the sublinks `E` not containing
/// the first component.
pub fn linking_factor(d: &Diagram) -> Poly { 
    let n = d.ncomponents();
    if n <= 1 {
        return Poly::one()
    }

    let lk = (0..n).map(|a|
        (0..n).map(|b| d.linking_number(a, b)).collect_vec()
    ).collect_vec();

    let mut counts: BTreeMap<isize, i64> = BTreeMap::new();
    for e in 0..1usize << (n - 1) { 
        let in_e = |a: usize| a > 0 && (e >> (a - 1)) & 1 == 1;
        let l: isize = (0..n).filter(|&a| in_e(a)).flat_map(|a|
            (0..n).filter(|&b| !in_e(b)).map(move |b| (a, b))
        ).map(|(a, b)| lk[a][b]).sum();
        *counts.entry(2 * l).or_default() += 1;
    }

    Poly::from_terms(counts.into_iter().map(|(k, c)|
        (Mono::tq(k, 2 * k), Int::from(c))
    ))
}

/// Unnormalised Jones polynomial
/// `(-1)^{n-} q^{n+ - 2n-} Σ_v (-q)^{|v|} (q + q^{-1})^{c(v)}`.
pub fn jones_polynomial(d: &Diagram, cache: &CycleCache) -> Poly { 
    let n = d.ncrossings();

    let mut counts: BTreeMap<(usize, usize), i64> = BTreeMap::new();
    for v in State::all(n) { 
        *counts.entry((v.weight(), cache.count(v))).or_default() += 1;
    }

    let circle = &Poly::from(Mono::q(1)) + &Poly::from(Mono::q(-1));
    let max_c = counts.keys().map(|&(_, c)| c).max().unwrap_or(0);
    let powers = (0..=max_c).scan(Poly::one(), |acc, _| { 
        let p = acc.clone();
        *acc = &*acc * &circle;
        Some(p)
    }).collect_vec();

    let sum = counts.into_iter().fold(Poly::zero(), |acc, ((w, c), k)| {
        let sign = if w % 2 == 0 { k } else { -k };
        &acc + &powers[c].mul_mono(&Mono::q(w as isize), &Int::from(sign))
    });

    let (n_pos, n_neg) = (d.n_pos() as isize, d.n_neg() as isize);
    let sign = if n_neg % 2 == 0 { 1 } else { -1 };
    sum.mul_mono(&Mono::q(n_pos - 2 * n_neg), &Int::from(sign))
}
