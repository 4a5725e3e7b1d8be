use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use auto_impl_ops::auto_ops;
use itertools::Itertools;
use num_traits::{One, Signed, Zero};

use crate::Int;

/// Polynomial variables: the torsion symbols `T` (order 2) and `T<p>`,
/// the homological variable `t` and the quantum variable `q`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Var {
    Tor(Int),
    T,
    Q,
}

impl Var { 
    pub fn tor<P: Into<Int>>(p: P) -> Self {
        Var::Tor(p.into())
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { 
            Var::Tor(p) if p == &Int::from(2) => write!(f, "T"),
            Var::Tor(p) => write!(f, "T{p}"),
            Var::T => write!(f, "t"),
            Var::Q => write!(f, "q"),
        }
    }
}

/// A Laurent monomial.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mono(BTreeMap<Var, isize>);

impl Mono {
    pub fn one() -> Self { 
        Self::default()
    }

    pub fn new<I>(exps: I) -> Self
    where I: IntoIterator<Item = (Var, isize)> {
        let mut m = Self::one();
        for (v, e) in exps { 
            m.mul_var(v, e);
        }
        m
    }

    pub fn tq(t: isize, q: isize) -> Self { 
        Self::new([(Var::T, t), (Var::Q, q)])
    }

    pub fn q(q: isize) -> Self { 
        Self::new([(Var::Q, q)])
    }

    fn mul_var(&mut self, v: Var, e: isize) {
        let d = self.0.entry(v.clone()).or_insert(0);
        *d += e;
        if *d == 0 { 
            self.0.remove(&v);
        }
    }

    pub fn deg(&self, v: Var) -> isize { 
        self.0.get(&v).cloned().unwrap_or(0)
    }

    pub fn is_one(&self) -> bool { 
        self.0.is_empty()
    }

    pub fn vars(&self) -> impl Iterator<Item = (&Var, &isize)> {
        self.0.iter()
    }

    pub fn mul(&self, other: &Mono) -> Mono {
        let mut m = self.clone();
        for (v, &e) in other.0.iter() {
            m.mul_var(v.clone(), e);
        }
        m
    }

    pub fn pow(&self, k: isize) -> Mono { 
        Self::new(self.0.iter().map(|(v, &e)| (v.clone(), e * k)))
    }

    pub fn inv(&self) -> Mono { 
        self.pow(-1)
    }

    // monomial order used for leading terms.
    fn key(&self) -> (isize, isize, Vec<(Var, isize)>) {
        let rest = self.0.iter().filter(|(v, _)| matches!(v, Var::Tor(_))).map(|(v, &e)| (v.clone(), e)).collect();
        (self.deg(Var::T), self.deg(Var::Q), rest)
    }
}

impl Display for Mono {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { 
        if self.is_one() {
            return write!(f, "1")
        }
        let s = self.0.iter().map(|(v, &e)|
            if e == 1 { v.to_string() } else { format!("{v}^{e}") }
        ).join(" ");
        write!(f, "{s}")
    }
}

/// A Laurent polynomial with integer coefficients.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Poly {
    terms: BTreeMap<Mono, Int>
}

impl Poly {
    pub fn mono(m: Mono, c: Int) -> Self { 
        let mut p = Self::default();
        p.add_term(m, c);
        p
    }

    pub fn var(v: Var) -> Self {
        Self::mono(Mono::new([(v, 1)]), Int::one())
    }

    pub fn from_terms<I>(terms: I) -> Self
    where I: IntoIterator<Item = (Mono, Int)> {
        let mut p = Self::default();
        for (m, c) in terms { 
            p.add_term(m, c);
        }
        p
    }

    /// `Σ c t^i q^j`.
    pub fn from_tq<I>(terms: I) -> Self
    where I: IntoIterator<Item = (isize, isize, i64)> { 
        Self::from_terms(terms.into_iter().map(|(i, j, c)| (Mono::tq(i, j), Int::from(c))))
    }

    fn add_term(&mut self, m: Mono, c: Int) {
        if c.is_zero() { 
            return
        }
        let e = self.terms.entry(m.clone()).or_insert_with(Int::zero);
        *e += c;
        if e.is_zero() { 
            self.terms.remove(&m);
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Mono, &Int)> {
        self.terms.iter()
    }

    pub fn nterms(&self) -> usize {
        self.terms.len()
    }

    pub fn coeff(&self, m: &Mono) -> Int { 
        self.terms.get(m).cloned().unwrap_or_else(Int::zero)
    }

    pub fn is_monomial(&self) -> bool {
        self.terms.len() == 1
    }

    pub fn min_deg(&self, v: Var) -> Option<isize> { 
        self.terms.keys().map(|m| m.deg(v.clone())).min()
    }

    pub fn max_deg(&self, v: Var) -> Option<isize> {
        self.terms.keys().map(|m| m.deg(v.clone())).max()
    }

    pub fn is_nonnegative(&self) -> bool {
        self.terms.values().all(|c| !c.is_negative())
    }

    fn lowest(&self, v: Var) -> Option<(Mono, Int)> { 
        self.terms.iter().min_by_key(|(m, _)| m.deg(v.clone())).map(|(m, c)| (m.clone(), c.clone()))
    }

    fn leading(&self) -> Option<(&Mono, &Int)> {
        self.terms.iter().min_by_key(|(m, _)| m.key())
    }

    pub fn mul_mono(&self, m: &Mono, c: &Int) -> Poly {
        Self::from_terms(self.terms.iter().map(|(m1, c1)| (m1.mul(m), c1 * c)))
    }

    /// Substitutes `v ↦ sign · m`.
    pub fn subs(&self, v: Var, sign: i8, m: &Mono) -> Poly { 
        Self::from_terms(self.terms.iter().map(|(m1, c1)| {
            let e = m1.deg(v.clone());
            let rest = m1.mul(&Mono::new([(v.clone(), -e)]));
            let c = if sign < 0 && e % 2 != 0 { -c1.clone() } else { c1.clone() };
            (rest.mul(&m.pow(e)), c)
        }))
    }

    /// Exact quotient by `1 + m`, where `m` has positive degree in `v`.
    pub fn div_one_plus(&self, m: &Mono, v: Var) -> Option<Poly> {
        assert!(m.deg(v.clone()) > 0);

        let Some(top) = self.max_deg(v.clone()) else {
            return Some(Poly::zero())
        };

        let mut r = self.clone();
        let mut q = Poly::zero();

        while let Some((m0, c)) = r.lowest(v.clone()) {
            if m0.deg(v.clone()) > top {
                return None
            }
            r.add_term(m0.mul(m), -c.clone());
            r.add_term(m0.clone(), -c.clone());
            q.add_term(m0, c);
        }

        Some(q)
    }

    /// Finds `(c, m)` with `self = c · m · other`.
    pub fn div_by_multiple(&self, other: &Poly) -> Option<(Int, Mono)> { 
        let (m1, c1) = self.leading()?;
        let (m2, c2) = other.leading()?;

        if !(c1 % c2).is_zero() { 
            return None
        }

        let c = c1 / c2;
        let m = m1.mul(&m2.inv());

        (&other.mul_mono(&m, &c) == self).then_some((c, m))
    }

    /// Each term as a polynomial of its own.
    pub fn split_terms(&self) -> Vec<Poly> { 
        self.sorted_terms().into_iter().map(|(m, c)| Poly::mono(m.clone(), c.clone())).collect()
    }

    pub fn sorted_terms(&self) -> Vec<(&Mono, &Int)> {
        self.terms.iter().sorted_by_key(|(m, _)| m.key()).collect()
    }
}

impl From<Mono> for Poly {
    fn from(m: Mono) -> Self { 
        Self::mono(m, Int::one())
    }
}

#[auto_ops]
impl<'a> Add for &'a Poly {
    type Output = Poly;
    fn add(self, rhs: Self) -> Self::Output {
        let mut res = self.clone();
        for (m, c) in rhs.terms.iter() { 
            res.add_term(m.clone(), c.clone());
        }
        res
    }
}

#[auto_ops]
impl<'a> Sub for &'a Poly {
    type Output = Poly;
    fn sub(self, rhs: Self) -> Self::Output { 
        let mut res = self.clone();
        for (m, c) in rhs.terms.iter() { 
            res.add_term(m.clone(), -c.clone());
        }
        res
    }
}

#[auto_ops]
impl<'a> Mul for &'a Poly {
    type Output = Poly;
    fn mul(self, rhs: Self) -> Self::Output {
        let mut res = Poly::zero();
        for ((m1, c1), (m2, c2)) in self.terms.iter().cartesian_product(rhs.terms.iter()) { 
            res.add_term(m1.mul(m2), c1 * c2);
        }
        res
    }
}

impl Neg for Poly {
    type Output = Poly;
    fn neg(mut self) -> Self::Output { 
        for c in self.terms.values_mut() {
            *c = -c.clone();
        }
        self
    }
}

impl Zero for Poly {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }
}

impl One for Poly {
    fn one() -> Self { 
        Self::mono(Mono::one(), Int::one())
    }
}

impl Display for Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() { 
            return write!(f, "0")
        }

        for (k, (m, c)) in self.sorted_terms().into_iter().enumerate() { 
            let a = c.abs();
            let sign = match (k, c.is_negative()) {
                (0, false) => "",
                (0, true)  => "-",
                (_, false) => " + ",
                (_, true)  => " - ",
            };
            if m.is_one() { 
                write!(f, "{sign}{a}")?;
            } else if a.is_one() {
                write!(f, "{sign}{m}")?;
            } else { 
                write!(f, "{sign}{a}{m}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(e: isize) -> Poly { 
        Poly::from(Mono::q(e))
    }

    #[test]
    fn arithmetic() {
        let a = &q(1) + &q(-1);
        let b = &q(1) - &q(-1);
        assert_eq!(&a * &b, &q(2) - &q(-2));
        assert!((&a - &a).is_zero());
        assert_eq!(-(a.clone()), &Poly::zero() - &a);
    }

    #[test]
    fn owned_ops() { 
        let a = q(1) + q(-1);
        let b = a.clone() * q(2);
        assert_eq!(b, q(3) + q(1));
    }

    #[test]
    fn assign_ops() {
        let mut a = q(1);
        a += q(-1);
        a *= &q(2);
        a -= q(1);
        assert_eq!(a, q(3));
    }

    #[test]
    fn display() { 
        let p = Poly::from_tq([(0, -1, 1), (0, -3, 1), (-2, -5, 1), (-3, -9, 1)]);
        assert_eq!(p.to_string(), "t^-3 q^-9 + t^-2 q^-5 + q^-3 + q^-1");

        let p = Poly::from_tq([(0, 0, -2), (1, 2, 3)]);
        assert_eq!(p.to_string(), "-2 + 3t q^2");

        let p = Poly::mono(Mono::new([(Var::tor(2), 1), (Var::T, -2), (Var::Q, -7)]), Int::one());
        assert_eq!(p.to_string(), "T t^-2 q^-7");

        let p = Poly::var(Var::tor(3));
        assert_eq!(p.to_string(), "T3");

        assert_eq!(Poly::zero().to_string(), "0");
    }

    #[test]
    fn subs() { 
        // t^-2 q^-5 at t = -q^-4
        let p = Poly::from_tq([(-2, -5, 1), (-3, -9, 1)]);
        let s = p.subs(Var::T, -1, &Mono::q(-4));
        assert!(s.is_zero());

        let p = Poly::from_tq([(1, 0, 1), (2, 1, 1)]);
        assert_eq!(p.subs(Var::T, -1, &Mono::one()), &q(1) - &Poly::one());
    }

    #[test]
    fn div_one_plus() { 
        let m = Mono::tq(1, 4);
        let d = &Poly::one() + &Poly::from(m.clone());
        let p = Poly::from_tq([(-3, -9, 1), (2, 5, -4), (0, 1, 7)]);

        let prod = &p * &d;
        assert_eq!(prod.div_one_plus(&m, Var::T), Some(p));

        let r = &prod + &Poly::one();
        assert_eq!(r.div_one_plus(&m, Var::T), None);
        assert_eq!(Poly::zero().div_one_plus(&m, Var::T), Some(Poly::zero()));
    }

    #[test]
    fn div_by_multiple() { 
        let a = &q(1) + &q(3);
        let b = Poly::mono(Mono::q(-2), Int::from(3)) * (&q(1) + &q(3));
        assert_eq!(b.div_by_multiple(&a), Some((Int::from(3), Mono::q(-2))));

        let c = &b + &q(0);
        assert_eq!(c.div_by_multiple(&a), None);
    }

    #[test]
    fn nonnegative() { 
        assert!(Poly::from_tq([(0, 1, 2), (1, 3, 1)]).is_nonnegative());
        assert!(!Poly::from_tq([(0, 1, 2), (1, 3, -1)]).is_nonnegative());
    }
}
