use std::fmt::Display;

/// A vertex of the resolution cube: bit `k` is the resolution chosen at
/// crossing `k`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(u64);

impl State {
    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn weight(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_set(&self, k: usize) -> bool {
        (self.0 >> k) & 1 == 1
    }

    pub fn with(&self, k: usize) -> Self {
        Self(self.0 | (1 << k))
    }

    /// `(-1)^m` where `m` is the number of 1-resolutions before crossing `k`.
    pub fn sign_before(&self, k: usize) -> i8 {
        let m = (self.0 & ((1 << k) - 1)).count_ones();
        if m % 2 == 0 { 1 } else { -1 }
    }

    pub fn all(n: usize) -> impl Iterator<Item = State> {
        (0..1u64 << n).map(State)
    }

    pub fn of_weight(n: usize, w: usize) -> States {
        States::new(n, w)
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:b}", self.0)
    }
}

/// States of fixed weight in increasing order (Gosper's hack).
#[derive(Clone, Debug)]
pub struct States {
    next: Option<u64>,
    limit: u64,
}

impl States {
    fn new(n: usize, w: usize) -> Self {
        let next = (w <= n).then(|| (1u64 << w) - 1);
        Self { next, limit: 1u64 << n }
    }
}

impl Iterator for States {
    type Item = State;

    fn next(&mut self) -> Option<Self::Item> {
        let x = self.next?;
        self.next = if x == 0 {
            None
        } else {
            let c = x & x.wrapping_neg();
            let r = x + c;
            let y = (((r ^ x) >> 2) / c) | r;
            (y < self.limit).then_some(y)
        };
        Some(State(x))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use super::*;

    #[test]
    fn of_weight() {
        let s = State::of_weight(4, 2).map(|s| s.bits()).collect_vec();
        assert_eq!(s, vec![0b0011, 0b0101, 0b0110, 0b1001, 0b1010, 0b1100]);
    }

    #[test]
    fn of_weight_edge_cases() {
        assert_eq!(State::of_weight(3, 0).count(), 1);
        assert_eq!(State::of_weight(3, 3).count(), 1);
        assert_eq!(State::of_weight(3, 4).count(), 0);
        assert_eq!(State::of_weight(0, 0).count(), 1);
    }

    #[test]
    fn weights_cover_cube() {
        let n = 6;
        let total: usize = (0..=n).map(|w| State::of_weight(n, w).count()).sum();
        assert_eq!(total, 1 << n);
    }

    #[test]
    fn sign_before() {
        let v = State::new(0b1011);
        assert_eq!(v.sign_before(0), 1);
        assert_eq!(v.sign_before(1), -1);
        assert_eq!(v.sign_before(2), 1);
        assert_eq!(v.sign_before(4), -1);
        assert_eq!(v.with(2).bits(), 0b1111);
    }
}
