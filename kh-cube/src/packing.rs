use cfg_if::cfg_if;

/// Packs a (secondary index, local index) pair into one `u32` as
/// `j_index * base + local`. Requires `local < base`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packing {
    base: u32
}

impl Packing {
    pub fn new(base: u32) -> Self {
        assert!(base > 0);
        Self { base }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn pack(&self, j_index: usize, local: usize) -> u32 {
        debug_assert!(local < self.base as usize);
        (j_index as u32) * self.base + (local as u32)
    }

    pub fn unpack(&self, p: u32) -> (usize, usize) {
        ((p / self.base) as usize, (p % self.base) as usize)
    }
}

cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        /// Packed `u32` values, two per machine word.
        #[derive(Clone, Debug, Default)]
        pub struct PackedVec {
            words: Vec<u64>,
            len: usize,
        }

        impl PackedVec {
            pub fn with_capacity(n: usize) -> Self {
                Self { words: Vec::with_capacity((n + 1) / 2), len: 0 }
            }

            pub fn push(&mut self, p: u32) {
                if self.len % 2 == 0 {
                    self.words.push(p as u64);
                } else if let Some(w) = self.words.last_mut() {
                    *w |= (p as u64) << 32;
                }
                self.len += 1;
            }

            pub fn get(&self, i: usize) -> u32 {
                assert!(i < self.len);
                (self.words[i / 2] >> (32 * (i % 2))) as u32
            }
        }
    } else {
        /// Packed `u32` values.
        #[derive(Clone, Debug, Default)]
        pub struct PackedVec {
            words: Vec<u32>,
            len: usize,
        }

        impl PackedVec {
            pub fn with_capacity(n: usize) -> Self { 
                Self { words: Vec::with_capacity(n), len: 0 }
            }

            pub fn push(&mut self, p: u32) {
                self.words.push(p);
                self.len += 1;
            }

            pub fn get(&self, i: usize) -> u32 { 
                self.words[i]
            }
        }
    }
}

impl PackedVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool { 
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(|i| self.get(i))
    }
}
