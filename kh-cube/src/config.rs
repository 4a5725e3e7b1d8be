use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{bail, Result};
use crate::packing::Packing;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomologyType {
    #[default]
    #[display(fmt = "standard")]
    Standard,
    #[display(fmt = "reduced")]
    Reduced,
    #[display(fmt = "odd")]
    Odd,
    #[display(fmt = "reduced-odd")]
    ReducedOdd,
    #[display(fmt = "unified")]
    Unified,
}

/// Which coefficient the split/merge maps pick up when two X-labelled
/// cycles pass each other: `1` (even), `-1` (odd) or a formal unit `π`
/// with `π² = 1` (unified).
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Theory {
    Even,
    Odd,
    Unified,
}

impl HomologyType {
    pub const ALL: [HomologyType; 5] = [
        HomologyType::Standard,
        HomologyType::Reduced,
        HomologyType::Odd,
        HomologyType::ReducedOdd,
        HomologyType::Unified,
    ];

    pub fn is_reduced(&self) -> bool {
        matches!(self, Self::Reduced | Self::ReducedOdd)
    }

    pub fn theory(&self) -> Theory {
        match self {
            Self::Standard | Self::Reduced => Theory::Even,
            Self::Odd | Self::ReducedOdd   => Theory::Odd,
            Self::Unified                  => Theory::Unified,
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl Theory {
    pub fn needs_signs(&self) -> bool {
        !matches!(self, Theory::Even)
    }

    /// Number of Z-basis elements per enhanced state.
    pub fn multiplicity(&self) -> usize {
        match self {
            Theory::Unified => 2,
            _ => 1
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KhConfig {
    pub homology_type: HomologyType,
    pub capacity: usize,
    pub max_generators: u32,
    pub max_q_size: u32,
    pub max_entries: usize,
    pub max_crossings: usize,
    pub verbosity: u8,
    pub debug: bool,
}

impl Default for KhConfig {
    fn default() -> Self {
        Self { 
            homology_type: HomologyType::Standard,
            capacity: 64,
            max_generators: 1 << 24,
            max_q_size: 256,
            max_entries: 1 << 28,
            max_crossings: 24,
            verbosity: 0,
            debug: false,
        }
    }
}

impl KhConfig {
    pub fn with_type(mut self, t: HomologyType) -> Self {
        self.homology_type = t;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            bail!(CapacityExceeded, "capacity must be positive");
        }
        if self.max_generators < 2 || self.max_q_size == 0 { 
            bail!(CapacityExceeded, "max_generators = {}, max_q_size = {}", self.max_generators, self.max_q_size);
        }
        if (self.max_generators as u64) * (self.max_q_size as u64) > (u32::MAX as u64) + 1 { 
            bail!(CapacityExceeded, "max_generators * max_q_size must fit in 32 bits");
        }
        if self.max_crossings > 62 {
            bail!(CapacityExceeded, "max_crossings = {} is beyond the cube bit width", self.max_crossings);
        }
        Ok(())
    }

    pub fn packing(&self) -> Packing {
        Packing::new(self.max_generators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() { 
        assert!(KhConfig::default().validate().is_ok());
    }

    #[test]
    fn packing_overflow() {
        let c = KhConfig { max_generators: 1 << 24, max_q_size: 1 << 9, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn theory() {
        assert_eq!(HomologyType::ReducedOdd.theory(), Theory::Odd);
        assert!(HomologyType::ReducedOdd.is_reduced());
        assert!(!HomologyType::Unified.is_reduced());
        assert_eq!(HomologyType::Unified.theory().multiplicity(), 2);
    }

    #[test]
    fn deserialize() {
        let c: KhConfig = serde_json::from_str(r#"{ "homology_type": "reduced_odd", "capacity": 4 }"#).unwrap();
        assert_eq!(c.homology_type, HomologyType::ReducedOdd);
        assert_eq!(c.capacity, 4);
        assert_eq!(c.max_q_size, 256);
    }
}
