use clap::ValueEnum;
use derive_more::Display;
use serde::Deserialize;

use kh_cube::HomologyType;

#[derive(Clone, Copy, ValueEnum, Display, Debug, Deserialize, Default, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum HType {
    #[default] Standard,
    Reduced,
    Odd,
    ReducedOdd,
    Unified,
}

impl From<HType> for HomologyType {
    fn from(t: HType) -> Self {
        match t {
            HType::Standard   => HomologyType::Standard,
            HType::Reduced    => HomologyType::Reduced,
            HType::Odd        => HomologyType::Odd,
            HType::ReducedOdd => HomologyType::ReducedOdd,
            HType::Unified    => HomologyType::Unified,
        }
    }
}
