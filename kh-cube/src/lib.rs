//! Exact Khovanov homology of knot and link diagrams.
//!
//! The crate builds the enhanced-state cube of a PD-code diagram, assembles
//! the bigraded differentials over the integers (even, odd or unified
//! theory), reduces them by unit cancellation followed by Smith normal form
//! and extracts Betti numbers, torsion and polynomial invariants.
//!
//! All state lives in a [`DiagramStore`]:
//!
//! ```no_run
//! use kh_cube::{Diagram, DiagramStore, KhConfig};
//!
//! let mut store = DiagramStore::new(KhConfig::default()).unwrap();
//! let slot = store.initialize_diagram(Diagram::load("3_1").unwrap(), "3_1", None).unwrap();
//! let h = store.homology(slot).unwrap();
//! assert_eq!(h[(-2, -7)].tors().len(), 1);
//! ```

mod error;
mod config;
mod diagram;
mod cycles;
mod state;
mod packing;
mod states;
mod signs;
mod builder;
mod matrix;
mod snf;
mod reduce;
mod poly;
mod grid;
mod homology;
mod invariants;
mod store;

pub use error::{KhError, Result, ConjectureViolation};
pub use config::{HomologyType, Theory, KhConfig};
pub use diagram::{Edge, Crossing, Diagram};
pub use cycles::{CycleDecomp, CycleCache};
pub use state::{State, States};
pub use packing::{Packing, PackedVec};
pub use states::{StateTable, Binomials};
pub use signs::{FaceType, SignCube};
pub use builder::{Entry, DiffBuilder};
pub use matrix::{SpMat, DnsMat};
pub use snf::smith_diagonal;
pub use reduce::{ReducedPiece, reduce_piece};
pub use poly::{Var, Mono, Poly};
pub use grid::{isize2, Grid2, GridTrait};
pub use homology::{KhSummand, KhHomology};
pub use invariants::*;
pub use store::{SlotId, Status, Stage, Bounds, DiagramRecord, DiagramStore};

cfg_if::cfg_if! { 
    if #[cfg(feature = "i64")] { 
        pub type Int = i64;
    } else if #[cfg(feature = "i128")] { 
        pub type Int = i128;
    } else { 
        pub type Int = num_bigint::BigInt;
    }
}
