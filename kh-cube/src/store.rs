use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::time::Instant;

use derive_more::Display;
use itertools::Itertools;
use log::{debug, info};

use crate::builder::DiffBuilder;
use crate::config::{HomologyType, KhConfig};
use crate::cycles::CycleCache;
use crate::diagram::Diagram;
use crate::error::{bail, ConjectureViolation, Result};
use crate::grid::isize2;
use crate::homology::{KhHomology, KhSummand};
use crate::invariants::{check_conjecture1, homological_width, jones_polynomial, linking_factor, Conjecture1, PolyOutput, Width};
use crate::matrix::SpMat;
use crate::poly::Poly;
use crate::reduce::{reduce_piece, ReducedPiece};
use crate::signs::SignCube;
use crate::states::StateTable;
use crate::Int;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display(fmt = "#{}", _0)]
pub struct SlotId(pub usize);

#[derive(Clone, Copy, Debug, Display, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    #[display(fmt = "not computed")]
    NotComputed,
    #[display(fmt = "computed")]
    Computed,
    #[display(fmt = "erased")]
    Erased,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    #[display(fmt = "states")]
    States,
    #[display(fmt = "differentials")]
    Differentials,
    #[display(fmt = "reduced")]
    Reduced,
    #[display(fmt = "betti")]
    Betti,
    #[display(fmt = "torsion")]
    Torsion,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::States,
        Stage::Differentials,
        Stage::Reduced,
        Stage::Betti,
        Stage::Torsion,
    ];

    pub fn deps(&self) -> &'static [Stage] { 
        match self { 
            Stage::States        => &[],
            Stage::Differentials => &[Stage::States],
            Stage::Reduced       => &[Stage::Differentials],
            Stage::Betti         => &[Stage::Reduced],
            Stage::Torsion       => &[Stage::Reduced],
        }
    }

    fn index(&self) -> usize { 
        *self as usize
    }
}

/// Gradings of the cube, known once the states are enumerated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub i_range: RangeInclusive<isize>,
    pub j_range: RangeInclusive<isize>,
    pub generators: usize,
}

#[derive(Clone, Debug, Default)]
struct TypeData {
    status: [Status; 5],
    bounds: Option<Bounds>,
    table: Option<StateTable>,
    signs: Option<SignCube>,
    diffs: Vec<Vec<SpMat>>,
    pieces: Vec<ReducedPiece>,
    betti: BTreeMap<isize2, usize>,
    torsion: BTreeMap<isize2, Vec<Int>>,
}

impl TypeData {
    fn status(&self, s: Stage) -> Status { 
        self.status[s.index()]
    }

    fn erase(&mut self, s: Stage) { 
        let st = &mut self.status[s.index()];
        if *st == Status::Computed { 
            *st = Status::Erased;
        }
    }
}

/// A diagram with everything computed from it so far, per homology type.
#[derive(Clone, Debug)]
pub struct DiagramRecord {
    name: String,
    diagram: Diagram,
    cache: Option<CycleCache>,
    data: [TypeData; 5],
}

impl DiagramRecord { 
    fn new(diagram: Diagram, name: String) -> Self { 
        Self { name, diagram, cache: None, data: Default::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn diagram(&self) -> &Diagram { 
        &self.diagram
    }

    pub fn status(&self, htype: HomologyType, stage: Stage) -> Status { 
        self.data(htype).status(stage)
    }

    pub fn bounds(&self, htype: HomologyType) -> Option<&Bounds> {
        self.data(htype).bounds.as_ref()
    }

    pub fn states(&self, htype: HomologyType) -> Option<&StateTable> { 
        self.data(htype).table.as_ref()
    }

    pub fn differentials(&self, htype: HomologyType) -> &[Vec<SpMat>] {
        &self.data(htype).diffs
    }

    pub fn reduced(&self, htype: HomologyType) -> &[ReducedPiece] { 
        &self.data(htype).pieces
    }

    pub fn betti(&self, htype: HomologyType) -> &BTreeMap<isize2, usize> { 
        &self.data(htype).betti
    }

    pub fn torsion(&self, htype: HomologyType) -> &BTreeMap<isize2, Vec<Int>> { 
        &self.data(htype).torsion
    }

    /// The homology table, once Betti numbers and torsion are computed.
    pub fn homology(&self, htype: HomologyType) -> Option<KhHomology> { 
        let d = self.data(htype);
        let done = [Stage::Betti, Stage::Torsion].iter().all(|&s| d.status(s) == Status::Computed);
        let bounds = d.bounds.as_ref().filter(|_| done)?;

        let mut table: HashMap<isize2, KhSummand> = HashMap::new();
        for idx in d.betti.keys().chain(d.torsion.keys()).unique() { 
            let r = d.betti.get(idx).cloned().unwrap_or(0);
            let t = d.torsion.get(idx).cloned().unwrap_or_default();
            table.insert(*idx, KhSummand::new(r, t));
        }

        Some(KhHomology::new_impl(htype, bounds.i_range.clone(), bounds.j_range.clone(), table))
    }

    fn data(&self, htype: HomologyType) -> &TypeData { 
        &self.data[htype.index()]
    }

    fn run_states(&mut self, htype: HomologyType, config: &KhConfig) -> Result<()> {
        let Self { diagram, cache, data, .. } = self;
        let cache = cache.get_or_insert_with(|| CycleCache::new(diagram));

        let table = StateTable::build(diagram, cache, htype, config)?;
        let signs = if htype.theory().needs_signs() { 
            let s = SignCube::build(diagram, cache);
            if config.debug { 
                s.check(diagram, cache)?;
            }
            Some(s)
        } else {
            None
        };

        let d = &mut data[htype.index()];
        d.bounds = Some(Bounds {
            i_range: table.i_range(),
            j_range: table.j_range(),
            generators: table.total(),
        });
        d.table = Some(table);
        d.signs = signs;

        Ok(())
    }

    fn run_differentials(&mut self, htype: HomologyType, config: &KhConfig) -> Result<()> { 
        let Self { diagram, cache, data, .. } = self;
        let d = &mut data[htype.index()];

        let (Some(cache), Some(table)) = (cache.as_ref(), d.table.as_ref()) else {
            bail!(InternalConsistency, "differentials requested before states");
        };

        let builder = DiffBuilder::new(diagram, cache, table, d.signs.as_ref())?;
        let (lo, hi) = (*table.i_range().start(), *table.i_range().end());
        let diffs = (lo..hi).map(|i| builder.build(i)).collect::<Result<Vec<_>>>()?;

        if config.debug { 
            check_d2(lo, &diffs)?;
        }

        d.diffs = diffs;
        Ok(())
    }

    fn run_reduced(&mut self, htype: HomologyType) -> Result<()> {
        let d = &mut self.data[htype.index()];
        let Some(table) = d.table.as_ref() else {
            bail!(InternalConsistency, "reduction requested before states");
        };

        let is = table.i_range().collect_vec();
        let pieces = (0..table.j_size()).map(|jx| {
            let j = table.j_at(jx);
            let ranks = is.iter().map(|&i| table.rank(i, j)).collect_vec();
            let diffs = d.diffs.iter().map(|ds| ds[jx].clone()).collect_vec();

            debug!("reduce j = {j}: ranks {:?}", ranks);
            reduce_piece(ranks, diffs)
        }).collect::<Result<Vec<_>>>()?;

        d.pieces = pieces;
        Ok(())
    }

    // (i, j) of the t-th group of the jx-th piece.
    fn bigradings(bounds: &Bounds, pieces: &[ReducedPiece]) -> Vec<(usize, usize, isize2)> {
        let (i0, j0) = (*bounds.i_range.start(), *bounds.j_range.start());
        pieces.iter().enumerate().flat_map(|(jx, p)|
            (0..p.len()).map(move |t| (jx, t, isize2(i0 + t as isize, j0 + 2 * jx as isize)))
        ).collect()
    }

    fn run_betti(&mut self, htype: HomologyType) -> Result<()> {
        let d = &mut self.data[htype.index()];
        let Some(bounds) = d.bounds.as_ref() else { 
            bail!(InternalConsistency, "betti numbers requested before states");
        };

        let betti = Self::bigradings(bounds, &d.pieces).into_iter().filter_map(|(jx, t, idx)| {
            let r = d.pieces[jx].homology_rank(t);
            (r > 0).then_some((idx, r))
        }).collect();

        d.betti = betti;
        Ok(())
    }

    fn run_torsion(&mut self, htype: HomologyType) -> Result<()> {
        let d = &mut self.data[htype.index()];
        let Some(bounds) = d.bounds.as_ref() else { 
            bail!(InternalConsistency, "torsion requested before states");
        };

        let torsion = Self::bigradings(bounds, &d.pieces).into_iter().filter_map(|(jx, t, idx)| { 
            let tors = d.pieces[jx].torsion(t);
            (!tors.is_empty()).then_some((idx, tors))
        }).collect();

        d.torsion = torsion;
        Ok(())
    }
}

fn check_d2(i0: isize, diffs: &[Vec<SpMat>]) -> Result<()> { 
    for (t, (d0, d1)) in diffs.iter().tuple_windows().enumerate() {
        for (a0, a1) in d0.iter().zip(d1.iter()) { 
            if !a0.compose(a1).is_zero() { 
                bail!(InternalConsistency, "d∘d ≠ 0 at i = {}", i0 + t as isize);
            }
        }
    }
    debug!("d∘d = 0 checked for {} differentials", diffs.len());
    Ok(())
}

/// Fixed-capacity storage of diagrams and their memoized computations.
///
/// Every `compute_*` call acts on the current homology type and runs only
/// the stages that are not yet computed. A stage that fails leaves the
/// record as it was.
#[derive(Clone, Debug)]
pub struct DiagramStore {
    config: KhConfig,
    htype: HomologyType,
    slots: Vec<Option<DiagramRecord>>,
}

impl DiagramStore {
    pub fn new(config: KhConfig) -> Result<Self> { 
        config.validate()?;
        let htype = config.homology_type;
        let slots = (0..config.capacity).map(|_| None).collect();
        Ok(Self { config, htype, slots })
    }

    pub fn config(&self) -> &KhConfig { 
        &self.config
    }

    pub fn homology_type(&self) -> HomologyType { 
        self.htype
    }

    pub fn set_homology_type(&mut self, htype: HomologyType) { 
        self.htype = htype;
    }

    pub fn capacity(&self) -> usize { 
        self.slots.len()
    }

    /// Occupied slots.
    pub fn slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots.iter().enumerate().filter(|(_, r)| r.is_some()).map(|(i, _)| SlotId(i))
    }

    /// Stores `diagram` in `slot` (replacing what was there) or in the
    /// first free slot.
    pub fn initialize_diagram<S>(&mut self, diagram: Diagram, name: S, slot: Option<SlotId>) -> Result<SlotId>
    where S: Into<String> {
        let name = name.into();
        let n = diagram.ncrossings();
        if n > self.config.max_crossings { 
            bail!(CapacityExceeded, "{name}: {n} crossings exceed max_crossings = {}", self.config.max_crossings);
        }

        let id = match slot { 
            Some(SlotId(k)) if k >= self.capacity() => {
                bail!(InvalidReference, "slot {k} out of range (capacity {})", self.capacity())
            },
            Some(id) => id,
            None => {
                let Some(k) = self.slots.iter().position(|r| r.is_none()) else {
                    bail!(CapacityExceeded, "all {} slots are occupied", self.capacity())
                };
                SlotId(k)
            }
        };

        info!("initialize {name} at {id}: {n} crossings, {} free loops", diagram.free_loops());

        self.slots[id.0] = Some(DiagramRecord::new(diagram, name));
        Ok(id)
    }

    pub fn record(&self, slot: SlotId) -> Result<&DiagramRecord> {
        match self.slots.get(slot.0) { 
            Some(Some(r)) => Ok(r),
            Some(None) => bail!(InvalidReference, "slot {} is not initialized", slot.0),
            None => bail!(InvalidReference, "slot {} out of range (capacity {})", slot.0, self.capacity()),
        }
    }

    fn record_mut(&mut self, slot: SlotId) -> Result<&mut DiagramRecord> {
        let cap = self.capacity();
        match self.slots.get_mut(slot.0) { 
            Some(Some(r)) => Ok(r),
            Some(None) => bail!(InvalidReference, "slot {} is not initialized", slot.0),
            None => bail!(InvalidReference, "slot {} out of range (capacity {cap})", slot.0),
        }
    }

    pub fn status(&self, slot: SlotId, stage: Stage) -> Result<Status> { 
        Ok(self.record(slot)?.status(self.htype, stage))
    }

    /// Stages to run, dependencies first, for `target` to become computed.
    pub fn plan(&self, slot: SlotId, target: Stage) -> Result<Vec<Stage>> { 
        fn visit(s: Stage, data: &TypeData, plan: &mut Vec<Stage>) { 
            if data.status(s) == Status::Computed || plan.contains(&s) {
                return
            }
            for &d in s.deps() { 
                visit(d, data, plan);
            }
            plan.push(s);
        }

        let data = self.record(slot)?.data(self.htype);
        let mut plan = vec![];
        visit(target, data, &mut plan);
        Ok(plan)
    }

    pub fn compute(&mut self, slot: SlotId, target: Stage) -> Result<()> { 
        for stage in self.plan(slot, target)? { 
            self.run(slot, stage)?;
        }
        Ok(())
    }

    fn run(&mut self, slot: SlotId, stage: Stage) -> Result<()> { 
        let htype = self.htype;
        let config = self.config.clone();
        let rec = self.record_mut(slot)?;
        let start = Instant::now();

        match stage { 
            Stage::States        => rec.run_states(htype, &config)?,
            Stage::Differentials => rec.run_differentials(htype, &config)?,
            Stage::Reduced       => rec.run_reduced(htype)?,
            Stage::Betti         => rec.run_betti(htype)?,
            Stage::Torsion       => rec.run_torsion(htype)?,
        }

        rec.data[htype.index()].status[stage.index()] = Status::Computed;
        info!("{} ({htype}): {stage} computed in {:?}", rec.name, start.elapsed());

        Ok(())
    }

    pub fn compute_states(&mut self, slot: SlotId) -> Result<()> { 
        self.compute(slot, Stage::States)
    }

    pub fn compute_differentials(&mut self, slot: SlotId) -> Result<()> { 
        self.compute(slot, Stage::Differentials)
    }

    pub fn compute_reduced(&mut self, slot: SlotId) -> Result<()> {
        self.compute(slot, Stage::Reduced)
    }

    pub fn compute_betti(&mut self, slot: SlotId) -> Result<()> { 
        self.compute(slot, Stage::Betti)
    }

    pub fn compute_torsion(&mut self, slot: SlotId) -> Result<()> {
        self.compute(slot, Stage::Torsion)
    }

    pub fn homology(&mut self, slot: SlotId) -> Result<KhHomology> {
        self.compute_betti(slot)?;
        self.compute_torsion(slot)?;

        let htype = self.htype;
        match self.record(slot)?.homology(htype) { 
            Some(h) => Ok(h),
            None => bail!(InternalConsistency, "homology of {slot} not available after computation"),
        }
    }

    pub fn compute_polynomial(&mut self, slot: SlotId, split: bool, as_vector: bool) -> Result<PolyOutput> { 
        let h = self.homology(slot)?;
        Ok(PolyOutput::new(&h, split, as_vector))
    }

    /// See [`check_conjecture1`](crate::check_conjecture1).
    pub fn check_conjecture1(&self, kh: &Poly, factor: &Poly) -> std::result::Result<Conjecture1, ConjectureViolation> { 
        check_conjecture1(kh, factor)
    }

    pub fn homological_width(&self, p: &Poly) -> Option<Width> {
        homological_width(p)
    }

    pub fn linking_factor(&self, slot: SlotId) -> Result<Poly> {
        Ok(linking_factor(self.record(slot)?.diagram()))
    }

    pub fn jones_polynomial(&mut self, slot: SlotId) -> Result<Poly> { 
        let rec = self.record_mut(slot)?;
        let DiagramRecord { diagram, cache, .. } = rec;
        let cache = cache.get_or_insert_with(|| CycleCache::new(diagram));
        Ok(jones_polynomial(diagram, cache))
    }

    pub fn erase_diagram(&mut self, slot: SlotId) -> Result<()> {
        let rec = self.record(slot)?;
        info!("erase {} at {slot}", rec.name);
        self.slots[slot.0] = None;
        Ok(())
    }

    /// Drops the differentials of every homology type.
    pub fn erase_matrices(&mut self, slot: SlotId) -> Result<()> { 
        let rec = self.record_mut(slot)?;
        for d in rec.data.iter_mut() {
            d.diffs = vec![];
            d.erase(Stage::Differentials);
        }
        Ok(())
    }

    /// Drops the states, sign cubes and cycle decompositions, and with them
    /// the differentials.
    pub fn erase_states(&mut self, slot: SlotId) -> Result<()> {
        self.erase_matrices(slot)?;
        let rec = self.record_mut(slot)?;
        rec.cache = None;
        for d in rec.data.iter_mut() {
            d.table = None;
            d.signs = None;
            d.erase(Stage::States);
        }
        Ok(())
    }
}
