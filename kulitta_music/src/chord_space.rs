// Chord spaces: pitch-space enumeration and quotient spaces.
//
// A pitch space is every pitch vector drawn from per-voice inclusive ranges
// (a Cartesian product). Filtering it with constraint predicates leaves the
// playable voicings; partitioning those under an equivalence relation gives
// the quotient space, an ordered list of classes whose members all realize
// the same abstract chord.
//
// Equivalence relations are built from four normalizations:
// - O (octave): every pitch mod 12
// - T (transposition): subtract the first pitch, so the first voice is 0
// - P (permutation): sort ascending
// - C (cardinality): drop repeated pitches, keeping first occurrences in
//   order
// Two chords are related when their normal forms are equal. The unions
// compose normalizations in a fixed order (OP = P after O, OT = O after T,
// and so on; see `Relation::normalize`).
//
// Because every relation here is equality of a normal form, `partition`
// hashes on that form instead of comparing all pairs. `partition_by` is the
// pairwise version for arbitrary relations.
//
// Enumeration cost is the product of range sizes and dominates the whole
// pipeline. `PitchSpace` is a lazy odometer so `search_range` can filter
// without materializing the unfiltered space.

use crate::constraints::Predicate;
use crate::error::{MusicError, check_arity};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;

/// One pitch per voice.
pub type PitchVector = Vec<i32>;

/// Lazy iterator over the Cartesian product of per-voice ranges.
///
/// The last voice varies fastest, so the output is in lexicographic order.
#[derive(Debug, Clone)]
pub struct PitchSpace {
    ranges: Vec<(i32, i32)>,
    next: Option<PitchVector>,
}

impl PitchSpace {
    pub fn new(ranges: &[(i32, i32)]) -> Result<Self, MusicError> {
        for (voice, &(lo, hi)) in ranges.iter().enumerate() {
            if lo > hi {
                return Err(MusicError::InvalidRange { voice, lo, hi });
            }
        }
        Ok(PitchSpace {
            ranges: ranges.to_vec(),
            next: Some(ranges.iter().map(|&(lo, _)| lo).collect()),
        })
    }

    /// Total number of vectors in the space (not just those not yet yielded).
    pub fn size(&self) -> Result<usize, MusicError> {
        self.ranges.iter().try_fold(1usize, |acc, &(lo, hi)| {
            let width = usize::try_from(i64::from(hi) - i64::from(lo) + 1)
                .map_err(|_| MusicError::SpaceTooLarge)?;
            acc.checked_mul(width).ok_or(MusicError::SpaceTooLarge)
        })
    }

    fn successor(&self, mut v: PitchVector) -> Option<PitchVector> {
        for i in (0..v.len()).rev() {
            if v[i] < self.ranges[i].1 {
                v[i] += 1;
                return Some(v);
            }
            v[i] = self.ranges[i].0;
        }
        None
    }
}

impl Iterator for PitchSpace {
    type Item = PitchVector;

    fn next(&mut self) -> Option<PitchVector> {
        let current = self.next.take()?;
        self.next = self.successor(current.clone());
        Some(current)
    }
}

/// Every pitch vector in the product of `ranges`.
pub fn enumerate(ranges: &[(i32, i32)]) -> Result<Vec<PitchVector>, MusicError> {
    let space = PitchSpace::new(ranges)?;
    let mut out = Vec::with_capacity(space.size()?);
    out.extend(space);
    Ok(out)
}

/// Keep the vectors a unary predicate accepts, in order. Pairwise predicates
/// have nothing to compare against and keep everything.
pub fn filter(space: &[PitchVector], predicate: &Predicate) -> Result<Vec<PitchVector>, MusicError> {
    let mut out = Vec::new();
    for chord in space {
        if predicate.check_one(chord)? {
            out.push(chord.clone());
        }
    }
    Ok(out)
}

/// `filter(enumerate(ranges), predicate)` without building the unfiltered
/// space.
pub fn search_range(
    predicate: &Predicate,
    ranges: &[(i32, i32)],
) -> Result<Vec<PitchVector>, MusicError> {
    let mut out = Vec::new();
    for chord in PitchSpace::new(ranges)? {
        if predicate.check_one(&chord)? {
            out.push(chord);
        }
    }
    log::debug!("search_range kept {} chords", out.len());
    Ok(out)
}

/// Shift every pitch by `k` semitones. Arithmetic wraps at the `i32`
/// boundary.
pub fn transpose(chord: &[i32], k: i32) -> PitchVector {
    chord.iter().map(|p| p.wrapping_add(k)).collect()
}

/// Move each voice by its own number of octaves.
pub fn shift_octaves(chord: &[i32], octaves: &[i32]) -> Result<PitchVector, MusicError> {
    check_arity(chord, octaves)?;
    Ok(chord
        .iter()
        .zip(octaves)
        .map(|(p, o)| p.wrapping_add(o.wrapping_mul(12)))
        .collect())
}

fn norm_o(chord: &[i32]) -> PitchVector {
    chord.iter().map(|p| p.rem_euclid(12)).collect()
}

fn norm_t(chord: &[i32]) -> PitchVector {
    match chord.first() {
        Some(&first) => chord.iter().map(|p| p.wrapping_sub(first)).collect(),
        None => Vec::new(),
    }
}

fn norm_p(chord: &[i32]) -> PitchVector {
    let mut sorted = chord.to_vec();
    sorted.sort_unstable();
    sorted
}

fn norm_c(chord: &[i32]) -> PitchVector {
    let mut out: PitchVector = Vec::with_capacity(chord.len());
    for &p in chord {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

/// The OPTIC-style equivalence relations on chords.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    O,
    T,
    P,
    C,
    OP,
    OC,
    OT,
    PT,
    PC,
    TC,
    OPC,
}

impl Relation {
    pub const ALL: [Relation; 11] = [
        Relation::O,
        Relation::T,
        Relation::P,
        Relation::C,
        Relation::OP,
        Relation::OC,
        Relation::OT,
        Relation::PT,
        Relation::PC,
        Relation::TC,
        Relation::OPC,
    ];

    /// Canonical representative of `chord`'s class.
    pub fn normalize(self, chord: &[i32]) -> PitchVector {
        match self {
            Relation::O => norm_o(chord),
            Relation::T => norm_t(chord),
            Relation::P => norm_p(chord),
            Relation::C => norm_c(chord),
            Relation::OP => norm_p(&norm_o(chord)),
            Relation::OC => norm_c(&norm_o(chord)),
            Relation::OT => norm_o(&norm_t(chord)),
            Relation::PT => norm_t(&norm_p(chord)),
            Relation::PC => norm_c(&norm_p(chord)),
            Relation::TC => norm_c(&norm_t(chord)),
            Relation::OPC => norm_c(&norm_p(&norm_o(chord))),
        }
    }

    /// Relations involving C may relate chords with different numbers of
    /// voices. All others require equal arity.
    pub fn collapses_duplicates(self) -> bool {
        matches!(
            self,
            Relation::C | Relation::OC | Relation::PC | Relation::TC | Relation::OPC
        )
    }

    pub fn related(self, a: &[i32], b: &[i32]) -> Result<bool, MusicError> {
        if !self.collapses_duplicates() {
            check_arity(a, b)?;
        }
        Ok(self.normalize(a) == self.normalize(b))
    }
}

/// Equivalence classes of a chord space, in order of each class's first
/// member in the scanned input. Members keep their input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotientSpace {
    classes: Vec<Vec<PitchVector>>,
}

impl QuotientSpace {
    pub fn classes(&self) -> &[Vec<PitchVector>] {
        &self.classes
    }

    pub fn class(&self, idx: usize) -> Option<&[PitchVector]> {
        self.classes.get(idx).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of chords across all classes.
    pub fn chord_count(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// Index of the first class whose representative is related to `chord`.
    pub fn find_class(&self, relation: Relation, chord: &[i32]) -> Result<Option<usize>, MusicError> {
        for (idx, class) in self.classes.iter().enumerate() {
            let Some(rep) = class.first() else {
                continue;
            };
            if relation.related(chord, rep)? {
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }
}

/// Partition `items` into the classes of `relation`.
///
/// Chords are grouped by normal form through a hash map that remembers
/// each form's class index, so this is linear in the number of chords.
/// Fails if the relation requires equal arity and the chords differ.
pub fn partition(relation: Relation, items: Vec<PitchVector>) -> Result<QuotientSpace, MusicError> {
    let total = items.len();
    let mut index: HashMap<PitchVector, usize> = HashMap::new();
    let mut classes: Vec<Vec<PitchVector>> = Vec::new();
    let arity = items.first().map(Vec::len);

    for item in items {
        if let Some(arity) = arity.filter(|&n| n != item.len() && !relation.collapses_duplicates()) {
            return Err(MusicError::ArityMismatch {
                left: arity,
                right: item.len(),
            });
        }
        match index.entry(relation.normalize(&item)) {
            Entry::Occupied(e) => classes[*e.get()].push(item),
            Entry::Vacant(e) => {
                e.insert(classes.len());
                classes.push(vec![item]);
            }
        }
    }

    log::debug!(
        "partitioned {total} chords into {} classes under {relation:?}",
        classes.len()
    );
    Ok(QuotientSpace { classes })
}

/// Partition by an arbitrary equivalence test.
///
/// Repeatedly takes the first unclassified item and gathers every remaining
/// item related to it. Quadratic in the number of items. The representative
/// always joins its own class, so this terminates even for a non-reflexive
/// `eq`.
pub fn partition_by<T>(items: Vec<T>, eq: impl Fn(&T, &T) -> bool) -> Vec<Vec<T>> {
    let mut class_of = vec![0usize; items.len()];
    let mut remaining: Vec<usize> = (0..items.len()).collect();
    let mut class_count = 0;

    while let Some(&rep) = remaining.first() {
        remaining.retain(|&i| {
            if i == rep || eq(&items[rep], &items[i]) {
                class_of[i] = class_count;
                false
            } else {
                true
            }
        });
        class_count += 1;
    }

    let mut classes: Vec<Vec<T>> = (0..class_count).map(|_| Vec::new()).collect();
    for (item, class) in items.into_iter().zip(class_of) {
        classes[class].push(item);
    }
    classes
}

/// A shuffled copy of `items`.
pub fn randomize<T: Clone>(items: &[T], rng: &mut impl Rng) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Keep chords with no repeated pitch, sort each ascending, and drop
/// duplicates (first occurrence wins).
pub fn piano_filter(chords: impl IntoIterator<Item = PitchVector>) -> Vec<PitchVector> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for chord in chords {
        let sorted = norm_p(&chord);
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            continue;
        }
        if seen.insert(sorted.clone()) {
            out.push(sorted);
        }
    }
    out
}
