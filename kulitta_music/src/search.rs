// Voice-leading search: turning abstract chords into concrete voicings.
//
// Each abstract chord is classified to one class of a quotient space, and
// one member of that class is picked as its voicing. The greedy resolver
// walks the sequence left to right:
// - The first chord is a uniform random member of its class.
// - Each later chord is a uniform random member among those the admissible
//   predicate accepts against the previous voicing. The pick is random on
//   purpose, not nearest, to keep successive runs varied.
// - When nothing in the class is admissible, the fallback policy picks
//   instead (e.g. the member closest to the previous voicing). The predicate
//   is a preference; the resolver always produces a voicing for every chord.
//
// `exhaustive_search` is the brute-force alternative for short sequences:
// every combination of one member per class that satisfies the predicate
// over the whole sequence.

use crate::chord_space::{PitchSpace, PitchVector, QuotientSpace, Relation};
use crate::constraints::{Predicate, euclidean_distance, max_step_distance};
use crate::error::MusicError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to pick when no class member satisfies the admissible predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Fallback {
    /// Uniform random member of the class.
    Random,
    /// Member with the smallest Euclidean distance to the previous voicing.
    #[default]
    NearestEuclidean,
    /// Member whose largest single-voice move is smallest.
    NearestMaxStep,
}

impl Fallback {
    /// Pick a member of `class`. Without a previous voicing every policy
    /// picks at random. Ties go to the earliest member.
    pub fn pick(
        self,
        class: &[PitchVector],
        previous: Option<&[i32]>,
        rng: &mut impl Rng,
    ) -> Result<PitchVector, MusicError> {
        if class.is_empty() {
            return Err(MusicError::EmptyClass);
        }
        let previous = match (self, previous) {
            (Fallback::Random, _) | (_, None) => return Ok(random_member(class, rng)),
            (_, Some(previous)) => previous,
        };
        let mut best = &class[0];
        let mut best_dist = self.distance(best, previous)?;
        for candidate in &class[1..] {
            let dist = self.distance(candidate, previous)?;
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        Ok(best.clone())
    }

    fn distance(self, a: &[i32], b: &[i32]) -> Result<f64, MusicError> {
        match self {
            Fallback::NearestMaxStep => Ok(f64::from(max_step_distance(a, b)?)),
            Fallback::Random | Fallback::NearestEuclidean => euclidean_distance(a, b),
        }
    }
}

fn random_member(class: &[PitchVector], rng: &mut impl Rng) -> PitchVector {
    class[rng.random_range(0..class.len())].clone()
}

/// Classifier that maps a chord to the first class related to it under
/// `relation`.
pub fn classify_by(
    relation: Relation,
) -> impl Fn(&QuotientSpace, &PitchVector) -> Result<Option<usize>, MusicError> {
    move |space, chord| space.find_class(relation, chord)
}

/// Greedily assign one voicing per abstract chord.
///
/// `classify` names the class realizing each abstract chord; an abstract
/// chord it cannot place is an error, as is a class with no members.
pub fn resolve<A: fmt::Debug>(
    space: &QuotientSpace,
    classify: impl Fn(&QuotientSpace, &A) -> Result<Option<usize>, MusicError>,
    admissible: &Predicate,
    fallback: Fallback,
    abstract_seq: &[A],
    rng: &mut impl Rng,
) -> Result<Vec<PitchVector>, MusicError> {
    let mut out: Vec<PitchVector> = Vec::with_capacity(abstract_seq.len());
    let mut fallbacks = 0usize;

    for (step, chord) in abstract_seq.iter().enumerate() {
        let class = classify(space, chord)?
            .and_then(|idx| space.class(idx))
            .ok_or_else(|| MusicError::Unclassifiable(format!("{chord:?}")))?;
        if class.is_empty() {
            return Err(MusicError::EmptyClass);
        }

        let voicing = match out.last() {
            None => random_member(class, rng),
            Some(previous) => {
                let mut candidates: Vec<&PitchVector> = Vec::new();
                for member in class {
                    if admissible.check(member, previous)? {
                        candidates.push(member);
                    }
                }
                if candidates.is_empty() {
                    fallbacks += 1;
                    log::warn!("step {step}: no admissible voicing for {chord:?}, using {fallback:?}");
                    fallback.pick(class, Some(previous.as_slice()), rng)?
                } else {
                    candidates[rng.random_range(0..candidates.len())].clone()
                }
            }
        };
        log::trace!("step {step}: {chord:?} -> {voicing:?}");
        out.push(voicing);
    }

    log::debug!("resolved {} chords ({fallbacks} by fallback)", out.len());
    Ok(out)
}

/// Every sequence made of one member from each bucket, last bucket varying
/// fastest. Empty if any bucket is empty.
pub fn all_solutions(buckets: &[Vec<PitchVector>]) -> Result<Vec<Vec<PitchVector>>, MusicError> {
    if buckets.iter().any(Vec::is_empty) {
        return Ok(Vec::new());
    }
    let mut index_ranges = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let last = i32::try_from(bucket.len() - 1).map_err(|_| MusicError::SpaceTooLarge)?;
        index_ranges.push((0, last));
    }
    let odometer = PitchSpace::new(&index_ranges)?;
    let mut out = Vec::with_capacity(odometer.size()?);
    for picks in odometer {
        out.push(
            picks
                .iter()
                .zip(buckets)
                .map(|(&i, bucket)| bucket[i as usize].clone())
                .collect(),
        );
    }
    Ok(out)
}

/// All solutions over which `predicate` holds for the whole sequence.
pub fn exhaustive_search(
    buckets: &[Vec<PitchVector>],
    predicate: &Predicate,
) -> Result<Vec<Vec<PitchVector>>, MusicError> {
    let mut out = Vec::new();
    for solution in all_solutions(buckets)? {
        if predicate.holds_for_all(&solution)? {
            out.push(solution);
        }
    }
    Ok(out)
}
