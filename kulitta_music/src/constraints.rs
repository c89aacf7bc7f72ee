// Constraint predicates over pitch vectors.
//
// Pure functions used in two places: filtering the pitch space before it is
// partitioned (unary predicates such as spacing, ordering and doubling), and
// judging voice-leading between consecutive chords during resolution
// (pairwise predicates such as no-parallels, no-crossing and step limits).
//
// Pairwise functions never silently accept vectors with different numbers of
// voices; they fail with `MusicError::ArityMismatch`.
//
// The `Predicate` wrapper unifies both kinds so the resolver can take either:
// a unary predicate applied as an admissibility test simply ignores the
// previous chord.

use crate::error::{MusicError, check_arity};
use std::collections::HashSet;

/// Every adjacent voice pair `(i, i + 1)` lies between `bounds[i].0` and
/// `bounds[i].1` semitones apart, inclusive.
pub fn spacing_ok(chord: &[i32], bounds: &[(i32, i32)]) -> Result<bool, MusicError> {
    if chord.len() != bounds.len() + 1 {
        return Err(MusicError::ArityMismatch {
            left: chord.len(),
            right: bounds.len() + 1,
        });
    }
    Ok(chord
        .windows(2)
        .zip(bounds)
        .all(|(pair, &(min, max))| {
            (i64::from(min)..=i64::from(max)).contains(&i64::from(pair[0].abs_diff(pair[1])))
        }))
}

/// Voices are non-decreasing in pitch by voice index (lowest voice first).
pub fn is_ordered(chord: &[i32]) -> bool {
    chord.windows(2).all(|pair| pair[0] <= pair[1])
}

/// No two voices share a pitch.
pub fn has_distinct_pitches(chord: &[i32]) -> bool {
    let mut seen = HashSet::with_capacity(chord.len());
    chord.iter().all(|p| seen.insert(*p))
}

/// No two voices move by the same signed interval between `a` and `b`.
/// Catches parallel octaves and fifths, along with any other parallel motion.
pub fn not_parallel(a: &[i32], b: &[i32]) -> Result<bool, MusicError> {
    check_arity(a, b)?;
    let mut motions = HashSet::with_capacity(a.len());
    Ok(a.iter().zip(b).all(|(&x, &y)| motions.insert(i64::from(y) - i64::from(x))))
}

/// Voice indices sorted by pitch (stable, so unisons keep voice order).
fn rank(chord: &[i32]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..chord.len()).collect();
    idx.sort_by_key(|&i| chord[i]);
    idx
}

/// The voices keep the same relative order from `a` to `b`.
pub fn not_crossing(a: &[i32], b: &[i32]) -> Result<bool, MusicError> {
    check_arity(a, b)?;
    Ok(rank(a) == rank(b))
}

pub fn euclidean_distance(a: &[i32], b: &[i32]) -> Result<f64, MusicError> {
    check_arity(a, b)?;
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum();
    Ok(sum.sqrt())
}

/// Largest distance any single voice moves from `a` to `b`.
pub fn max_step_distance(a: &[i32], b: &[i32]) -> Result<u32, MusicError> {
    check_arity(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x.abs_diff(*y)).max().unwrap_or(0))
}

/// Sorted pitch-class content of a chord (octave then permutation
/// normalization). Transposition is handled by the caller.
fn pitch_class_profile(chord: &[i32]) -> Vec<i32> {
    let mut pcs: Vec<i32> = chord.iter().map(|p| p.rem_euclid(12)).collect();
    pcs.sort_unstable();
    pcs
}

/// Canonical chord shapes a voicing may double.
///
/// Stores every template at all twelve transpositions in octave-and-
/// permutation normal form, so matching a chord is one hash lookup.
#[derive(Debug, Clone)]
pub struct DoublingTemplates {
    voices: usize,
    forms: HashSet<Vec<i32>>,
}

impl DoublingTemplates {
    /// Build from explicit templates, all of which must have `voices`
    /// entries.
    pub fn new(voices: usize, templates: &[Vec<i32>]) -> Result<Self, MusicError> {
        let mut forms = HashSet::new();
        for template in templates {
            if template.len() != voices {
                return Err(MusicError::ArityMismatch {
                    left: voices,
                    right: template.len(),
                });
            }
            for t in 0..12 {
                let shifted: Vec<i32> = template.iter().map(|p| p.rem_euclid(12) + t).collect();
                forms.insert(pitch_class_profile(&shifted));
            }
        }
        Ok(DoublingTemplates { voices, forms })
    }

    /// Major, minor and diminished triads spread over `voices` voices with
    /// every possible doubling. With three or more voices each chord tone
    /// must be present; with fewer, any selection of chord tones is allowed.
    pub fn triads(voices: usize) -> Self {
        const TRIADS: [[i32; 3]; 3] = [[0, 4, 7], [0, 3, 7], [0, 3, 6]];
        let min_each = usize::from(voices >= 3);
        let mut templates = Vec::new();
        for triad in TRIADS {
            for root in min_each..=voices {
                for third in min_each..=(voices - root) {
                    let fifth = voices - root - third;
                    if fifth < min_each {
                        continue;
                    }
                    let mut template = Vec::with_capacity(voices);
                    template.extend(std::iter::repeat_n(triad[0], root));
                    template.extend(std::iter::repeat_n(triad[1], third));
                    template.extend(std::iter::repeat_n(triad[2], fifth));
                    templates.push(template);
                }
            }
        }
        let forms = templates
            .iter()
            .flat_map(|template| {
                (0..12).map(move |t| {
                    let shifted: Vec<i32> = template.iter().map(|p| p.rem_euclid(12) + t).collect();
                    pitch_class_profile(&shifted)
                })
            })
            .collect();
        DoublingTemplates { voices, forms }
    }

    pub fn voices(&self) -> usize {
        self.voices
    }

    /// Whether `chord` is some transposition of one of the templates, up to
    /// octave placement and voice order.
    pub fn matches(&self, chord: &[i32]) -> Result<bool, MusicError> {
        if chord.len() != self.voices {
            return Err(MusicError::ArityMismatch {
                left: chord.len(),
                right: self.voices,
            });
        }
        Ok(self.forms.contains(&pitch_class_profile(chord)))
    }
}

type UnaryFn = Box<dyn Fn(&[i32]) -> Result<bool, MusicError>>;
type PairwiseFn = Box<dyn Fn(&[i32], &[i32]) -> Result<bool, MusicError>>;

/// A test on one chord, or on a chord and the chord before it.
pub enum Predicate {
    Unary(UnaryFn),
    /// Called as `f(candidate, previous)`.
    Pairwise(PairwiseFn),
    /// Conjunction that keeps each side's kind, so a unary side still
    /// applies to single chords and to the first chord of a sequence.
    Both(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn unary(f: impl Fn(&[i32]) -> Result<bool, MusicError> + 'static) -> Self {
        Predicate::Unary(Box::new(f))
    }

    pub fn pairwise(f: impl Fn(&[i32], &[i32]) -> Result<bool, MusicError> + 'static) -> Self {
        Predicate::Pairwise(Box::new(f))
    }

    /// Accepts everything.
    pub fn always() -> Self {
        Predicate::unary(|_| Ok(true))
    }

    pub fn spacing(bounds: Vec<(i32, i32)>) -> Self {
        Predicate::unary(move |chord| spacing_ok(chord, &bounds))
    }

    pub fn ordered() -> Self {
        Predicate::unary(|chord| Ok(is_ordered(chord)))
    }

    pub fn distinct_pitches() -> Self {
        Predicate::unary(|chord| Ok(has_distinct_pitches(chord)))
    }

    pub fn doubling(templates: DoublingTemplates) -> Self {
        Predicate::unary(move |chord| templates.matches(chord))
    }

    pub fn not_parallel() -> Self {
        Predicate::pairwise(not_parallel)
    }

    pub fn not_crossing() -> Self {
        Predicate::pairwise(not_crossing)
    }

    /// Every voice moves by at most `limit` semitones.
    pub fn max_step_within(limit: i32) -> Self {
        Predicate::pairwise(move |candidate, previous| {
            Ok(i64::from(max_step_distance(candidate, previous)?) <= i64::from(limit))
        })
    }

    /// True when no part of the predicate looks at the previous chord.
    pub fn is_unary(&self) -> bool {
        match self {
            Predicate::Unary(_) => true,
            Predicate::Pairwise(_) => false,
            Predicate::Both(a, b) => a.is_unary() && b.is_unary(),
        }
    }

    /// Evaluate against `candidate`; `previous` is only consulted by
    /// pairwise predicates.
    pub fn check(&self, candidate: &[i32], previous: &[i32]) -> Result<bool, MusicError> {
        match self {
            Predicate::Unary(f) => f(candidate),
            Predicate::Pairwise(f) => f(candidate, previous),
            Predicate::Both(a, b) => Ok(a.check(candidate, previous)? && b.check(candidate, previous)?),
        }
    }

    /// Evaluate on a single chord. Pairwise parts have nothing to compare
    /// against and hold vacuously; unary parts are still applied.
    pub fn check_one(&self, chord: &[i32]) -> Result<bool, MusicError> {
        match self {
            Predicate::Unary(f) => f(chord),
            Predicate::Pairwise(_) => Ok(true),
            Predicate::Both(a, b) => Ok(a.check_one(chord)? && b.check_one(chord)?),
        }
    }

    /// Both predicates hold. Two unary predicates stay unary.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Unary(f), Predicate::Unary(g)) => {
                Predicate::unary(move |chord| Ok(f(chord)? && g(chord)?))
            }
            (a, b) => Predicate::Both(Box::new(a), Box::new(b)),
        }
    }

    /// Unary parts: every chord passes. Pairwise parts: every adjacent pair
    /// passes, each later chord taken as the candidate against the one
    /// before it.
    pub fn holds_for_all(&self, seq: &[Vec<i32>]) -> Result<bool, MusicError> {
        match self {
            Predicate::Unary(f) => {
                for chord in seq {
                    if !f(chord.as_slice())? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Pairwise(f) => {
                for pair in seq.windows(2) {
                    if !f(pair[1].as_slice(), pair[0].as_slice())? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Both(a, b) => Ok(a.holds_for_all(seq)? && b.holds_for_all(seq)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_bounds() {
        let bounds = [(3, 12), (3, 12)];
        assert!(!spacing_ok(&[60, 61, 67], &bounds).unwrap()); // 1 semitone < 3
        assert!(spacing_ok(&[60, 64, 67], &bounds).unwrap());
        assert!(!spacing_ok(&[48, 64, 67], &bounds).unwrap()); // 16 > 12
    }

    #[test]
    fn spacing_needs_one_bound_per_adjacent_pair() {
        assert!(matches!(
            spacing_ok(&[60, 64, 67, 72], &[(3, 12)]),
            Err(MusicError::ArityMismatch { left: 4, right: 2 })
        ));
    }

    #[test]
    fn ordering_and_distinctness() {
        assert!(is_ordered(&[40, 52, 52, 67]));
        assert!(!is_ordered(&[52, 40]));
        assert!(has_distinct_pitches(&[40, 52, 64]));
        assert!(!has_distinct_pitches(&[40, 52, 40]));
    }

    #[test]
    fn parallel_motion_detected() {
        // Outer voices both move up a semitone.
        assert!(!not_parallel(&[60, 64, 67], &[61, 70, 68]).unwrap());
        assert!(not_parallel(&[60, 64, 67], &[59, 65, 67]).unwrap());
        // Oblique motion in two voices counts as identical (zero) motion.
        assert!(!not_parallel(&[60, 64, 67], &[60, 65, 67]).unwrap());
    }

    #[test]
    fn voice_crossing_detected() {
        assert!(!not_crossing(&[60, 64, 67], &[66, 65, 67]).unwrap());
        assert!(not_crossing(&[60, 64, 67], &[59, 65, 72]).unwrap());
    }

    #[test]
    fn pairwise_functions_reject_mismatched_arity() {
        assert!(matches!(
            not_parallel(&[60, 64], &[60, 64, 67]),
            Err(MusicError::ArityMismatch { left: 2, right: 3 })
        ));
        assert!(not_crossing(&[60], &[60, 64]).is_err());
        assert!(euclidean_distance(&[1, 2, 3], &[1, 2]).is_err());
        assert!(max_step_distance(&[], &[1]).is_err());
    }

    #[test]
    fn distances() {
        assert_eq!(euclidean_distance(&[0, 0], &[3, 4]).unwrap(), 5.0);
        assert_eq!(max_step_distance(&[60, 64, 67], &[62, 59, 67]).unwrap(), 5);
        assert_eq!(max_step_distance(&[], &[]).unwrap(), 0);
    }

    #[test]
    fn triad_templates_accept_doubled_triads() {
        let templates = DoublingTemplates::triads(4);
        assert!(templates.matches(&[48, 55, 64, 72]).unwrap()); // C major, doubled root
        assert!(templates.matches(&[45, 57, 60, 64]).unwrap()); // A minor
        assert!(templates.matches(&[47, 50, 53, 62]).unwrap()); // B diminished
        assert!(!templates.matches(&[48, 52, 55, 58]).unwrap()); // C7: not a triad
        assert!(!templates.matches(&[48, 60, 64, 72]).unwrap()); // missing the fifth
        assert!(templates.matches(&[48, 52, 55]).is_err());
    }

    #[test]
    fn triad_templates_for_few_voices() {
        let three = DoublingTemplates::triads(3);
        assert!(three.matches(&[62, 65, 69]).unwrap());
        assert!(!three.matches(&[60, 60, 67]).unwrap());
        let two = DoublingTemplates::triads(2);
        assert!(two.matches(&[60, 67]).unwrap());
        assert!(!two.matches(&[60, 61]).unwrap());
    }

    #[test]
    fn explicit_templates_checked_for_arity() {
        assert!(DoublingTemplates::new(3, &[vec![0, 4, 7], vec![0, 4]]).is_err());
        let power = DoublingTemplates::new(2, &[vec![0, 7]]).unwrap();
        assert!(power.matches(&[50, 57]).unwrap());
        assert!(!power.matches(&[50, 56]).unwrap());
    }

    #[test]
    fn predicate_combination_and_aggregation() {
        let pred = Predicate::ordered().and(Predicate::max_step_within(2));
        assert!(!pred.is_unary());
        let smooth = vec![vec![60, 64], vec![61, 65], vec![60, 66]];
        let jumpy = vec![vec![60, 64], vec![67, 70]];
        assert!(pred.holds_for_all(&smooth).unwrap());
        assert!(!pred.holds_for_all(&jumpy).unwrap());

        let unary = Predicate::ordered().and(Predicate::distinct_pitches());
        assert!(unary.is_unary());
        assert!(unary.check_one(&[1, 2, 3]).unwrap());
        assert!(!unary.check(&[1, 1, 3], &[]).unwrap());
        assert!(Predicate::not_crossing().check_one(&[3, 2, 1]).unwrap());
    }

    #[test]
    fn mixed_conjunction_keeps_unary_part() {
        let pred = Predicate::ordered().and(Predicate::max_step_within(12));
        assert!(!pred.is_unary());
        // The first chord is unordered; the step between them is small.
        assert!(!pred.holds_for_all(&[vec![2, 1], vec![3, 4]]).unwrap());
        assert!(pred.holds_for_all(&[vec![1, 2], vec![3, 4]]).unwrap());
        assert!(!pred.check_one(&[2, 1]).unwrap());
        assert!(pred.check_one(&[1, 2]).unwrap());
        assert!(!pred.check(&[2, 1], &[1, 2]).unwrap());
        assert!(!pred.check(&[1, 20], &[1, 2]).unwrap());

        // Order of the operands does not matter.
        let flipped = Predicate::max_step_within(12).and(Predicate::ordered());
        assert!(!flipped.holds_for_all(&[vec![2, 1], vec![3, 4]]).unwrap());
        assert!(!flipped.check_one(&[2, 1]).unwrap());
    }

    #[test]
    fn extreme_pitches_do_not_overflow() {
        assert!(!spacing_ok(&[i32::MIN, i32::MAX], &[(0, 12)]).unwrap());
        assert!(spacing_ok(&[i32::MAX, i32::MAX - 4], &[(3, 5)]).unwrap());
        assert!(not_parallel(&[i32::MIN, i32::MAX], &[i32::MAX, i32::MIN]).unwrap());
        assert_eq!(max_step_distance(&[i32::MIN], &[i32::MAX]).unwrap(), u32::MAX);
        assert!(!Predicate::max_step_within(i32::MAX).check(&[i32::MIN], &[i32::MAX]).unwrap());
        assert!(euclidean_distance(&[i32::MIN], &[i32::MAX]).unwrap() > 4.0e9);
    }

    #[test]
    fn aggregate_surfaces_arity_errors() {
        let seq = vec![vec![60, 64, 67], vec![60, 64]];
        assert!(Predicate::not_parallel().holds_for_all(&seq).is_err());
    }
}
