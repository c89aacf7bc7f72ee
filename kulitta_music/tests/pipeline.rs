// End-to-end: grammar derivation through voiced chords.

use kulitta_music::chord_space::Relation;
use kulitta_music::chords::to_chords;
use kulitta_music::classical::classical_voicings;
use kulitta_music::config::GenerationConfig;
use kulitta_music::grammar::{ChordType, Mode, MusicParams};
use kulitta_ptgg::{Symbol, generate};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn compose(config: &GenerationConfig, seed: u64) -> Vec<kulitta_music::chords::TChord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let rules = config.grammar().unwrap();
    let derivation = generate(&rules, &config.start_symbol(), config.generations, &mut rng).unwrap();
    let chords = to_chords(&derivation).unwrap();
    classical_voicings(&chords, &config.voicing, &mut rng).unwrap()
}

#[test]
fn default_pipeline_fills_the_phrase() {
    let config = GenerationConfig::default();
    for seed in 0..5 {
        let voiced = compose(&config, seed);
        assert!(!voiced.is_empty());
        assert!(voiced.len() <= 16, "four generations of binary splits");
        let end = voiced.last().map(|c| c.onset + c.dur).unwrap();
        assert!((end - config.start.dur).abs() < 1e-9);
        for pair in voiced.windows(2) {
            assert!((pair[0].onset + pair[0].dur - pair[1].onset).abs() < 1e-9);
        }
        for chord in &voiced {
            assert_eq!(chord.pitches.len(), 3);
            assert!(chord.pitches.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn pipeline_is_deterministic_per_seed() {
    let config = GenerationConfig::default();
    assert_eq!(compose(&config, 42), compose(&config, 42));
}

#[test]
fn progression_stays_on_stock_functions() {
    let config = GenerationConfig::default();
    let voiced = compose(&config, 8);
    let allowed: Vec<Vec<i32>> = [ChordType::I, ChordType::IV, ChordType::V]
        .iter()
        .map(|&c| Relation::OP.normalize(&kulitta_music::chords::to_abs_chord(c, Mode::Major, 0)))
        .collect();
    for chord in &voiced {
        assert!(allowed.contains(&Relation::OP.normalize(&chord.pitches)), "{:?}", chord.pitches);
    }
}

#[test]
fn minor_key_start_with_duration_guard() {
    let config = GenerationConfig::from_json(
        r#"{ "generations": 8, "min_duration": 1.0, "start": { "dur": 4.0, "mode": "Minor", "key": 9 } }"#,
    )
    .unwrap();
    let voiced = compose(&config, 3);
    for chord in &voiced {
        assert_eq!((chord.mode, chord.key), (Mode::Minor, 9));
        assert!(chord.dur >= 0.5);
    }
}

#[test]
fn let_bound_phrase_repeats_its_chords() {
    let config = GenerationConfig::default();
    let phrase = MusicParams::phrase(2.0, Mode::Major, 0);
    let start = vec![Symbol::let_in(
        "a",
        vec![Symbol::nt(ChordType::I, phrase)],
        vec![Symbol::var("a"), Symbol::var("a")],
    )];
    let mut rng = StdRng::seed_from_u64(6);
    let derivation = generate(&config.grammar().unwrap(), &start, 3, &mut rng).unwrap();
    let chords = to_chords(&derivation).unwrap();
    let half = chords.len() / 2;
    assert_eq!(chords.len() % 2, 0);
    for (a, b) in chords[..half].iter().zip(&chords[half..]) {
        assert_eq!((a.dur, &a.pitches), (b.dur, &b.pitches));
        assert!((b.onset - a.onset - 2.0).abs() < 1e-9);
    }
}
