// Kulitta harmony generator, CLI entry point.
//
// Runs the whole pipeline: grammar derivation, chord realization, then
// voicing through the chord space. Prints one line per chord, or the voiced
// chords as JSON for an external renderer.
//
// Usage:
//   cargo run -p kulitta_music --bin generate -- [--config FILE] [--seed N]
//     [--generations N] [--json]
//
// Set RUST_LOG=debug (or trace) for per-stage and per-step logging.

use kulitta_music::MusicError;
use kulitta_music::chords::{TChord, to_chords};
use kulitta_music::classical::classical_voicings;
use kulitta_music::config::GenerationConfig;
use kulitta_ptgg::generate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_flag::<String>(&args, "--config") {
        Err(e) => exit_with(&e),
        Ok(None) => GenerationConfig::default(),
        Ok(Some(path)) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => exit_with(&format!("Failed to load config {path}: {e}")),
        },
    };
    match parse_flag(&args, "--seed") {
        Ok(Some(seed)) => config.seed = Some(seed),
        Ok(None) => {}
        Err(e) => exit_with(&e),
    }
    match parse_flag(&args, "--generations") {
        Ok(Some(generations)) => config.generations = generations,
        Ok(None) => {}
        Err(e) => exit_with(&e),
    }
    let json = args.iter().any(|a| a == "--json");

    if let Err(e) = run(&config, json) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(path: &str) -> Result<GenerationConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    GenerationConfig::from_json(&text).map_err(|e| e.to_string())
}

fn run(config: &GenerationConfig, json: bool) -> Result<(), MusicError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    // Progress goes to stderr in JSON mode so stdout stays parseable.
    let say = |line: String| {
        if json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    say("=== Kulitta Harmony Generator ===".to_string());
    if let Some(seed) = config.seed {
        say(format!("Seed: {seed}"));
    }

    say(format!("[1/3] Deriving ({} generations)...", config.generations));
    let rules = config.grammar()?;
    let derivation = generate(&rules, &config.start_symbol(), config.generations, &mut rng)?;
    let chords = to_chords(&derivation)?;
    say(format!("  {} chords", chords.len()));

    let voicing = &config.voicing;
    say(format!(
        "[2/3] Voicing over {} voices ({:?}, max step {})...",
        voicing.voice_ranges.len(),
        voicing.relation,
        voicing.max_step
    ));
    let voiced = classical_voicings(&chords, voicing, &mut rng)?;

    say("[3/3] Output".to_string());
    if json {
        println!("{}", render_json(&voiced)?);
    } else {
        for chord in &voiced {
            println!("  {:>7.4} {:>7.4}  {:?}", chord.onset, chord.dur, chord.pitches);
        }
    }
    Ok(())
}

fn render_json(voiced: &[TChord]) -> Result<String, MusicError> {
    serde_json::to_string_pretty(voiced).map_err(MusicError::Output)
}

fn exit_with(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

/// `None` when the flag is absent; an error when it is present without a
/// value that parses, so a mistyped seed never falls back to OS seeding.
fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>, String> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    match args.get(i + 1) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| format!("Invalid value for {flag}: {v}")),
        None => Err(format!("Missing value for {flag}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn seed_flag_parses_or_fails_loudly() {
        let ok = args(&["generate", "--seed", "42"]);
        assert_eq!(parse_flag::<u64>(&ok, "--seed"), Ok(Some(42)));
        assert_eq!(parse_flag::<u64>(&ok, "--generations"), Ok(None));

        let bad = args(&["generate", "--seed", "abc"]);
        assert!(parse_flag::<u64>(&bad, "--seed").unwrap_err().contains("abc"));

        let missing = args(&["generate", "--generations"]);
        assert!(parse_flag::<usize>(&missing, "--generations").is_err());
    }

    #[test]
    fn output_errors_are_not_reported_as_config_errors() {
        let cause = serde_json::from_str::<u8>("x").unwrap_err();
        let message = MusicError::Output(cause).to_string();
        assert!(message.starts_with("failed to write output"), "{message}");
        assert!(render_json(&[]).unwrap().starts_with('['));
    }
}
