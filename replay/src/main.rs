use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use customines_core::{IntentDispatcher, Screen, ScriptedEngine, SessionConfig};
use futures::executor::block_on;

use transcript::{Intent, Transcript};

mod render;
mod transcript;

/// Replays a recorded engine transcript through the board client and prints the resulting board.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board and game settings as TOML, overrides the transcript's own
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON transcript with boards, batches and intents
    transcript: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let transcript = Transcript::load(&args.transcript)?;
    let config = transcript.session_config(args.config.as_deref())?;
    log::debug!("config: {:?}", config);

    replay(transcript, config, &mut std::io::stdout().lock())
}

/// Enters the game screen, runs every intent and writes one line per intent plus the final board.
///
/// Recoverable failures are reported and the replay goes on, anything else ends it.
fn replay(transcript: Transcript, config: SessionConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let engine = ScriptedEngine::new(transcript.boards, transcript.batches);
    let dispatcher = IntentDispatcher::new(engine, config);
    block_on(dispatcher.navigate(Screen::Game)).context("Could not enter the game screen")?;

    let mut applied = 0;
    for (step, intent) in transcript.intents.iter().enumerate() {
        let result = match *intent {
            Intent::Reveal((x, y)) => block_on(dispatcher.reveal(x, y)).map(|outcome| {
                applied += usize::from(outcome.has_update());
                format!("{:?}", outcome)
            }),
            Intent::Mark((x, y)) => block_on(dispatcher.mark(x, y)).map(|outcome| {
                applied += usize::from(outcome.has_update());
                format!("{:?}", outcome)
            }),
            Intent::Navigate(screen) => {
                block_on(dispatcher.navigate(screen)).map(|effect| format!("{:?}", effect))
            }
        };
        match result {
            Ok(outcome) => writeln!(out, "{:>3} {:?}: {}", step, intent, outcome)?,
            Err(err) if err.is_recoverable() => {
                writeln!(out, "{:>3} {:?}: failed, {}", step, intent, err)?
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Session broken by {:?} at step {}", intent, step));
            }
        }
    }
    log::info!("{} of {} intents reached the engine", applied, transcript.intents.len());

    let snapshot = dispatcher.snapshot();
    write!(out, "{}", render::render(&snapshot))?;
    if !snapshot.phase().is_finished() {
        log::info!("transcript ends before the game does");
    }
    let unused = dispatcher.engine().pending_batches();
    if unused > 0 {
        log::warn!("{} scripted batches were never requested", unused);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(json: &str) -> anyhow::Result<String> {
        let transcript = Transcript::from_json(json)?;
        let config = transcript.session_config(None)?;
        let mut out = Vec::new();
        replay(transcript, config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn replays_bundled_game_to_a_win() {
        let out = run(include_str!("../transcripts/four_by_four.json")).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines,
            vec![
                "  0 Reveal((0, 0)): Applied",
                "  1 Mark((2, 3)): Applied",
                "  2 Reveal((3, 3)): Applied",
                "  3 Mark((0, 0)): Ignored",
                "....",
                "....",
                ".111",
                ".1F1",
                "GameWon on Game: 1 hidden, 1 flagged, 0 mines left",
            ]
        );
    }

    #[test]
    fn engine_failures_do_not_stop_the_replay() {
        let out = run(r#"{
            "config": {"board": {"width": 4, "height": 4, "mines": 1}},
            "boards": [],
            "intents": [{"reveal": [1, 1]}, {"mark": [1, 1]}]
        }"#)
        .unwrap();

        assert!(out.starts_with("  0 Reveal((1, 1)): failed, Engine request failed"));
        assert!(out.contains("  1 Mark((1, 1)): Ignored"));
        assert!(out.ends_with("BeforeGame on Game: 16 hidden, 0 flagged, 1 mines left\n"));
    }

    #[test]
    fn protocol_errors_end_the_replay() {
        let err = run(r#"{
            "config": {"board": {"width": 4, "height": 4, "mines": 1}},
            "boards": [[
                [{"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0},
                 {"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0}],
                [{"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0},
                 {"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0}],
                [{"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0},
                 {"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0}],
                [{"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0},
                 {"state": "Hidden", "value": 0}, {"state": "Hidden", "value": 0}]
            ]],
            "batches": [{"hidden_cell_count": 15, "flag_count": 0, "mines_remaining": 1,
                         "changes": [{"x": 4, "y": 0, "state": "ShowValue", "value": 1}]}],
            "intents": [{"reveal": [0, 0]}]
        }"#)
        .unwrap_err();

        assert!(err.to_string().contains("Session broken by Reveal((0, 0)) at step 0"));
    }
}
