//! Lane Rush entry point
//!
//! Natively this runs a headless session: an autoplayer presses goals while a
//! manual clock ticks at 60 Hz, and the final state is printed as JSON.
//!
//! Usage: `lane-rush [CONFIG] [--frames N] [--seed N] [--skill PERCENT]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use lane_rush::assets::StubAssetSource;
    use lane_rush::audio::NullAudio;
    use lane_rush::platform::time;
    use lane_rush::platform::{Control, InputEvent, LogOverlay, ManualClock, MemoryStore};
    use lane_rush::renderer::DrawList;
    use lane_rush::sim::Phase;
    use lane_rush::{Collaborators, Game, GameConfig, Screen};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Headless Lane Rush session driven by an autoplayer
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct CliArgs {
        /// Game config JSON; defaults are used when omitted
        #[arg(value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Frames to simulate at 60 Hz
        #[arg(long, value_name = "COUNT", default_value_t = 3600)]
        frames: u64,
        /// Seed for spawns, effects and the autoplayer; defaults to the wall clock
        #[arg(long)]
        seed: Option<u64>,
        /// Percent chance the autoplayer presses a goal in time
        #[arg(
            long,
            value_name = "PERCENT",
            default_value_t = 90,
            value_parser = clap::value_parser!(u8).range(0..=100)
        )]
        skill: u8,
    }

    /// Keys of goals that have an active button inside their hit window
    fn ripe_keys(game: &Game) -> Vec<String> {
        let ratio = game.tuning().hit.threshold_ratio;
        game.goals()
            .goals()
            .iter()
            .filter(|goal| {
                // Wait for the button to get close for a better proximity score
                let window = goal.motion.height() * ratio / 2.0;
                game.pool()
                    .active_in_lane(goal.lane)
                    .any(|b| (goal.motion.y() - b.motion.y()).abs() < window)
            })
            .filter_map(|goal| goal.keycode.clone())
            .collect()
    }

    pub fn run() {
        let args = CliArgs::parse();
        let seed = args.seed.unwrap_or_else(time::seed);
        let skill = f64::from(args.skill) / 100.0;

        let config = match &args.config {
            Some(path) => match GameConfig::from_path(path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
            },
            None => GameConfig::default(),
        };

        let clock = ManualClock::new(0.0);
        let io = Collaborators {
            overlay: Box::new(LogOverlay),
            audio: Box::new(NullAudio::default()),
            prefs: Box::new(MemoryStore::new()),
            surface: Box::new(DrawList::new()),
            clock: Box::new(clock.clone()),
        };
        let screen = Screen::from_window(400.0, 800.0, config.settings.max_width, 0.0);
        let mut game = Game::new(config, screen, io, seed);
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);
        log::info!("Headless run: {} frames, seed {}", args.frames, seed);

        game.load(&mut StubAssetSource::default());
        game.handle_input(InputEvent::Click(Control::Start));

        let mut games = 1;
        for _ in 0..args.frames {
            clock.advance(FRAME_MS);
            if !game.step() {
                break;
            }
            match game.state().current {
                Phase::Play => {
                    for key in ripe_keys(&game) {
                        if rng.random_bool(skill) {
                            game.handle_input(InputEvent::KeyDown(key));
                        }
                    }
                }
                Phase::Ready => {
                    games += 1;
                    game.handle_input(InputEvent::KeyDown("Space".to_string()));
                }
                _ => {}
            }
        }
        game.destroy();

        log::info!(
            "Finished after {} frames, {} game(s), best {:?}",
            game.frame().count,
            games,
            game.scores().top_score()
        );
        match serde_json::to_string_pretty(&serde_json::json!({
            "state": game.state(),
            "scores": game.scores(),
        })) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize final state: {}", e),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cli_defaults() {
            let args = CliArgs::try_parse_from(["lane-rush"]).unwrap();
            assert_eq!(args.config, None);
            assert_eq!(args.frames, 3600);
            assert_eq!(args.seed, None);
            assert_eq!(args.skill, 90);
        }

        #[test]
        fn test_cli_parses_config_and_options() {
            let args = CliArgs::try_parse_from([
                "lane-rush", "game.json", "--frames", "600", "--seed", "7", "--skill", "100",
            ])
            .unwrap();
            assert_eq!(args.config, Some(PathBuf::from("game.json")));
            assert_eq!(args.frames, 600);
            assert_eq!(args.seed, Some(7));
            assert_eq!(args.skill, 100);
        }

        #[test]
        fn test_cli_rejects_skill_out_of_range() {
            assert!(CliArgs::try_parse_from(["lane-rush", "--skill", "101"]).is_err());
            assert!(CliArgs::try_parse_from(["lane-rush", "--skill", "0.5"]).is_err());
            assert!(CliArgs::try_parse_from(["lane-rush", "--frobnicate"]).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lane Rush (native) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `lane_rush::Game` directly
}
