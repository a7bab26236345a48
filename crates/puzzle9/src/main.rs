use anyhow::Context as _;
use puzzle9::config::PuzzleConfig;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => PuzzleConfig::load(&path)
            .with_context(|| format!("Failed to load puzzle config from {path}"))?,
        None => PuzzleConfig::default(),
    };

    puzzle9::run(config).context("Failed to start the puzzle")
}
