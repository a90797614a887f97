use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use score_player_core::{
    Clock, IntervalClock, ManifestDecoder, ManualClock, PlaybackState, Player, PlayerConfig,
    PlayerError, ScoreDecoder, ScoreFetcher,
};
use tracing_subscriber::EnvFilter;

mod fetch;

use fetch::FileFetcher;

fn main() -> score_player_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => run_play(&args),
        Commands::Inspect { path } => run_inspect(&path),
    }
}

fn run_play(args: &PlayArgs) -> score_player_core::Result<()> {
    let config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    tracing::info!(source = %args.source, realtime = args.realtime, "starting playback");

    let ticks = if args.realtime {
        let mut clock = IntervalClock::new();
        let receiver = clock
            .ticks()
            .ok_or_else(|| PlayerError::msg("clock tick receiver already taken"))?;
        let mut player = Player::with_config(config, clock);
        prepare(&mut player, args)?;

        let mut count = 0;
        while keep_going(&player, count, args.max_ticks) {
            let id = receiver
                .recv()
                .map_err(|_| PlayerError::msg("clock stopped delivering ticks"))?;
            player.tick_from(id);
            count += 1;
        }
        player.stop();
        count
    } else {
        let mut player = Player::with_config(config, ManualClock::new());
        prepare(&mut player, args)?;

        let mut count = 0;
        while keep_going(&player, count, args.max_ticks) {
            player.tick();
            count += 1;
        }
        player.stop();
        count
    };

    tracing::info!(ticks, "playback finished");
    Ok(())
}

fn prepare<C: Clock>(player: &mut Player<C>, args: &PlayArgs) -> score_player_core::Result<()> {
    player.on_state_changed(|state| tracing::info!(%state, "state changed"));
    player.on_time_update(|seconds| tracing::debug!(seconds, "time update"));
    player.on_error(|message| tracing::error!(reason = message, "player error"));
    player.on_loaded(|| tracing::info!("score ready"));

    if let Some(tempo) = args.tempo {
        player.set_tempo(tempo);
    }
    if let Some(volume) = args.volume {
        player.set_volume(volume);
    }
    if args.loop_playback {
        player.set_loop(true);
    }

    let ticket = player.load_from_url(&args.source);
    let fetched = FileFetcher.fetch(&args.source);
    if !player.deliver_fetch(ticket, fetched, &ManifestDecoder) {
        return Err(PlayerError::msg(format!("could not load `{}`", args.source)));
    }

    for &index in &args.mute {
        player.set_track_muted(index, true);
    }
    for track in player.tracks() {
        tracing::info!(
            index = track.index,
            name = %track.name,
            instrument = %track.instrument,
            muted = track.muted,
            gain = player.effective_track_gain(track.index),
            "track"
        );
    }

    tracing::info!(
        tick_period = ?player.config().tick_period(),
        tempo_scaled = player.config().tempo_scaled_ticks,
        tempo = player.tempo(),
        volume = player.volume(),
        looping = player.is_looping(),
        "starting transport"
    );
    player.play();
    Ok(())
}

fn keep_going<C: Clock>(player: &Player<C>, count: u64, max_ticks: Option<u64>) -> bool {
    player.state() == PlaybackState::Playing && max_ticks.map_or(true, |max| count < max)
}

fn run_inspect(path: &Path) -> score_player_core::Result<()> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let score = ManifestDecoder.decode(&bytes, &filename)?;

    let mut player = Player::new(ManualClock::new());
    let ticket = player.begin_load();
    player.complete_load(ticket, score);

    let report = serde_json::json!({
        "metadata": player.metadata(),
        "tracks": player.tracks(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Score playback controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a score manifest and play it through to the end.
    Play(PlayArgs),
    /// Print the metadata and tracks of a score manifest as JSON.
    Inspect {
        /// Path to the score manifest.
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Path or `file://` URL of the score manifest.
    source: String,
    /// Restart from the beginning when the end is reached.
    #[arg(long = "loop")]
    loop_playback: bool,
    /// Tempo factor, clamped to 0.25..=4.0.
    #[arg(long)]
    tempo: Option<f32>,
    /// Master volume, clamped to 0.0..=1.0.
    #[arg(long)]
    volume: Option<f32>,
    /// Track index to mute. May be repeated.
    #[arg(long)]
    mute: Vec<usize>,
    /// JSON player configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Drive ticks from a wall-clock timer instead of as fast as possible.
    #[arg(long)]
    realtime: bool,
    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
}
