// ABOUTME: scrast CLI entry point.
// ABOUTME: Records the screen, or sends stop/pause/resume/info to a running recording.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use scrast::status::print_error;
use scrast::{
    recording, run_recorder, send_command, Config, ControlMessage, RecorderOptions,
    RecordingOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "scrast", version)]
#[command(about = "Command line utility to record the screen")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Control socket path (overrides the config file)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(flatten)]
    record: RecordArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Stop the running recording
    Stop,
    /// Pause the running recording
    Pause,
    /// Resume the paused recording
    Resume,
    /// Print status, elapsed time and size of the running recording
    Info,
}

impl Commands {
    fn message(&self) -> ControlMessage {
        match self {
            Commands::Stop => ControlMessage::Stop,
            Commands::Pause => ControlMessage::Pause,
            Commands::Resume => ControlMessage::Resume,
            Commands::Info => ControlMessage::Info,
        }
    }
}

#[derive(Args)]
struct RecordArgs {
    /// X display and screen to capture
    #[arg(short, long, default_value = ":0.0")]
    input: String,

    #[arg(short = 'r', long, default_value_t = 60)]
    framerate: u32,

    /// Select a region of the screen to record
    #[arg(short, long)]
    select_region: bool,

    /// The window to record; 0 is the root window (see xwininfo)
    #[arg(short, long, default_value = "0")]
    window_id: String,

    #[arg(short = 'N', long)]
    no_mouse: bool,

    #[arg(short = 'P', long, default_value = "128M")]
    probesize: String,

    #[arg(
        short,
        long,
        default_value = "p7",
        value_parser = ["p1", "p2", "p3", "p4", "p5", "p6", "p7"]
    )]
    preset: String,

    #[arg(short, long, default_value = "lossless", value_parser = ["hq", "ll", "ull", "lossless"])]
    tune: String,

    #[arg(short = 'R', long, default_value = "high444p")]
    video_profile: String,

    #[arg(short = 'x', long, default_value = "yuv444p")]
    pixel_format: String,

    #[arg(short = 'f', long, default_value = "matroska")]
    output_format: String,

    /// ALSA device to record audio from (see `arecord -L`); enables audio
    #[arg(short = 'a', long)]
    alsa_audio: Option<String>,

    /// Do not bind the control socket; allows several instances, disables commands
    #[arg(short = 'I', long)]
    no_ipc: bool,

    /// Replace the nvenc output flags with these, e.g. -E='-c:v libx264 -preset ultrafast'
    #[arg(short = 'E', long, allow_hyphen_values = true)]
    no_nvenc: Option<String>,
}

impl RecordArgs {
    fn options(self) -> RecordingOptions {
        RecordingOptions {
            input: self.input,
            frame_rate: self.framerate,
            select_region: self.select_region,
            window_id: self.window_id,
            no_mouse: self.no_mouse,
            probe_size: self.probesize,
            preset: self.preset,
            tune: self.tune,
            video_profile: self.video_profile,
            pixel_format: self.pixel_format,
            output_format: self.output_format,
            alsa_audio: self.alsa_audio,
            custom_output_flags: self.no_nvenc,
            ..RecordingOptions::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&config_path)?;
    if let Some(socket) = cli.socket {
        config.socket_path = socket;
    }

    match cli.command {
        Some(command) => {
            scrast_log::init();
            if let Some(reply) = send_command(&config, command.message()).await? {
                print!("{reply}");
            }
            Ok(())
        }
        None => {
            scrast_log::init_file("scrast");
            let control = !cli.record.no_ipc;
            let output = recording::output_path(&config.output_directory_expanded())?;
            println!("Recording to {}", output.display());

            let encoder_args = cli.record.options().encoder_args(&output);
            let options = RecorderOptions {
                encoder_args,
                control,
            };
            let kind = run_recorder(config, options).await?;
            tracing::info!(?kind, "Recording finished");
            Ok(())
        }
    }
}
