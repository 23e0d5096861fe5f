// ABOUTME: Builds the encoder argument vector and the output file path.
// ABOUTME: Screen capture via x11grab, nvenc output flags unless overridden.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const INPUT_FORMAT: &str = "x11grab";
const VIDEO_CODEC: &str = "h264_nvenc";
const THREAD_QUEUE_SIZE: &str = "1024";

/// What to capture and how to encode it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingOptions {
    pub input: String,
    pub frame_rate: u32,
    pub select_region: bool,
    pub window_id: String,
    pub no_mouse: bool,
    pub probe_size: String,
    pub preset: String,
    pub tune: String,
    pub video_profile: String,
    pub pixel_format: String,
    pub output_format: String,
    /// ALSA capture device; audio is recorded only when set
    pub alsa_audio: Option<String>,
    /// Replaces the nvenc output flags, split on whitespace
    pub custom_output_flags: Option<String>,
    pub replace_existing: bool,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            input: ":0.0".to_string(),
            frame_rate: 60,
            select_region: false,
            window_id: "0".to_string(),
            no_mouse: false,
            probe_size: "128M".to_string(),
            preset: "p7".to_string(),
            tune: "lossless".to_string(),
            video_profile: "high444p".to_string(),
            pixel_format: "yuv444p".to_string(),
            output_format: "matroska".to_string(),
            alsa_audio: None,
            custom_output_flags: None,
            replace_existing: true,
        }
    }
}

impl RecordingOptions {
    /// Encoder arguments, in order, writing to `output`.
    pub fn encoder_args(&self, output: &Path) -> Vec<String> {
        let flag = |on: bool| (if on { "1" } else { "0" }).to_string();
        let mut args: Vec<String> = vec!["-hide_banner".into()];

        args.extend([
            "-f".into(),
            INPUT_FORMAT.into(),
            "-r".into(),
            self.frame_rate.to_string(),
            "-probesize".into(),
            self.probe_size.clone(),
            "-thread_queue_size".into(),
            THREAD_QUEUE_SIZE.into(),
            "-draw_mouse".into(),
            flag(!self.no_mouse),
            "-select_region".into(),
            flag(self.select_region),
            "-show_region".into(),
            "1".into(),
            "-window_id".into(),
            self.window_id.clone(),
            "-i".into(),
            self.input.clone(),
        ]);

        if let Some(device) = &self.alsa_audio {
            args.extend([
                "-f".into(),
                "alsa".into(),
                "-thread_queue_size".into(),
                THREAD_QUEUE_SIZE.into(),
                "-i".into(),
                device.clone(),
            ]);
        }

        match &self.custom_output_flags {
            Some(flags) => args.extend(flags.split_whitespace().map(String::from)),
            None => args.extend([
                "-c:v".into(),
                VIDEO_CODEC.into(),
                "-preset".into(),
                self.preset.clone(),
                "-tune".into(),
                self.tune.clone(),
                "-profile:v".into(),
                self.video_profile.clone(),
                "-pix_fmt".into(),
                self.pixel_format.clone(),
            ]),
        }

        if self.alsa_audio.is_some() {
            args.extend(["-c:a".to_string(), "copy".to_string()]);
        }

        args.extend([
            "-f".into(),
            self.output_format.clone(),
            output.to_string_lossy().into_owned(),
            (if self.replace_existing { "-y" } else { "-n" }).into(),
        ]);
        args
    }
}

/// `<directory>/<unix millis>.mkv`, creating the directory when missing.
pub fn output_path(directory: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {}", directory.display()))?;
    let millis = chrono::Utc::now().timestamp_millis();
    Ok(directory.join(format!("{millis}.mkv")))
}
