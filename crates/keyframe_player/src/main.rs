// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless keyframe timeline player.
//!
//! Loads a serialized timeline (JSON or RON, chosen by file extension),
//! plays it on the system clock, and logs every actor state it renders.
//!
//! ```text
//! keyframe_player <timeline.json|timeline.ron> [settings.ron]
//! ```

mod error;
mod frame_loop;
mod log_renderer;
mod settings;

use error::{PlayerError, Result};
use keyframe_timeline::{SystemClock, Timeline};
use log_renderer::LogRenderer;
use settings::PlayerSettings;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let timeline_path = args.next();
    let settings_path = args.next();

    let settings = settings_path
        .as_deref()
        .map(PlayerSettings::load)
        .transpose();

    let log_filter = settings
        .as_ref()
        .ok()
        .and_then(Option::as_ref)
        .map_or(settings::DEFAULT_LOG_FILTER, |s| s.log_filter.as_str());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting keyframe player v{}", env!("CARGO_PKG_VERSION"));

    let result = settings.and_then(|settings| {
        let timeline_path = timeline_path.ok_or_else(|| {
            PlayerError::Usage("usage: keyframe_player <timeline.json|timeline.ron> [settings.ron]".to_string())
        })?;
        run(&timeline_path, &settings.unwrap_or_default())
    });

    if let Err(e) = result {
        tracing::error!("Player failed: {e}");
        std::process::exit(1);
    }
}

fn run(timeline_path: &Path, settings: &PlayerSettings) -> Result<()> {
    let format = format_for(timeline_path)?;
    let text = std::fs::read_to_string(timeline_path)?;

    let scheduler = frame_loop::IntervalScheduler::new();
    let mut timeline = Timeline::builder()
        .config(settings.timeline.clone())
        .scheduler(scheduler.clone())
        .clock(SystemClock::new())
        .renderer(|| Box::new(LogRenderer::new()))
        .build()?;

    let actors = timeline.import_from(&format, &text)?;
    tracing::info!(
        path = %timeline_path.display(),
        actors = actors.len(),
        length = timeline.animation_length(),
        "Loaded timeline"
    );

    timeline.play(settings.iterations);
    let summary = frame_loop::run(&mut timeline, &scheduler, settings.max_runtime());
    tracing::info!(frames = summary.frames, exit = ?summary.exit, "Playback finished");

    Ok(())
}

/// Timeline format name from the file extension
fn format_for(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| PlayerError::Usage(format!("cannot tell the format of {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for() {
        assert_eq!(format_for(Path::new("demo.json")).unwrap(), "json");
        assert_eq!(format_for(Path::new("demo.RON")).unwrap(), "ron");
        assert!(matches!(format_for(Path::new("demo")), Err(PlayerError::Usage(_))));
    }

    #[test]
    fn test_demo_asset_loads() {
        let text = include_str!("../assets/bounce.json");
        let mut timeline = Timeline::new();
        let actors = timeline.import_from("json", text).unwrap();
        assert_eq!(actors.len(), 2);
        assert_eq!(timeline.animation_length(), 2000);

        timeline.update(Some(500));
        let ball = timeline.actor(actors[0]).unwrap();
        assert_eq!(ball.state().number("y"), Some(200.0));
    }
}
