// src/main.rs

use anyhow::Result;
use lane_finder::pipeline::{LaneSession, MetricsSummary};
use lane_finder::preprocessing::SegmentExtractor;
use lane_finder::render::LaneRenderer;
use lane_finder::video_processor::VideoProcessor;
use lane_finder::{Config, FrameIssue};
use opencv::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Shared per-run collaborators around the detection core.
struct Stages {
    extractor: SegmentExtractor,
    renderer: LaneRenderer,
}

fn main() -> Result<()> {
    let config_path =
        std::env::var("LANE_FINDER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let loaded = Config::load_optional(&config_path)?;
    let config_found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("🛣️  Lane Line Finder Starting");
    if config_found {
        info!("✓ Configuration loaded from {}", config_path);
    } else {
        warn!("Config {} not found, using defaults", config_path);
    }

    info!(
        "Detection: smoothing={:.2}, max_slope={:.0}, cutoff={:.2}",
        config.detection.smoothing_factor, config.detection.max_slope, config.detection.cutoff_ratio
    );

    let processor = VideoProcessor::new(config.video.clone());
    let stages = Stages {
        extractor: SegmentExtractor::new(
            config.preprocessing.clone(),
            config.hough.clone(),
            config.detection.cutoff_ratio,
        ),
        renderer: LaneRenderer::new(config.render.clone()),
    };

    for image_path in processor.find_image_files() {
        if let Err(e) = process_image(&image_path, &processor, &stages, &config) {
            error!("Failed to process image {}: {:#}", image_path.display(), e);
        }
    }

    let video_files = processor.find_video_files();
    if video_files.is_empty() {
        warn!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    for (idx, video_path) in video_files.iter().enumerate() {
        info!("========================================");
        info!(
            "Processing video {}/{}: {}",
            idx + 1,
            video_files.len(),
            video_path.display()
        );

        match process_video(video_path, &processor, &stages, &config) {
            Ok(stats) => {
                info!("✓ Video processed successfully!");
                info!("  Total frames: {}", stats.total_frames);
                info!(
                    "  Both lines drawn: {} ({:.1}%)",
                    stats.frames_with_both_lines,
                    stats.coverage_pct()
                );
                info!("  Any line drawn: {}", stats.frames_with_any_line);
                if stats.crossed_lines > 0 {
                    warn!("  ✗ Crossed-line frames suppressed: {}", stats.crossed_lines);
                }
                info!(
                    "  Unstable fits: {} | Empty sides: {} | Vertical segments: {}",
                    stats.unstable_slopes, stats.empty_side_inputs, stats.degenerate_segments
                );
                info!("  Processing Speed: {:.1} FPS", stats.fps);
                if let Ok(json) = stats.to_json() {
                    debug!("Summary: {}", json);
                }
            }
            Err(e) => {
                error!("Failed to process video: {:#}", e);
            }
        }
    }

    Ok(())
}

/// A still image is its own session: no smoothing carries over between images.
fn process_image(path: &Path, processor: &VideoProcessor, stages: &Stages, config: &Config) -> Result<()> {
    let image = processor.read_image(path)?;
    let mut session = LaneSession::new(&config.detection);
    session.set_source_id(path.to_string_lossy());

    let segments = stages.extractor.extract(&image)?;
    let output = session.process(&segments, image.rows() as u32);
    let annotated = stages.renderer.render(&image, &output, &segments)?;

    let written = processor.write_image(path, &annotated)?;
    info!(
        "🖼️  {} → {} ({} segments, {} lines)",
        path.display(),
        written.display(),
        segments.len(),
        output.lines().count()
    );
    Ok(())
}

fn process_video(
    path: &Path,
    processor: &VideoProcessor,
    stages: &Stages,
    config: &Config,
) -> Result<MetricsSummary> {
    use opencv::videoio::VideoWriterTrait;

    let start_time = Instant::now();

    let mut reader = processor.open_video(path)?;
    let mut writer = processor.create_writer(path, &reader.meta)?;

    // Fresh state per video
    let mut session = LaneSession::new(&config.detection);
    session.set_source_id(path.to_string_lossy());

    while let Some(frame) = reader.read_frame()? {
        let segments = stages.extractor.extract(&frame.image)?;
        let output = session.process(&segments, frame.height);

        if output.has_issue(|i| matches!(i, FrameIssue::CrossedLines { .. })) {
            debug!(
                "Frame {} @ {:.0}ms: crossed lines suppressed",
                frame.index, frame.timestamp_ms
            );
        }

        if let Some(w) = writer.as_mut() {
            let annotated = stages.renderer.render(&frame.image, &output, &segments)?;
            w.write(&annotated)?;
        }

        if reader.frames_read() % 100 == 0 {
            match reader.progress_pct() {
                Some(pct) => info!(
                    "Progress: {:.1}% ({} frames, {:.1}s)",
                    pct,
                    reader.frames_read(),
                    frame.timestamp_ms / 1000.0
                ),
                None => info!(
                    "Progress: {} frames, {:.1}s",
                    reader.frames_read(),
                    frame.timestamp_ms / 1000.0
                ),
            }
        }
    }

    if let Some(mut w) = writer {
        w.release()?;
    }

    debug!(
        "Video {} finished in {:.1}s",
        path.display(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(session.metrics().summary())
}
