// src/video_processor.rs

use crate::types::VideoConfig;
use anyhow::{bail, Context, Result};
use opencv::{
    core::{self, Mat, Vector},
    imgcodecs,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTraitConst, VideoWriter},
};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

pub struct VideoProcessor {
    config: VideoConfig,
}

impl VideoProcessor {
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }

    pub fn find_video_files(&self) -> Vec<PathBuf> {
        let videos = find_files(&self.config.input_dir, &self.config.video_extensions);
        info!("Found {} video files in {}", videos.len(), self.config.input_dir);
        videos
    }

    pub fn find_image_files(&self) -> Vec<PathBuf> {
        let images = find_files(&self.config.image_dir, &self.config.image_extensions);
        info!("Found {} images in {}", images.len(), self.config.image_dir);
        images
    }

    /// Open a video and read its stream properties. Streams that do not
    /// report a frame count get `frame_count: None`.
    pub fn open_video(&self, path: &Path) -> Result<VideoReader> {
        let path_str = path
            .to_str()
            .with_context(|| format!("non UTF-8 path {}", path.display()))?;
        let cap = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        if !cap.is_opened()? {
            bail!("Failed to open video file {}", path.display());
        }

        let prop = |id| VideoCaptureTraitConst::get(&cap, id);
        let reported_count = prop(videoio::CAP_PROP_FRAME_COUNT)?;
        let meta = StreamMeta {
            fps: prop(videoio::CAP_PROP_FPS)?,
            frame_count: (reported_count >= 1.0).then_some(reported_count as u64),
            size: core::Size::new(
                prop(videoio::CAP_PROP_FRAME_WIDTH)? as i32,
                prop(videoio::CAP_PROP_FRAME_HEIGHT)? as i32,
            ),
        };

        info!(
            "Opened {}: {}x{} @ {:.1} FPS, {} frames",
            path.display(),
            meta.size.width,
            meta.size.height,
            meta.fps,
            meta.frame_count.map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );

        Ok(VideoReader {
            cap,
            meta,
            frames_read: 0,
        })
    }

    /// Writer for `<stem>_lanes.mp4` matching the input stream, or `None`
    /// when annotated output is disabled.
    pub fn create_writer(&self, input_path: &Path, meta: &StreamMeta) -> Result<Option<VideoWriter>> {
        if !self.config.save_annotated {
            return Ok(None);
        }

        let output_path = self.output_path(input_path, |stem| format!("{stem}_lanes.mp4"))?;
        info!("Output video: {}", output_path.display());

        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer = VideoWriter::new(
            &output_path.to_string_lossy(),
            fourcc,
            meta.fps,
            meta.size,
            true,
        )?;

        Ok(Some(writer))
    }

    pub fn read_image(&self, path: &Path) -> Result<Mat> {
        let image = imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_COLOR)?;
        if image.empty() {
            bail!("Failed to read image {}", path.display());
        }
        Ok(image)
    }

    /// Write `lanes_marked_<name>` into the output directory.
    pub fn write_image(&self, input_path: &Path, image: &Mat) -> Result<PathBuf> {
        let name = input_path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("no file name in {}", input_path.display()))?;
        let output_path = self.output_path(input_path, |_| format!("lanes_marked_{name}"))?;

        if !imgcodecs::imwrite(&output_path.to_string_lossy(), image, &Vector::new())? {
            bail!("Failed to write image {}", output_path.display());
        }
        Ok(output_path)
    }

    fn output_path(&self, input_path: &Path, name: impl FnOnce(&str) -> String) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)
            .with_context(|| format!("creating {}", self.config.output_dir))?;
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("no file stem in {}", input_path.display()))?;
        Ok(PathBuf::from(&self.config.output_dir).join(name(stem)))
    }
}

fn find_files(dir: &str, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
        })
        .collect();
    files.sort();
    files
}

/// Stream properties as reported by the container.
#[derive(Debug, Clone, Copy)]
pub struct StreamMeta {
    pub fps: f64,
    pub frame_count: Option<u64>,
    pub size: core::Size,
}

/// One decoded frame and where it sits in the stream.
pub struct VideoFrame {
    pub image: Mat,
    /// Zero-based position in decode order.
    pub index: u64,
    pub timestamp_ms: f64,
    /// Height of the decoded image, which is what projection uses. Can differ
    /// from the container's reported size.
    pub height: u32,
}

pub struct VideoReader {
    cap: VideoCapture,
    pub meta: StreamMeta,
    frames_read: u64,
}

impl VideoReader {
    /// Next BGR frame, or `None` at end of stream.
    pub fn read_frame(&mut self) -> Result<Option<VideoFrame>> {
        use opencv::videoio::VideoCaptureTrait;

        let mut image = Mat::default();
        if !VideoCaptureTrait::read(&mut self.cap, &mut image)? || image.empty() {
            return Ok(None);
        }

        let index = self.frames_read;
        self.frames_read += 1;

        let timestamp_ms = match frame_timestamp_ms(index, self.meta.fps) {
            Some(ts) => ts,
            None => VideoCaptureTraitConst::get(&self.cap, videoio::CAP_PROP_POS_MSEC)?,
        };
        let height = u32::try_from(image.rows())
            .with_context(|| format!("frame {index} has negative height {}", image.rows()))?;

        Ok(Some(VideoFrame {
            image,
            index,
            timestamp_ms,
            height,
        }))
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Percentage of the stream decoded so far, when the length is known.
    pub fn progress_pct(&self) -> Option<f64> {
        progress_pct(self.frames_read, self.meta.frame_count)
    }
}

/// Presentation time of frame `index` at a constant `fps`. `None` when the
/// container reports no usable rate.
fn frame_timestamp_ms(index: u64, fps: f64) -> Option<f64> {
    (fps.is_finite() && fps > 0.0).then(|| index as f64 * 1000.0 / fps)
}

fn progress_pct(frames_read: u64, frame_count: Option<u64>) -> Option<f64> {
    let total = frame_count.filter(|&n| n > 0)?;
    Some((frames_read as f64 / total as f64 * 100.0).min(100.0))
}
