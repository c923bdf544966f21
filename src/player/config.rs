use std::collections::HashMap;

use itertools::Itertools;
use log::Level;

use crate::utils::parse_log_level;

use super::SequenceError;

pub const DEFAULT_CANVAS_ID: &str = "hero-canvas";
pub const DEFAULT_FRAME_COUNT: usize = 40;
pub const DEFAULT_FPS: f64 = 24.0;
pub const DEFAULT_BASE_PATH: &str = "hero/seq/ezgif-frame-";
pub const DEFAULT_EXTENSION: &str = ".jpg";
pub const DEFAULT_PAD_LENGTH: usize = 3;
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.1;
pub const DEFAULT_RESIZE_SETTLE_MS: i32 = 50;
pub const DEFAULT_RESIZE_POLL_MS: i32 = 2000;

pub const MAX_FRAME_COUNT: usize = 10_000;
pub const MAX_PAD_LENGTH: usize = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct SequenceConfig {
    pub canvas_id: String,
    pub frame_count: usize,
    pub fps: f64,
    pub base_path: String,
    pub extension: String,
    pub pad_length: usize,
    pub visibility_threshold: f64,
    pub resize_settle_ms: i32,
    /// Zero disables the periodic resize check.
    pub resize_poll_ms: i32,
    pub log_level: Level,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        SequenceConfig {
            canvas_id: DEFAULT_CANVAS_ID.to_string(),
            frame_count: DEFAULT_FRAME_COUNT,
            fps: DEFAULT_FPS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            pad_length: DEFAULT_PAD_LENGTH,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            resize_settle_ms: DEFAULT_RESIZE_SETTLE_MS,
            resize_poll_ms: DEFAULT_RESIZE_POLL_MS,
            log_level: Level::Warn,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SequenceError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| SequenceError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn out_of_range(key: &str, value: &str) -> SequenceError {
    SequenceError::OutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

impl SequenceConfig {
    /// Frame interval in milliseconds.
    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Applies a single override. On error the previous value is kept.
    pub fn apply_param(&mut self, key: &str, value: &str) -> Result<(), SequenceError> {
        match key {
            "canvasId" => {
                if value.trim().is_empty() {
                    return Err(out_of_range(key, value));
                }
                self.canvas_id = value.trim().to_string();
            }
            "frameCount" => {
                let count = parse_number::<usize>(key, value)?;
                if count == 0 || count > MAX_FRAME_COUNT {
                    return Err(out_of_range(key, value));
                }
                self.frame_count = count;
            }
            "fps" => {
                let fps = parse_number::<f64>(key, value)?;
                if !fps.is_finite() || fps <= 0.0 {
                    return Err(out_of_range(key, value));
                }
                self.fps = fps;
            }
            "basePath" => self.base_path = value.to_string(),
            "extension" => self.extension = value.to_string(),
            "padLength" => {
                let pad = parse_number::<usize>(key, value)?;
                if pad > MAX_PAD_LENGTH {
                    return Err(out_of_range(key, value));
                }
                self.pad_length = pad;
            }
            "visibilityThreshold" => {
                let threshold = parse_number::<f64>(key, value)?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(out_of_range(key, value));
                }
                self.visibility_threshold = threshold;
            }
            "resizeSettleMs" => {
                let ms = parse_number::<i32>(key, value)?;
                if ms < 0 {
                    return Err(out_of_range(key, value));
                }
                self.resize_settle_ms = ms;
            }
            "resizePollMs" => {
                let ms = parse_number::<i32>(key, value)?;
                if ms < 0 {
                    return Err(out_of_range(key, value));
                }
                self.resize_poll_ms = ms;
            }
            "logLevel" => {
                self.log_level = parse_log_level(value).ok_or_else(|| out_of_range(key, value))?;
            }
            _ => return Err(SequenceError::UnknownParam(key.to_string())),
        }
        Ok(())
    }

    /// Applies every override in key order and collects the rejected ones.
    pub fn apply_params(&mut self, params: &HashMap<String, String>) -> Vec<SequenceError> {
        params
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .filter_map(|(key, value)| self.apply_param(key, value).err())
            .collect()
    }
}
