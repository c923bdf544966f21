use log::debug;

use super::config::{SequenceConfig, MAX_PAD_LENGTH};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameStatus {
    Pending,
    Loading,
    Loaded { width: u32, height: u32 },
    Failed,
}

pub struct Frame<I> {
    /// 1-based, matches the number in the file name.
    pub number: usize,
    pub src: String,
    pub status: FrameStatus,
    pub image: Option<I>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PreloadProgress {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl PreloadProgress {
    pub fn is_settled(&self) -> bool {
        self.requested > 0 && self.loaded + self.failed == self.requested
    }
}

/// Padding is capped at `MAX_PAD_LENGTH` digits.
pub fn frame_path(base_path: &str, number: usize, pad_length: usize, extension: &str) -> String {
    format!(
        "{}{:0width$}{}",
        base_path,
        number,
        extension,
        width = pad_length.min(MAX_PAD_LENGTH)
    )
}

pub struct FrameStore<I> {
    frames: Vec<Frame<I>>,
    progress: PreloadProgress,
}

impl<I> FrameStore<I> {
    pub fn new(config: &SequenceConfig) -> FrameStore<I> {
        let frames = (1..=config.frame_count)
            .map(|number| Frame {
                number,
                src: frame_path(&config.base_path, number, config.pad_length, &config.extension),
                status: FrameStatus::Pending,
                image: None,
            })
            .collect();
        FrameStore {
            frames,
            progress: PreloadProgress::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame<I>> {
        self.frames.get(index)
    }

    pub fn progress(&self) -> PreloadProgress {
        self.progress
    }

    /// Requests every pending frame through `load`, which receives the
    /// 0-based slot and the source path and returns the image handle.
    /// Frames that were already requested are left alone.
    pub fn preload<F>(&mut self, mut load: F)
    where
        F: FnMut(usize, &str) -> Option<I>,
    {
        for (index, frame) in self.frames.iter_mut().enumerate() {
            if frame.status != FrameStatus::Pending {
                continue;
            }
            frame.image = load(index, &frame.src);
            self.progress.requested += 1;
            if frame.image.is_some() {
                frame.status = FrameStatus::Loading;
            } else {
                debug!("Could not create image for {}", frame.src);
                frame.status = FrameStatus::Failed;
                self.progress.failed += 1;
            }
        }
    }

    /// Records a completed load. Returns false if the slot is unknown or
    /// was not waiting for a load.
    pub fn mark_loaded(&mut self, index: usize, width: u32, height: u32) -> bool {
        match self.frames.get_mut(index) {
            Some(frame) if frame.status == FrameStatus::Loading => {
                frame.status = FrameStatus::Loaded { width, height };
                self.progress.loaded += 1;
                true
            }
            _ => false,
        }
    }

    pub fn mark_failed(&mut self, index: usize) -> bool {
        match self.frames.get_mut(index) {
            Some(frame) if frame.status == FrameStatus::Loading => {
                debug!("Frame {} failed to load: {}", frame.number, frame.src);
                frame.status = FrameStatus::Failed;
                self.progress.failed += 1;
                true
            }
            _ => false,
        }
    }

    /// The image and its natural size, if the frame has finished loading.
    pub fn ready_image(&self, index: usize) -> Option<(&I, u32, u32)> {
        let frame = self.frames.get(index)?;
        match (frame.status, frame.image.as_ref()) {
            (FrameStatus::Loaded { width, height }, Some(image)) => Some((image, width, height)),
            _ => None,
        }
    }
}
