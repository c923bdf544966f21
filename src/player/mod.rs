pub mod clock;
pub mod config;
pub mod frame;
pub mod geometry;
pub mod schedule;

use std::fmt;

use log::debug;

use clock::FrameClock;
use config::SequenceConfig;
use frame::{FrameStore, PreloadProgress};
use geometry::{cover_fit, DrawRect, SurfaceGeometry};

#[derive(Clone, Debug, PartialEq)]
pub enum SequenceError {
    UnknownParam(String),
    InvalidNumber { key: String, value: String },
    OutOfRange { key: String, value: String },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::UnknownParam(key) => write!(f, "unknown sequence param '{}'", key),
            SequenceError::InvalidNumber { key, value } => {
                write!(f, "sequence param '{}' is not a number: '{}'", key, value)
            }
            SequenceError::OutOfRange { key, value } => {
                write!(f, "sequence param '{}' is out of range: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for SequenceError {}

/// The drawing target a player renders into.
pub trait FrameSurface {
    type Image;

    /// Resizes the backing store, sets the displayed size and restores the
    /// pixel-ratio transform and smoothing settings.
    fn apply_geometry(&mut self, geometry: &SurfaceGeometry);

    /// Draws `image` into `rect`, given in logical pixels.
    fn draw(&mut self, image: &Self::Image, rect: &DrawRect);
}

/// Identifies one animation-frame loop started by `play`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    FrameMissing,
    FrameNotLoaded,
    EmptySurface,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderOutcome {
    Drawn(DrawRect),
    Skipped(SkipReason),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Advanced(RenderOutcome),
    Waiting,
    Stop,
}

impl TickOutcome {
    pub fn should_reschedule(&self) -> bool {
        !matches!(self, TickOutcome::Stop)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResizeOutcome {
    Resized {
        geometry: SurfaceGeometry,
        render: RenderOutcome,
    },
    ContainerMissing,
}

pub struct SequencePlayer<S: FrameSurface> {
    pub config: SequenceConfig,
    surface: S,
    frames: FrameStore<S::Image>,
    current_frame: usize,
    is_playing: bool,
    clock: FrameClock,
    loop_generation: u64,
    geometry: Option<SurfaceGeometry>,
    skipped_renders: u64,
}

impl<S: FrameSurface> SequencePlayer<S> {
    pub fn new(config: SequenceConfig, surface: S) -> SequencePlayer<S> {
        let frames = FrameStore::new(&config);
        let clock = FrameClock::new(config.frame_interval());
        SequencePlayer {
            config,
            surface,
            frames,
            current_frame: 0,
            is_playing: false,
            clock,
            loop_generation: 0,
            geometry: None,
            skipped_renders: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn geometry(&self) -> Option<SurfaceGeometry> {
        self.geometry
    }

    pub fn progress(&self) -> PreloadProgress {
        self.frames.progress()
    }

    pub fn skipped_renders(&self) -> u64 {
        self.skipped_renders
    }

    pub fn preload<F>(&mut self, load: F)
    where
        F: FnMut(usize, &str) -> Option<S::Image>,
    {
        self.frames.preload(load);
    }

    pub fn mark_loaded(&mut self, index: usize, width: u32, height: u32) -> bool {
        self.frames.mark_loaded(index, width, height)
    }

    pub fn mark_failed(&mut self, index: usize) -> bool {
        self.frames.mark_failed(index)
    }

    /// Starts playback. Returns the token for the new loop, or `None` when
    /// a loop is already running.
    pub fn play(&mut self, now: f64) -> Option<LoopToken> {
        if self.is_playing {
            return None;
        }
        self.is_playing = true;
        self.clock.reset(now);
        self.loop_generation += 1;
        debug!("Sequence playing (loop {})", self.loop_generation);
        Some(LoopToken(self.loop_generation))
    }

    pub fn pause(&mut self) {
        if self.is_playing {
            debug!("Sequence paused at frame {}", self.current_frame);
        }
        self.is_playing = false;
    }

    /// Plays while the surface intersects the viewport with at least
    /// `visibility_threshold` of it in view, and pauses otherwise.
    pub fn on_visibility(
        &mut self,
        is_intersecting: bool,
        intersection_ratio: f64,
        now: f64,
    ) -> Option<LoopToken> {
        if is_intersecting && intersection_ratio >= self.config.visibility_threshold {
            self.play(now)
        } else {
            self.pause();
            None
        }
    }

    /// One animation-frame callback of the loop identified by `token`.
    pub fn tick(&mut self, token: LoopToken, timestamp: f64) -> TickOutcome {
        if !self.is_playing || token.0 != self.loop_generation {
            return TickOutcome::Stop;
        }
        if !self.clock.poll(timestamp) {
            return TickOutcome::Waiting;
        }
        self.advance();
        TickOutcome::Advanced(self.render_frame(self.current_frame))
    }

    fn advance(&mut self) {
        if !self.frames.is_empty() {
            self.current_frame = (self.current_frame + 1) % self.frames.len();
        }
    }

    pub fn render_frame(&mut self, index: usize) -> RenderOutcome {
        let outcome = self.draw_frame(index);
        if let RenderOutcome::Skipped(reason) = outcome {
            self.skipped_renders += 1;
            debug!("Skipped frame {}: {:?}", index, reason);
        }
        outcome
    }

    fn draw_frame(&mut self, index: usize) -> RenderOutcome {
        if self.frames.get(index).is_none() {
            return RenderOutcome::Skipped(SkipReason::FrameMissing);
        }
        let (image, width, height) = match self.frames.ready_image(index) {
            Some(ready) => ready,
            None => return RenderOutcome::Skipped(SkipReason::FrameNotLoaded),
        };
        let geometry = match self.geometry {
            Some(geometry) => geometry,
            None => return RenderOutcome::Skipped(SkipReason::EmptySurface),
        };
        match cover_fit(
            geometry.css_width,
            geometry.css_height,
            width as f64,
            height as f64,
        ) {
            Some(rect) => {
                self.surface.draw(image, &rect);
                RenderOutcome::Drawn(rect)
            }
            None => RenderOutcome::Skipped(SkipReason::EmptySurface),
        }
    }

    /// Fits the surface to its container and redraws the current frame.
    /// `container_size` is the container's on-screen size in CSS pixels.
    pub fn resize(
        &mut self,
        container_size: Option<(f64, f64)>,
        pixel_ratio: Option<f64>,
    ) -> ResizeOutcome {
        let (width, height) = match container_size {
            Some(size) => size,
            None => {
                debug!("Resize skipped, surface has no container");
                return ResizeOutcome::ContainerMissing;
            }
        };
        let geometry = SurfaceGeometry::new(width, height, pixel_ratio);
        self.surface.apply_geometry(&geometry);
        self.geometry = Some(geometry);
        let render = self.render_frame(self.current_frame);
        ResizeOutcome::Resized { geometry, render }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        geometries: Vec<SurfaceGeometry>,
        draws: Vec<(usize, DrawRect)>,
    }

    impl FrameSurface for RecordingSurface {
        type Image = usize;

        fn apply_geometry(&mut self, geometry: &SurfaceGeometry) {
            self.geometries.push(*geometry);
        }

        fn draw(&mut self, image: &usize, rect: &DrawRect) {
            self.draws.push((*image, *rect));
        }
    }

    fn player(frame_count: usize) -> SequencePlayer<RecordingSurface> {
        let config = SequenceConfig {
            frame_count,
            ..SequenceConfig::default()
        };
        SequencePlayer::new(config, RecordingSurface::default())
    }

    fn loaded_player(frame_count: usize) -> SequencePlayer<RecordingSurface> {
        let mut player = player(frame_count);
        player.preload(|index, _| Some(index));
        for index in 0..frame_count {
            player.mark_loaded(index, 1920, 1080);
        }
        player.resize(Some((800.0, 600.0)), Some(1.0));
        player
    }

    #[test]
    fn test_advance_is_cyclic() {
        for start in 0..7 {
            let mut player = player(7);
            player.current_frame = start;
            let mut seen = HashSet::new();
            for _ in 0..7 {
                player.advance();
                seen.insert(player.current_frame());
            }
            assert_eq!(seen.len(), 7);
            assert_eq!(player.current_frame(), start);
        }
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut player = player(4);
        let token = player.play(0.0);
        assert!(token.is_some());
        assert_eq!(player.play(5.0), None);
        assert!(player.is_playing());
        // The second call did not reset the clock.
        assert_eq!(player.clock.last_frame_time(), 0.0);
    }

    #[test]
    fn test_pause_stops_loop() {
        let mut player = loaded_player(4);
        let token = player.play(0.0).unwrap();
        assert_eq!(player.tick(token, 10.0), TickOutcome::Waiting);
        player.pause();
        player.pause();
        assert_eq!(player.tick(token, 100.0), TickOutcome::Stop);
        assert_eq!(player.current_frame(), 0);
    }

    #[test]
    fn test_stale_loop_stops_after_pause_and_play() {
        let mut player = loaded_player(4);
        let first = player.play(0.0).unwrap();
        player.pause();
        let second = player.play(1.0).unwrap();
        assert_ne!(first, second);
        // The first loop still has a callback queued. It must not keep running.
        assert_eq!(player.tick(first, 50.0), TickOutcome::Stop);
        assert!(player.tick(second, 50.0).should_reschedule());
    }

    #[test]
    fn test_resume_does_not_jump() {
        let mut player = loaded_player(10);
        let token = player.play(0.0).unwrap();
        assert!(matches!(player.tick(token, 50.0), TickOutcome::Advanced(_)));
        assert_eq!(player.current_frame(), 1);

        player.pause();
        assert_eq!(player.tick(token, 5_000.0), TickOutcome::Stop);

        // Resuming long after pausing advances at most one frame per interval.
        let token = player.play(10_000.0).unwrap();
        assert_eq!(player.tick(token, 10_016.0), TickOutcome::Waiting);
        assert!(matches!(player.tick(token, 10_045.0), TickOutcome::Advanced(_)));
        assert_eq!(player.current_frame(), 2);
    }

    #[test]
    fn test_tick_advances_once_per_interval() {
        let mut player = loaded_player(40);
        let token = player.play(0.0).unwrap();
        let mut t = 0.0;
        while t < 1000.0 {
            t += 1000.0 / 60.0;
            player.tick(token, t);
        }
        // 24fps over one second of 60Hz ticks.
        assert!((23..=24).contains(&player.current_frame()));
        assert_eq!(player.surface().draws.len(), player.current_frame() + 1);
    }

    #[test]
    fn test_render_skips_unloaded_frame() {
        let mut player = player(3);
        player.preload(|index, _| Some(index));
        player.mark_loaded(0, 100, 100);
        player.resize(Some((200.0, 100.0)), None);
        assert_eq!(player.surface().draws.len(), 1);

        assert_eq!(
            player.render_frame(1),
            RenderOutcome::Skipped(SkipReason::FrameNotLoaded)
        );
        assert_eq!(
            player.render_frame(99),
            RenderOutcome::Skipped(SkipReason::FrameMissing)
        );
        assert_eq!(player.surface().draws.len(), 1);
        assert_eq!(player.skipped_renders(), 2);
    }

    #[test]
    fn test_unloaded_frames_do_not_block_advance() {
        let mut player = player(3);
        player.preload(|index, _| Some(index));
        player.mark_loaded(2, 100, 100);
        player.resize(Some((100.0, 100.0)), None);
        let token = player.play(0.0).unwrap();

        assert_eq!(
            player.tick(token, 50.0),
            TickOutcome::Advanced(RenderOutcome::Skipped(SkipReason::FrameNotLoaded))
        );
        assert_eq!(player.current_frame(), 1);
        assert!(matches!(
            player.tick(token, 100.0),
            TickOutcome::Advanced(RenderOutcome::Drawn(_))
        ));
        assert_eq!(player.current_frame(), 2);
        assert_eq!(player.surface().draws.last().unwrap().0, 2);
    }

    #[test]
    fn test_render_before_first_resize() {
        let mut player = player(1);
        player.preload(|index, _| Some(index));
        player.mark_loaded(0, 100, 100);
        assert_eq!(
            player.render_frame(0),
            RenderOutcome::Skipped(SkipReason::EmptySurface)
        );
    }

    #[test]
    fn test_render_uses_cover_fit() {
        let mut player = player(1);
        player.preload(|index, _| Some(index));
        player.mark_loaded(0, 400, 400);
        let outcome = player.resize(Some((800.0, 600.0)), Some(2.0));
        let expected = DrawRect {
            x: 0.0,
            y: -100.0,
            width: 800.0,
            height: 800.0,
        };
        assert_eq!(
            outcome,
            ResizeOutcome::Resized {
                geometry: SurfaceGeometry::new(800.0, 600.0, Some(2.0)),
                render: RenderOutcome::Drawn(expected),
            }
        );
        assert_eq!(player.surface().draws, vec![(0, expected)]);
    }

    #[test]
    fn test_visibility_gates_playback() {
        let mut player = loaded_player(5);
        assert_eq!(player.on_visibility(true, 0.05, 0.0), None);
        assert!(!player.is_playing());

        let token = player.on_visibility(true, 0.1, 0.0).unwrap();
        assert!(player.is_playing());
        assert!(player.on_visibility(true, 0.6, 10.0).is_none());
        player.tick(token, 50.0);
        assert_eq!(player.current_frame(), 1);

        assert_eq!(player.on_visibility(true, 0.09, 60.0), None);
        assert!(!player.is_playing());
        let draws = player.surface().draws.len();
        for t in [100.0, 200.0, 300.0] {
            assert_eq!(player.tick(token, t), TickOutcome::Stop);
        }
        assert_eq!(player.current_frame(), 1);
        assert_eq!(player.surface().draws.len(), draws);
    }

    #[test]
    fn test_zero_threshold_pauses_off_screen() {
        let mut player = loaded_player(5);
        player
            .config
            .apply_param("visibilityThreshold", "0")
            .unwrap();

        let token = player.on_visibility(true, 0.5, 0.0).unwrap();
        assert!(player.is_playing());

        // Leaving the viewport reports a ratio of 0, which still meets a zero threshold.
        assert_eq!(player.on_visibility(false, 0.0, 20.0), None);
        assert!(!player.is_playing());
        assert_eq!(player.tick(token, 100.0), TickOutcome::Stop);
        assert_eq!(player.current_frame(), 0);
    }

    #[test]
    fn test_resize_rerenders_current_frame() {
        let mut player = player(6);
        player.preload(|index, _| Some(index));
        for index in 0..6 {
            player.mark_loaded(index, 1600, 1200);
        }
        player.current_frame = 3;

        player.resize(Some((800.0, 600.0)), Some(2.0));
        assert_eq!(player.surface().geometries[0].backing_size(), (1600, 1200));

        let outcome = player.resize(Some((400.0, 300.0)), Some(2.0));
        let geometry = player.surface().geometries[1];
        assert_eq!(geometry.backing_size(), (800, 600));
        assert_eq!((geometry.css_width, geometry.css_height), (400.0, 300.0));
        assert_eq!(player.current_frame(), 3);

        let expected = DrawRect {
            x: 0.0,
            y: 0.0,
            width: 400.0,
            height: 300.0,
        };
        assert_eq!(
            outcome,
            ResizeOutcome::Resized {
                geometry,
                render: RenderOutcome::Drawn(expected),
            }
        );
        assert_eq!(player.surface().draws.last(), Some(&(3, expected)));
    }

    #[test]
    fn test_resize_without_container() {
        let mut player = loaded_player(2);
        let draws = player.surface().draws.len();
        assert_eq!(player.resize(None, Some(2.0)), ResizeOutcome::ContainerMissing);
        assert_eq!(player.surface().geometries.len(), 1);
        assert_eq!(player.surface().draws.len(), draws);
    }

    #[test]
    fn test_error_display() {
        let err = SequenceError::InvalidNumber {
            key: "fps".to_string(),
            value: "fast".to_string(),
        };
        assert_eq!(err.to_string(), "sequence param 'fps' is not a number: 'fast'");
    }
}
