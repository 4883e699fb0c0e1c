//! Animated background
//!
//! GIFs are decoded on a loader thread and handed back over a channel; the
//! UI thread only uploads textures and steps the frame clock. While a new
//! animation loads the previous one keeps playing.

use deckcore::theme::DeckColors;
use egui::{Color32, ColorImage, Painter, Rect, TextureHandle, TextureOptions};
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

/// Frames that declare no delay play at this rate.
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

pub struct DecodedFrame {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
    pub delay: Duration,
}

/// Per-frame delay from the GIF's `numer / denom` milliseconds.
pub fn frame_delay(numer: u32, denom: u32) -> Duration {
    if denom == 0 || numer == 0 {
        return DEFAULT_FRAME_DELAY;
    }
    let micros = u64::from(numer) * 1000 / u64::from(denom);
    if micros < 1000 {
        DEFAULT_FRAME_DELAY
    } else {
        Duration::from_micros(micros)
    }
}

pub fn decode_gif(path: &Path) -> image::ImageResult<Vec<DecodedFrame>> {
    let decoder = GifDecoder::new(BufReader::new(File::open(path)?))?;
    let frames = decoder.into_frames().collect_frames()?;
    Ok(frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let buffer = frame.into_buffer();
            let (w, h) = buffer.dimensions();
            DecodedFrame {
                size: [w as usize, h as usize],
                rgba: buffer.into_raw(),
                delay: frame_delay(numer, denom),
            }
        })
        .collect())
}

/// Which frame is showing and when the next one is due.
#[derive(Debug, Clone)]
pub struct FrameClock {
    delays: Vec<Duration>,
    index: usize,
    next: Instant,
}

impl FrameClock {
    pub fn new(delays: Vec<Duration>, now: Instant) -> Self {
        let first = delays.first().copied().unwrap_or(DEFAULT_FRAME_DELAY);
        Self { delays, index: 0, next: now + first }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// `None` for still images.
    pub fn deadline(&self) -> Option<Instant> {
        (self.delays.len() > 1).then_some(self.next)
    }

    /// Step past every frame whose time is up. Returns whether the frame
    /// changed. After a long stall the clock restarts from `now`.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.delays.len() < 2 || now < self.next {
            return false;
        }
        for _ in 0..self.delays.len() {
            self.index = (self.index + 1) % self.delays.len();
            self.next += self.delays[self.index];
            if now < self.next {
                return true;
            }
        }
        self.next = now + self.delays[self.index];
        true
    }
}

struct Loaded {
    path: PathBuf,
    result: image::ImageResult<Vec<DecodedFrame>>,
}

#[derive(Default)]
pub struct BackgroundPlayer {
    /// Animation most recently asked for.
    wanted: Option<PathBuf>,
    loading: Option<Receiver<Loaded>>,
    textures: Vec<TextureHandle>,
    clock: Option<FrameClock>,
}

impl BackgroundPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `path` unless it is already showing or on its way.
    pub fn show(&mut self, ctx: &egui::Context, path: Option<&Path>) {
        let Some(path) = path else {
            return;
        };
        if self.wanted.as_deref() == Some(path) {
            return;
        }
        self.wanted = Some(path.to_path_buf());

        let (tx, rx) = mpsc::channel();
        let path = path.to_path_buf();
        let repaint = ctx.clone();
        let spawned = std::thread::Builder::new()
            .name("deck-gif-loader".to_string())
            .spawn(move || {
                let result = decode_gif(&path);
                let _ = tx.send(Loaded { path, result });
                repaint.request_repaint();
            });
        match spawned {
            Ok(_) => self.loading = Some(rx),
            Err(e) => tracing::warn!(error = %e, "could not start background loader"),
        }
    }

    /// Pick up a finished load and advance the animation.
    pub fn poll(&mut self, ctx: &egui::Context, now: Instant) {
        if let Some(rx) = &self.loading {
            match rx.try_recv() {
                Ok(loaded) => {
                    self.loading = None;
                    self.install(ctx, loaded, now);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.loading = None,
            }
        }
        if let Some(clock) = &mut self.clock {
            clock.advance(now);
        }
    }

    fn install(&mut self, ctx: &egui::Context, loaded: Loaded, now: Instant) {
        // A newer swap superseded this load.
        if self.wanted.as_deref() != Some(loaded.path.as_path()) {
            return;
        }
        let frames = match loaded.result {
            Ok(frames) if !frames.is_empty() => frames,
            Ok(_) => {
                tracing::warn!(path = %loaded.path.display(), "animation has no frames");
                return;
            }
            Err(e) => {
                tracing::warn!(path = %loaded.path.display(), error = %e, "could not decode animation");
                return;
            }
        };

        tracing::debug!(path = %loaded.path.display(), frames = frames.len(), "background loaded");
        let delays = frames.iter().map(|f| f.delay).collect();
        self.textures = frames
            .into_iter()
            .enumerate()
            .map(|(i, frame)| {
                let image = ColorImage::from_rgba_unmultiplied(frame.size, &frame.rgba);
                ctx.load_texture(format!("background_{}", i), image, TextureOptions::LINEAR)
            })
            .collect();
        self.clock = Some(FrameClock::new(delays, now));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.clock.as_ref().and_then(FrameClock::deadline)
    }

    /// Stretch the current frame over `rect`, or the plain backdrop when
    /// nothing has loaded.
    pub fn paint(&self, painter: &Painter, rect: Rect) {
        let frame = self
            .clock
            .as_ref()
            .and_then(|clock| self.textures.get(clock.index()));
        match frame {
            Some(texture) => {
                let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), rect, uv, Color32::WHITE);
            }
            None => {
                painter.rect_filled(rect, 0.0, DeckColors::BACKDROP);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_zero_delay_plays_at_default_rate() {
        assert_eq!(frame_delay(0, 1), DEFAULT_FRAME_DELAY);
        assert_eq!(frame_delay(5, 0), DEFAULT_FRAME_DELAY);
        assert_eq!(frame_delay(40, 1), ms(40));
        assert_eq!(frame_delay(250, 2), ms(125));
    }

    #[test]
    fn test_clock_steps_through_frames_and_loops() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(vec![ms(100), ms(50), ms(200)], t0);
        assert_eq!(clock.deadline(), Some(t0 + ms(100)));

        assert!(!clock.advance(t0 + ms(99)));
        assert!(clock.advance(t0 + ms(100)));
        assert_eq!(clock.index(), 1);
        assert!(clock.advance(t0 + ms(150)));
        assert_eq!(clock.index(), 2);
        assert!(clock.advance(t0 + ms(350)));
        assert_eq!(clock.index(), 0);
    }

    #[test]
    fn test_clock_catches_up_skipped_frames() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(vec![ms(100), ms(100), ms(100), ms(100)], t0);
        assert!(clock.advance(t0 + ms(250)));
        assert_eq!(clock.index(), 2);
        assert_eq!(clock.deadline(), Some(t0 + ms(300)));
    }

    #[test]
    fn test_clock_restarts_after_long_stall() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(vec![ms(100), ms(100)], t0);
        let late = t0 + Duration::from_secs(60);
        assert!(clock.advance(late));
        assert_eq!(clock.deadline(), Some(late + ms(100)));
    }

    #[test]
    fn test_still_image_has_no_deadline() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(vec![ms(100)], t0);
        assert_eq!(clock.deadline(), None);
        assert!(!clock.advance(t0 + Duration::from_secs(5)));
        assert_eq!(clock.index(), 0);
    }

    #[test]
    fn test_decode_gif_frames_and_delays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.gif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = GifEncoder::new(file);
            let frames = [(Rgba([255, 0, 0, 255]), 50), (Rgba([0, 0, 255, 255]), 0)]
                .into_iter()
                .map(|(color, ms)| {
                    Frame::from_parts(
                        RgbaImage::from_pixel(4, 3, color),
                        0,
                        0,
                        Delay::from_numer_denom_ms(ms, 1),
                    )
                });
            encoder.encode_frames(frames).unwrap();
        }

        let frames = decode_gif(&path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].size, [4, 3]);
        assert_eq!(frames[0].rgba.len(), 4 * 3 * 4);
        assert_eq!(frames[0].delay, ms(50));
        assert_eq!(frames[1].delay, DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn test_decode_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(decode_gif(&dir.path().join("nope.gif")).is_err());
    }
}
