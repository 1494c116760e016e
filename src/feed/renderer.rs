//! Frame presentation onto the avatar rendering surface.
//!
//! [`FrameSink`] is the seam between the feeds and whatever actually shows
//! pixels; [`CanvasRenderer`] is the production implementation, painting
//! each frame aspect-fit and centered onto an owned pixel buffer
//! (letterbox/pillarbox). Tests substitute their own sink to observe
//! presentation timing.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage, imageops};

/// Destination for decoded avatar frames.
///
/// `present` must never fail: feeds treat presentation as infallible and a
/// sink with nowhere to draw simply ignores the frame.
pub trait FrameSink: Send {
    /// Present one decoded frame, replacing whatever was shown before.
    fn present(&mut self, frame: &DynamicImage);
}

/// Placement of a frame on a surface, aspect-fit and centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRect {
    /// Left edge of the drawn frame on the surface.
    pub x: u32,
    /// Top edge of the drawn frame on the surface.
    pub y: u32,
    /// Drawn width.
    pub width: u32,
    /// Drawn height.
    pub height: u32,
}

/// Compute the letterbox/pillarbox placement of a `frame_w`×`frame_h` frame
/// on a `surface_w`×`surface_h` surface.
///
/// The frame is scaled to fill the surface while preserving aspect ratio
/// and centered on whichever axis has slack. Returns `None` when any
/// dimension is zero (nothing to draw).
#[must_use]
pub fn fit_rect(frame_w: u32, frame_h: u32, surface_w: u32, surface_h: u32) -> Option<FitRect> {
    if frame_w == 0 || frame_h == 0 || surface_w == 0 || surface_h == 0 {
        return None;
    }

    // Cross-multiplied aspect comparison; avoids float rounding at the seam.
    let frame_wider = u64::from(frame_w) * u64::from(surface_h)
        >= u64::from(surface_w) * u64::from(frame_h);

    if frame_wider {
        // Fit to surface width, center vertically (letterbox).
        let height =
            ((u64::from(surface_w) * u64::from(frame_h)) / u64::from(frame_w)).max(1) as u32;
        Some(FitRect {
            x: 0,
            y: (surface_h.saturating_sub(height)) / 2,
            width: surface_w,
            height,
        })
    } else {
        // Fit to surface height, center horizontally (pillarbox).
        let width =
            ((u64::from(surface_h) * u64::from(frame_w)) / u64::from(frame_h)).max(1) as u32;
        Some(FitRect {
            x: (surface_w.saturating_sub(width)) / 2,
            y: 0,
            width,
            height: surface_h,
        })
    }
}

/// Paints frames onto an owned RGBA pixel buffer.
///
/// The buffer is sized to the last observed container box and only resized
/// on explicit [`resize`](Self::resize) calls, never per frame.
pub struct CanvasRenderer {
    surface: RgbaImage,
    frames_presented: u64,
}

/// Surface background drawn behind letterboxed frames.
const CLEAR_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

impl CanvasRenderer {
    /// Create a renderer with a surface of the given pixel dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: RgbaImage::from_pixel(width, height, CLEAR_COLOR),
            frames_presented: 0,
        }
    }

    /// Resize the surface to a newly observed container box, discarding the
    /// current contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface = RgbaImage::from_pixel(width, height, CLEAR_COLOR);
    }

    /// Current surface dimensions `(width, height)`.
    #[must_use]
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    /// Number of frames presented since construction.
    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// The current surface contents.
    #[must_use]
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }
}

impl FrameSink for CanvasRenderer {
    fn present(&mut self, frame: &DynamicImage) {
        let (sw, sh) = self.surface.dimensions();
        let Some(rect) = fit_rect(frame.width(), frame.height(), sw, sh) else {
            // Empty surface or empty frame: nothing to draw.
            return;
        };

        for pixel in self.surface.pixels_mut() {
            *pixel = CLEAR_COLOR;
        }

        let scaled = imageops::resize(
            &frame.to_rgba8(),
            rect.width,
            rect.height,
            FilterType::Triangle,
        );
        imageops::overlay(
            &mut self.surface,
            &scaled,
            i64::from(rect.x),
            i64::from(rect.y),
        );
        self.frames_presented += 1;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn wide_frame_letterboxes() {
        // 200x50 frame on a 100x100 surface: fit to width, slack above/below.
        let rect = fit_rect(200, 50, 100, 100).unwrap();
        assert_eq!(rect.width, 100);
        assert_eq!(rect.height, 25);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 37); // (100 - 25) / 2
    }

    #[test]
    fn tall_frame_pillarboxes() {
        // 50x200 frame on a 100x100 surface: fit to height, slack left/right.
        let rect = fit_rect(50, 200, 100, 100).unwrap();
        assert_eq!(rect.height, 100);
        assert_eq!(rect.width, 25);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.x, 37);
    }

    #[test]
    fn matching_aspect_fills_surface() {
        let rect = fit_rect(400, 300, 800, 600).unwrap();
        assert_eq!(
            rect,
            FitRect {
                x: 0,
                y: 0,
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn zero_dimensions_yield_none() {
        assert!(fit_rect(0, 100, 100, 100).is_none());
        assert!(fit_rect(100, 0, 100, 100).is_none());
        assert!(fit_rect(100, 100, 0, 100).is_none());
        assert!(fit_rect(100, 100, 100, 0).is_none());
    }

    #[test]
    fn extreme_aspect_never_collapses_to_zero() {
        let rect = fit_rect(10_000, 1, 100, 100).unwrap();
        assert!(rect.height >= 1);
        let rect = fit_rect(1, 10_000, 100, 100).unwrap();
        assert!(rect.width >= 1);
    }

    #[test]
    fn present_paints_and_counts() {
        let mut renderer = CanvasRenderer::new(100, 100);
        let frame = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            200,
            50,
            Rgba([255, 255, 255, 255]),
        ));
        renderer.present(&frame);
        assert_eq!(renderer.frames_presented(), 1);

        // Center row falls inside the letterboxed band and is white.
        let center = renderer.surface().get_pixel(50, 50);
        assert_eq!(center[0], 255);
        // Top row is clear color (letterbox bar).
        let top = renderer.surface().get_pixel(50, 0);
        assert_eq!(top[0], 0);
    }

    #[test]
    fn present_replaces_previous_frame() {
        let mut renderer = CanvasRenderer::new(50, 50);
        let white = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            50,
            50,
            Rgba([255, 255, 255, 255]),
        ));
        let red =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 50, Rgba([255, 0, 0, 255])));
        renderer.present(&white);
        renderer.present(&red);
        let px = renderer.surface().get_pixel(25, 25);
        assert_eq!((px[0], px[1], px[2]), (255, 0, 0));
        assert_eq!(renderer.frames_presented(), 2);
    }

    #[test]
    fn present_on_empty_surface_is_noop() {
        let mut renderer = CanvasRenderer::new(0, 0);
        let frame =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255])));
        renderer.present(&frame);
        assert_eq!(renderer.frames_presented(), 0);
    }

    #[test]
    fn resize_matches_last_observed_box() {
        let mut renderer = CanvasRenderer::new(100, 100);
        renderer.resize(320, 240);
        assert_eq!(renderer.surface_size(), (320, 240));
    }
}
