//! Hand landmark data as delivered by the external tracker.
//!
//! The tracker emits one JSON object per processed frame; each detected
//! hand is 21 normalized (x, y, z) points in the MediaPipe hand-landmark
//! numbering. Only the first hand is considered. Decoding fails closed:
//! anything malformed becomes "no hand detected" rather than an error
//! the render loop would have to handle.

use serde::Deserialize;

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices (MediaPipe hand landmark convention).
#[allow(dead_code)]
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A single 2D point. Landmarks are normalized image-space (0.0–1.0,
/// y grows downward); stroke and bird positions reuse the same type in
/// playfield pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Project a normalized landmark into playfield pixels, optionally
    /// mirroring horizontally so the display matches a selfie view.
    pub fn to_screen(self, width: f64, height: f64, mirror: bool) -> Point {
        let x = if mirror { 1.0 - self.x } else { self.x };
        Point {
            x: x * width,
            y: self.y * height,
        }
    }
}

/// One detected hand: exactly [`LANDMARK_COUNT`] normalized points.
///
/// Construction goes through [`LandmarkSet::new`], which rejects
/// wrong-length input, so downstream code can index freely.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.len() == LANDMARK_COUNT {
            Some(Self { points })
        } else {
            None
        }
    }

    pub fn point(&self, idx: usize) -> Point {
        self.points[idx]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The index fingertip, the pointer for drawing and hit testing.
    pub fn index_tip(&self) -> Point {
        self.points[index::INDEX_TIP]
    }
}

#[derive(Deserialize)]
struct RawLandmark {
    x: f64,
    y: f64,
    #[allow(dead_code)]
    #[serde(default)]
    z: f64,
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    hands: Vec<Vec<RawLandmark>>,
}

/// Decode one tracker frame line. Returns `None` for empty frames and
/// for anything malformed (bad JSON, wrong landmark count).
pub fn decode_frame(line: &str) -> Option<LandmarkSet> {
    let frame: RawFrame = serde_json::from_str(line).ok()?;
    let hand = frame.hands.into_iter().next()?;
    LandmarkSet::new(
        hand.into_iter()
            .map(|lm| Point::new(lm.x, lm.y))
            .collect(),
    )
}
