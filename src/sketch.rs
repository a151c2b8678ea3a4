//! Interaction state machine for the drawing canvas.
//!
//! Couples per-frame gesture input to stroke state: a raised index
//! finger draws, anything else lifts the pen, and completed strokes stay
//! on the canvas until an explicit clear.

use crate::gesture::Gesture;
use crate::landmarks::Point;
use crate::util::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    ActiveDraw,
}

/// The drawing surface state: current phase, all strokes drawn so far,
/// and the derived info line. Mutated only from the event loop.
#[derive(Debug)]
pub struct Sketch {
    pub phase: DrawPhase,
    /// Completed and in-progress strokes, oldest first. The last entry
    /// is the one being extended while in [`DrawPhase::ActiveDraw`].
    pub strokes: Vec<Vec<Point>>,
    /// User-facing description of the last classified gesture.
    pub info: String,
    /// On-screen region that clears the canvas when the fingertip
    /// enters it (the same action is reachable from the keyboard).
    pub clear_button: Rect,
}

impl Sketch {
    pub fn new(clear_button: Rect) -> Self {
        Self {
            phase: DrawPhase::Idle,
            strokes: Vec::new(),
            info: Gesture::NoHand.describe().to_string(),
            clear_button,
        }
    }

    /// Feed one frame's classification and (screen-space, mirrored)
    /// fingertip into the state machine.
    pub fn on_frame(&mut self, gesture: Gesture, fingertip: Option<Point>) {
        self.info = gesture.describe().to_string();

        match (gesture, fingertip) {
            (Gesture::OneFingerUp, Some(tip)) => {
                if self.clear_button.contains(tip) {
                    self.clear();
                    return;
                }
                if self.phase != DrawPhase::ActiveDraw || self.strokes.is_empty() {
                    // Entering draw (or drawing right after a clear)
                    // starts a new stroke at the fingertip.
                    self.strokes.push(vec![tip]);
                    self.phase = DrawPhase::ActiveDraw;
                } else if let Some(stroke) = self.strokes.last_mut() {
                    stroke.push(tip);
                }
            }
            _ => {
                // Strokes are retained; only the pen lifts.
                self.phase = DrawPhase::Idle;
            }
        }
    }

    /// Empty the canvas unconditionally, whatever the current gesture.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.phase = DrawPhase::Idle;
    }

    /// Points in the stroke currently being drawn, if any.
    pub fn current_stroke(&self) -> Option<&[Point]> {
        match self.phase {
            DrawPhase::ActiveDraw => self.strokes.last().map(Vec::as_slice),
            DrawPhase::Idle => None,
        }
    }
}
