//! Gesture classification over a single frame's hand landmarks.
//!
//! A handful of fixed-threshold comparisons between fingertips and their
//! PIP joints, evaluated in strict precedence. Pure and total: the same
//! landmark set always classifies the same way, and absent or malformed
//! input classifies as [`Gesture::NoHand`] instead of failing.

use crate::landmarks::{index, LandmarkSet};

/// Minimum normalized-y separation between a fingertip and its PIP joint
/// before the finger counts as folded or raised. Empirically tuned.
pub const FOLD_MARGIN: f64 = 0.03;

/// Discrete hand pose for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// No hand in frame (or the tracker delivered something malformed).
    NoHand,
    /// Fist: all four non-thumb fingers folded.
    Closed,
    /// Index finger raised, the rest folded. The drawing/hit pose.
    OneFingerUp,
    /// A hand is present but matches no recognized pose.
    Other,
}

impl Gesture {
    /// User-facing description, shown in the info line. Display only;
    /// nothing branches on this string.
    pub fn describe(&self) -> &'static str {
        match self {
            Gesture::NoHand => "no hand detected",
            Gesture::Closed => "fist",
            Gesture::OneFingerUp => "pointing — draw / hit",
            Gesture::Other => "hand detected",
        }
    }
}

// The four non-thumb fingers as (tip, pip) landmark pairs.
const FINGERS: [(usize, usize); 4] = [
    (index::INDEX_TIP, index::INDEX_PIP),
    (index::MIDDLE_TIP, index::MIDDLE_PIP),
    (index::RING_TIP, index::RING_PIP),
    (index::PINKY_TIP, index::PINKY_PIP),
];

/// Classify one frame's landmarks.
///
/// Image-space y grows downward, so "folded" means the tip sits below
/// (greater y than) its PIP joint.
pub fn classify(hand: Option<&LandmarkSet>) -> Gesture {
    let Some(hand) = hand else {
        return Gesture::NoHand;
    };

    let folded =
        |(tip, pip): (usize, usize)| hand.point(tip).y - hand.point(pip).y >= FOLD_MARGIN;
    let raised =
        |(tip, pip): (usize, usize)| hand.point(pip).y - hand.point(tip).y >= FOLD_MARGIN;

    let rest_folded = FINGERS[1..].iter().all(|&pair| folded(pair));

    if folded(FINGERS[0]) && rest_folded {
        Gesture::Closed
    } else if raised(FINGERS[0]) && rest_folded {
        Gesture::OneFingerUp
    } else {
        Gesture::Other
    }
}
