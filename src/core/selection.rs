use serde::Serialize;

use crate::math::ease;
use crate::types::KeyframeId;

/// The two keyframes bracketing the viewport center, recomputed every frame
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ActivePair {
    pub prev: KeyframeId,
    pub next: KeyframeId,
    /// Eased weight of `next`; `prev` weighs `1 - blend`
    pub blend: f32,
}

/// A keyframe as seen by pair selection
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id: KeyframeId,
    /// Vertical offset from the viewport center; non-finite means excluded
    pub offset_y: f32,
    pub ease_in: bool,
    pub ease_out: bool,
}

/// Pick the pair around the viewport center.
///
/// `prev` is the candidate with the largest offset at or above the center,
/// `next` the one with the smallest offset below it. Without a `next` the
/// pair collapses onto `prev`. When every offset is below the center, `prev`
/// falls back to the first candidate in offset order.
pub fn select_active_pair(candidates: &[Candidate]) -> Option<ActivePair> {
    let mut sorted: Vec<&Candidate> = candidates
        .iter()
        .filter(|candidate| candidate.offset_y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.offset_y.total_cmp(&b.offset_y));

    let mut prev = *sorted.first()?;
    let mut next: Option<&Candidate> = None;
    for &candidate in &sorted {
        if candidate.offset_y <= 0.0 && candidate.offset_y > prev.offset_y {
            prev = candidate;
        }
        if candidate.offset_y > 0.0 && next.map_or(true, |n| candidate.offset_y < n.offset_y) {
            next = Some(candidate);
        }
    }
    let next = next.unwrap_or(prev);

    Some(ActivePair {
        prev: prev.id,
        next: next.id,
        blend: blend_factor(prev, next),
    })
}

fn blend_factor(prev: &Candidate, next: &Candidate) -> f32 {
    if prev.offset_y == next.offset_y {
        return 0.0;
    }
    let total = prev.offset_y.abs() + next.offset_y.abs();
    let t_raw = prev.offset_y.abs() / total;
    ease(t_raw, next.ease_in, prev.ease_out)
}
