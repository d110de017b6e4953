//! Card-stack transition: the one discrete state machine in the crate.
//!
//! `Idle -> Transitioning(progress)` fires when the cycle clock crosses the
//! cycle length and no transition is in flight; progress is monotone within a
//! transition and completion advances the active index by exactly one.

use crate::motion::{ease_in_out_cubic, lerp};

/// Current state of the animator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionPhase {
    Idle,
    Transitioning { progress: f32 },
}

/// What `advance` did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionStep {
    None,
    Started,
    /// A transition finished; the caller commits the index advance and snaps
    /// resting transforms.
    Completed,
}

/// The per-frame step is defined against a 60 Hz reference frame so the
/// configured speed keeps its meaning under any tick cadence.
const REFERENCE_FRAME_SECS: f32 = 1.0 / 60.0;

#[derive(Clone, Debug)]
pub struct TransitionAnimator {
    phase: TransitionPhase,
    cycle_clock: f32,
    cycle_seconds: f32,
    /// Progress added per reference frame while transitioning.
    step: f32,
}

impl TransitionAnimator {
    pub fn new(cycle_seconds: f32, step: f32) -> Self {
        Self {
            phase: TransitionPhase::Idle,
            cycle_clock: 0.0,
            cycle_seconds: cycle_seconds.max(REFERENCE_FRAME_SECS),
            step: step.max(1e-5),
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, TransitionPhase::Transitioning { .. })
    }

    pub fn progress(&self) -> Option<f32> {
        match self.phase {
            TransitionPhase::Transitioning { progress } => Some(progress),
            TransitionPhase::Idle => None,
        }
    }

    /// Update the cycle parameters from live settings. Takes effect on the
    /// next trigger; an in-flight transition keeps its current progress.
    pub fn configure(&mut self, cycle_seconds: f32, step: f32) {
        self.cycle_seconds = cycle_seconds.max(REFERENCE_FRAME_SECS);
        self.step = step.max(1e-5);
    }

    /// Advance clocks by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> TransitionStep {
        self.cycle_clock += dt;

        let mut started = false;
        if self.phase == TransitionPhase::Idle {
            if self.cycle_clock < self.cycle_seconds {
                return TransitionStep::None;
            }
            self.cycle_clock -= self.cycle_seconds;
            self.phase = TransitionPhase::Transitioning { progress: 0.0 };
            started = true;
        }

        if let TransitionPhase::Transitioning { progress } = &mut self.phase {
            *progress += self.step * (dt / REFERENCE_FRAME_SECS);
            if *progress >= 1.0 {
                self.phase = TransitionPhase::Idle;
                return TransitionStep::Completed;
            }
        }

        if started {
            TransitionStep::Started
        } else {
            TransitionStep::None
        }
    }
}

/// Display transform of one card for the stack variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardTransform {
    pub z: f32,
    pub y: f32,
    pub rot_x: f32,
    pub scale: f32,
    pub opacity: f32,
}

/// Stack geometry snapshotted from the live settings.
#[derive(Clone, Copy, Debug)]
pub struct StackParams {
    pub spacing: f32,
    pub y_offset: f32,
    pub x_rotation: f32,
}

/// How far the front card folds down as it leaves.
const FOLD_ROTATION: f32 = std::f32::consts::FRAC_PI_3;
/// Vertical lift and scale gain of the center-ordinal card.
const CENTER_LIFT: f32 = 2.0;
const CENTER_SCALE_GAIN: f32 = 1.5;

/// Transform of the card currently `relative_pos` slots behind the active
/// index, mid-transition.
///
/// Front card folds down and fades out, the back card emerges in reverse, the
/// center ordinal scales up, everything else slides one slot forward.
pub fn card_transform(
    relative_pos: usize,
    count: usize,
    center: usize,
    progress: f32,
    p: &StackParams,
) -> CardTransform {
    let ease = ease_in_out_cubic(progress);
    // The fold runs slightly ahead of the slide so the front card is clear
    // before its slot is reoccupied.
    let fold = ease_in_out_cubic((progress * 1.1).min(1.0));
    let rel = relative_pos as f32;

    if relative_pos == 0 {
        CardTransform {
            z: fold * 0.5,
            y: p.y_offset - 1.5 * fold * fold,
            rot_x: p.x_rotation + FOLD_ROTATION * fold,
            scale: 1.0 - fold * 0.2,
            opacity: (1.0 - fold * 1.5).max(0.0),
        }
    } else if count > 0 && relative_pos == count - 1 {
        let emerge = 1.0 - fold;
        CardTransform {
            z: -rel * p.spacing - emerge * 0.5,
            y: p.y_offset - 1.5 * emerge * emerge,
            rot_x: p.x_rotation - FOLD_ROTATION * emerge,
            scale: 0.8 + fold * 0.2,
            opacity: (fold * 1.5).min(1.0),
        }
    } else if relative_pos == center {
        let scale_ease = ease_in_out_cubic(ease);
        CardTransform {
            z: -rel * p.spacing,
            y: p.y_offset + CENTER_LIFT * scale_ease,
            rot_x: p.x_rotation,
            scale: 1.0 + CENTER_SCALE_GAIN * scale_ease,
            opacity: 1.0,
        }
    } else {
        let next = (relative_pos + count - 1) % count.max(1);
        let current_z = -rel * p.spacing;
        let next_z = -(next as f32) * p.spacing;
        CardTransform {
            z: lerp(current_z, next_z, ease),
            y: p.y_offset,
            rot_x: p.x_rotation,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

/// Exact transform a card rests at between transitions.
pub fn resting_transform(relative_pos: usize, center: usize, p: &StackParams) -> CardTransform {
    let rel = relative_pos as f32;
    if relative_pos == center {
        CardTransform {
            z: -rel * p.spacing,
            y: p.y_offset + CENTER_LIFT,
            rot_x: p.x_rotation,
            scale: 1.0 + CENTER_SCALE_GAIN,
            opacity: 1.0,
        }
    } else {
        CardTransform {
            z: -rel * p.spacing,
            y: p.y_offset,
            rot_x: p.x_rotation,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn params() -> StackParams {
        StackParams { spacing: 1.0, y_offset: 1.0, x_rotation: 0.0 }
    }

    #[test]
    fn test_no_transition_before_cycle() {
        let mut a = TransitionAnimator::new(3.0, 0.008);
        for _ in 0..170 {
            // 170 frames ≈ 2.83s < 3s
            assert_eq!(a.advance(DT), TransitionStep::None);
        }
        assert!(!a.is_transitioning());
    }

    #[test]
    fn test_transition_starts_after_cycle() {
        let mut a = TransitionAnimator::new(3.0, 0.008);
        let mut started = false;
        for _ in 0..200 {
            if a.advance(DT) == TransitionStep::Started {
                started = true;
                break;
            }
        }
        assert!(started);
        assert!(a.is_transitioning());
    }

    #[test]
    fn test_progress_monotone_and_no_reentry() {
        let mut a = TransitionAnimator::new(0.1, 0.008);
        // Trigger.
        while a.advance(DT) != TransitionStep::Started {}
        let mut prev = a.progress().unwrap();
        loop {
            let step = a.advance(DT);
            if step == TransitionStep::Completed {
                break;
            }
            // Mid-flight the cycle clock keeps crossing the (short) cycle
            // length, but a second transition must not start.
            assert_eq!(step, TransitionStep::None);
            let p = a.progress().expect("still transitioning");
            assert!(p >= prev);
            prev = p;
        }
        assert!(!a.is_transitioning());
    }

    #[test]
    fn test_completion_timing_at_reference_speed() {
        // 0.008 per reference frame needs 125 frames to cross 1.0.
        let mut a = TransitionAnimator::new(3.0, 0.008);
        while a.advance(DT) != TransitionStep::Started {}
        let mut frames = 1; // the starting tick also advanced progress
        while a.advance(DT) != TransitionStep::Completed {
            frames += 1;
        }
        // 0.008 per frame crosses 1.0 after 125 frames, give or take float
        // accumulation in the last step.
        assert!((124..=126).contains(&frames), "frames = {}", frames);
    }

    #[test]
    fn test_large_dt_completes_in_one_tick() {
        let mut a = TransitionAnimator::new(1.0, 0.008);
        // One giant tick: trigger and complete.
        assert_eq!(a.advance(10.0), TransitionStep::Completed);
        assert!(!a.is_transitioning());
    }

    #[test]
    fn test_front_card_fades_out() {
        let p = params();
        let early = card_transform(0, 5, 2, 0.1, &p);
        let late = card_transform(0, 5, 2, 0.9, &p);
        assert!(late.opacity < early.opacity);
        assert!(late.rot_x > early.rot_x);
    }

    #[test]
    fn test_back_card_fades_in() {
        let p = params();
        let early = card_transform(4, 5, 2, 0.1, &p);
        let late = card_transform(4, 5, 2, 0.9, &p);
        assert!(late.opacity > early.opacity);
        assert!(late.scale > early.scale);
    }

    #[test]
    fn test_center_card_scales_up() {
        let p = params();
        let start = card_transform(2, 5, 2, 0.0, &p);
        let end = card_transform(2, 5, 2, 1.0, &p);
        assert!((start.scale - 1.0).abs() < 1e-5);
        assert!((end.scale - 2.5).abs() < 1e-5);
        assert!((end.y - (p.y_offset + 2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_middle_cards_slide_one_slot() {
        let p = params();
        let start = card_transform(1, 6, 3, 0.0, &p);
        let end = card_transform(1, 6, 3, 1.0, &p);
        assert!((start.z - (-1.0 * p.spacing)).abs() < 1e-5);
        assert!((end.z - 0.0).abs() < 1e-5);
        assert_eq!(start.opacity, 1.0);
        assert_eq!(end.opacity, 1.0);
    }

    #[test]
    fn test_resting_transforms() {
        let p = params();
        let center = resting_transform(2, 2, &p);
        assert_eq!(center.scale, 2.5);
        assert_eq!(center.y, p.y_offset + 2.0);
        let other = resting_transform(1, 2, &p);
        assert_eq!(other.scale, 1.0);
        assert_eq!(other.opacity, 1.0);
        assert_eq!(other.z, -1.0 * p.spacing);
    }
}
