//! Stuck detection and the memory of headings that already failed

use bevy::prelude::*;
use std::collections::VecDeque;

/// Headings closer than this are treated as the same heading
const HEADING_MATCH_RADIANS: f32 = 7.5 * std::f32::consts::PI / 180.0;

/// Compares displacement over fixed windows of simulated time
#[derive(Debug, Clone, PartialEq)]
pub struct StuckDetector {
    window_start: f64,
    anchor: Vec2,
}

impl StuckDetector {
    pub fn new(position: Vec2, now: f64) -> Self {
        Self {
            window_start: now,
            anchor: position,
        }
    }

    pub fn reset(&mut self, position: Vec2, now: f64) {
        self.window_start = now;
        self.anchor = position;
    }

    /// Returns true when a window has just closed with less than `threshold` displacement
    pub fn update(&mut self, position: Vec2, now: f64, window: f64, threshold: f32) -> bool {
        if now - self.window_start < window {
            return false;
        }
        let stuck = position.distance(self.anchor) < threshold;
        self.reset(position, now);
        stuck
    }
}

/// Bounded FIFO of recently rejected steering headings
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedHeadings {
    headings: VecDeque<Vec2>,
    capacity: usize,
}

impl Default for RejectedHeadings {
    fn default() -> Self {
        Self::with_capacity(8)
    }
}

impl RejectedHeadings {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            headings: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn remember(&mut self, heading: Vec2) {
        let Some(heading) = heading.try_normalize() else {
            return;
        };
        if self.headings.len() == self.capacity {
            self.headings.pop_front();
        }
        self.headings.push_back(heading);
    }

    pub fn contains(&self, heading: Vec2) -> bool {
        let Some(heading) = heading.try_normalize() else {
            return false;
        };
        self.headings
            .iter()
            .any(|rejected| rejected.angle_to(heading).abs() < HEADING_MATCH_RADIANS)
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    pub fn clear(&mut self) {
        self.headings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stuck_after_window_without_progress() {
        let mut detector = StuckDetector::new(Vec2::ZERO, 0.0);

        assert!(!detector.update(Vec2::new(0.01, 0.0), 1.0, 1.5, 0.1));
        assert!(detector.update(Vec2::new(0.05, 0.0), 1.5, 1.5, 0.1));
        // New window anchored at the last position
        assert!(!detector.update(Vec2::new(1.0, 0.0), 3.0, 1.5, 0.1));
    }

    #[test]
    fn test_progress_is_not_stuck() {
        let mut detector = StuckDetector::new(Vec2::ZERO, 0.0);
        assert!(!detector.update(Vec2::new(0.5, 0.0), 1.6, 1.5, 0.1));
    }

    #[test]
    fn test_rejected_headings_are_bounded() {
        let mut rejected = RejectedHeadings::default();
        for i in 0..10 {
            let angle = i as f32 * 0.5;
            rejected.remember(Vec2::from_angle(angle));
        }

        assert_eq!(rejected.len(), 8);
        // The two oldest were evicted
        assert!(!rejected.contains(Vec2::from_angle(0.0)));
        assert!(rejected.contains(Vec2::from_angle(4.5)));
        assert!(rejected.contains(Vec2::from_angle(4.5 + 0.05) * 3.0));
    }

    #[test]
    fn test_zero_heading_ignored() {
        let mut rejected = RejectedHeadings::default();
        rejected.remember(Vec2::ZERO);
        assert!(rejected.is_empty());
        assert!(!rejected.contains(Vec2::ZERO));
    }
}
