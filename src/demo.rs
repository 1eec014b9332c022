// Scripted intro: a fake cursor (plus highlight ring) sweeps across the surface
// so the visitor sees where to paint. It never touches the mask; the host
// draws the cursor wherever `tick` says it is.
use crate::config::DemoConfig;
use crate::types::{Point, Rect};
use std::time::{Duration, Instant};

/// 1 - (1 - t)^3: fast start, gentle landing on each waypoint.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Waypoints: center, then `passes` sweeps alternating left->right and
/// right->left along the vertical center line, then back to center.
#[derive(Clone, Debug, PartialEq)]
pub struct DemoPath {
    points: Vec<Point>,
}

impl DemoPath {
    pub fn build(rect: Rect, passes: u32, margin: f32) -> Self {
        let center = rect.center();
        let left = Point::new(rect.left + rect.width * margin, center.y);
        let right = Point::new(rect.left + rect.width * (1.0 - margin), center.y);

        let mut points = Vec::with_capacity(2 * passes as usize + 2);
        points.push(center);
        for pass in 0..passes {
            if pass % 2 == 0 {
                points.extend([left, right]);
            } else {
                points.extend([right, left]);
            }
        }
        points.push(center);
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn segments(&self) -> usize {
        self.points.len().saturating_sub(1).max(1)
    }

    /// Position at normalized progress `t` in [0,1], eased per segment.
    pub fn sample(&self, t: f32) -> Point {
        let last = self.points.len().saturating_sub(1);
        let Some(&first) = self.points.first() else {
            return Point::default();
        };
        let t = t.clamp(0.0, 1.0);
        let segment_f = t * self.segments() as f32;
        let index = segment_f.floor() as usize;
        let local = (segment_f - index as f32).min(1.0);

        let a = self.points.get(index.min(last)).copied().unwrap_or(first);
        let b = self.points.get((index + 1).min(last)).copied().unwrap_or(first);
        a.lerp(&b, ease_out_cubic(local))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DemoFrame {
    /// Draw the cursor and highlight here.
    Running(Point),
    /// Ran to completion this tick; hide the visuals.
    Finished,
    /// Already finished or stopped; nothing to draw.
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DemoStatus {
    Running,
    Done,
}

pub struct DemoAnimation {
    path: DemoPath,
    duration: Duration,
    started: Instant,
    status: DemoStatus,
}

impl DemoAnimation {
    pub fn start(path: DemoPath, duration: Duration, now: Instant) -> Self {
        tracing::debug!(waypoints = path.points().len(), ?duration, "demo animation started");
        Self { path, duration, started: now, status: DemoStatus::Running }
    }

    /// Standard intro over the displayed surface rectangle.
    pub fn from_config(config: &DemoConfig, surface: Rect, now: Instant) -> Self {
        let path = DemoPath::build(surface, config.passes, config.margin);
        Self::start(path, Duration::from_millis(config.duration_ms), now)
    }

    fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn position_at(&self, elapsed: Duration) -> Point {
        self.path.sample(self.progress(elapsed))
    }

    pub fn tick(&mut self, now: Instant) -> DemoFrame {
        if self.status == DemoStatus::Done {
            return DemoFrame::Hidden;
        }
        let elapsed = now.saturating_duration_since(self.started);
        if self.progress(elapsed) >= 1.0 {
            self.status = DemoStatus::Done;
            tracing::debug!("demo animation finished");
            return DemoFrame::Finished;
        }
        DemoFrame::Running(self.position_at(elapsed))
    }

    /// Cancel early; visuals are hidden from now on.
    pub fn stop(&mut self) {
        self.status = DemoStatus::Done;
    }

    pub fn is_running(&self) -> bool {
        self.status == DemoStatus::Running
    }
}
