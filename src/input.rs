//! Pointer and keyboard routing.
//!
//! Pointer positions arrive in viewport coordinates and are mapped into mask
//! pixels using the ratio between the surface's backing size and the size it
//! is displayed at. A stroke is a press, any number of moves, and a release;
//! each move stamps a line of evenly spaced dabs so fast drags leave no gaps.

use crate::types::{Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u64,
    pub phase: PointerPhase,
    /// Viewport coordinates.
    pub position: Point,
}

impl PointerEvent {
    pub fn new(pointer_id: u64, phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { pointer_id, phase, position: Point::new(x, y) }
    }
}

/// Keys the widget reacts to. Hosts map their own key codes onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealKey {
    /// Space: flip active/inactive.
    Toggle,
    /// Escape: force inactive.
    Cancel,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: RevealKey,
    /// Auto-repeat while held; ignored.
    pub repeat: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Toggle,
    Disable,
}

/// Where the surface sits in the viewport and how big its backing raster is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceGeometry {
    pub display: Rect,
    pub pixel_width: usize,
    pub pixel_height: usize,
}

impl SurfaceGeometry {
    fn scale(&self) -> (f32, f32) {
        let sx = if self.display.width > 0.0 { self.pixel_width as f32 / self.display.width } else { 1.0 };
        let sy = if self.display.height > 0.0 { self.pixel_height as f32 / self.display.height } else { 1.0 };
        (sx, sy)
    }

    /// Viewport point -> mask pixel coordinates.
    pub fn to_surface(&self, p: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new((p.x - self.display.left) * sx, (p.y - self.display.top) * sy)
    }

    /// Mask pixel coordinates -> viewport point.
    pub fn to_viewport(&self, p: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(p.x / sx + self.display.left, p.y / sy + self.display.top)
    }
}

/// Spacing rule for interpolated stroke dabs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSpacing {
    pub step_factor: f32,
    pub min_step: f32,
}

impl StrokeSpacing {
    pub fn step(&self, radius: f32) -> f32 {
        (radius * self.step_factor).max(self.min_step)
    }
}

impl Default for StrokeSpacing {
    fn default() -> Self {
        Self { step_factor: 0.2, min_step: 4.0 }
    }
}

/// Dab centers from `a` to `b` inclusive, no further apart than the step.
/// `ceil(distance / step) + 1` points; a zero-length move yields just `a`.
pub fn line_stamps(a: Point, b: Point, radius: f32, spacing: &StrokeSpacing) -> Vec<Point> {
    let step = spacing.step(radius);
    let dist = a.distance(&b);
    let steps = if dist.is_finite() && step > 0.0 { (dist / step).ceil() as usize } else { 0 };
    if steps == 0 {
        return vec![a];
    }
    (0..=steps).map(|i| a.lerp(&b, i as f32 / steps as f32)).collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing {
        pointer_id: u64,
        /// Last stamped position, in mask pixels.
        last: Point,
    },
}

/// What the controller has to do after a pointer event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerOutcome {
    /// Dab centers in mask pixels, in paint order.
    pub stamps: Vec<Point>,
    pub capture: Option<u64>,
    pub release: Option<u64>,
}

#[derive(Debug, Default)]
pub struct PointerInputRouter {
    state: StrokeState,
    spacing: StrokeSpacing,
}

impl PointerInputRouter {
    pub fn new(spacing: StrokeSpacing) -> Self {
        Self { state: StrokeState::Idle, spacing }
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Last stamped position of the current stroke.
    pub fn last_position(&self) -> Option<Point> {
        match self.state {
            StrokeState::Drawing { last, .. } => Some(last),
            StrokeState::Idle => None,
        }
    }

    pub fn handle(
        &mut self,
        event: &PointerEvent,
        active: bool,
        geometry: &SurfaceGeometry,
        brush_radius: f32,
    ) -> PointerOutcome {
        let mut out = PointerOutcome::default();
        match event.phase {
            PointerPhase::Down => {
                if !active {
                    return out;
                }
                // Only the captured pointer may restart a stroke in progress.
                if let StrokeState::Drawing { pointer_id, .. } = self.state {
                    if pointer_id != event.pointer_id {
                        return out;
                    }
                }
                let p = geometry.to_surface(event.position);
                self.state = StrokeState::Drawing { pointer_id: event.pointer_id, last: p };
                out.stamps.push(p);
                out.capture = Some(event.pointer_id);
            }
            PointerPhase::Move => {
                if !active {
                    return out;
                }
                if let StrokeState::Drawing { pointer_id, last } = self.state {
                    if pointer_id != event.pointer_id {
                        return out;
                    }
                    let p = geometry.to_surface(event.position);
                    out.stamps = line_stamps(last, p, brush_radius, &self.spacing);
                    self.state = StrokeState::Drawing { pointer_id, last: p };
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                if let StrokeState::Drawing { pointer_id, .. } = self.state {
                    // Only the captured pointer can end its stroke.
                    if pointer_id != event.pointer_id {
                        return out;
                    }
                    out.release = Some(pointer_id);
                }
                self.state = StrokeState::Idle;
            }
        }
        out
    }

    /// End any stroke in progress; returns the pointer to release.
    pub fn cancel(&mut self) -> Option<u64> {
        let released = match self.state {
            StrokeState::Drawing { pointer_id, .. } => Some(pointer_id),
            StrokeState::Idle => None,
        };
        self.state = StrokeState::Idle;
        released
    }

    /// Edge-triggered key mapping: repeats do nothing.
    pub fn key_command(&self, event: &KeyEvent) -> Option<KeyCommand> {
        if event.repeat {
            return None;
        }
        match event.key {
            RevealKey::Toggle => Some(KeyCommand::Toggle),
            RevealKey::Cancel => Some(KeyCommand::Disable),
            RevealKey::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(dpr: f32) -> SurfaceGeometry {
        SurfaceGeometry {
            display: Rect::new(10.0, 20.0, 400.0, 300.0),
            pixel_width: (400.0 * dpr) as usize,
            pixel_height: (300.0 * dpr) as usize,
        }
    }

    #[test]
    fn mapping_scales_by_backing_ratio() {
        let g = geometry(2.0);
        assert_eq!(g.to_surface(Point::new(10.0, 20.0)), Point::new(0.0, 0.0));
        assert_eq!(g.to_surface(Point::new(210.0, 170.0)), Point::new(400.0, 300.0));
    }

    #[test]
    fn line_stamp_count_and_spacing() {
        let spacing = StrokeSpacing::default();
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        // R = 80 -> step 16 -> ceil(100/16) + 1 = 8
        let pts = line_stamps(a, b, 80.0, &spacing);
        assert_eq!(pts.len(), 8);
        assert_eq!(pts[0], a);
        assert_eq!(*pts.last().unwrap(), b);
        for w in pts.windows(2) {
            assert!(w[0].distance(&w[1]) <= 16.0 + 1e-3);
        }
        // R = 10 -> step floors at 4 -> 26
        assert_eq!(line_stamps(a, b, 10.0, &spacing).len(), 26);
        assert_eq!(line_stamps(a, a, 10.0, &spacing), vec![a]);
    }

    #[test]
    fn down_only_starts_stroke_when_active() {
        let g = geometry(1.0);
        let mut r = PointerInputRouter::default();
        let out = r.handle(&PointerEvent::new(1, PointerPhase::Down, 50.0, 50.0), false, &g, 24.0);
        assert!(out.stamps.is_empty());
        assert!(!r.is_drawing());

        let out = r.handle(&PointerEvent::new(1, PointerPhase::Down, 50.0, 50.0), true, &g, 24.0);
        assert_eq!(out.stamps, vec![Point::new(40.0, 30.0)]);
        assert_eq!(out.capture, Some(1));
        assert!(r.is_drawing());
    }

    #[test]
    fn moves_outside_bounds_keep_painting_until_release() {
        let g = geometry(1.0);
        let mut r = PointerInputRouter::default();
        r.handle(&PointerEvent::new(7, PointerPhase::Down, 400.0, 100.0), true, &g, 24.0);
        let out = r.handle(&PointerEvent::new(7, PointerPhase::Move, 460.0, 100.0), true, &g, 24.0);
        assert!(out.stamps.len() > 1);
        assert_eq!(r.last_position(), Some(Point::new(450.0, 80.0)));

        // Other pointers do not hijack the stroke.
        let out = r.handle(&PointerEvent::new(8, PointerPhase::Move, 20.0, 20.0), true, &g, 24.0);
        assert!(out.stamps.is_empty());

        let out = r.handle(&PointerEvent::new(7, PointerPhase::Up, 0.0, 0.0), false, &g, 24.0);
        assert_eq!(out.release, Some(7));
        assert!(!r.is_drawing());
    }

    #[test]
    fn release_from_another_pointer_keeps_stroke() {
        let g = geometry(1.0);
        let mut r = PointerInputRouter::default();
        r.handle(&PointerEvent::new(7, PointerPhase::Down, 100.0, 100.0), true, &g, 24.0);

        let out = r.handle(&PointerEvent::new(8, PointerPhase::Up, 100.0, 100.0), true, &g, 24.0);
        assert_eq!(out.release, None);
        let out = r.handle(&PointerEvent::new(8, PointerPhase::Cancel, 100.0, 100.0), true, &g, 24.0);
        assert_eq!(out.release, None);
        assert!(r.is_drawing());

        let out = r.handle(&PointerEvent::new(7, PointerPhase::Move, 200.0, 100.0), true, &g, 24.0);
        assert!(out.stamps.len() > 1);
        assert_eq!(r.last_position(), Some(Point::new(190.0, 80.0)));

        let out = r.handle(&PointerEvent::new(7, PointerPhase::Up, 200.0, 100.0), true, &g, 24.0);
        assert_eq!(out.release, Some(7));
        assert!(!r.is_drawing());
    }

    #[test]
    fn moves_while_inactive_are_ignored() {
        let g = geometry(1.0);
        let mut r = PointerInputRouter::default();
        r.handle(&PointerEvent::new(1, PointerPhase::Down, 50.0, 50.0), true, &g, 24.0);
        let out = r.handle(&PointerEvent::new(1, PointerPhase::Move, 90.0, 50.0), false, &g, 24.0);
        assert!(out.stamps.is_empty());
        r.handle(&PointerEvent::new(1, PointerPhase::Cancel, 0.0, 0.0), false, &g, 24.0);
        assert_eq!(r.state(), StrokeState::Idle);
    }

    #[test]
    fn keys_are_edge_triggered() {
        let r = PointerInputRouter::default();
        assert_eq!(r.key_command(&KeyEvent { key: RevealKey::Toggle, repeat: false }), Some(KeyCommand::Toggle));
        assert_eq!(r.key_command(&KeyEvent { key: RevealKey::Toggle, repeat: true }), None);
        assert_eq!(r.key_command(&KeyEvent { key: RevealKey::Cancel, repeat: false }), Some(KeyCommand::Disable));
        assert_eq!(r.key_command(&KeyEvent { key: RevealKey::Other, repeat: false }), None);
    }
}
