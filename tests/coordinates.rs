mod common;

use brush_reveal::config::RevealConfig;
use brush_reveal::input::{PointerEvent, PointerPhase, SurfaceGeometry};
use brush_reveal::sizer::SurfaceSizer;
use brush_reveal::types::{Point, Rect};
use common::controller;

#[test]
fn viewport_surface_round_trip() {
    let cfg = RevealConfig::default();
    let sizer = SurfaceSizer::new(&cfg);
    let natural_aspect = 600.0 / 400.0;
    // Displayed narrower and wider than the 600px natural width.
    for width in [300.0, 900.0] {
        for dpr in [1.0, 1.5, 2.0] {
            let size = sizer.fit(width, Some(natural_aspect), dpr);
            let g = SurfaceGeometry {
                display: Rect::new(17.0, 42.5, size.display_width, size.display_height),
                pixel_width: size.pixel_width,
                pixel_height: size.pixel_height,
            };
            for p in [Point::new(17.0, 42.5), Point::new(100.3, 77.7), Point::new(250.25, 190.0)] {
                let back = g.to_viewport(g.to_surface(p));
                assert!((back.x - p.x).abs() < 1e-3 && (back.y - p.y).abs() < 1e-3, "{p:?} -> {back:?}");
            }
            let s = g.to_surface(Point::new(17.0 + size.display_width, 42.5 + size.display_height));
            assert!((s.x - size.pixel_width as f32).abs() < 1e-3);
            assert!((s.y - size.pixel_height as f32).abs() < 1e-3);
        }
    }
}

#[test]
fn pointer_lands_on_backing_pixels_at_high_dpr() {
    let (mut c, container) = controller(300.0, 2.0, 600, 400);
    container.origin.set((30.0, 40.0));
    c.enable();
    c.handle_pointer(&PointerEvent::new(1, PointerPhase::Down, 180.0, 140.0));
    assert_eq!(c.last_pointer_position(), Some(Point::new(300.0, 200.0)));
    assert_eq!(c.mask().unwrap().alpha_at(300, 200), 1.0);
}

#[test]
fn fast_drag_leaves_no_gaps() {
    let (mut c, _) = controller(400.0, 1.0, 400, 300);
    c.enable();
    c.set_brush_radius(80.0);
    c.handle_pointer(&PointerEvent::new(1, PointerPhase::Down, 50.0, 150.0));
    c.handle_pointer(&PointerEvent::new(1, PointerPhase::Move, 350.0, 150.0));
    c.handle_pointer(&PointerEvent::new(1, PointerPhase::Up, 350.0, 150.0));
    let mask = c.mask().unwrap();
    for x in 50..=349 {
        assert_eq!(mask.alpha_at(x, 150), 1.0, "gap at x={x}");
    }
    assert!(!c.is_drawing());
}
