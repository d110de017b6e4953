//! End-to-end scenarios across the gallery variants.

use galleria::camera::aspect_ratio;
use galleria::gallery::{GalleryInstance, GalleryVariant};
use galleria::layout::LayoutStrategy;
use galleria::transition::{card_transform, StackParams};

const DT: f32 = 1.0 / 60.0;

#[test]
fn test_sphere_layout_six_images_radius_three() {
    let placements = LayoutStrategy::FibonacciSphere { radius: 3.0 }.place(6);
    assert_eq!(placements.len(), 6);
    for p in &placements {
        assert!(
            (p.position.length() - 3.0).abs() < 1e-6,
            "distance from origin must be 3.000, got {}",
            p.position.length()
        );
    }
    for i in 0..6 {
        for j in (i + 1)..6 {
            let d = placements[i].position.distance(placements[j].position);
            assert!(d > 0.1, "surfaces {} and {} only {} apart", i, j, d);
        }
    }
}

#[test]
fn test_stack_five_images_one_full_cycle() {
    let mut g = GalleryInstance::new(GalleryVariant::Stack, 5, 800, 600);
    assert_eq!(g.settings().value("cycleSeconds"), 3.0);
    assert_eq!(g.settings().value("moveSpeed"), 0.008);
    assert_eq!(g.active_index(), 0);

    // 3 s until the trigger plus a 125-frame transition.
    for _ in 0..320 {
        g.tick(DT);
    }
    assert_eq!(g.active_index(), 1);
    assert!(!g.is_transitioning());

    // All surfaces back at full opacity and canonical resting scale.
    let center = 5 / 2;
    for (i, s) in g.surfaces().iter().enumerate() {
        assert_eq!(s.opacity, 1.0);
        let rel = (i + 5 - g.active_index()) % 5;
        let expected_scale = if rel == center { 2.5 } else { 1.0 };
        assert!((s.scale.x / s.base_size - expected_scale).abs() < 1e-5);
    }
}

#[test]
fn test_stack_front_card_opacity_falls_through_transition() {
    let params = StackParams { spacing: 1.0, y_offset: 1.0, x_rotation: 0.0 };
    let early = card_transform(0, 5, 2, 0.1, &params);
    let late = card_transform(0, 5, 2, 0.9, &params);
    assert!(late.opacity < early.opacity);
}

#[test]
fn test_resize_through_zero_never_divides_by_zero() {
    let mut g = GalleryInstance::new(GalleryVariant::Wave, 8, 800, 600);
    g.tick(DT);

    g.resize(0, 0);
    g.pointer_moved(5.0, 5.0);
    for _ in 0..5 {
        assert!(g.tick(DT));
    }
    let vp = g.pose().view_projection(0.0, 0.0);
    assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));

    g.resize(400, 300);
    assert!(g.tick(DT));
    assert_eq!(aspect_ratio(400.0, 300.0), 400.0 / 300.0);
}

#[test]
fn test_teardown_stops_frames_immediately() {
    let mut g = GalleryInstance::new(GalleryVariant::Tunnel, 4, 640, 480);
    assert!(g.tick(DT));
    let token = g.cancel_token();
    token.cancel();
    assert!(!g.tick(DT), "no tick body may run after cancellation");
    assert!(!g.tick(DT));
}

#[test]
fn test_all_variants_survive_a_minute_of_ticks() {
    for variant in [
        GalleryVariant::Sphere,
        GalleryVariant::Wave,
        GalleryVariant::Stack,
        GalleryVariant::Tunnel,
    ] {
        let mut g = GalleryInstance::new(variant, 7, 1024, 768);
        for _ in 0..3600 {
            assert!(g.tick(DT));
        }
        for s in g.surfaces() {
            assert!(s.position.is_finite(), "{:?} produced NaN", variant);
            assert!(s.opacity.is_finite());
        }
    }
}
