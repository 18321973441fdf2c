//! End-to-end overlay scenarios.
//!
//! Drives the public API the way an embedding page would: samples in, mapped
//! points, ticks and axis drawing calls out.
//!
//! Run: cargo test --test overlay_scenarios

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use heatmap_overlay::prelude::*;
use proptest::prelude::*;

#[derive(Default)]
struct Points(Vec<PixelPoint>, f64);

impl HeatmapSink for Points {
    fn reset(&mut self, _surface: &Surface) {
        self.0.clear();
    }

    fn set_points(&mut self, max_intensity: f64, points: &[PixelPoint]) {
        self.1 = max_intensity;
        self.0 = points.to_vec();
    }
}

#[derive(Default)]
struct Calls {
    lines: usize,
    labels: Vec<String>,
}

impl AxisCanvas for Calls {
    fn reset(&mut self, _surface: &Surface) {
        self.lines = 0;
        self.labels.clear();
    }

    fn draw_line(&mut self, _from: Point, _to: Point, _style: &LineStyle) {
        self.lines += 1;
    }

    fn draw_label(&mut self, _at: Point, text: &str, _style: &LabelStyle) {
        self.labels.push(text.to_string());
    }
}

fn surface_100() -> Surface {
    Surface::new(100, 100, 10).unwrap()
}

fn render(samples: &[Sample], config: &RenderConfig) -> Result<(RenderReport, Points, Calls)> {
    let (mut sink, mut canvas) = (Points::default(), Calls::default());
    let report = Overlay::new().render(samples, config, &mut sink, &mut canvas)?;
    Ok((report, sink, canvas))
}

// ============================================================================
// Documented scenarios
// ============================================================================

#[test]
fn scenario_two_corners_map_to_plot_corners() {
    let config = RenderConfig {
        surface: surface_100(),
        ..RenderConfig::default()
    };
    let samples = [Sample::new(0.0, 0.0), Sample::new(10.0, 10.0)];
    let (report, sink, _) = render(&samples, &config).unwrap();

    assert_eq!(report.bounds, Bounds::new(0.0, 10.0, 0.0, 10.0).unwrap());
    let pixels: Vec<_> = sink.0.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(pixels, [(10, 90), (90, 10)]);
    assert!(sink.0.iter().all(|p| p.value == 1.0));
}

#[test]
fn scenario_empty_fetch_renders_fallback() {
    let config = RenderConfig {
        surface: surface_100(),
        ..RenderConfig::default()
    };
    assert_eq!(
        config.fallback,
        [Sample::weighted(0.1, 2.0, 1.0), Sample::weighted(1.0, 2.0, 1.0)]
    );
    let (report, sink, _) = render(&[], &config).unwrap();

    assert!(report.used_fallback);
    assert_eq!(report.bounds.range(Axis::X), (0.1, 1.0));
    assert_eq!(sink.0.len(), 2);
    assert_eq!((sink.0[0].x, sink.0[1].x), (10, 90));
    // y = 2 sits mid-way through the [0, 4] default range.
    assert_eq!(sink.0[0].y, 50);
}

#[test]
fn default_config_renders_a_frame_from_nothing() {
    for style in [HeatmapStyle::Splat, HeatmapStyle::Binned] {
        let settings = HeatmapSettings {
            style,
            ..HeatmapSettings::default()
        };
        let frame = Overlay::new()
            .render_frame(&[], &RenderConfig::default(), &settings)
            .unwrap();

        let report = frame.report();
        assert!(report.used_fallback);
        for axis in [Axis::X, Axis::Y] {
            let (min, max) = report.bounds.range(axis);
            assert!(min.is_finite() && max.is_finite() && max > min);
        }
        assert!(frame.to_svg().unwrap().contains("<svg"));
    }
}

#[test]
fn samples_far_outside_fixed_bounds_render() {
    let config = RenderConfig {
        surface: surface_100(),
        bounds: BoundsPolicy::fixed(Bounds::new(0.0, 10.0, 0.0, 10.0).unwrap()),
        ..RenderConfig::default()
    };
    let samples = [
        Sample::new(5.0, 5.0),
        Sample::new(1e12, 5.0),
        Sample::new(-1e12, 5.0),
        Sample::new(5.0, 1e12),
        Sample::new(5.0, -1e12),
    ];

    for style in [HeatmapStyle::Splat, HeatmapStyle::Binned] {
        let settings = HeatmapSettings {
            style,
            ..HeatmapSettings::default()
        };
        let frame = Overlay::new().render_frame(&samples, &config, &settings).unwrap();
        assert_eq!(frame.report().points.len(), 5);
        // Only the in-bounds sample leaves heat at its pixel.
        assert!(frame.heat().get_pixel(50, 50).unwrap().a > 0);
        assert!(frame.to_png().is_ok());
    }
}

#[test]
fn scenario_five_divisions_over_hundred() {
    let bounds = Bounds::new(0.0, 100.0, 0.0, 100.0).unwrap();
    let labels: Vec<String> = generate_ticks(Axis::X, &bounds, &surface_100(), 5, LabelFormat::Rounded)
        .unwrap()
        .map(|t| t.label)
        .collect();
    assert_eq!(labels, ["0", "20", "40", "60", "80", "100"]);
}

#[test]
fn scenario_pinned_left_edge() {
    let config = RenderConfig {
        surface: surface_100(),
        bounds: BoundsPolicy::dynamic().with_pins(PinnedEdges {
            min_x: Some(90.0),
            ..PinnedEdges::default()
        }),
        ..RenderConfig::default()
    };
    let samples = [Sample::new(95.0, 1.0), Sample::new(100.0, 3.0)];
    let (report, sink, canvas) = render(&samples, &config).unwrap();

    assert_eq!(report.bounds.range(Axis::X), (90.0, 100.0));
    assert_eq!(sink.0[0].x, 50);
    assert_eq!(canvas.labels[2], "90");
}

#[test]
fn scenario_fixed_two_decimal_labels() {
    let config = RenderConfig {
        surface: surface_100(),
        bounds: BoundsPolicy::fixed(Bounds::new(0.0, 1.0, -1.0, 0.0).unwrap()),
        divisions: 4,
        label_format: LabelFormat::Fixed(2),
        ..RenderConfig::default()
    };
    let (report, _, _) = render(&[Sample::new(0.5, -0.5)], &config).unwrap();

    let x: Vec<_> = report.x_ticks.iter().map(|t| t.label.as_str()).collect();
    let y: Vec<_> = report.y_ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(x, ["0.00", "0.25", "0.50", "0.75", "1.00"]);
    assert_eq!(y, ["-1.00", "-0.75", "-0.50", "-0.25", "0.00"]);
}

#[test]
fn degenerate_data_is_an_error_not_a_nan() {
    let config = RenderConfig {
        surface: surface_100(),
        ..RenderConfig::default()
    };
    let samples = [Sample::new(3.0, 1.0), Sample::new(3.0, 2.0)];
    let err = render(&samples, &config).err().unwrap();
    assert!(matches!(err, Error::DegenerateRange { axis: Axis::X, .. }));
}

#[test]
fn config_file_drives_a_full_frame() {
    let yaml = r#"
surface: {width: 300, height: 200, padding: 20}
axes: {divisions: 4}
heatmap: {style: binned, max_intensity: 5}
"#;
    let config = Config::parse(yaml).unwrap();
    let samples = [Sample::new(0.0, 0.0), Sample::new(4.0, 2.0), Sample::new(2.0, 1.0)];

    let frame = Overlay::new()
        .render_frame(&samples, &config.render_config(), &config.heatmap.settings())
        .unwrap();
    assert_eq!(frame.report().x_ticks.len(), 5);
    assert_eq!(frame.heat().width(), 300);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.svg");
    frame.write_to_file(&path).unwrap();
    let svg = std::fs::read_to_string(path).unwrap();
    assert!(svg.contains(r#"width="300" height="200""#));
}

// ============================================================================
// Properties
// ============================================================================

fn sample_strategy() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((-1e3..1e3f64, -1e3..1e3f64, 0.0..20.0f64), 2..40).prop_map(|v| {
        v.into_iter()
            .map(|(x, y, w)| Sample::weighted(x, y, w))
            .collect()
    })
}

fn wide_sample_strategy() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((-1e12..1e12f64, -1e12..1e12f64, 0.0..20.0f64), 1..20).prop_map(|v| {
        v.into_iter()
            .map(|(x, y, w)| Sample::weighted(x, y, w))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_fixed_bounds_accept_any_finite_sample(samples in wide_sample_strategy()) {
        let config = RenderConfig {
            surface: surface_100(),
            bounds: BoundsPolicy::fixed(Bounds::new(-10.0, 10.0, -10.0, 10.0).unwrap()),
            ..RenderConfig::default()
        };
        for style in [HeatmapStyle::Splat, HeatmapStyle::Binned] {
            let settings = HeatmapSettings { style, ..HeatmapSettings::default() };
            let frame = Overlay::new().render_frame(&samples, &config, &settings);
            prop_assert!(frame.is_ok());
        }
    }
}

proptest! {
    #[test]
    fn prop_render_is_idempotent(samples in sample_strategy()) {
        let config = RenderConfig::default();
        let first = render(&samples, &config);
        let second = render(&samples, &config);
        match (first, second) {
            (Ok((a, pa, ca)), Ok((b, pb, cb))) => {
                prop_assert_eq!(a, b);
                prop_assert_eq!(pa.0, pb.0);
                prop_assert_eq!(ca.labels, cb.labels);
                prop_assert_eq!(ca.lines, cb.lines);
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "render outcome changed between passes"),
        }
    }

    #[test]
    fn prop_points_stay_inside_padded_area(samples in sample_strategy()) {
        let config = RenderConfig::default();
        if let Ok((_, sink, _)) = render(&samples, &config) {
            let s = config.surface;
            for p in &sink.0 {
                prop_assert!(p.x >= s.padding as i32 && p.x <= (s.width - s.padding) as i32);
                prop_assert!(p.y >= s.padding as i32 && p.y <= (s.height - s.padding) as i32);
            }
        }
    }

    #[test]
    fn prop_x_order_is_preserved(samples in sample_strategy()) {
        if let Ok((_, sink, _)) = render(&samples, &RenderConfig::default()) {
            for (i, a) in samples.iter().enumerate() {
                for (j, b) in samples.iter().enumerate() {
                    if a.x < b.x {
                        prop_assert!(sink.0[i].x <= sink.0[j].x);
                    }
                    if a.y < b.y {
                        prop_assert!(sink.0[i].y >= sink.0[j].y);
                    }
                }
            }
        }
    }
}
