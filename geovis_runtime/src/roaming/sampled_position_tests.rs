use super::*;

fn t(seconds: f64) -> SceneTime {
    SceneTime(seconds)
}

/// Samples of x = f(t) along the X axis.
fn sampled(interpolation: Interpolation, f: impl Fn(f64) -> f64, times: &[f64]) -> SampledPosition {
    let mut property = SampledPosition::new(interpolation);
    for &time in times {
        property.add_sample(t(time), DVec3::new(f(time), 0.0, 0.0));
    }
    property
}

#[test]
fn test_samples_stay_time_ordered() {
    let mut property = SampledPosition::default();
    property.add_sample(t(2.0), DVec3::X);
    property.add_sample(t(0.0), DVec3::Y);
    property.add_sample(t(1.0), DVec3::Z);

    let times: Vec<f64> = property.samples().iter().map(|s| s.time.seconds()).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
    assert_eq!(property.start_time(), Some(t(0.0)));
    assert_eq!(property.stop_time(), Some(t(2.0)));
}

#[test]
fn test_sample_at_same_time_replaces() {
    let mut property = SampledPosition::default();
    property.add_sample(t(1.0), DVec3::X);
    property.add_sample(t(1.0), DVec3::Y);

    assert_eq!(property.len(), 1);
    assert_eq!(property.value(t(1.0)), Some(DVec3::Y));
}

#[test]
fn test_outside_domain_is_none() {
    let property = sampled(Interpolation::Linear, |x| x, &[0.0, 10.0]);

    assert!(property.value(t(-0.1)).is_none());
    assert!(property.value(t(10.1)).is_none());
    assert!(SampledPosition::default().value(t(0.0)).is_none());
}

#[test]
fn test_linear_interpolation() {
    let property = sampled(Interpolation::Linear, |x| x * x, &[0.0, 2.0, 4.0]);

    // Between 0 and 4 on the [0, 2] segment
    assert_eq!(property.value(t(1.0)), Some(DVec3::new(2.0, 0.0, 0.0)));
    assert_eq!(property.value(t(4.0)), Some(DVec3::new(16.0, 0.0, 0.0)));
}

#[test]
fn test_polynomials_reproduce_their_degree() {
    let cubic = |x: f64| 0.5 * x * x * x - 2.0 * x + 1.0;
    let times = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

    let lagrange = sampled(Interpolation::Lagrange { degree: 5 }, cubic, &times);
    let hermite = sampled(Interpolation::Hermite { degree: 3 }, cubic, &times);

    for probe in [0.5, 2.25, 5.9] {
        let expected = cubic(probe);
        assert!((lagrange.value(t(probe)).unwrap().x - expected).abs() < 1e-9);
        assert!((hermite.value(t(probe)).unwrap().x - expected).abs() < 1e-9);
    }
}

#[test]
fn test_hermite_degree_two_on_large_times() {
    // Absolute times like wall-clock seconds must not lose precision
    let base = 1.7e9;
    let quadratic = |x: f64| (x - base) * (x - base);
    let property = sampled(
        Interpolation::Hermite { degree: 2 },
        quadratic,
        &[base, base + 1.0, base + 2.0, base + 3.0],
    );

    let value = property.value(t(base + 1.5)).unwrap().x;
    assert!((value - 2.25).abs() < 1e-6);
}

#[test]
fn test_window_shrinks_with_few_samples() {
    let property = sampled(Interpolation::Lagrange { degree: 5 }, |x| 3.0 * x, &[0.0, 1.0]);
    assert!((property.value(t(0.25)).unwrap().x - 0.75).abs() < 1e-12);
}

#[test]
fn test_provider_matches_value() {
    let property = sampled(Interpolation::Linear, |x| x, &[0.0, 1.0]);
    assert_eq!(property.position_at(t(0.5)), property.value(t(0.5)));
}
