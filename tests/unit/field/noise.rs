use super::*;

#[test]
fn sampling_is_deterministic() {
    let a = CoherentNoise::new(7);
    let b = CoherentNoise::new(7);
    for &(x, y, z) in &[(0.0, 0.0, 0.0), (0.37, 12.5, 3.25), (-4.2, 9.9, -0.001)] {
        assert_eq!(a.sample(x, y, z), a.sample(x, y, z));
        assert_eq!(a.sample(x, y, z), b.sample(x, y, z));
    }
}

#[test]
fn values_stay_in_unit_interval() {
    let noise = CoherentNoise::new(3);
    for i in 0..2000 {
        let f = i as f64;
        let v = noise.sample(f * 0.137 - 50.0, f * 0.071 + 1000.0, f * -0.013);
        assert!((0.0..1.0).contains(&v), "sample {i} out of range: {v}");
    }
}

#[test]
fn nearby_inputs_give_nearby_outputs() {
    let noise = CoherentNoise::new(11);
    let mut max_step = 0.0f64;
    for i in 0..500 {
        let x = i as f64 * 0.001;
        let d = (noise.sample(x, 2.0, 0.5) - noise.sample(x + 0.001, 2.0, 0.5)).abs();
        max_step = max_step.max(d);
    }
    assert!(max_step < 0.05, "field is not smooth: step {max_step}");
}

#[test]
fn seeds_produce_different_fields() {
    let a = CoherentNoise::new(1);
    let b = CoherentNoise::new(2);
    let differs = (0..32).any(|i| {
        let x = i as f64 * 0.31;
        a.sample(x, x, 0.0) != b.sample(x, x, 0.0)
    });
    assert!(differs);
}

#[test]
fn huge_coordinates_stay_in_range() {
    let n = CoherentNoise::new(5);
    for &(x, y, z) in &[
        (1e19, 0.0, 0.0),
        (0.0, -1e19, 0.0),
        (0.0, 0.0, 1e20),
        (f64::MAX, f64::MAX, f64::MAX),
        (f64::INFINITY, 1.0, f64::NEG_INFINITY),
    ] {
        let v = n.sample(x, y, z);
        assert!((0.0..1.0).contains(&v), "({x}, {y}, {z}) -> {v}");
    }
}

#[test]
fn non_finite_inputs_collapse_into_range() {
    let n = CoherentNoise::default();
    let v = n.sample(f64::NAN, 0.0, 0.0);
    assert!((0.0..1.0).contains(&v));
}
