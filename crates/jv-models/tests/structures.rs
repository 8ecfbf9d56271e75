use jv_models::{DualCavity, GradientShape, InteriorModel, LayeredStructure, ThreeLayer, YKnob};

#[test]
fn three_layer_from_yaml_uses_defaults() {
    let yaml = "kind: three_layer\ny1: 0.27\nz1: 0.015\nz2: 0.05\n";
    let model: InteriorModel = serde_yaml::from_str(yaml).unwrap();
    let InteriorModel::ThreeLayer(m) = &model else {
        panic!("wrong variant: {model:?}");
    };
    assert_eq!(m.r_core, 0.1);
    assert_eq!(m.r_trans, 0.8);
    assert_eq!(m.y_knob, YKnob::Inner);
    assert_eq!(model.as_structure().mass_knob_name(), "r_core");
    assert_eq!(model.discontinuities(), vec![0.1, 0.8]);
}

#[test]
fn dual_cavity_from_yaml() {
    let yaml = r#"
kind: dual_cavity
y1: 0.27
z1: 0.0075
y2: 0.4
rii: 0.19
rio: 0.2
roi: 0.79
roo: 0.8
gradient_shape: linear
y_knob: inner
"#;
    let model: InteriorModel = serde_yaml::from_str(yaml).unwrap();
    let InteriorModel::DualCavity(m) = &model else {
        panic!("wrong variant: {model:?}");
    };
    assert_eq!(m.gradient_shape, GradientShape::Linear);
    assert_eq!(m.z2, 0.5);
    assert_eq!(model.as_structure().y_knob_name(), "y2");
    // Smooth bands: four alignment radii, no discontinuity.
    assert_eq!(model.alignment_radii(), vec![0.19, 0.2, 0.79, 0.8]);
    assert!(model.discontinuities().is_empty());
}

#[test]
fn knobs_are_adjustable_through_the_tagged_type() {
    let mut model = InteriorModel::DualCavity(DualCavity::with_thin_bands(
        0.27, 0.0075, 0.4, 0.2, 0.8, 1e-2,
    ));
    model.as_structure_mut().set_mass_knob(0.3);
    model.as_structure_mut().set_y_knob(0.26);
    let s = model.as_structure();
    assert_eq!(s.mass_knob(), 0.3);
    assert_eq!(s.y_knob(), 0.26);
    assert_eq!(s.composition(0.5).z, 0.3);
    assert_eq!(s.composition(0.9).y, 0.26);
}

#[test]
fn mass_knob_bounds_respect_layers() {
    let m = ThreeLayer::new(0.27, 0.015, 0.05);
    let (lo, hi) = m.mass_knob_bounds();
    assert!(lo > 0.0 && hi < m.r_trans);
}
