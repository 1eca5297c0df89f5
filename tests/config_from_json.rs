use colocation::colocator::ColocatorKind;
use colocation::config::{ConstraintMethod, OptionValue};
use colocation::{Colocation, ColocationConfig, ColocationError, Colocator, Constraint, Kernel};

#[test]
fn test_full_request_from_json() {
    let config: ColocationConfig = serde_json::from_str(
        r#"{
            "colocator": {"kind": "difference", "var_name": "aod_col", "diff_name": "aod_diff"},
            "kernel": "nn_time",
            "constraint": {"h_sep": 25, "t_sep": "T6H", "fill_value": "-1"}
        }"#,
    )
    .unwrap();

    assert_eq!(config.colocator.kind, ColocatorKind::Difference);
    let constraint = config.constraint.as_ref().unwrap();
    assert_eq!(constraint.method, ConstraintMethod::Separation);
    assert_eq!(constraint.h_sep, Some(OptionValue::Number(25.0)));

    let colocation = Colocation::new(&config).unwrap();
    assert_eq!(
        colocation.kernel(),
        &Kernel::Nearest(colocation::hyperpoint::NearestAxis::Time)
    );
    let Colocator::Difference(difference) = colocation.colocator() else {
        panic!("expected a difference colocator");
    };
    assert_eq!(difference.diff_name, "aod_diff");
    assert_eq!(difference.overrides.var_name.as_deref(), Some("aod_col"));

    let Constraint::Separation(sep) = colocation.constraint() else {
        panic!("expected a separation constraint");
    };
    assert_eq!(sep.h_sep(), Some(25.0));
    assert_eq!(sep.t_sep(), Some(0.25));
    assert_eq!(sep.fill_value(), -1.0);
}

#[test]
fn test_defaults_from_an_empty_document() {
    let config: ColocationConfig = serde_json::from_str("{}").unwrap();
    let colocation = Colocation::new(&config).unwrap();
    assert_eq!(colocation.colocator().kind(), ColocatorKind::Default);
    assert_eq!(colocation.kernel(), &Kernel::Mean);
    assert_eq!(colocation.constraint(), &Constraint::null());

    let gridded: ColocationConfig =
        serde_json::from_str(r#"{"colocator": {"kind": "gridded"}}"#).unwrap();
    assert_eq!(
        Colocation::new(&gridded).unwrap().kernel().name(),
        "gridded_gridded_nn"
    );
}

#[test]
fn test_invalid_documents() {
    assert!(serde_json::from_str::<ColocationConfig>(r#"{"constraint": {"radius": 3}}"#).is_err());
    assert!(serde_json::from_str::<ColocationConfig>(r#"{"colocator": {"kind": "median"}}"#).is_err());

    let bad_sep: ColocationConfig =
        serde_json::from_str(r#"{"constraint": {"h_sep": "far"}}"#).unwrap();
    assert!(matches!(
        Colocation::new(&bad_sep),
        Err(ColocationError::InvalidConstraintParameter(_))
    ));

    let misplaced: ColocationConfig =
        serde_json::from_str(r#"{"colocator": {"kind": "dummy", "var_name": "x"}}"#).unwrap();
    assert!(matches!(
        Colocation::new(&misplaced),
        Err(ColocationError::InvalidColocatorOption(_))
    ));

    let mismatch: ColocationConfig = serde_json::from_str(
        r#"{"colocator": {"kind": "ungridded_gridded"}, "kernel": "full_average"}"#,
    )
    .unwrap();
    assert!(matches!(
        Colocation::new(&mismatch),
        Err(ColocationError::KernelMismatch { .. })
    ));
}

#[test]
fn test_config_round_trip() {
    let config: ColocationConfig = serde_json::from_str(
        r#"{"colocator": {"kind": "debug", "max_vals": 50, "print_step": 5}, "kernel": "mean"}"#,
    )
    .unwrap();
    let text = serde_json::to_string(&config).unwrap();
    let back: ColocationConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
}
