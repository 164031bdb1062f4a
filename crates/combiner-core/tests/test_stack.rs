mod common;

use combiner_core::error::StackError;
use combiner_core::stack::mean::channel_mean;
use combiner_core::stack::median::channel_median;
use combiner_core::stack::mode::channel_mode;
use combiner_core::stack::{validate_stack, Operation, OperationSet, StackGeometry};

use common::solid;

// ---------------------------------------------------------------------------
// Mean
// ---------------------------------------------------------------------------

#[test]
fn test_mean_single_value() {
    assert_eq!(channel_mean(&[173]), 173);
}

#[test]
fn test_mean_truncates() {
    // 3 / 2 = 1.5 -> 1
    assert_eq!(channel_mean(&[1, 2]), 1);
    // 764 / 3 = 254.67 -> 254
    assert_eq!(channel_mean(&[255, 255, 254]), 254);
}

#[test]
fn test_mean_extremes() {
    assert_eq!(channel_mean(&[255; 64]), 255);
    assert_eq!(channel_mean(&[0, 255]), 127);
}

#[test]
fn test_mean_empty_is_zero() {
    assert_eq!(channel_mean(&[]), 0);
}

// ---------------------------------------------------------------------------
// Median
// ---------------------------------------------------------------------------

#[test]
fn test_median_even_takes_lower_middle() {
    let mut values = [40, 10, 30, 20];
    assert_eq!(channel_median(&mut values), 20);
}

#[test]
fn test_median_odd_takes_middle() {
    let mut values = [90, 10, 50];
    assert_eq!(channel_median(&mut values), 50);
}

#[test]
fn test_median_two_values() {
    let mut values = [200, 100];
    assert_eq!(channel_median(&mut values), 100);
}

#[test]
fn test_median_rejects_outlier() {
    let mut values = [12, 11, 250, 12, 13];
    assert_eq!(channel_median(&mut values), 12);
}

#[test]
fn test_median_empty_is_zero() {
    assert_eq!(channel_median(&mut []), 0);
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[test]
fn test_mode_tie_takes_smallest() {
    assert_eq!(channel_mode(&[1, 1, 2, 2]), 1);
    assert_eq!(channel_mode(&[200, 7, 200, 7]), 7);
}

#[test]
fn test_mode_most_frequent() {
    assert_eq!(channel_mode(&[9, 3, 9, 3, 9]), 9);
}

#[test]
fn test_mode_all_distinct_takes_smallest() {
    assert_eq!(channel_mode(&[30, 20, 10]), 10);
}

#[test]
fn test_mode_empty_is_zero() {
    assert_eq!(channel_mode(&[]), 0);
}

// ---------------------------------------------------------------------------
// Operation / OperationSet
// ---------------------------------------------------------------------------

#[test]
fn test_operation_apply_dispatches() {
    assert_eq!(Operation::Mean.apply(&mut [10, 20, 30, 40]), 25);
    assert_eq!(Operation::Median.apply(&mut [10, 20, 30, 40]), 20);
    assert_eq!(Operation::Mode.apply(&mut [40, 40, 10, 10]), 10);
}

#[test]
fn test_operation_set_iterates_in_fixed_order() {
    let set: OperationSet = [Operation::Mode, Operation::Mean].into_iter().collect();
    assert_eq!(
        set.iter().collect::<Vec<_>>(),
        vec![Operation::Mean, Operation::Mode]
    );
    assert_eq!(set.len(), 2);
    assert!(!set.contains(Operation::Median));
}

#[test]
fn test_operation_set_empty() {
    assert!(OperationSet::default().is_empty());
    assert_eq!(OperationSet::all().len(), 3);
    assert_eq!(
        OperationSet::only(Operation::Median).iter().collect::<Vec<_>>(),
        vec![Operation::Median]
    );
}

#[test]
fn test_operation_names() {
    assert_eq!(Operation::Mean.file_prefix(), "averaged");
    assert_eq!(Operation::Median.file_prefix(), "median");
    assert_eq!(Operation::Mode.file_prefix(), "modal");
    assert_eq!(Operation::Mean.name(), "mean");
    assert_eq!(format!("{}", Operation::Mean), "Average");
}

// ---------------------------------------------------------------------------
// Dimension validation
// ---------------------------------------------------------------------------

#[test]
fn test_validate_empty_stack() {
    assert_eq!(validate_stack(&[]), Err(StackError::EmptyStack));
}

#[test]
fn test_validate_uniform_stack() {
    let stack = vec![solid(6, 4, [0; 4]), solid(6, 4, [9; 4]), solid(6, 4, [1; 4])];
    assert_eq!(
        validate_stack(&stack),
        Ok(StackGeometry {
            width: 6,
            height: 4,
            depth: 3
        })
    );
}

#[test]
fn test_validate_reports_first_mismatch() {
    let stack = vec![
        solid(10, 10, [0; 4]),
        solid(10, 10, [0; 4]),
        solid(20, 20, [0; 4]),
        solid(5, 5, [0; 4]),
    ];
    assert_eq!(
        validate_stack(&stack),
        Err(StackError::DimensionMismatch {
            index: 2,
            expected: (10, 10),
            found: (20, 20),
        })
    );
}

#[test]
fn test_validate_transposed_sizes_mismatch() {
    let stack = vec![solid(4, 8, [0; 4]), solid(8, 4, [0; 4])];
    assert!(matches!(
        validate_stack(&stack),
        Err(StackError::DimensionMismatch { index: 1, .. })
    ));
}
