//! Combination strategies.
//!
//! Every strategy is deterministic and walks dimensions in declaration order.
//! Unrecognized plan strategy names are resolved to pairwise before they get
//! here (see [`casegen_plan::Strategy::from_name`]), so the dispatch below is
//! exhaustive over the four variants.

use casegen_core::value::is_numeric;
use casegen_core::{BACKEND_DIMENSION, OptionDimensions, SIZE_DIMENSION, VALIDATION_DIMENSION};
use casegen_plan::Strategy;
use serde_json::Value;

use crate::combination::OptionCombination;
use crate::errors::GenerationError;

/// Sizes exercised by the critical-path strategy when the schema lists them.
pub const CRITICAL_SIZES: [u64; 4] = [0, 256, 65_536, 268_435_456];

const PAIRWISE_LIMIT: usize = 10;

/// Expand option dimensions into combinations using `strategy`.
///
/// Fails with [`GenerationError::InvalidSchema`] when a dimension has no values.
pub fn generate_combinations(
    dimensions: &OptionDimensions,
    strategy: Strategy,
) -> Result<Vec<OptionCombination>, GenerationError> {
    let axes = axes(dimensions)?;

    let combinations = match strategy {
        Strategy::Exhaustive => exhaustive(&axes),
        Strategy::Boundary => boundary(&axes),
        Strategy::CriticalPath => critical_path(&axes),
        Strategy::Pairwise => pairwise(&axes),
    };

    Ok(combinations)
}

/// Number of combinations produced by the pairwise strategy for `k` dimensions.
pub fn pairwise_count(dimensions: usize) -> usize {
    // 2^4 already exceeds the limit.
    if dimensions >= 4 {
        PAIRWISE_LIMIT
    } else {
        (1_usize << dimensions).min(PAIRWISE_LIMIT)
    }
}

/// Dimension view with a guaranteed non-empty value list.
#[derive(Clone, Copy)]
struct Axis<'a> {
    name: &'a str,
    values: &'a [Value],
}

impl<'a> Axis<'a> {
    fn first(&self) -> &'a Value {
        &self.values[0]
    }

    fn last(&self) -> &'a Value {
        &self.values[self.values.len() - 1]
    }

    fn middle(&self) -> &'a Value {
        if self.values.len() > 2 {
            &self.values[self.values.len() / 2]
        } else {
            self.first()
        }
    }
}

fn axes(dimensions: &OptionDimensions) -> Result<Vec<Axis<'_>>, GenerationError> {
    dimensions
        .iter()
        .map(|(name, spec)| {
            if spec.is_empty() {
                Err(GenerationError::InvalidSchema(format!(
                    "dimension '{name}' has no values"
                )))
            } else {
                Ok(Axis {
                    name,
                    values: &spec.values,
                })
            }
        })
        .collect()
}

fn select(axes: &[Axis<'_>], pick: impl Fn(&Axis<'_>) -> Value) -> OptionCombination {
    axes.iter().map(|axis| (axis.name, pick(axis))).collect()
}

fn baseline(axes: &[Axis<'_>]) -> OptionCombination {
    select(axes, |axis| axis.first().clone())
}

fn push_unique(combinations: &mut Vec<OptionCombination>, candidate: OptionCombination) {
    if !combinations.contains(&candidate) {
        combinations.push(candidate);
    }
}

fn exhaustive(axes: &[Axis<'_>]) -> Vec<OptionCombination> {
    let mut combinations = vec![OptionCombination::new()];

    for axis in axes {
        combinations = combinations
            .into_iter()
            .flat_map(|prefix| {
                axis.values.iter().map(move |value| {
                    let mut combination = prefix.clone();
                    combination.set(axis.name, value.clone());
                    combination
                })
            })
            .collect();
    }

    combinations
}

fn boundary(axes: &[Axis<'_>]) -> Vec<OptionCombination> {
    let first = baseline(axes);
    let mut combinations = Vec::new();

    push_unique(&mut combinations, first.clone());
    push_unique(&mut combinations, select(axes, |axis| axis.last().clone()));
    push_unique(&mut combinations, select(axes, |axis| axis.middle().clone()));

    for axis in axes {
        for value in axis.values {
            push_unique(&mut combinations, first.with_override(axis.name, value));
        }
    }

    combinations
}

fn critical_path(axes: &[Axis<'_>]) -> Vec<OptionCombination> {
    let default = baseline(axes);
    let find = |name: &str| axes.iter().find(|axis| axis.name == name);
    let mut combinations = vec![default.clone()];

    if let Some(axis) = find(VALIDATION_DIMENSION) {
        for value in axis.values {
            push_unique(&mut combinations, default.with_override(axis.name, value));
        }
    }

    if let Some(axis) = find(SIZE_DIMENSION) {
        for size in CRITICAL_SIZES {
            if let Some(value) = axis.values.iter().find(|value| is_numeric(value, size)) {
                push_unique(&mut combinations, default.with_override(axis.name, value));
            }
        }
    }

    if let Some(axis) = find(BACKEND_DIMENSION) {
        for value in axis.values {
            push_unique(&mut combinations, default.with_override(axis.name, value));
        }
    }

    combinations
}

fn pairwise(axes: &[Axis<'_>]) -> Vec<OptionCombination> {
    (0..pairwise_count(axes.len()))
        .map(|row| {
            axes.iter()
                .enumerate()
                .map(|(column, axis)| {
                    let value = &axis.values[(row + column) % axis.values.len()];
                    (axis.name, value.clone())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use casegen_core::DimensionSpec;
    use serde_json::json;

    use super::*;

    fn dims(spec: &[(&str, Vec<Value>)]) -> OptionDimensions {
        spec.iter()
            .map(|(name, values)| (*name, DimensionSpec::new(values.clone())))
            .collect()
    }

    fn combo(pairs: &[(&str, Value)]) -> OptionCombination {
        pairs.iter().map(|(name, value)| (*name, value.clone())).collect()
    }

    fn buffer_dims() -> OptionDimensions {
        dims(&[
            ("size", vec![json!(0), json!(256), json!(65536), json!(268435456)]),
            ("validation", vec![json!(false), json!(true)]),
        ])
    }

    #[test]
    fn exhaustive_is_ordered_cartesian_product() {
        let dimensions = dims(&[
            ("a", vec![json!(1), json!(2)]),
            ("b", vec![json!("x"), json!("y"), json!("z")]),
        ]);

        let combinations =
            generate_combinations(&dimensions, Strategy::Exhaustive).expect("generate");
        assert_eq!(combinations.len(), 6);
        assert_eq!(combinations[0], combo(&[("a", json!(1)), ("b", json!("x"))]));
        assert_eq!(combinations[1], combo(&[("a", json!(1)), ("b", json!("y"))]));
        assert_eq!(combinations[3], combo(&[("a", json!(2)), ("b", json!("x"))]));
        assert_eq!(combinations[5], combo(&[("a", json!(2)), ("b", json!("z"))]));
    }

    #[test]
    fn exhaustive_without_dimensions_yields_one_empty_combination() {
        let combinations =
            generate_combinations(&OptionDimensions::new(), Strategy::Exhaustive)
                .expect("generate");
        assert_eq!(combinations, vec![OptionCombination::new()]);
    }

    #[test]
    fn boundary_emits_extremes_then_single_overrides() {
        let dimensions = dims(&[
            ("power", vec![json!("Undefined"), json!("LowPower"), json!("HighPerformance")]),
            ("fallback", vec![json!(false), json!(true)]),
        ]);

        let combinations =
            generate_combinations(&dimensions, Strategy::Boundary).expect("generate");
        assert_eq!(
            combinations,
            vec![
                combo(&[("power", json!("Undefined")), ("fallback", json!(false))]),
                combo(&[("power", json!("HighPerformance")), ("fallback", json!(true))]),
                combo(&[("power", json!("LowPower")), ("fallback", json!(false))]),
                combo(&[("power", json!("HighPerformance")), ("fallback", json!(false))]),
                combo(&[("power", json!("Undefined")), ("fallback", json!(true))]),
            ]
        );
    }

    #[test]
    fn boundary_middle_uses_half_index_above_two_values() {
        let dimensions = dims(&[
            ("size", vec![json!(0), json!(1), json!(2), json!(3)]),
            ("mapped", vec![json!(false), json!(true)]),
        ]);

        let combinations =
            generate_combinations(&dimensions, Strategy::Boundary).expect("generate");
        assert_eq!(combinations[2], combo(&[("size", json!(2)), ("mapped", json!(false))]));
    }

    #[test]
    fn boundary_with_single_values_collapses_to_one() {
        let dimensions = dims(&[("a", vec![json!(1)]), ("b", vec![json!(2)])]);
        let combinations =
            generate_combinations(&dimensions, Strategy::Boundary).expect("generate");
        assert_eq!(combinations.len(), 1);
    }

    #[test]
    fn critical_path_covers_validation_and_critical_sizes() {
        let combinations =
            generate_combinations(&buffer_dims(), Strategy::CriticalPath).expect("generate");

        assert_eq!(
            combinations,
            vec![
                combo(&[("size", json!(0)), ("validation", json!(false))]),
                combo(&[("size", json!(0)), ("validation", json!(true))]),
                combo(&[("size", json!(256)), ("validation", json!(false))]),
                combo(&[("size", json!(65536)), ("validation", json!(false))]),
                combo(&[("size", json!(268435456)), ("validation", json!(false))]),
            ]
        );
    }

    #[test]
    fn critical_path_skips_sizes_missing_from_schema() {
        let dimensions = dims(&[
            ("size", vec![json!(4), json!(256.0), json!(1024)]),
            ("backend_type", vec![json!("Vulkan"), json!("Fallback")]),
        ]);

        let combinations =
            generate_combinations(&dimensions, Strategy::CriticalPath).expect("generate");
        assert_eq!(
            combinations,
            vec![
                combo(&[("size", json!(4)), ("backend_type", json!("Vulkan"))]),
                combo(&[("size", json!(256.0)), ("backend_type", json!("Vulkan"))]),
                combo(&[("size", json!(4)), ("backend_type", json!("Fallback"))]),
            ]
        );
    }

    #[test]
    fn critical_path_without_known_dimensions_is_default_only() {
        let dimensions = dims(&[("label", vec![json!(""), json!("main")])]);
        let combinations =
            generate_combinations(&dimensions, Strategy::CriticalPath).expect("generate");
        assert_eq!(combinations, vec![combo(&[("label", json!(""))])]);
    }

    #[test]
    fn pairwise_rotates_values() {
        let dimensions = dims(&[
            ("a", vec![json!(0), json!(1), json!(2)]),
            ("b", vec![json!("x"), json!("y")]),
        ]);

        let combinations =
            generate_combinations(&dimensions, Strategy::Pairwise).expect("generate");
        assert_eq!(
            combinations,
            vec![
                combo(&[("a", json!(0)), ("b", json!("y"))]),
                combo(&[("a", json!(1)), ("b", json!("x"))]),
                combo(&[("a", json!(2)), ("b", json!("y"))]),
                combo(&[("a", json!(0)), ("b", json!("x"))]),
            ]
        );
    }

    #[test]
    fn pairwise_count_caps_at_ten() {
        assert_eq!(pairwise_count(0), 1);
        assert_eq!(pairwise_count(1), 2);
        assert_eq!(pairwise_count(3), 8);
        assert_eq!(pairwise_count(4), 10);
        assert_eq!(pairwise_count(64), 10);
    }

    #[test]
    fn unknown_strategy_name_generates_pairwise() {
        let fallback = generate_combinations(&buffer_dims(), Strategy::from_name("orthogonal"))
            .expect("generate");
        let pairwise = generate_combinations(&buffer_dims(), Strategy::Pairwise).expect("generate");
        assert_eq!(fallback, pairwise);
    }

    #[test]
    fn empty_dimension_fails_fast() {
        let dimensions = dims(&[("a", vec![json!(1)]), ("b", Vec::new())]);
        for strategy in Strategy::ALL {
            let err = generate_combinations(&dimensions, strategy).expect_err("must fail");
            assert!(err.to_string().contains("'b'"));
        }
    }

    mod proptests {
        use casegen_core::{DimensionSpec, OptionDimensions};
        use casegen_plan::Strategy as Kind;
        use proptest::prelude::*;
        use serde_json::{Value, json};

        use crate::combination::OptionCombination;
        use crate::strategies::{generate_combinations, pairwise_count};

        fn arb_dimensions() -> impl Strategy<Value = OptionDimensions> {
            prop::collection::vec(prop::collection::btree_set(0_u8..8, 1..4), 0..5).prop_map(
                |axes| {
                    axes.into_iter()
                        .enumerate()
                        .map(|(idx, values)| {
                            let values = values.into_iter().map(|value| json!(value)).collect();
                            (format!("d{idx}"), DimensionSpec::new(values))
                        })
                        .collect()
                },
            )
        }

        fn values_of(dimensions: &OptionDimensions) -> Vec<Vec<Value>> {
            dimensions.iter().map(|(_, spec)| spec.values.clone()).collect()
        }

        proptest! {
            /// Exhaustive yields the product of cardinalities, all distinct.
            #[test]
            fn prop_exhaustive_size_and_distinct(dimensions in arb_dimensions()) {
                let combinations = generate_combinations(&dimensions, Kind::Exhaustive)
                    .expect("generate");
                let expected: usize = dimensions.iter().map(|(_, spec)| spec.len()).product();
                prop_assert_eq!(combinations.len(), expected);
                for (idx, combination) in combinations.iter().enumerate() {
                    prop_assert!(!combinations[idx + 1..].contains(combination));
                }
            }

            /// Boundary never repeats a combination and starts with the extremes.
            #[test]
            fn prop_boundary_dedup_and_extremes(dimensions in arb_dimensions()) {
                let combinations = generate_combinations(&dimensions, Kind::Boundary)
                    .expect("generate");
                for (idx, combination) in combinations.iter().enumerate() {
                    prop_assert!(!combinations[idx + 1..].contains(combination));
                }

                let first: OptionCombination = dimensions
                    .iter()
                    .map(|(name, spec)| (name, spec.values[0].clone()))
                    .collect();
                let last: OptionCombination = dimensions
                    .iter()
                    .map(|(name, spec)| (name, spec.values[spec.len() - 1].clone()))
                    .collect();
                prop_assert_eq!(&combinations[0], &first);
                if last != first {
                    prop_assert_eq!(&combinations[1], &last);
                }
            }

            /// Pairwise picks values[j][(i + j) % len_j] for min(10, 2^k) rows.
            #[test]
            fn prop_pairwise_rotation(dimensions in arb_dimensions()) {
                let combinations = generate_combinations(&dimensions, Kind::Pairwise)
                    .expect("generate");
                let values = values_of(&dimensions);
                prop_assert_eq!(combinations.len(), pairwise_count(values.len()));

                let names: Vec<&str> = dimensions.names().collect();
                for (row, combination) in combinations.iter().enumerate() {
                    for (column, name) in names.iter().enumerate() {
                        let axis = &values[column];
                        prop_assert_eq!(combination.get(name), Some(&axis[(row + column) % axis.len()]));
                    }
                }
            }

            /// Critical path includes every validation value over the default.
            #[test]
            fn prop_critical_path_covers_validation(
                dimensions in arb_dimensions(),
                validation in prop::collection::btree_set(0_u8..4, 1..4),
            ) {
                let mut dimensions = dimensions;
                let validation: Vec<Value> = validation.into_iter().map(|value| json!(value)).collect();
                dimensions.insert("validation", DimensionSpec::new(validation.clone()));

                let combinations = generate_combinations(&dimensions, Kind::CriticalPath)
                    .expect("generate");
                let default: OptionCombination = dimensions
                    .iter()
                    .map(|(name, spec)| (name, spec.values[0].clone()))
                    .collect();
                for value in &validation {
                    prop_assert!(combinations.contains(&default.with_override("validation", value)));
                }
                for (idx, combination) in combinations.iter().enumerate() {
                    prop_assert!(!combinations[idx + 1..].contains(combination));
                }
            }
        }
    }
}
