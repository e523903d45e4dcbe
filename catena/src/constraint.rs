//! Value constraints attached to parameter definitions.
//!
//! Constraints describe legal values to clients. The device layer also uses
//! [`Constraint::apply`] to coerce incoming writes: ranges clamp and snap to
//! the step grid, strict choices fall back to their first choice.

use serde::{Deserialize, Serialize};

use crate::param::Value;
use crate::text::{PolyglotText, simple_text};

/// Numeric range with an optional step (`0` means continuous).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConstraint<T> {
    pub min_value: T,
    pub max_value: T,
    pub step: T,
    pub display_min: T,
    pub display_max: T,
}

impl<T: Copy> RangeConstraint<T> {
    pub fn new(min_value: T, max_value: T, step: T) -> Self {
        Self {
            min_value,
            max_value,
            step,
            display_min: min_value,
            display_max: max_value,
        }
    }

    pub fn with_display_range(mut self, display_min: T, display_max: T) -> Self {
        self.display_min = display_min;
        self.display_max = display_max;
        self
    }
}

impl RangeConstraint<i32> {
    fn is_valid(&self) -> bool {
        self.min_value <= self.max_value
    }

    /// Distance of `value` above the closest grid point at or below it.
    fn grid_offset(&self, value: i32) -> i64 {
        if self.step == 0 {
            return 0;
        }
        (i64::from(value) - i64::from(self.min_value)).rem_euclid(i64::from(self.step))
    }
}

impl RangeConstraint<f32> {
    fn is_valid(&self) -> bool {
        self.min_value <= self.max_value && self.step.is_finite()
    }
}

/// One entry of an integer choice list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntChoice {
    pub value: i32,
    pub name: PolyglotText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntChoiceConstraint {
    pub choices: Vec<IntChoice>,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringChoiceConstraint {
    pub choices: Vec<String>,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Int32Range(RangeConstraint<i32>),
    Float32Range(RangeConstraint<f32>),
    Int32Choice(IntChoiceConstraint),
    StringChoice(StringChoiceConstraint),
}

impl Constraint {
    /// Whether `value` satisfies the constraint. Values of a kind the
    /// constraint does not speak about are accepted.
    pub fn satisfied(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Int32Range(range), _) if !range.is_valid() => true,
            (Self::Float32Range(range), _) if !range.is_valid() => true,
            (Self::Int32Range(range), Value::Int32(v)) => {
                *v >= range.min_value && *v <= range.max_value && range.grid_offset(*v) == 0
            }
            (Self::Float32Range(range), Value::Float32(v)) => {
                *v >= range.min_value
                    && *v <= range.max_value
                    && (range.step == 0.0 || on_float_grid(*v, range))
            }
            (Self::Int32Choice(choice), Value::Int32(v)) => {
                !choice.strict || choice.choices.iter().any(|c| c.value == *v)
            }
            (Self::StringChoice(choice), Value::String(v)) => {
                !choice.strict || choice.choices.iter().any(|c| c == v)
            }
            _ => true,
        }
    }

    /// Coerce `value` into the constraint. Degenerate ranges are never
    /// applied, so the clamps below always see `min <= max`.
    pub fn apply(&self, value: &Value) -> Value {
        if self.satisfied(value) {
            return value.clone();
        }
        match (self, value) {
            (Self::Int32Range(range), Value::Int32(v)) => {
                let clamped = (*v).clamp(range.min_value, range.max_value);
                // stays within [min_value, clamped]
                let snapped = i64::from(clamped) - range.grid_offset(clamped);
                Value::Int32(snapped as i32)
            }
            (Self::Float32Range(range), Value::Float32(v)) => {
                let clamped = v.clamp(range.min_value, range.max_value);
                let snapped = if range.step == 0.0 {
                    clamped
                } else {
                    clamped - (clamped - range.min_value) % range.step
                };
                Value::Float32(snapped)
            }
            (Self::Int32Choice(choice), _) => choice
                .choices
                .first()
                .map(|c| Value::Int32(c.value))
                .unwrap_or_else(|| value.clone()),
            (Self::StringChoice(choice), _) => choice
                .choices
                .first()
                .map(|c| Value::String(c.clone()))
                .unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        }
    }
}

fn on_float_grid(value: f32, range: &RangeConstraint<f32>) -> bool {
    let remainder = (value - range.min_value) % range.step;
    // upper bound is always valid
    remainder.abs() < 1e-6 || (range.step - remainder).abs() < 1e-6 || value == range.max_value
}

pub fn int32_range(min_value: i32, max_value: i32, step: i32) -> Constraint {
    Constraint::Int32Range(RangeConstraint::new(min_value, max_value, step))
}

pub fn float32_range(min_value: f32, max_value: f32, step: f32) -> Constraint {
    Constraint::Float32Range(RangeConstraint::new(min_value, max_value, step))
}

/// Strict integer choice whose values are the positions of `names`.
pub fn int32_choice<S: AsRef<str>>(names: &[S]) -> Constraint {
    let choices = names
        .iter()
        .zip(0..)
        .map(|(name, value)| IntChoice {
            value,
            name: simple_text(name.as_ref()),
        })
        .collect();
    Constraint::Int32Choice(IntChoiceConstraint {
        choices,
        strict: true,
    })
}

pub fn string_choice<S: AsRef<str>>(choices: &[S], strict: bool) -> Constraint {
    Constraint::StringChoice(StringChoiceConstraint {
        choices: choices.iter().map(|c| c.as_ref().to_string()).collect(),
        strict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_range() {
        let c = int32_range(0, 10, 2);
        assert!(c.satisfied(&Value::Int32(4)));
        assert!(!c.satisfied(&Value::Int32(3)));
        assert!(!c.satisfied(&Value::Int32(12)));
        assert_eq!(c.apply(&Value::Int32(3)), Value::Int32(2));
        assert_eq!(c.apply(&Value::Int32(-5)), Value::Int32(0));
        assert_eq!(c.apply(&Value::Int32(99)), Value::Int32(10));
    }

    #[test]
    fn test_full_width_int_range() {
        let c = int32_range(i32::MIN, i32::MAX, 2);
        assert!(c.satisfied(&Value::Int32(0)));
        assert!(c.satisfied(&Value::Int32(i32::MIN)));
        assert!(!c.satisfied(&Value::Int32(i32::MAX)));
        assert_eq!(c.apply(&Value::Int32(i32::MAX)), Value::Int32(i32::MAX - 1));
        assert_eq!(c.apply(&Value::Int32(-3)), Value::Int32(-4));

        let wide = int32_range(-2_000_000_000, 2_000_000_000, 1);
        assert!(wide.satisfied(&Value::Int32(2_000_000_000)));
        assert_eq!(
            wide.apply(&Value::Int32(i32::MAX)),
            Value::Int32(2_000_000_000)
        );
    }

    #[test]
    fn test_degenerate_ranges_constrain_nothing() {
        let inverted = int32_range(10, 0, 1);
        assert!(inverted.satisfied(&Value::Int32(5)));
        assert_eq!(inverted.apply(&Value::Int32(50)), Value::Int32(50));

        let nan = float32_range(f32::NAN, 1.0, 0.0);
        assert_eq!(nan.apply(&Value::Float32(2.0)), Value::Float32(2.0));
        let inverted = float32_range(1.0, -1.0, 0.1);
        assert_eq!(inverted.apply(&Value::Float32(3.0)), Value::Float32(3.0));
    }

    #[test]
    fn test_float_range_continuous() {
        let c = float32_range(0.0, 1.0, 0.0);
        assert!(c.satisfied(&Value::Float32(0.75)));
        assert_eq!(c.apply(&Value::Float32(1.5)), Value::Float32(1.0));
    }

    #[test]
    fn test_int_choice() {
        let c = int32_choice(&["Choice 1", "Choice 2", "Choice 3"]);
        let Constraint::Int32Choice(choice) = &c else {
            panic!("expected an int choice");
        };
        assert_eq!(choice.choices[2].value, 2);
        assert_eq!(choice.choices[2].name.get("en"), Some("Choice 3"));
        assert!(c.satisfied(&Value::Int32(1)));
        assert_eq!(c.apply(&Value::Int32(7)), Value::Int32(0));
    }

    #[test]
    fn test_string_choice_strictness() {
        let loose = string_choice(&["a", "b"], false);
        assert!(loose.satisfied(&Value::from("z")));

        let strict = string_choice(&["a", "b"], true);
        assert_eq!(strict.apply(&Value::from("z")), Value::from("a"));
    }

    #[test]
    fn test_unrelated_kind_passes() {
        let c = int32_range(0, 10, 1);
        assert!(c.satisfied(&Value::from("text")));
    }
}
