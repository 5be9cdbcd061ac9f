//! Type-aware validation and canonical formatting for catalog parameters.
//!
//! Empty input is always valid and means "unset, fall back to the default".
//! Everything else is checked against the parameter's type, then its bounds
//! and allowed options. Invalid values are reported, never coerced.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::schema::{ParamType, Parameter};
use crate::value::ParamValue;

const TRUTHY: &[&str] = &["true", "yes", "on", "1"];
const FALSY: &[&str] = &["false", "no", "off", "0"];

static COLOR_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"^rgba\([0-9a-fA-F]{6,8}\)$",
        r"^rgb\([0-9a-fA-F]{6}\)$",
        r"^0x[0-9a-fA-F]{6,8}$",
        r"^#[0-9a-fA-F]{6,8}$",
    ]
    .map(|p| Regex::new(p).expect("color regex"))
});

static ANGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+deg$").expect("angle regex"));

impl Parameter {
    /// Validate raw text for this parameter.
    ///
    /// `Ok(None)` means the input was empty (unset). `Ok(Some(v))` carries the
    /// value in its typed, normalized form.
    pub fn validate(&self, raw: &str) -> Result<Option<ParamValue>, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let value = match self.param_type {
            ParamType::Int => {
                let n: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
                    value: trimmed.to_string(),
                })?;
                self.check_range(trimmed, n as f64)?;
                self.check_options(trimmed, &n.to_string())?;
                ParamValue::Int(n)
            }
            ParamType::Float => {
                let x = parse_finite(trimmed).ok_or_else(|| ValidationError::NotANumber {
                    value: trimmed.to_string(),
                })?;
                self.check_range(trimmed, x)?;
                ParamValue::Float(x)
            }
            ParamType::Bool => ParamValue::Bool(parse_bool(trimmed).ok_or_else(|| {
                ValidationError::NotABool {
                    value: trimmed.to_string(),
                }
            })?),
            ParamType::Color => {
                if !is_color(trimmed) {
                    return Err(ValidationError::NotAColor {
                        value: trimmed.to_string(),
                    });
                }
                ParamValue::Str(trimmed.to_string())
            }
            ParamType::Gradient => {
                if !is_gradient(trimmed) {
                    return Err(ValidationError::NotAGradient {
                        value: trimmed.to_string(),
                    });
                }
                ParamValue::Str(trimmed.to_string())
            }
            ParamType::Vec2 => {
                let (x, y) = parse_vec2(trimmed).ok_or_else(|| ValidationError::NotAVec2 {
                    value: trimmed.to_string(),
                })?;
                ParamValue::Str(format!("{x} {y}"))
            }
            ParamType::Str => {
                self.check_options(trimmed, trimmed)?;
                ParamValue::Str(trimmed.to_string())
            }
        };

        Ok(Some(value))
    }

    /// Validate an already-typed value by its text form. `None` is unset.
    pub fn validate_value(
        &self,
        value: Option<&ParamValue>,
    ) -> Result<Option<ParamValue>, ValidationError> {
        match value {
            Some(v) => self.validate(&v.to_string()),
            None => Ok(None),
        }
    }

    /// Render a value the way it should appear in config text.
    ///
    /// Booleans become `true`/`false`. Numeric parameters are re-parsed and
    /// re-printed so `05` and `1.50` come out as `5` and `1.5`; text that
    /// does not parse is left alone.
    pub fn format_value(&self, value: &ParamValue) -> String {
        match value {
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Str(s) if self.param_type.is_numeric() => match parse_finite(s.trim()) {
                Some(x) => format_number(x),
                None => s.clone(),
            },
            ParamValue::Float(x) => format_number(*x),
            other => other.to_string(),
        }
    }

    fn check_range(&self, raw: &str, n: f64) -> Result<(), ValidationError> {
        if let Some(min) = self.min
            && n < min
        {
            return Err(ValidationError::BelowMinimum {
                value: raw.to_string(),
                min,
            });
        }
        if let Some(max) = self.max
            && n > max
        {
            return Err(ValidationError::AboveMaximum {
                value: raw.to_string(),
                max,
            });
        }
        Ok(())
    }

    fn check_options(&self, raw: &str, candidate: &str) -> Result<(), ValidationError> {
        match &self.options {
            Some(options) if !options.iter().any(|o| o == candidate) => {
                Err(ValidationError::NotAnOption {
                    value: raw.to_string(),
                    options: options.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Case-insensitive boolean literal: true/yes/on/1 or false/no/off/0.
pub fn parse_bool(s: &str) -> Option<bool> {
    let lower = s.trim().to_lowercase();
    if TRUTHY.contains(&lower.as_str()) {
        Some(true)
    } else if FALSY.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

pub fn is_color(s: &str) -> bool {
    COLOR_PATTERNS.iter().any(|re| re.is_match(s))
}

/// One or more colors followed by an `<n>deg` angle, or a single bare color.
pub fn is_gradient(s: &str) -> bool {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, colors)) if ANGLE.is_match(last) => {
            !colors.is_empty() && colors.iter().all(|c| is_color(c))
        }
        _ => tokens.len() == 1 && is_color(tokens[0]),
    }
}

fn parse_vec2(s: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    match parts.as_slice() {
        [x, y] => Some((parse_finite(x)?, parse_finite(y)?)),
        _ => None,
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|x| x.is_finite())
}

fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        x.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Catalog;

    fn param(path: &str) -> Parameter {
        Catalog::builtin().get(path).unwrap().clone()
    }

    #[test]
    fn empty_is_valid_and_unset() {
        assert_eq!(param("general:gaps_in").validate(""), Ok(None));
        assert_eq!(param("general:gaps_in").validate("   "), Ok(None));
        assert_eq!(param("general:gaps_in").validate_value(None), Ok(None));
    }

    #[test]
    fn int_below_minimum() {
        let err = param("general:gaps_in").validate("-5").unwrap_err();
        assert_eq!(err.to_string(), "Value -5 is below minimum 0");
    }

    #[test]
    fn int_parses() {
        assert_eq!(
            param("general:gaps_in").validate(" 12 "),
            Ok(Some(ParamValue::Int(12)))
        );
    }

    #[test]
    fn int_rejects_text_and_fractions() {
        assert!(matches!(
            param("general:gaps_in").validate("wide"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(param("general:gaps_in").validate("2.5").is_err());
    }

    #[test]
    fn int_options_enforced() {
        let p = param("input:follow_mouse");
        assert_eq!(p.validate("2"), Ok(Some(ParamValue::Int(2))));
        assert!(matches!(
            p.validate("7"),
            Err(ValidationError::NotAnOption { .. })
        ));
    }

    #[test]
    fn float_range() {
        let p = param("decoration:active_opacity");
        assert_eq!(p.validate("0.9"), Ok(Some(ParamValue::Float(0.9))));
        let err = p.validate("1.2").unwrap_err();
        assert_eq!(err.to_string(), "Value 1.2 is above maximum 1");
        assert!(p.validate("NaN").is_err());
    }

    #[test]
    fn bool_literals() {
        let p = param("animations:enabled");
        for t in ["true", "YES", " on ", "1"] {
            assert_eq!(p.validate(t), Ok(Some(ParamValue::Bool(true))), "{t}");
        }
        for f in ["False", "no", "OFF", "0"] {
            assert_eq!(p.validate(f), Ok(Some(ParamValue::Bool(false))), "{f}");
        }
        assert!(matches!(
            p.validate("maybe"),
            Err(ValidationError::NotABool { .. })
        ));
    }

    #[test]
    fn color_forms() {
        assert!(is_color("rgba(33ccffee)"));
        assert!(is_color("rgb(33ccff)"));
        assert!(is_color("0xff444444"));
        assert!(is_color("#ff4444"));
        assert!(!is_color("rgb(33ccffee)"));
        assert!(!is_color("red"));
        assert!(!is_color("0xfff"));
        let p = param("decoration:shadow:color");
        assert!(matches!(
            p.validate("blue"),
            Err(ValidationError::NotAColor { .. })
        ));
    }

    #[test]
    fn gradient_forms() {
        assert!(is_gradient("rgba(33ccffee) rgba(00ff99ee) 45deg"));
        assert!(is_gradient("0xffffffff"));
        assert!(is_gradient("rgb(ff0000) -90deg"));
        assert!(!is_gradient("45deg"));
        assert!(!is_gradient("rgb(ff0000) rgb(00ff00)"));
        assert!(!is_gradient("rgb(ff0000) nope 45deg"));
    }

    #[test]
    fn vec2_is_reformatted_from_parsed_numbers() {
        let p = param("decoration:shadow:offset");
        assert_eq!(p.validate("  2.50   -3 "), Ok(Some(ParamValue::from("2.5 -3"))));
        assert!(matches!(
            p.validate("1 2 3"),
            Err(ValidationError::NotAVec2 { .. })
        ));
        assert!(p.validate("x 2").is_err());
    }

    #[test]
    fn str_options() {
        let p = param("general:layout");
        assert_eq!(p.validate("master"), Ok(Some(ParamValue::from("master"))));
        assert!(p.validate("spiral").is_err());
        let free = param("input:kb_layout");
        assert_eq!(free.validate("us,de"), Ok(Some(ParamValue::from("us,de"))));
    }

    #[test]
    fn format_value_normalizes() {
        let gaps = param("general:gaps_in");
        assert_eq!(gaps.format_value(&ParamValue::from("05")), "5");
        assert_eq!(gaps.format_value(&ParamValue::from("abc")), "abc");
        let opacity = param("decoration:active_opacity");
        assert_eq!(opacity.format_value(&ParamValue::from("0.50")), "0.5");
        assert_eq!(opacity.format_value(&ParamValue::Float(1.0)), "1");
        let anim = param("animations:enabled");
        assert_eq!(anim.format_value(&ParamValue::Bool(false)), "false");
        assert_eq!(anim.format_value(&ParamValue::from("yes")), "yes");
        let color = param("decoration:shadow:color");
        assert_eq!(color.format_value(&ParamValue::from("rgb(000000)")), "rgb(000000)");
    }

    #[test]
    fn parse_bool_trims() {
        assert_eq!(parse_bool("  Yes "), Some(true));
        assert_eq!(parse_bool("2"), None);
    }
}
