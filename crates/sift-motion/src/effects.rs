//! Show/hide effects grammar.
//!
//! An effects string such as `"fade scale(0.5) translateY(-20px) stagger(40ms)"`
//! names the opacity and transform terms a target starts from when showing
//! and ends at when hiding, plus an optional stagger step.

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::style::TransformValue;

/// Transform functions recognised as effects, in the order their terms are
/// written into a transform declaration.
pub const TRANSFORM_FUNCTIONS: &[&str] = &[
    "scale",
    "scaleX",
    "scaleY",
    "scaleZ",
    "translateX",
    "translateY",
    "translateZ",
    "rotateX",
    "rotateY",
    "rotateZ",
    "skewX",
    "skewY",
    "perspective",
];

const DEFAULT_STAGGER_MS: u32 = 30;

fn default_argument(function: &str) -> TransformValue {
    match function {
        f if f.starts_with("scale") => TransformValue::new(0.01, ""),
        f if f.starts_with("translate") => TransformValue::new(20.0, "px"),
        f if f.starts_with("rotate") => TransformValue::new(90.0, "deg"),
        f if f.starts_with("skew") => TransformValue::new(20.0, "deg"),
        _ => TransformValue::new(1000.0, "px"),
    }
}

/// Reversible terms flip sign when `reverse_out` is set.
fn is_directional(function: &str) -> bool {
    ["translate", "rotate", "skew"]
        .iter()
        .any(|prefix| function.starts_with(prefix))
}

/// Parsed effects for one direction (showing or hiding).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Effects {
    /// Opacity at the hidden end of the transition; `None` disables fading.
    pub opacity: Option<f64>,
    /// Transform terms in [`TRANSFORM_FUNCTIONS`] order.
    pub transforms: Vec<(String, TransformValue)>,
    /// Stagger step requested through `stagger()`.
    pub stagger_ms: Option<u32>,
}

impl Effects {
    pub fn parse(input: &str) -> Result<Self> {
        let mut effects = Self::default();

        for token in tokenize(input) {
            let (name, argument) = split_call(token);

            match name {
                "fade" => {
                    effects.opacity = Some(match argument {
                        Some(arg) => parse_argument(name, arg)?.value,
                        None => 0.0,
                    });
                }
                "stagger" => {
                    let step = match argument {
                        Some(arg) => parse_argument(name, arg)?.value,
                        None => f64::from(DEFAULT_STAGGER_MS),
                    };
                    effects.stagger_ms = Some(step.max(0.0).round() as u32);
                }
                _ if TRANSFORM_FUNCTIONS.contains(&name) => {
                    let value = match argument {
                        Some(arg) => parse_argument(name, arg)?,
                        None => default_argument(name),
                    };
                    effects.transforms.retain(|(existing, _)| existing != name);
                    effects.transforms.push((name.to_string(), value));
                }
                _ => return Err(MotionError::UnknownEffect(token.to_string())),
            }
        }

        effects
            .transforms
            .sort_by_key(|(name, _)| TRANSFORM_FUNCTIONS.iter().position(|f| *f == name.as_str()));

        Ok(effects)
    }

    /// Copy with translate, rotate and skew terms negated.
    pub fn reversed(&self) -> Self {
        let transforms = self
            .transforms
            .iter()
            .map(|(name, value)| {
                let value = if is_directional(name) {
                    value.negated()
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect();

        Self {
            transforms,
            ..self.clone()
        }
    }

    /// Transform terms ready to join into a declaration, e.g. `["scale(0.01)"]`.
    pub fn transform_terms(&self) -> Vec<String> {
        self.transforms
            .iter()
            .map(|(name, value)| value.term(name))
            .collect()
    }

    pub fn is_fading(&self) -> bool {
        self.opacity.is_some()
    }
}

/// Split on whitespace outside parentheses.
fn tokenize(input: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&input[s..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        tokens.push(&input[s..]);
    }

    tokens
}

fn split_call(token: &str) -> (&str, Option<&str>) {
    match token.split_once('(') {
        Some((name, rest)) => (name, Some(rest.trim_end_matches(')').trim())),
        None => (token, None),
    }
}

/// `"-20px"` → `{-20, "px"}`, `"0.5"` → `{0.5, ""}`.
fn parse_argument(name: &str, argument: &str) -> Result<TransformValue> {
    let split = argument
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(argument.len());
    let (number, unit) = argument.split_at(split);

    number
        .parse::<f64>()
        .map(|value| TransformValue::new(value, unit.trim()))
        .map_err(|_| MotionError::InvalidEffectArgument {
            name: name.to_string(),
            argument: argument.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let effects = Effects::parse("fade scale").unwrap();
        assert_eq!(effects.opacity, Some(0.0));
        assert_eq!(effects.transform_terms(), vec!["scale(0.01)"]);
        assert_eq!(effects.stagger_ms, None);
    }

    #[test]
    fn test_parse_arguments_and_canonical_order() {
        let effects =
            Effects::parse("rotateZ(-45deg) stagger(40ms) translateY(-20px) scale(0.5)").unwrap();
        assert_eq!(effects.opacity, None);
        assert_eq!(
            effects.transform_terms(),
            vec!["scale(0.5)", "translateY(-20px)", "rotateZ(-45deg)"]
        );
        assert_eq!(effects.stagger_ms, Some(40));
    }

    #[test]
    fn test_bare_stagger_uses_default_step() {
        let effects = Effects::parse("stagger").unwrap();
        assert_eq!(effects.stagger_ms, Some(DEFAULT_STAGGER_MS));
    }

    #[test]
    fn test_partial_fade() {
        let effects = Effects::parse("fade(0.25)").unwrap();
        assert_eq!(effects.opacity, Some(0.25));
    }

    #[test]
    fn test_empty_string_has_no_effects() {
        let effects = Effects::parse("   ").unwrap();
        assert!(!effects.is_fading());
        assert!(effects.transforms.is_empty());
    }

    #[test]
    fn test_reversed_flips_directional_terms_only() {
        let effects = Effects::parse("scale(0.5) translateX(30px) rotateY(90deg)").unwrap();
        assert_eq!(
            effects.reversed().transform_terms(),
            vec!["scale(0.5)", "translateX(-30px)", "rotateY(-90deg)"]
        );
    }

    #[test]
    fn test_unknown_effect() {
        assert_eq!(
            Effects::parse("fade wobble"),
            Err(MotionError::UnknownEffect("wobble".to_string()))
        );
    }

    #[test]
    fn test_invalid_argument() {
        assert!(matches!(
            Effects::parse("scale(big)"),
            Err(MotionError::InvalidEffectArgument { .. })
        ));
    }
}
