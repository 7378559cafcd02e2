//! CSS timing functions.
//!
//! An `EasingFunction` is parsed from the configured easing string, written
//! back out verbatim into transition rules, and evaluated by the simulated
//! compositor.
//!
//! ```
//! use sift_motion::easing::EasingFunction;
//!
//! let easing: EasingFunction = "cubic-bezier(0.4, 0, 0.2, 1)".parse().unwrap();
//! assert_eq!(easing.to_string(), "cubic-bezier(0.4, 0, 0.2, 1)");
//! let progress = easing.evaluate(0.5);
//! assert!(progress > 0.5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Where the jump happens in a `steps()` timing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// `jump-start` / `start`
    Start,
    /// `jump-end` / `end`
    #[default]
    End,
    /// `jump-both`
    Both,
    /// `jump-none`
    None,
}

impl StepPosition {
    fn keyword(self) -> &'static str {
        match self {
            Self::Start => "jump-start",
            Self::End => "jump-end",
            Self::Both => "jump-both",
            Self::None => "jump-none",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "jump-start" | "start" => Some(Self::Start),
            "jump-end" | "end" => Some(Self::End),
            "jump-both" => Some(Self::Both),
            "jump-none" => Some(Self::None),
            _ => None,
        }
    }
}

/// A CSS `<easing-function>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1)`
    #[default]
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`
    EaseInOut,
    /// Custom curve; x control values lie in [0, 1], y values are free.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Discrete jumps; `count` is at least 1.
    Steps { count: u32, position: StepPosition },
}

impl EasingFunction {
    /// Map linear progress in [0, 1] to eased progress.
    ///
    /// Input is clamped; bezier output may overshoot [0, 1].
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Self::Linear => t,
            Self::Ease => Bezier::new(0.25, 0.1, 0.25, 1.0).solve(t),
            Self::EaseIn => Bezier::new(0.42, 0.0, 1.0, 1.0).solve(t),
            Self::EaseOut => Bezier::new(0.0, 0.0, 0.58, 1.0).solve(t),
            Self::EaseInOut => Bezier::new(0.42, 0.0, 0.58, 1.0).solve(t),
            Self::CubicBezier { x1, y1, x2, y2 } => Bezier::new(x1, y1, x2, y2).solve(t),
            Self::Steps { count, position } => stepped(count, position, t),
        }
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Self::Steps { count, position } => {
                write!(f, "steps({}, {})", count, position.keyword())
            }
        }
    }
}

impl FromStr for EasingFunction {
    type Err = MotionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim().to_ascii_lowercase();
        let invalid = || MotionError::InvalidEasing(input.to_string());

        match text.as_str() {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            "step-start" => {
                return Ok(Self::Steps {
                    count: 1,
                    position: StepPosition::Start,
                });
            }
            "step-end" => {
                return Ok(Self::Steps {
                    count: 1,
                    position: StepPosition::End,
                });
            }
            _ => {}
        }

        let (name, args) = text
            .strip_suffix(')')
            .and_then(|rest| rest.split_once('('))
            .ok_or_else(invalid)?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();

        match (name.trim(), args.as_slice()) {
            ("cubic-bezier", [x1, y1, x2, y2]) => {
                let parse = |v: &str| v.parse::<f32>().map_err(|_| invalid());
                let (x1, y1, x2, y2) = (parse(*x1)?, parse(*y1)?, parse(*x2)?, parse(*y2)?);
                if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                    return Err(invalid());
                }
                Ok(Self::CubicBezier { x1, y1, x2, y2 })
            }
            ("steps", [count, rest @ ..]) if rest.len() <= 1 => {
                let count = count.parse::<u32>().map_err(|_| invalid())?;
                if count == 0 {
                    return Err(invalid());
                }
                let position = match rest.first() {
                    Some(keyword) => StepPosition::from_keyword(keyword).ok_or_else(invalid)?,
                    None => StepPosition::End,
                };
                Ok(Self::Steps { count, position })
            }
            _ => Err(invalid()),
        }
    }
}

/// Unit cubic bezier through (0, 0) and (1, 1).
struct Bezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl Bezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// y for a given x, locating the curve parameter by Newton-Raphson.
    fn solve(&self, x: f32) -> f32 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        let mut t = x;
        for _ in 0..8 {
            let error = Self::component(self.x1, self.x2, t) - x;
            if error.abs() < 1e-6 {
                break;
            }
            let slope = self.slope_x(t);
            if slope.abs() < 1e-6 {
                break;
            }
            t = (t - error / slope).clamp(0.0, 1.0);
        }

        Self::component(self.y1, self.y2, t)
    }

    // 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
    #[inline]
    fn component(p1: f32, p2: f32, t: f32) -> f32 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
    }

    #[inline]
    fn slope_x(&self, t: f32) -> f32 {
        let mt = 1.0 - t;
        3.0 * mt * mt * self.x1 + 6.0 * mt * t * (self.x2 - self.x1) + 3.0 * t * t * (1.0 - self.x2)
    }
}

fn stepped(count: u32, position: StepPosition, t: f32) -> f32 {
    let steps = count.max(1) as f32;

    match position {
        StepPosition::Start => (t * steps).ceil() / steps,
        StepPosition::End => (t * steps).floor() / steps,
        StepPosition::Both => ((t * (steps + 1.0)).floor() / steps).min(1.0),
        StepPosition::None if count <= 1 => 0.5,
        StepPosition::None => ((t * steps).floor() / (steps - 1.0)).min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_keyword_round_trip() {
        for keyword in ["linear", "ease", "ease-in", "ease-out", "ease-in-out"] {
            let easing: EasingFunction = keyword.parse().unwrap();
            assert_eq!(easing.to_string(), keyword);
        }
    }

    #[test]
    fn test_parse_cubic_bezier_with_overshoot() {
        let easing: EasingFunction = "cubic-bezier(0.68, -0.55, 0.265, 1.55)".parse().unwrap();
        assert_eq!(
            easing,
            EasingFunction::CubicBezier {
                x1: 0.68,
                y1: -0.55,
                x2: 0.265,
                y2: 1.55
            }
        );
        assert_eq!(easing.to_string(), "cubic-bezier(0.68, -0.55, 0.265, 1.55)");
    }

    #[test]
    fn test_parse_steps() {
        let easing: EasingFunction = "steps(4, jump-start)".parse().unwrap();
        assert_eq!(
            easing,
            EasingFunction::Steps {
                count: 4,
                position: StepPosition::Start
            }
        );
        assert_eq!(easing.to_string(), "steps(4, jump-start)");

        let easing: EasingFunction = "steps(3)".parse().unwrap();
        assert_eq!(easing.to_string(), "steps(3, jump-end)");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["bouncy", "cubic-bezier(1.5, 0, 0, 1)", "steps(0)", "cubic-bezier(0, 0)"] {
            assert_eq!(
                bad.parse::<EasingFunction>(),
                Err(MotionError::InvalidEasing(bad.to_string())),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_linear() {
        let ease = EasingFunction::Linear;
        assert!(approx_eq(ease.evaluate(0.25), 0.25));
        assert!(approx_eq(ease.evaluate(0.75), 0.75));
    }

    #[test]
    fn test_ease_shape() {
        let ease = EasingFunction::Ease;
        assert!(approx_eq(ease.evaluate(0.0), 0.0));
        assert!(approx_eq(ease.evaluate(1.0), 1.0));

        let mid = ease.evaluate(0.5);
        assert!(mid > 0.7 && mid < 0.9, "CSS ease mid-point should be ~0.8, got {}", mid);
        assert!(ease.evaluate(0.25) < mid);
        assert!(mid < ease.evaluate(0.75));
    }

    #[test]
    fn test_ease_in_out_symmetry() {
        let ease = EasingFunction::EaseInOut;
        assert!(approx_eq(ease.evaluate(0.5), 0.5));
        assert!(approx_eq(ease.evaluate(0.25) + ease.evaluate(0.75), 1.0));
    }

    #[test]
    fn test_steps_end() {
        let ease = EasingFunction::Steps {
            count: 4,
            position: StepPosition::End,
        };
        assert!(approx_eq(ease.evaluate(0.24), 0.0));
        assert!(approx_eq(ease.evaluate(0.25), 0.25));
        assert!(approx_eq(ease.evaluate(0.99), 0.75));
        assert!(approx_eq(ease.evaluate(1.0), 1.0));
    }

    #[test]
    fn test_clamping() {
        let ease = EasingFunction::Ease;
        assert!(approx_eq(ease.evaluate(-0.5), 0.0));
        assert!(approx_eq(ease.evaluate(1.5), 1.0));
    }
}
