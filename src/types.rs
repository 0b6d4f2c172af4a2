//! Value types shared by the config layer, the resolver and the settings patcher

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the image sits inside the terminal pane (host spelling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Center,
    Left,
    Top,
    Right,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Alignment {
    pub const ALL: [Alignment; 9] = [
        Alignment::Center,
        Alignment::Left,
        Alignment::Top,
        Alignment::Right,
        Alignment::Bottom,
        Alignment::TopLeft,
        Alignment::TopRight,
        Alignment::BottomLeft,
        Alignment::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Center => "center",
            Alignment::Left => "left",
            Alignment::Top => "top",
            Alignment::Right => "right",
            Alignment::Bottom => "bottom",
            Alignment::TopLeft => "topLeft",
            Alignment::TopRight => "topRight",
            Alignment::BottomLeft => "bottomLeft",
            Alignment::BottomRight => "bottomRight",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alignment {
    type Err = String;

    /// Case-insensitive, so `topleft` and `topLeft` both work on the command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Alignment::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "invalid alignment '{s}' (expected one of: {})",
                    Alignment::ALL.map(|a| a.as_str()).join(", ")
                )
            })
    }
}

/// How the image is scaled to the pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stretch {
    None,
    Fill,
    Uniform,
    UniformToFill,
}

impl Stretch {
    pub const ALL: [Stretch; 4] = [
        Stretch::None,
        Stretch::Fill,
        Stretch::Uniform,
        Stretch::UniformToFill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stretch::None => "none",
            Stretch::Fill => "fill",
            Stretch::Uniform => "uniform",
            Stretch::UniformToFill => "uniformToFill",
        }
    }
}

impl fmt::Display for Stretch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stretch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stretch::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "invalid stretch mode '{s}' (expected one of: {})",
                    Stretch::ALL.map(|m| m.as_str()).join(", ")
                )
            })
    }
}

/// Background image opacity, always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Opacity(f64);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);

    pub fn new(value: f64) -> Result<Self, String> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("opacity must be between 0 and 1, got {value}"))
        }
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Opacity {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Opacity> for f64 {
    fn from(opacity: Opacity) -> Self {
        opacity.0
    }
}

impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Opacity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid opacity '{s}' (expected a number between 0 and 1)"))?;
        Self::new(value)
    }
}

/// Host profile addressed by a publish: `profiles.defaults` or a 1-based entry of `profiles.list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfileTarget {
    Defaults,
    List(NonZeroUsize),
}

impl ProfileTarget {
    /// Zero-based index into `profiles.list`, if this is a numbered profile
    pub fn list_index(&self) -> Option<usize> {
        match self {
            ProfileTarget::Defaults => None,
            ProfileTarget::List(n) => Some(n.get() - 1),
        }
    }
}

impl fmt::Display for ProfileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileTarget::Defaults => f.write_str("default"),
            ProfileTarget::List(n) => write!(f, "list-{n}"),
        }
    }
}

impl FromStr for ProfileTarget {
    type Err = String;

    /// Accepts `default`, `list-N` or a bare `N` (N >= 1)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("default") || trimmed.eq_ignore_ascii_case("defaults") {
            return Ok(ProfileTarget::Defaults);
        }

        let number = trimmed
            .strip_prefix("list-")
            .or_else(|| trimmed.strip_prefix("LIST-"))
            .unwrap_or(trimmed);
        number
            .parse::<NonZeroUsize>()
            .map(ProfileTarget::List)
            .map_err(|_| format!("invalid profile '{s}' (expected 'default', 'list-N' or N, with N >= 1)"))
    }
}

impl TryFrom<String> for ProfileTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProfileTarget> for String {
    fn from(target: ProfileTarget) -> Self {
        target.to_string()
    }
}
