use crate::error::{PTZError, Result};
use std::fmt;
use std::str::FromStr;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{AsRefStr, EnumCount as EnumCountMacro, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, EnumString, EnumIter, EnumCountMacro,
)]
#[strum(serialize_all = "lowercase")]
pub enum Parameter {
    Pan,
    Tilt,
    Zoom,
    Focus,
    Brightness,
    Autofocus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    /// Rendered as `on`/`off` on the wire.
    Switch(bool),
    /// Raw value as reported by the camera.
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value. `Text` is parsed on demand, `Switch` never is.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse().ok(),
            ParamValue::Switch(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Switch(true) => f.write_str("on"),
            ParamValue::Switch(false) => f.write_str("off"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Switch(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

/// Last-known camera settings. Always holds every [`Parameter`]; nothing can
/// add or remove a key. The values may lag behind the camera until the next
/// position query.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    values: [ParamValue; Parameter::COUNT],
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            values: [
                ParamValue::Number(0.0),
                ParamValue::Number(0.0),
                ParamValue::Number(0.0),
                ParamValue::Number(0.0),
                ParamValue::Number(0.0),
                ParamValue::Switch(true),
            ],
        }
    }
}

impl Parameters {
    pub fn get(&self, param: Parameter) -> &ParamValue {
        &self.values[param as usize]
    }

    pub fn set(&mut self, param: Parameter, value: impl Into<ParamValue>) {
        self.values[param as usize] = value.into();
    }

    pub fn number(&self, param: Parameter) -> Result<f64> {
        self.get(param).as_f64().ok_or_else(|| {
            PTZError::ParseError(format!(
                "{} is not numeric: {}",
                param.as_ref(),
                self.get(param)
            ))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Parameter, &ParamValue)> {
        Parameter::iter().map(move |p| (p, self.get(p)))
    }

    /// Key/value pairs in the order the camera expects them on `action=update`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.iter()
            .map(|(p, v)| (<&'static str>::from(p), v.to_string()))
            .collect()
    }

    /// Overwrite entries with raw camera output. Keys outside the fixed set
    /// are skipped; returns how many entries were written.
    pub fn apply_raw<I, K, V>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut applied = 0;
        for (key, value) in pairs {
            match Parameter::from_str(key.as_ref()) {
                Ok(param) => {
                    self.set(param, ParamValue::Text(value.into()));
                    applied += 1;
                }
                Err(_) => {
                    tracing::debug!(key = %key.as_ref(), "Ignoring unknown position key");
                }
            }
        }
        applied
    }
}
