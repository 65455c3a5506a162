//! Targeter clauses
//!
//! A targeter names the anchor that command offsets are relative to. It is
//! either a bare name (`Origin`) or a name with parameters
//! (`Ring{radius=3;points=8}`).

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Default anchor used when a layer does not name one.
pub const DEFAULT_TARGETER: &str = "Origin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targeter {
    name: String,
    params: Vec<(String, String)>,
}

impl Targeter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            DEFAULT_TARGETER.to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            name,
            params: Vec::new(),
        }
    }

    /// Add or replace a parameter, keeping insertion order.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(key, value);
        self
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Parse targeter text. Never fails: text without a well-formed
    /// parameter block is taken as a bare name.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(open) = text.find('{') else {
            return Self::new(text);
        };
        let Some(body) = text[open + 1..].strip_suffix('}') else {
            return Self::new(text);
        };

        let mut targeter = Self::new(&text[..open]);
        for pair in body.split(';').filter(|p| !p.trim().is_empty()) {
            match pair.split_once('=') {
                Some((k, v)) => targeter.set_param(k.trim(), v.trim()),
                None => targeter.set_param(pair.trim(), ""),
            }
        }
        targeter
    }
}

impl Default for Targeter {
    fn default() -> Self {
        Self::new(DEFAULT_TARGETER)
    }
}

impl FromStr for Targeter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Targeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.params.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name() {
        let t = Targeter::parse("Origin");
        assert_eq!(t.name(), "Origin");
        assert!(t.params().is_empty());
        assert_eq!(t.to_string(), "Origin");
    }

    #[test]
    fn test_parameterized() {
        let t = Targeter::parse("Ring{radius=3;points=8}");
        assert_eq!(t.name(), "Ring");
        assert_eq!(t.params().len(), 2);
        assert_eq!(t.to_string(), "Ring{radius=3;points=8}");
    }

    #[test]
    fn test_empty_defaults_to_origin() {
        assert_eq!(Targeter::parse("   ").to_string(), "Origin");
    }

    #[test]
    fn test_unclosed_block_is_a_name() {
        let t = Targeter::parse("Self{r=1");
        assert_eq!(t.name(), "Self{r=1");
        assert!(t.params().is_empty());
    }

    #[test]
    fn test_set_param_replaces() {
        let t = Targeter::new("Target")
            .with_param("r", "1")
            .with_param("r", "2");
        assert_eq!(t.to_string(), "Target{r=2}");
    }
}
