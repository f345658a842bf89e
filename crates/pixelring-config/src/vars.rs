use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::eval::eval_in_context;
use crate::expr::ScalarExpr;

/// Resolved variable table. Later entries may reference earlier ones.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    map: IndexMap<String, f64>,
}

impl Variables {
    pub fn parse(raw: Option<&IndexMap<String, ScalarExpr>>) -> Result<Self, ConfigError> {
        let mut resolved = Self::default();
        let Some(raw) = raw else {
            return Ok(resolved);
        };
        for (key, expr) in raw {
            let value = resolved.eval(key, expr)?;
            resolved.map.insert(key.clone(), value);
        }
        Ok(resolved)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.map.get(key).copied()
    }

    #[must_use]
    pub fn vars(&self) -> &IndexMap<String, f64> {
        &self.map
    }

    pub fn eval(&self, key: &str, expr: &ScalarExpr) -> Result<f64, ConfigError> {
        match expr {
            ScalarExpr::Number(n) => Ok(*n),
            ScalarExpr::String(s) => eval_in_context(key, s, &self.map),
        }
    }

    /// Evaluate `expr` and require a non-negative whole number.
    pub fn eval_count(&self, key: &str, expr: &ScalarExpr) -> Result<usize, ConfigError> {
        let value = self.eval(key, expr)?;
        if value < 0.0 || value.fract().abs() > 1e-9 || !value.is_finite() {
            return Err(ConfigError::NotACount {
                key: key.to_string(),
                value,
            });
        }
        Ok(value.round() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_variables_see_earlier_ones() {
        let raw = IndexMap::from([
            ("r".to_string(), ScalarExpr::Number(20.0)),
            ("edge".to_string(), ScalarExpr::from("r + 4")),
            ("twice".to_string(), ScalarExpr::from("2edge")),
        ]);
        let vars = Variables::parse(Some(&raw)).unwrap();
        assert_eq!(vars.get("edge"), Some(24.0));
        assert_eq!(vars.get("twice"), Some(48.0));
        let keys: Vec<_> = vars.vars().keys().cloned().collect();
        assert_eq!(keys, ["r", "edge", "twice"]);
    }

    #[test]
    fn forward_references_fail() {
        let raw = IndexMap::from([
            ("a".to_string(), ScalarExpr::from("b + 1")),
            ("b".to_string(), ScalarExpr::Number(1.0)),
        ]);
        assert!(matches!(
            Variables::parse(Some(&raw)),
            Err(ConfigError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn counts_must_be_whole() {
        let vars = Variables::default();
        assert_eq!(vars.eval_count("n", &ScalarExpr::from("6*2")).unwrap(), 12);
        assert!(matches!(
            vars.eval_count("n", &ScalarExpr::Number(2.5)),
            Err(ConfigError::NotACount { .. })
        ));
        assert!(matches!(
            vars.eval_count("n", &ScalarExpr::Number(-1.0)),
            Err(ConfigError::NotACount { .. })
        ));
    }
}
