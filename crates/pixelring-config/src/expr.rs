use serde::{Deserialize, Serialize};

/// A number, or a string expression evaluated against the variable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarExpr {
    Number(f64),
    String(String),
}

impl ScalarExpr {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarExpr::String(s) => Some(s),
            ScalarExpr::Number(_) => None,
        }
    }
}

impl From<f64> for ScalarExpr {
    fn from(v: f64) -> Self {
        ScalarExpr::Number(v)
    }
}

impl From<&str> for ScalarExpr {
    fn from(v: &str) -> Self {
        ScalarExpr::String(v.to_string())
    }
}
