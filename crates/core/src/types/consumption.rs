//! How the customer will consume the order.

use serde::{Deserialize, Serialize};

/// Order attribute distinguishing on-premises dining from takeaway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumptionMethod {
    #[default]
    DineIn,
    Takeaway,
}

impl ConsumptionMethod {
    /// Resolve the method from the `consumptionMethod` query parameter.
    ///
    /// Only the exact value `TAKEAWAY` selects takeaway; anything else,
    /// including a missing parameter, falls back to dining in.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("TAKEAWAY") => Self::Takeaway,
            _ => Self::DineIn,
        }
    }

    /// Wire name, as used in query strings and the order API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DineIn => "DINE_IN",
            Self::Takeaway => "TAKEAWAY",
        }
    }

    /// Customer-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DineIn => "Para comer aqui",
            Self::Takeaway => "Para levar",
        }
    }
}

impl std::fmt::Display for ConsumptionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_takeaway() {
        assert_eq!(
            ConsumptionMethod::from_query(Some("TAKEAWAY")),
            ConsumptionMethod::Takeaway
        );
    }

    #[test]
    fn test_from_query_falls_back_to_dine_in() {
        assert_eq!(
            ConsumptionMethod::from_query(None),
            ConsumptionMethod::DineIn
        );
        assert_eq!(
            ConsumptionMethod::from_query(Some("DINE_IN")),
            ConsumptionMethod::DineIn
        );
        assert_eq!(
            ConsumptionMethod::from_query(Some("takeaway")),
            ConsumptionMethod::DineIn
        );
        assert_eq!(
            ConsumptionMethod::from_query(Some("")),
            ConsumptionMethod::DineIn
        );
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&ConsumptionMethod::Takeaway).unwrap(),
            "\"TAKEAWAY\""
        );
        assert_eq!(
            serde_json::to_string(&ConsumptionMethod::DineIn).unwrap(),
            "\"DINE_IN\""
        );
    }
}
