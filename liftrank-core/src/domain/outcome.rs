use serde::{Deserialize, Serialize};

/// Result of a statistic computed over a filtered view.
///
/// An empty view has no percentile, distribution or quantile. That state is
/// reported as `InsufficientData` and is never folded into a numeric default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    InsufficientData,
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::InsufficientData => None,
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(value),
            Outcome::InsufficientData => Outcome::InsufficientData,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(f(value)),
            Outcome::InsufficientData => Outcome::InsufficientData,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Outcome::InsufficientData, Outcome::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_serializes_without_value() {
        let json = serde_json::to_string(&Outcome::<f64>::InsufficientData).unwrap();
        assert_eq!(json, r#"{"status":"insufficient_data"}"#);

        let json = serde_json::to_string(&Outcome::Ready(30.0)).unwrap();
        assert_eq!(json, r#"{"status":"ready","value":30.0}"#);
    }

    #[test]
    fn map_preserves_insufficient_data() {
        let none: Outcome<f64> = None.into();
        assert_eq!(none.map(|v| v * 2.0), Outcome::InsufficientData);
        assert_eq!(Outcome::Ready(2.0).map(|v| v * 2.0), Outcome::Ready(4.0));
    }
}
