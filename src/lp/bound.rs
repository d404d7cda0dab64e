//! Serde helpers for unbounded values.
//!
//! JSON has no infinity: serde_json writes `f64::INFINITY` as `null` and
//! refuses to read it back. An infinite bound is stored as `null` and read
//! back as the matching infinity.

/// `+inf` ⇄ `null`.
pub(crate) mod upper {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if *value == f64::INFINITY {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }

    pub(crate) fn unbounded() -> f64 {
        f64::INFINITY
    }
}

/// `-inf` ⇄ `null`.
pub(crate) mod lower {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if *value == f64::NEG_INFINITY {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Bounds {
        #[serde(with = "crate::lp::bound::lower")]
        lower: f64,
        #[serde(with = "crate::lp::bound::upper", default = "crate::lp::bound::upper::unbounded")]
        upper: f64,
    }

    #[test]
    fn test_infinite_bounds_survive_json() {
        let b = Bounds {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        };
        let json = serde_json::to_string(&b).expect("serializable");
        assert_eq!(json, r#"{"lower":null,"upper":null}"#);
        let back: Bounds = serde_json::from_str(&json).expect("readable");
        assert_eq!(back, b);
    }

    #[test]
    fn test_finite_bounds_are_plain_numbers() {
        let back: Bounds = serde_json::from_str(r#"{"lower":1.5,"upper":7.0}"#).expect("readable");
        assert_eq!(back, Bounds { lower: 1.5, upper: 7.0 });
    }

    #[test]
    fn test_missing_upper_is_unbounded() {
        let back: Bounds = serde_json::from_str(r#"{"lower":0.0}"#).expect("readable");
        assert!(back.upper.is_infinite());
    }
}
