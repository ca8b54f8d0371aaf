//! Lenient numeric decoding for backend fields that arrive as either JSON
//! numbers or decimal strings.

use serde::{Deserialize, Deserializer};

/// Raw shape of a numeric field before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Resolve to a finite value, or `None` when the text does not parse.
    pub(crate) fn to_finite(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Deserialize an optional number that may be encoded as a string.
///
/// Unparseable text is treated as absent rather than as a decoding error.
pub(crate) fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(NumberOrText::to_finite))
}

/// Deserialize a number that may be encoded as a string, defaulting to zero.
pub(crate) fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_f64(deserializer)?.unwrap_or_default())
}

/// Deserialize an identifier sent either as a JSON integer or as text.
pub(crate) fn id_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Integer(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Integer(id) => id.to_string(),
        RawId::Text(id) => id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_and_numeric_text_resolve() {
        assert_eq!(NumberOrText::Number(4.5).to_finite(), Some(4.5));
        assert_eq!(NumberOrText::Text(" 3.25 ".into()).to_finite(), Some(3.25));
    }

    #[test]
    fn garbage_and_non_finite_text_resolve_to_none() {
        assert_eq!(NumberOrText::Text("great".into()).to_finite(), None);
        assert_eq!(NumberOrText::Text(String::new()).to_finite(), None);
        assert_eq!(NumberOrText::Text("NaN".into()).to_finite(), None);
        assert_eq!(NumberOrText::Text("inf".into()).to_finite(), None);
    }
}
