//! Validated primitive types shared across the PMS crates.

/// Errors raised when constructing validated text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input was empty or whitespace only.
    #[error("must not be empty")]
    Empty,
}

/// A string guaranteed to contain at least one non-whitespace character.
///
/// The text is kept exactly as supplied; surrounding whitespace is not stripped. Used for every
/// free-text patient attribute (`id`, `name`, `city`), so a blank value can never reach the
/// record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Wraps `input` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if `input` is empty or whitespace only.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let text = input.into();
        if text.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl TryFrom<String> for NonEmptyText {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_surrounding_whitespace() {
        let text = NonEmptyText::new("  Pune \n").expect("non-empty input");
        assert_eq!(text.as_str(), "  Pune \n");
        assert_eq!(text.to_string(), "  Pune \n");
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new("   \t"), Err(TextError::Empty));
    }

    #[test]
    fn deserialize_rejects_blank_strings() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").expect_err("blank must fail");
        assert!(err.to_string().contains("must not be empty"));

        let ok: NonEmptyText = serde_json::from_str("\"P001\"").expect("valid text");
        assert_eq!(String::from(ok), "P001");
    }
}
