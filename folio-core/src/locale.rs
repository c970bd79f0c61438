use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::I18nError;

/// One of the locales the site ships a catalog for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleCode {
    De,
    En,
    Fr,
}

impl LocaleCode {
    pub const ALL: [LocaleCode; 3] = [LocaleCode::De, LocaleCode::En, LocaleCode::Fr];

    /// Case-insensitive parse; surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, I18nError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "de" => Ok(Self::De),
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            _ => Err(I18nError::UnsupportedLocale(input.to_string())),
        }
    }

    /// Value for the `lang` attribute and the resource file stem.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Short label shown in the current-locale indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::De => "DE",
            Self::En => "EN",
            Self::Fr => "FR",
        }
    }
}

impl Default for LocaleCode {
    fn default() -> Self {
        Self::De
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocaleCode {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_mixed_case_and_padding() {
        assert_eq!(LocaleCode::parse(" EN ").unwrap(), LocaleCode::En);
        assert_eq!("fr".parse::<LocaleCode>().unwrap(), LocaleCode::Fr);
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(
            LocaleCode::parse("es"),
            Err(I18nError::UnsupportedLocale("es".to_string()))
        );
        assert!(LocaleCode::parse("").is_err());
    }
}
