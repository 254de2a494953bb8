use std::fmt;

/// A single attribute cell, as read from a layer's attribute table.
///
/// Several representations of "a number" coexist here because the readers
/// keep whatever the file stored: GeoJSON numbers become `Int`/`Float`,
/// dBase `N`/`F` columns become `Decimal` (the stored text may have failed to
/// parse), and free text stays `Text`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    /// Boxed numeric whose conversion may have failed (`None`).
    Decimal(Option<f64>),
    Text(String),
    Bool(bool),
    /// Calendar date, kept as ISO `YYYY-MM-DD` text.
    Date(String),
}

impl AttrValue {
    #[inline] pub fn is_null(&self) -> bool { matches!(self, AttrValue::Null) }

    /// Native numbers only.
    fn as_native(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Unwrap a boxed numeric through its own conversion.
    fn as_boxed(&self) -> Option<f64> {
        match self {
            AttrValue::Decimal(d) => *d,
            _ => None,
        }
    }

    /// Parse text, accepting a decimal comma (`"3,5"`).
    fn as_text(&self) -> Option<f64> {
        match self {
            AttrValue::Text(s) => s.trim()
                .replace(',', ".")
                .parse::<f64>().ok()
                .filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Convert any attribute value to `f64`, never failing.
    ///
    /// Attempts, in order: null (0.0), native numbers, boxed numerics, text
    /// with a decimal comma. Anything that cannot be read as a number
    /// contributes 0.0 so that one malformed cell never aborts a run.
    pub fn to_float(&self) -> f64 {
        if self.is_null() { return 0.0 }

        self.as_native()
            .or_else(|| self.as_boxed())
            .or_else(|| self.as_text())
            .unwrap_or(0.0)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null | AttrValue::Decimal(None) => write!(f, "NULL"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Float(v) | AttrValue::Decimal(Some(v)) => write!(f, "{v}"),
            AttrValue::Text(s) | AttrValue::Date(s) => write!(f, "{s}"),
            AttrValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self { AttrValue::Float(value) }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self { AttrValue::Int(value) }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self { AttrValue::Text(value.to_string()) }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::AttrValue;

    #[test]
    fn null_is_zero() {
        assert_eq!(AttrValue::Null.to_float(), 0.0);
    }

    #[test]
    fn native_numbers_cast() {
        assert_eq!(AttrValue::Float(3.5).to_float(), 3.5);
        assert_eq!(AttrValue::Int(-7).to_float(), -7.0);
    }

    #[test]
    fn boxed_numeric_unwraps_or_falls_through() {
        assert_eq!(AttrValue::Decimal(Some(12.25)).to_float(), 12.25);
        assert_eq!(AttrValue::Decimal(None).to_float(), 0.0);
    }

    #[test]
    fn text_with_decimal_comma() {
        assert_eq!(AttrValue::from("3,5").to_float(), 3.5);
        assert_eq!(AttrValue::from(" 42 ").to_float(), 42.0);
        assert_eq!(AttrValue::from("-0.125").to_float(), -0.125);
    }

    #[test]
    fn unparsable_text_is_zero() {
        assert_eq!(AttrValue::from("abc").to_float(), 0.0);
        assert_eq!(AttrValue::from("").to_float(), 0.0);
        assert_eq!(AttrValue::from("1,234.5").to_float(), 0.0);
        assert_eq!(AttrValue::from("NaN").to_float(), 0.0);
    }

    #[test]
    fn non_numeric_kinds_are_zero() {
        assert_eq!(AttrValue::Bool(true).to_float(), 0.0);
        assert_eq!(AttrValue::Date("2025-08-31".into()).to_float(), 0.0);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(AttrValue::from(None::<f64>), AttrValue::Null);
        assert_eq!(AttrValue::from(Some(2.0)), AttrValue::Float(2.0));
    }
}
