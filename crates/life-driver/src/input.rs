//! Validation of user-entered numbers (grid width, height and delay).
//!
//! A value is accepted when it is numeric, greater than zero and integral.
//! `"12"`, `"+12"`, `"12.0"` and `"1e2"` pass; `"0"`, `"-3"`, `"2.5"`,
//! `"abc"` and `""` do not.

/// Largest float that still represents every integer below it exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Why an input value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Not a number at all.
    #[error("{raw:?} is not a number")]
    NotNumeric {
        /// The rejected input.
        raw: String,
    },

    /// Zero or negative.
    #[error("{raw:?} must be greater than zero")]
    NotPositive {
        /// The rejected input.
        raw: String,
    },

    /// Has a fractional part.
    #[error("{raw:?} must be a whole number")]
    NotInteger {
        /// The rejected input.
        raw: String,
    },

    /// Too large to represent.
    #[error("{raw:?} is too large")]
    TooLarge {
        /// The rejected input.
        raw: String,
    },
}

/// Parse a positive whole number.
pub fn parse_positive(raw: &str) -> Result<u64, InputError> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return if value == 0 {
            Err(InputError::NotPositive { raw: raw.to_owned() })
        } else {
            Ok(value)
        };
    }

    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
        .ok_or_else(|| InputError::NotNumeric { raw: raw.to_owned() })?;

    if value <= 0.0 {
        return Err(InputError::NotPositive { raw: raw.to_owned() });
    }
    if value.fract() != 0.0 {
        return Err(InputError::NotInteger { raw: raw.to_owned() });
    }
    if value > MAX_EXACT_FLOAT {
        return Err(InputError::TooLarge { raw: raw.to_owned() });
    }

    // Positive, integral and below 2^53: the cast is exact.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = value as u64;
    Ok(whole)
}

/// Last value entered into a numeric field, `None` while it is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputField {
    value: Option<u64>,
}

impl InputField {
    /// A field holding a valid value.
    pub const fn new(value: u64) -> Self {
        Self { value: Some(value) }
    }

    /// Validate `raw` and store the outcome.
    ///
    /// An invalid entry marks the field invalid until a valid one arrives.
    pub fn accept(&mut self, raw: &str) -> Result<u64, InputError> {
        let parsed = parse_positive(raw);
        self.value = parsed.as_ref().ok().copied();
        parsed
    }

    /// Whether the last entry was valid.
    pub const fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// The last valid entry, if the field is currently valid.
    pub const fn value(&self) -> Option<u64> {
        self.value
    }
}
