//! Admission pattern for the amount field, built from the bounds.
//!
//! Four mutually exclusive shapes, each optionally followed by a decimal
//! fraction group. The pattern deliberately admits growable prefixes such as
//! "-" or "3." - text that is not yet a number but could still become one.

use regex::Regex;

/// Which signs the bounds leave reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignShape {
    /// `max < 0`: only negative numbers can ever be valid.
    NegativeOnly,
    /// `min > 0`: only positive numbers can ever be valid.
    PositiveOnly,
    /// Zero is inside the range; either sign may appear.
    Signed,
}

impl SignShape {
    pub fn for_bounds(min: f64, max: f64) -> Self {
        if max < 0.0 {
            SignShape::NegativeOnly
        } else if min > 0.0 {
            SignShape::PositiveOnly
        } else {
            SignShape::Signed
        }
    }

    fn source(&self) -> &'static str {
        match self {
            SignShape::NegativeOnly => "-[0-9]*",
            SignShape::PositiveOnly => "[0-9]+",
            SignShape::Signed => "-?[0-9]*",
        }
    }
}

/// Compiled admission pattern. The single source of truth for which
/// keystrokes and paste text may land in the buffer.
#[derive(Debug, Clone)]
pub struct NumberPattern {
    shape: SignShape,
    allow_decimal: bool,
    regex: Regex,
}

impl NumberPattern {
    pub fn for_bounds(min: f64, max: f64, allow_decimal: bool) -> Self {
        let shape = SignShape::for_bounds(min, max);
        let mut source = String::from("^");
        source.push_str(shape.source());
        if allow_decimal {
            source.push_str("(\\.[0-9]*)?");
        }
        source.push('$');
        // Sources are fixed by the enumeration above.
        let regex = Regex::new(&source).expect("static pattern source");
        Self { shape, allow_decimal, regex }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn shape(&self) -> SignShape {
        self.shape
    }

    pub fn allows_decimal(&self) -> bool {
        self.allow_decimal
    }
}
