//! Bounded numeric input engine.
//!
//! A text buffer constrained to `[min, max]` with a step and a decimal scale,
//! validated live on every keystroke and paste. Admission is decided by
//! [`NumberPattern`] plus a range check on the resulting value; the pattern
//! accepts intermediate states ("-", "3.") that a plain parse would refuse.
//!
//! A change is only reported when the buffer text exactly equals the
//! canonical string of the fully clamped value - not on every keystroke.
//! Every rejected keystroke or paste is reported with the offending text.

mod pattern;

pub use pattern::{NumberPattern, SignShape};

use std::ops::Range;

/// What a single edit did to the field.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// The edit landed. `committed` carries the new value when the buffer is
    /// in canonical (final) form, `None` while it is still an intermediate
    /// state.
    Accepted { committed: Option<f64> },
    /// The edit was refused; the buffer is untouched. `text` is the string
    /// the edit would have produced (or the raw pasted text).
    Rejected { text: String },
}

/// Keyboard input as seen by the field. Arrow keys bypass the pattern and
/// step the value instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    ArrowUp,
    ArrowDown,
}

#[derive(Debug, Clone)]
pub struct NumberField {
    text: String,
    min: f64,
    max: f64,
    step: f64,
    explicit_scale: u32,
    decimal_scale: u32,
    pattern: NumberPattern,
}

impl NumberField {
    pub fn new(min: f64, max: f64) -> Self {
        let mut field = Self {
            text: String::new(),
            min,
            max,
            step: 1.0,
            explicit_scale: 0,
            decimal_scale: 0,
            pattern: NumberPattern::for_bounds(min, max, false),
        };
        field.rebuild();
        field
    }

    /// The wallet amount field: non-negative integer satoshis.
    pub fn satoshis() -> Self {
        Self::new(0.0, f64::INFINITY).with_initial(0.0)
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self.rebuild();
        self
    }

    pub fn with_decimal_scale(mut self, scale: u32) -> Self {
        self.explicit_scale = scale;
        self.rebuild();
        self
    }

    pub fn with_initial(mut self, value: f64) -> Self {
        self.text = canonical(self.clamp_value(value));
        self
    }

    /// Recompute the derived scale and admission pattern. The scale is
    /// inferred from the fractional precision of min/max/step unless set
    /// explicitly, and forced to 0 when none of them are fractional.
    fn rebuild(&mut self) {
        let inferred = frac_digits(self.min)
            .max(frac_digits(self.max))
            .max(frac_digits(self.step));
        let allow_decimal = self.explicit_scale > 0 || inferred > 0;
        self.decimal_scale = if self.explicit_scale > 0 { self.explicit_scale } else { inferred };
        self.pattern = NumberPattern::for_bounds(self.min, self.max, allow_decimal);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The buffer resolved to a number: current text clamped into range and
    /// rounded to the decimal scale.
    pub fn value(&self) -> f64 {
        self.clamp(&self.text)
    }

    pub fn pattern(&self) -> &NumberPattern {
        &self.pattern
    }

    /// Parse-and-clamp. Empty or non-numeric text resolves to 0. Idempotent.
    pub fn clamp(&self, raw: &str) -> f64 {
        self.clamp_value(numeric_value(raw).unwrap_or(f64::NAN))
    }

    fn clamp_value(&self, value: f64) -> f64 {
        let v = if value.is_nan() { 0.0 } else { value };
        round_to(v.max(self.min).min(self.max), self.decimal_scale)
    }

    /// Keyboard entry at the given selection. Arrow keys step; characters go
    /// through pattern + range admission.
    pub fn key_down(&mut self, selection: Range<usize>, key: Key) -> InputOutcome {
        match key {
            Key::ArrowUp => InputOutcome::Accepted { committed: Some(self.step_by(self.step)) },
            Key::ArrowDown => InputOutcome::Accepted { committed: Some(self.step_by(-self.step)) },
            Key::Char(ch) => self.keystroke(selection, ch),
        }
    }

    /// Insert one character at the selection, replacing any selected text.
    /// Rejection leaves the buffer untouched and reports the text the
    /// keystroke would have produced.
    pub fn keystroke(&mut self, selection: Range<usize>, ch: char) -> InputOutcome {
        let candidate = splice(&self.text, selection, &ch.to_string());
        if !self.admits(&candidate) {
            return InputOutcome::Rejected { text: candidate };
        }
        self.apply(candidate)
    }

    /// Paste at the selection. The admission rule is applied to the pasted
    /// text itself, surrounding whitespace stripped; rejection prevents the
    /// paste from landing at all.
    pub fn paste(&mut self, selection: Range<usize>, pasted: &str) -> InputOutcome {
        let trimmed = pasted.trim();
        if !self.admits(trimmed) {
            return InputOutcome::Rejected { text: pasted.to_string() };
        }
        let candidate = splice(&self.text, selection, trimmed);
        self.apply(candidate)
    }

    /// Blur/commit: always resolve to the clamped value, overwriting valid
    /// intermediate states like "-" or "3.".
    pub fn commit(&mut self) -> f64 {
        let value = self.clamp(&self.text);
        self.text = canonical(value);
        value
    }

    /// Adjust by `delta` from the current clamped value, clamping again.
    pub fn step_by(&mut self, delta: f64) -> f64 {
        let value = self.clamp_value(self.clamp(&self.text) + delta);
        self.text = canonical(value);
        value
    }

    pub fn can_increment(&self) -> bool {
        self.value() < self.max
    }

    pub fn can_decrement(&self) -> bool {
        self.value() > self.min
    }

    /// The pattern sees the text exactly as it would land in the buffer;
    /// whitespace makes it rejectable, not invisible.
    fn admits(&self, text: &str) -> bool {
        if !self.pattern.matches(text) {
            return false;
        }
        // Intermediate states ("-", ".") have no numeric value yet and pass;
        // fully parseable text must already sit inside the range.
        match numeric_value(text) {
            Some(v) => v >= self.min && v <= self.max,
            None => true,
        }
    }

    fn apply(&mut self, text: String) -> InputOutcome {
        self.text = text;
        let clamped = self.clamp(&self.text);
        let committed = (canonical(clamped) == self.text).then_some(clamped);
        InputOutcome::Accepted { committed }
    }
}

fn splice(text: &str, selection: Range<usize>, insert: &str) -> String {
    let start = selection.start.min(text.len());
    let end = selection.end.clamp(start, text.len());
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..start]);
    out.push_str(insert);
    out.push_str(&text[end..]);
    out
}

/// Empty text counts as 0; anything unparseable has no value yet.
fn numeric_value(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse().ok()
}

fn round_to(value: f64, scale: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(scale as i32);
    (value * factor).round() / factor
}

/// Digits after the decimal point in the shortest printed form. Non-finite
/// bounds contribute nothing.
fn frac_digits(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let printed = format!("{}", value);
    match printed.find('.') {
        Some(dot) => (printed.len() - dot - 1) as u32,
        None => 0,
    }
}

/// Canonical string form of a clamped value, the form change detection
/// compares the buffer against.
fn canonical(value: f64) -> String {
    format!("{}", value)
}
