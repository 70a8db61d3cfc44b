//! Identifier sequence for generated tags.

use crate::options::TaggerOptions;

/// Monotonic identifier source owned by a single annotation run. The counter
/// is wider than the configured start value so it cannot wrap.
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: String,
    width: usize,
    next: u64,
}

impl IdSequence {
    pub fn new(prefix: impl Into<String>, width: usize, first: u32) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            next: u64::from(first),
        }
    }

    pub fn from_options(options: &TaggerOptions) -> Self {
        Self::new(options.id_prefix.clone(), options.id_width, options.first_id)
    }

    /// Format the current value and advance by one.
    pub fn next_id(&mut self) -> String {
        let id = format_id(&self.prefix, self.width, self.next);
        self.next += 1;
        id
    }

    /// Value the next call to [`IdSequence::next_id`] will use.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// `prefix` followed by `value` zero-padded to at least `width` digits.
pub fn format_id(prefix: &str, width: usize, value: u64) -> String {
    format!("{prefix}{value:0width$}")
}
