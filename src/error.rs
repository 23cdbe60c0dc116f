use thiserror::Error;

/// Text that neither the ISO-8601 nor the `toString` date grammar accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised date: {input:?}")]
pub struct DateParseError {
    input: String,
}

impl DateParseError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}
