use std::collections::HashSet;

use crate::types::ParserConfig;
use crate::ConfigError;

impl ParserConfig {
    /// Validate the configuration and return a list of errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let delimited = &self.delimited;
        for (name, value) in [("delimiter", delimited.delimiter), ("quote", delimited.quote)] {
            if !value.is_ascii() {
                errors.push(ConfigError::InvalidDialect(format!(
                    "{} '{}' must be a single ASCII character",
                    name, value
                )));
            } else if value == '\n' || value == '\r' {
                errors.push(ConfigError::InvalidDialect(format!(
                    "{} must not be a line break",
                    name
                )));
            }
        }

        if delimited.delimiter == delimited.quote {
            errors.push(ConfigError::InvalidDialect(format!(
                "delimiter and quote are both '{}'",
                delimited.delimiter
            )));
        }

        if self.spreadsheet.max_cells == 0 {
            errors.push(ConfigError::InvalidConfig(
                "spreadsheet.max_cells must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for backend in &self.backends.disabled {
            if !seen.insert(backend) {
                errors.push(ConfigError::DuplicateBackend(backend.to_string()));
            }
        }

        errors
    }

    /// Validate and return Ok(()) if valid, or Err with the first error.
    pub fn validate_or_err(&self) -> Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}
