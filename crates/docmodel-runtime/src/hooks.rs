//! Named hook registry.
//!
//! Description files refer to validators, formatters and calculators by
//! name. A [`Hooks`] registry maps those names to functions when runtime
//! schemas are built.

use std::collections::HashMap;
use std::sync::Arc;

use crate::field::{CalculateFn, FormatFn, Hook, ValidateFn};
use crate::value::{Fields, Value};

/// Validators, formatters and calculators by name.
#[derive(Debug, Default, Clone)]
pub struct Hooks {
    validators: HashMap<String, Hook<ValidateFn>>,
    formatters: HashMap<String, Hook<FormatFn>>,
    calculators: HashMap<String, Hook<CalculateFn>>,
}

impl Hooks {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator. Replaces any validator of the same name.
    pub fn validator<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.validators
            .insert(name.to_string(), Hook::new(name, Arc::new(func) as Arc<ValidateFn>));
        self
    }

    /// Register a formatter.
    pub fn formatter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.formatters
            .insert(name.to_string(), Hook::new(name, Arc::new(func) as Arc<FormatFn>));
        self
    }

    /// Register a calculator.
    pub fn calculator<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&Fields) -> Value + Send + Sync + 'static,
    {
        self.calculators
            .insert(name.to_string(), Hook::new(name, Arc::new(func) as Arc<CalculateFn>));
        self
    }

    /// Look up a validator.
    pub fn get_validator(&self, name: &str) -> Option<Hook<ValidateFn>> {
        self.validators.get(name).cloned()
    }

    /// Look up a formatter.
    pub fn get_formatter(&self, name: &str) -> Option<Hook<FormatFn>> {
        self.formatters.get(name).cloned()
    }

    /// Look up a calculator.
    pub fn get_calculator(&self, name: &str) -> Option<Hook<CalculateFn>> {
        self.calculators.get(name).cloned()
    }
}
