//! Variable substitution for segment-name patterns and overlay text.

use std::collections::HashMap;

/// Variable substitution context.
///
/// Supports variable substitution in strings using the `{varname}` syntax.
/// Segment-name patterns and overlay texts are rendered through this with
/// the rendition's technical facts as variables.
///
/// # Example
///
/// ```
/// use hlspack_media::TemplateContext;
///
/// let ctx = TemplateContext::new()
///     .with_var("resolution", 720)
///     .with_var("index", "3_%03d");
///
/// assert_eq!(ctx.substitute("{resolution}p_{index}"), "720p_3_%03d");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty template context.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    /// Add a variable, builder style.
    pub fn with_var(mut self, key: &str, value: impl ToString) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Set a variable.
    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    /// Get a variable value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// Substitute variables in a string.
    ///
    /// Variables are in the form `{varname}`; unknown variables are left
    /// untouched.
    pub fn substitute(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.vars {
            result = result.replace(&format!("{{{}}}", key), value);
        }
        result
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new()
    }
}
