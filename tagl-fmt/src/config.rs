//! Formatting configuration

/// Knobs for the printer. The one-line-versus-wrap decision is structural,
/// not width-based, so there is deliberately no line-length setting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormatConfig {
    /// Spaces per indentation level (ignored when `use_tabs` is set).
    pub indent_width: usize,
    pub use_tabs: bool,
    /// Normalize numeric literals: lowercase base prefixes and hex digits
    /// (`0XFF` prints as `0xff`).
    pub normalize_numbers: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self { indent_width: 4, use_tabs: false, normalize_numbers: true }
    }
}

impl FormatConfig {
    /// The string for one indentation level.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }
}
