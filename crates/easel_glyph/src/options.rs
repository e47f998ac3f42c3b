//! Format options for easel_glyph.

use serde::{Deserialize, Serialize};

/// Formatting options for generated script blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    /// Number of spaces per indentation level (default: 4)
    #[serde(default = "default_tab_width")]
    pub tab_width: u8,

    /// Use tabs instead of spaces (default: false)
    #[serde(default)]
    pub use_tabs: bool,

    /// Use single quotes instead of double quotes (default: false)
    #[serde(default)]
    pub single_quote: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            tab_width: default_tab_width(),
            use_tabs: false,
            single_quote: false,
        }
    }
}

fn default_tab_width() -> u8 {
    4
}

impl FormatOptions {
    /// Get the indent string for one level
    #[inline]
    pub fn indent_string(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width as usize)
        }
    }

    /// Get the quote character based on options
    #[inline]
    pub fn quote_char(&self) -> char {
        if self.single_quote {
            '\''
        } else {
            '"'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FormatOptions::default();
        assert_eq!(options.indent_string(), "    ");
        assert_eq!(options.quote_char(), '"');
    }

    #[test]
    fn test_tabs() {
        let options = FormatOptions {
            use_tabs: true,
            ..Default::default()
        };
        assert_eq!(options.indent_string(), "\t");
    }

    #[test]
    fn test_deserialize_partial() {
        let options: FormatOptions = serde_json::from_str(r#"{"singleQuote":true}"#).unwrap();
        assert_eq!(options.tab_width, 4);
        assert_eq!(options.quote_char(), '\'');
    }
}
