//! Render options.

use serde::{Deserialize, Serialize};

/// Options controlling how a compiled snippet becomes a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Embed CSS and JS in the document instead of referencing `app.css` and
    /// `app.js` siblings.
    #[serde(default)]
    pub inline_js_and_css_into_iframe: bool,

    /// Wrap inlined code in `<host_global>.initialize = function (reason) {}`.
    #[serde(default = "default_true")]
    pub include_host_initialize_wrapper: bool,

    /// Function on the parent frame called before user code runs.
    #[serde(default)]
    pub sandbox_ready_callback: Option<String>,

    /// Body used when the template is blank.
    #[serde(default)]
    pub empty_template_fallback: Option<String>,

    /// Show a header with the snippet name and description above the body.
    #[serde(default)]
    pub runner_chrome: bool,

    /// JavaScript global exposed by the host runtime script.
    #[serde(default = "default_host_global")]
    pub host_global: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            inline_js_and_css_into_iframe: false,
            include_host_initialize_wrapper: true,
            sandbox_ready_callback: None,
            empty_template_fallback: None,
            runner_chrome: false,
            host_global: default_host_global(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_host_global() -> String {
    "Office".to_string()
}

impl RenderOptions {
    /// Inline mode with the default host wrapper.
    pub fn inline() -> Self {
        Self {
            inline_js_and_css_into_iframe: true,
            ..Default::default()
        }
    }
}
