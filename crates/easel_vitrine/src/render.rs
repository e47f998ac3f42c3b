//! Document assembly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use easel_atelier::CompiledSnippet;
use easel_carton::{indent_all, normalize, strip_spaces, INDENT_WIDTH};
use easel_glyph::{format_script, FormatOptions};

use crate::options::RenderOptions;

/// End tags are case-insensitive in HTML.
static SCRIPT_END_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</(script)").unwrap());
static STYLE_END_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</(style)").unwrap());

/// File name of the stylesheet in external-file mode.
pub const APP_CSS: &str = "app.css";
/// File name of the script in external-file mode.
pub const APP_JS: &str = "app.js";

/// Sibling files referenced by an external-file mode document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalFiles {
    pub app_css: String,
    pub app_js: String,
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSnippet {
    pub html: String,
    /// Host runtime URL, surfaced so the caller can load it outside the
    /// sandboxed frame.
    pub host_runtime_reference: Option<String>,
    /// `None` in inline mode.
    pub external_files: Option<ExternalFiles>,
}

/// Assemble the HTML document for a compiled snippet.
///
/// Never fails. A script block that cannot be beautified is emitted as is.
pub fn render(snippet: &CompiledSnippet, options: &RenderOptions) -> RenderedSnippet {
    let script = strip_spaces(&beautify(script_source(snippet, options)));
    let style = normalize(&snippet.style);

    let mut html = String::with_capacity(
        snippet.template.len() + script.len() + style.len() + 512,
    );

    html.push_str("<!DOCTYPE html>\n<html>\n\n<head>\n");
    push_line(&mut html, 1, r#"<meta charset="UTF-8" />"#);
    push_line(&mut html, 1, r#"<meta http-equiv="X-UA-Compatible" content="IE=Edge" />"#);
    push_line(
        &mut html,
        1,
        &format!("<title>{}</title>", htmlize::escape_text(snippet.name.as_str())),
    );

    if let Some(host_runtime) = &snippet.host_runtime_reference {
        html.push('\n');
        push_line(&mut html, 1, &script_tag(host_runtime));
    }

    if !snippet.script_references.is_empty() || !snippet.link_references.is_empty() {
        html.push('\n');
        for url in &snippet.script_references {
            push_line(&mut html, 1, &script_tag(url));
        }
        for url in &snippet.link_references {
            push_line(&mut html, 1, &link_tag(url));
        }
    }

    html.push('\n');
    let external_files = if options.inline_js_and_css_into_iframe {
        if !style.is_empty() {
            push_line(&mut html, 1, "<style>");
            push_line(&mut html, 0, &indent_all(&guard_end_tag(&style, &STYLE_END_TAG), 2, 0));
            push_line(&mut html, 1, "</style>");
        }
        push_line(&mut html, 1, "<script>");
        push_line(&mut html, 0, &indent_all(&guard_end_tag(&script, &SCRIPT_END_TAG), 2, 0));
        push_line(&mut html, 1, "</script>");
        None
    } else {
        push_line(&mut html, 1, &link_tag(APP_CSS));
        push_line(&mut html, 1, &script_tag(APP_JS));
        Some(ExternalFiles {
            app_css: style,
            app_js: script,
        })
    };
    html.push_str("</head>\n\n<body>\n");

    if options.runner_chrome {
        push_runner_chrome(&mut html, snippet);
    }
    let template = body_template(snippet, options);
    if !template.is_empty() {
        push_line(&mut html, 0, &indent_all(&template, 1, 0));
    }

    html.push_str("</body>\n\n</html>\n");

    tracing::debug!(
        snippet = %snippet.id,
        inline = options.inline_js_and_css_into_iframe,
        bytes = html.len(),
        "rendered snippet"
    );

    RenderedSnippet {
        html: normalize(&html),
        host_runtime_reference: snippet.host_runtime_reference.clone(),
        external_files,
    }
}

fn push_line(out: &mut String, level: usize, text: &str) {
    for _ in 0..level * INDENT_WIDTH {
        out.push(' ');
    }
    out.push_str(text);
    out.push('\n');
}

fn script_tag(src: &str) -> String {
    format!(r#"<script src="{}"></script>"#, htmlize::escape_attribute(src))
}

fn link_tag(href: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{}" />"#, htmlize::escape_attribute(href))
}

/// Keep inlined content from closing its own element early.
fn guard_end_tag(content: &str, end_tag: &Regex) -> String {
    end_tag.replace_all(content, r"<\/${1}").into_owned()
}

/// The script block: user code inside a document-ready handler, inside the
/// host runtime's initialize callback when the snippet loads a host runtime.
fn script_source(snippet: &CompiledSnippet, options: &RenderOptions) -> String {
    let mut body = String::new();
    if let Some(callback) = &options.sandbox_ready_callback {
        body.push_str(&format!("window.parent.{}();\n", callback));
    }
    body.push_str(&snippet.script);
    body.push('\n');

    let mut source = format!(
        r#"(function (ready) {{
if (document.readyState !== "loading") {{
ready();
}} else {{
document.addEventListener("DOMContentLoaded", ready);
}}
}})(function () {{
{}}});
"#,
        body
    );

    if options.include_host_initialize_wrapper && snippet.host_runtime_reference.is_some() {
        source = format!(
            "{}.initialize = function (reason) {{\n{}}};\n",
            options.host_global, source
        );
    }
    source
}

fn beautify(source: String) -> String {
    match format_script(&source, &FormatOptions::default()) {
        Ok(formatted) => formatted,
        Err(error) => {
            tracing::warn!(%error, "could not format script block; emitting it unformatted");
            source
        }
    }
}

fn body_template(snippet: &CompiledSnippet, options: &RenderOptions) -> String {
    let template = normalize(&snippet.template);
    if !template.is_empty() {
        return template;
    }
    options
        .empty_template_fallback
        .as_deref()
        .map(normalize)
        .unwrap_or_default()
}

fn push_runner_chrome(out: &mut String, snippet: &CompiledSnippet) {
    push_line(out, 1, r#"<header class="runner-header">"#);
    push_line(
        out,
        2,
        &format!(
            r#"<h1 class="runner-title">{}</h1>"#,
            htmlize::escape_text(snippet.name.as_str())
        ),
    );
    if !snippet.description.trim().is_empty() {
        push_line(
            out,
            2,
            &format!(
                r#"<p class="runner-description">{}</p>"#,
                htmlize::escape_text(snippet.description.trim())
            ),
        );
    }
    push_line(out, 1, "</header>");
    out.push('\n');
}
