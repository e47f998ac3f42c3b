//! Snippet input model.

use serde::{Deserialize, Serialize};

use easel_carton::Fingerprint;

/// A content block of a snippet: source text plus its language tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetBlock {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub language: String,
}

impl SnippetBlock {
    pub fn new(language: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            language: language.into(),
        }
    }
}

/// A user-authored snippet.
///
/// All metadata is optional on the wire. A missing `script.language` is
/// rejected at compile time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    /// Execution context tag, e.g. `EXCEL`, `WORD` or `WEB`.
    #[serde(default)]
    pub host: String,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Last modification time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
    #[serde(default)]
    pub script: SnippetBlock,
    #[serde(default)]
    pub style: SnippetBlock,
    #[serde(default)]
    pub template: SnippetBlock,
    /// Newline-delimited library references.
    #[serde(default)]
    pub libraries: String,
}

impl Snippet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: SnippetBlock::new("css", ""),
            template: SnippetBlock::new("html", ""),
            ..Default::default()
        }
    }

    pub fn with_script(mut self, language: impl Into<String>, content: impl Into<String>) -> Self {
        self.script = SnippetBlock::new(language, content);
        self
    }

    pub fn with_style(mut self, content: impl Into<String>) -> Self {
        self.style = SnippetBlock::new("css", content);
        self
    }

    pub fn with_template(mut self, content: impl Into<String>) -> Self {
        self.template = SnippetBlock::new("html", content);
        self
    }

    pub fn with_libraries(mut self, libraries: impl Into<String>) -> Self {
        self.libraries = libraries.into();
        self
    }

    /// Fingerprint of the snippet as authored, before any compilation.
    pub fn fingerprint(&self) -> String {
        let timestamp = |t: Option<i64>| t.map(|t| t.to_string());
        let block = |fingerprint: Fingerprint, block: &SnippetBlock| {
            fingerprint.field(&block.language).field(&block.content)
        };

        let fingerprint = Fingerprint::new()
            .field(&self.id)
            .field(&self.name)
            .field(&self.description)
            .field(&self.author)
            .field(&self.host)
            .optional(timestamp(self.created_at).as_deref())
            .optional(timestamp(self.modified_at).as_deref());
        let fingerprint = block(fingerprint, &self.script);
        let fingerprint = block(fingerprint, &self.style);
        block(fingerprint, &self.template)
            .field(&self.libraries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let snippet: Snippet =
            serde_json::from_str(r#"{"script":{"content":"x()","language":"javascript"}}"#)
                .unwrap();
        assert_eq!(snippet.script.language, "javascript");
        assert_eq!(snippet.template.content, "");
        assert_eq!(snippet.libraries, "");
        assert_eq!(snippet.created_at, None);
    }

    #[test]
    fn test_deserialize_full() {
        let json = r#"{
            "id": "abc",
            "name": "Blank snippet",
            "description": "Create a new snippet from a blank template.",
            "author": "someone",
            "host": "EXCEL",
            "createdAt": 1490303034000,
            "modifiedAt": 1490303034001,
            "script": { "content": "$('#run').click(run);", "language": "typescript" },
            "style": { "content": "body { margin: 0; }", "language": "css" },
            "template": { "content": "<button id=\"run\">Run</button>", "language": "html" },
            "libraries": "jquery\n@types/jquery"
        }"#;

        let snippet: Snippet = serde_json::from_str(json).unwrap();
        assert_eq!(snippet.host, "EXCEL");
        assert_eq!(snippet.created_at, Some(1490303034000));
        assert_eq!(snippet.modified_at, Some(1490303034001));
        assert_eq!(snippet.style.language, "css");
        assert_eq!(snippet.libraries.lines().count(), 2);
    }

    #[test]
    fn test_builder() {
        let snippet = Snippet::new("demo")
            .with_script("javascript", "run()")
            .with_style("p {}")
            .with_template("<p></p>")
            .with_libraries("jquery");
        assert_eq!(snippet.name, "demo");
        assert_eq!(snippet.script, SnippetBlock::new("javascript", "run()"));
        assert_eq!(snippet.template.language, "html");
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let snippet = Snippet::new("demo").with_script("javascript", "run()");
        assert_eq!(snippet.fingerprint(), snippet.clone().fingerprint());

        let edited = snippet.clone().with_script("javascript", "run();");
        assert_ne!(snippet.fingerprint(), edited.fingerprint());

        let relabeled = snippet.clone().with_script("typescript", "run()");
        assert_ne!(snippet.fingerprint(), relabeled.fingerprint());
    }
}
