//! Snippet files through the loader and the pipeline.

use easel::atelier::{CompileError, CompilerConfig};
use easel::loader::load_snippet;
use easel::pipeline::Pipeline;
use easel::vitrine::RenderOptions;

const SAMPLE_YAML: &str = r#"name: Sample
description: Logs a greeting
host: EXCEL
script:
  content: |
    const greeting: string = 'hi';
    console.log(greeting);
  language: typescript
style:
  content: "body{color:red}"
  language: css
template:
  content: |
    <div>
        <button id="run">Run</button>
    </div>
  language: html
libraries: |
  jquery
  // comment
  @types/jquery
  https://unpkg.com/office.js
"#;

#[test]
fn test_yaml_snippet_to_inline_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.yaml");
    std::fs::write(&path, SAMPLE_YAML).unwrap();

    let snippet = load_snippet(&path).unwrap();
    let pipeline = Pipeline::new(CompilerConfig::default(), 16);
    let output = pipeline
        .run(Some(&snippet), &RenderOptions::inline())
        .unwrap();
    let html = &output.rendered.html;

    assert!(html.contains(r#"<script src="//unpkg.com/jquery"></script>"#));
    assert!(!html.contains("@types"));
    assert!(html.contains("body{color:red}"));
    assert!(html.contains("<body>\n    <div>\n        <button id=\"run\">Run</button>\n    </div>\n</body>"));
    assert!(html.contains("console.log(greeting);"));
    assert!(!html.contains(": string"));
    assert_eq!(
        output.rendered.host_runtime_reference.as_deref(),
        Some("https://unpkg.com/office.js")
    );
}

#[test]
fn test_json_snippet_with_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{"name":"Broken","script":{"content":"const ok = 1;\nlet n: number = 'one';","language":"typescript"}}"#,
    )
    .unwrap();

    let snippet = load_snippet(&path).unwrap();
    let error = Pipeline::new(CompilerConfig::default(), 0)
        .run(Some(&snippet), &RenderOptions::default())
        .unwrap_err();

    let CompileError::Diagnostics(report) = error else {
        panic!("expected diagnostics");
    };
    assert_eq!(
        report.to_string(),
        "Line #2:  Type 'string' is not assignable to type 'number'.\n\nlet n: number = 'one';"
    );
}
