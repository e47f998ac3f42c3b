//! Script compilation.
//!
//! TypeScript goes through the oxc pipeline:
//!
//! 1. `oxc_parser` (syntax errors)
//! 2. `oxc_semantic` with syntax checks (redeclarations and friends)
//! 3. the literal assignability check from `easel_canon`
//! 4. `oxc_transformer` lowering to the configured target
//! 5. `oxc_codegen`
//! 6. for `es5`, the [`downlevel`](crate::downlevel) pass
//!
//! Diagnostics from steps 1-4 are mapped to 1-based lines of the original
//! source. The target is only validated once the source is clean. JavaScript
//! and unknown languages pass through untouched.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use once_cell::sync::Lazy;
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use regex::Regex;

use easel_canon::{check_literal_assignability, Diagnostic, DiagnosticReport, SpanDiagnostic};

use crate::downlevel::lower_to_es5;
use crate::error::CompileError;
use crate::snippet::SnippetBlock;

/// Module interop lines that make no sense in a plain `<script>` tag.
static MODULE_INTEROP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*(?:Object\.defineProperty\(exports,\s*["']__esModule["'].*|export\s*\{\s*\}\s*;?)[ \t]*\r?\n?"#,
    )
    .unwrap()
});

/// Compilation path selected by a script's language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLanguage {
    JavaScript,
    TypeScript,
    /// Anything else; passed through unchanged.
    Other,
}

impl ScriptLanguage {
    /// Parse a language tag (case-insensitive). An empty tag is an error.
    pub fn from_tag(tag: &str) -> Result<Self, CompileError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(CompileError::MissingLanguage);
        }
        Ok(if tag.eq_ignore_ascii_case("typescript") {
            Self::TypeScript
        } else if tag.eq_ignore_ascii_case("javascript") {
            Self::JavaScript
        } else {
            Self::Other
        })
    }
}

/// Options for [`ScriptCompiler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    /// ECMAScript target. `es5` runs the transformer at `es2015` and lowers
    /// the rest; anything else goes to `TransformOptions::from_target`.
    pub target: String,
    /// Remove `__esModule` markers and empty `export {}` statements.
    pub strip_module_interop: bool,
    /// Run the literal assignability check.
    pub type_check: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            target: "es5".to_string(),
            strip_module_interop: true,
            type_check: true,
        }
    }
}

/// Outcome of compiling a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledScript {
    Ok { code: String },
    Failed { diagnostics: Vec<Diagnostic> },
}

impl CompiledScript {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// The compiled code, or the diagnostics as a [`CompileError::Diagnostics`].
    pub fn into_code(self) -> Result<String, CompileError> {
        match self {
            Self::Ok { code } => Ok(code),
            Self::Failed { diagnostics } => {
                Err(CompileError::Diagnostics(DiagnosticReport::new(diagnostics)))
            }
        }
    }
}

/// Compiles snippet scripts to plain JavaScript.
#[derive(Debug, Clone, Default)]
pub struct ScriptCompiler {
    options: ScriptOptions,
}

impl ScriptCompiler {
    pub fn new(options: ScriptOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScriptOptions {
        &self.options
    }

    /// Compile a script block according to its language.
    ///
    /// Returns `Err` only for a missing language or an internal failure;
    /// script diagnostics are reported as [`CompiledScript::Failed`].
    pub fn compile(&self, script: &SnippetBlock) -> Result<CompiledScript, CompileError> {
        match ScriptLanguage::from_tag(&script.language)? {
            ScriptLanguage::TypeScript => self.compile_typescript(&script.content),
            ScriptLanguage::JavaScript | ScriptLanguage::Other => Ok(CompiledScript::Ok {
                code: script.content.clone(),
            }),
        }
    }

    /// Transpile TypeScript source. A panic inside the oxc pipeline is
    /// reported as [`CompileError::Internal`].
    pub fn compile_typescript(&self, source: &str) -> Result<CompiledScript, CompileError> {
        catch_unwind(AssertUnwindSafe(|| self.transpile(source))).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "compiler panicked".to_string());
            Err(CompileError::Internal(message))
        })
    }

    fn transpile(&self, source: &str) -> Result<CompiledScript, CompileError> {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, SourceType::ts()).parse();

        if !parsed.errors.is_empty() {
            return Ok(failed(source, parsed.errors.iter().map(span_diagnostic).collect()));
        }
        if parsed.panicked {
            return Err(CompileError::Internal(
                "parser aborted without diagnostics".to_string(),
            ));
        }

        let mut program = parsed.program;

        let semantic_ret = SemanticBuilder::new()
            .with_check_syntax_error(true)
            .build(&program);
        let mut diagnostics: Vec<SpanDiagnostic> =
            semantic_ret.errors.iter().map(span_diagnostic).collect();
        if self.options.type_check {
            diagnostics.extend(check_literal_assignability(source, &program));
        }
        if !diagnostics.is_empty() {
            return Ok(failed(source, diagnostics));
        }

        let target = &self.options.target;
        let (oxc_target, lower) = transform_target(target);
        let transform_options = TransformOptions::from_target(oxc_target).map_err(|e| {
            CompileError::Internal(format!("invalid target `{}`: {}", target, e))
        })?;

        let scoping = semantic_ret.semantic.into_scoping();
        let transform_ret = Transformer::new(&allocator, Path::new("snippet.ts"), &transform_options)
            .build_with_scoping(scoping, &mut program);
        if !transform_ret.errors.is_empty() {
            return Ok(failed(
                source,
                transform_ret.errors.iter().map(span_diagnostic).collect(),
            ));
        }

        let mut code = Codegen::new().build(&program).code;
        if lower {
            code = lower_to_es5(&code)?;
        }
        if self.options.strip_module_interop {
            code = strip_module_interop(&code);
        }

        tracing::debug!(
            input = source.len(),
            output = code.len(),
            target = %target,
            "transpiled typescript"
        );
        Ok(CompiledScript::Ok { code })
    }
}

/// Target handed to `oxc_transformer`, and whether ES5 lowering follows.
fn transform_target(target: &str) -> (&str, bool) {
    if target.trim().eq_ignore_ascii_case("es5") {
        ("es2015", true)
    } else {
        (target, false)
    }
}

fn span_diagnostic(error: &OxcDiagnostic) -> SpanDiagnostic {
    let (start, end) = error
        .labels
        .as_ref()
        .and_then(|labels| {
            labels
                .iter()
                .find(|label| label.primary())
                .or_else(|| labels.last())
        })
        .map(|label| (label.offset(), label.offset() + label.len()))
        .unwrap_or((0, 0));
    SpanDiagnostic::new(error.message.to_string(), start as u32, end as u32)
}

fn failed(source: &str, mut diagnostics: Vec<SpanDiagnostic>) -> CompiledScript {
    diagnostics.sort_by_key(|d| (d.start, d.end));
    CompiledScript::Failed {
        diagnostics: diagnostics.iter().map(|d| d.locate(source)).collect(),
    }
}

/// Remove module interop boilerplate lines from compiled output.
pub fn strip_module_interop(code: &str) -> String {
    MODULE_INTEROP.replace_all(code, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(language: &str, content: &str) -> Result<CompiledScript, CompileError> {
        ScriptCompiler::default().compile(&SnippetBlock::new(language, content))
    }

    fn diagnostics(content: &str) -> Vec<Diagnostic> {
        match compile("typescript", content).unwrap() {
            CompiledScript::Failed { diagnostics } => diagnostics,
            CompiledScript::Ok { code } => panic!("expected diagnostics, got code:\n{}", code),
        }
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(ScriptLanguage::from_tag("TypeScript").unwrap(), ScriptLanguage::TypeScript);
        assert_eq!(ScriptLanguage::from_tag("JAVASCRIPT").unwrap(), ScriptLanguage::JavaScript);
        assert_eq!(ScriptLanguage::from_tag("coffeescript").unwrap(), ScriptLanguage::Other);
        assert!(matches!(
            ScriptLanguage::from_tag("  "),
            Err(CompileError::MissingLanguage)
        ));
    }

    #[test]
    fn test_javascript_passes_through() {
        assert_eq!(
            compile("javascript", "console.log(1);").unwrap(),
            CompiledScript::Ok {
                code: "console.log(1);".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_language_passes_through() {
        let source = "let x: number = 'not checked';";
        assert_eq!(
            compile("python", source).unwrap(),
            CompiledScript::Ok {
                code: source.to_string()
            }
        );
    }

    #[test]
    fn test_missing_language() {
        assert!(matches!(
            compile("", "console.log(1);"),
            Err(CompileError::MissingLanguage)
        ));
    }

    #[test]
    fn test_typescript_types_are_erased() {
        let code = compile(
            "typescript",
            "interface Point { x: number }\nconst p: Point = { x: 1 };\nconsole.log('hi', p.x as number);",
        )
        .unwrap()
        .into_code()
        .unwrap();

        assert!(!code.contains("interface"));
        assert!(!code.contains(": Point"));
        assert!(!code.contains(" as number"));
        assert!(code.contains("console.log(\"hi\", p.x)"));
    }

    #[test]
    fn test_type_error_line_mapping() {
        let diagnostics = diagnostics("let x: number = 'a';\nlet y = 1;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line_number, 1);
        assert!(diagnostics[0].line_text.contains("let x: number = 'a';"));
        assert_eq!(
            diagnostics[0].message,
            "Type 'string' is not assignable to type 'number'."
        );
    }

    #[test]
    fn test_syntax_error_line_mapping() {
        let diagnostics = diagnostics("const a = 1;\n\n    const b = ;\nconst c = 3;");
        assert!(!diagnostics.is_empty());
        assert_eq!(diagnostics[0].line_number, 3);
        assert_eq!(diagnostics[0].line_text, "const b = ;");
    }

    #[test]
    fn test_multiple_diagnostics_are_ordered() {
        let diagnostics = diagnostics("let a: string = 1;\nlet ok = 2;\nlet b: boolean = 'no';");
        let lines: Vec<usize> = diagnostics.iter().map(|d| d.line_number).collect();
        assert_eq!(lines, [1, 3]);
    }

    #[test]
    fn test_redeclaration_is_reported() {
        let diagnostics = diagnostics("let a = 1;\nlet a = 2;");
        assert!(diagnostics.iter().any(|d| d.line_number == 2));
    }

    #[test]
    fn test_report_formatting() {
        let error = compile("typescript", "let x: number = 'a';")
            .unwrap()
            .into_code()
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Line #1:  Type 'string' is not assignable to type 'number'.\n\nlet x: number = 'a';"
        );
    }

    #[test]
    fn test_type_check_can_be_disabled() {
        let compiler = ScriptCompiler::new(ScriptOptions {
            type_check: false,
            ..Default::default()
        });
        let result = compiler
            .compile(&SnippetBlock::new("typescript", "let x: number = 'a';"))
            .unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_target_is_internal() {
        let compiler = ScriptCompiler::new(ScriptOptions {
            target: "es1999".to_string(),
            ..Default::default()
        });
        let result = compiler.compile(&SnippetBlock::new("typescript", "let a = 1;"));
        assert!(matches!(result, Err(CompileError::Internal(_))));
    }

    #[test]
    fn test_default_target_is_es5() {
        let code = compile(
            "typescript",
            "const add = (a: number, b: number): number => a + b;\nlet label: string = `sum ${add(1, 2)}`;\nclass Counter {\n    constructor() {\n        this.count = 0;\n    }\n    increment(): number {\n        return ++this.count;\n    }\n}\nconsole.log(label, new Counter().increment());",
        )
        .unwrap()
        .into_code()
        .unwrap();

        for construct in ["const ", "let ", "=>", "class ", "`", ": number"] {
            assert!(!code.contains(construct), "found `{}` in:\n{}", construct, code);
        }
        assert!(code.contains("var add"));
        assert!(code.contains("Counter.prototype.increment = function"));
        assert!(code.contains("console.log(label"));
    }

    #[test]
    fn test_es2015_target_keeps_modern_syntax() {
        let compiler = ScriptCompiler::new(ScriptOptions {
            target: "es2015".to_string(),
            ..Default::default()
        });
        let code = compiler
            .compile(&SnippetBlock::new("typescript", "const f = (x: number) => x;"))
            .unwrap()
            .into_code()
            .unwrap();
        assert!(code.contains("const f"));
        assert!(code.contains("=>"));
    }

    #[test]
    fn test_diagnostics_precede_target_validation() {
        let compiler = ScriptCompiler::new(ScriptOptions {
            target: "es1999".to_string(),
            ..Default::default()
        });
        let result = compiler
            .compile(&SnippetBlock::new("typescript", "let x: number = 'a';"))
            .unwrap();
        assert!(matches!(result, CompiledScript::Failed { .. }));
    }

    #[test]
    fn test_strip_module_interop() {
        let code = "\"use strict\";\nObject.defineProperty(exports, \"__esModule\", { value: true });\nconsole.log(1);\nexport {};\n";
        assert_eq!(strip_module_interop(code), "\"use strict\";\nconsole.log(1);\n");
    }

    #[test]
    fn test_strip_module_interop_leaves_other_code() {
        let code = "var exports = {};\nexport { a };\n";
        assert_eq!(strip_module_interop(code), code);
    }
}
