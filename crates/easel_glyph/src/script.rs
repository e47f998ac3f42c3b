//! Script formatting using oxc_codegen.
//!
//! The source is parsed as a classic script (it ends up in a plain
//! `<script>` tag), re-printed by oxc_codegen and then re-indented. Codegen
//! emits one tab per nesting level; every leading tab becomes one level of
//! the configured indent. Lines inside template literal text are kept byte
//! for byte, since their whitespace is part of the string value.

use memchr::memchr;
use oxc_allocator::Allocator;
use oxc_ast::ast::TemplateElement;
use oxc_ast_visit::Visit;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::FormatError;
use crate::options::FormatOptions;

/// Format JavaScript content using oxc_codegen
pub fn format_script_content(source: &str, options: &FormatOptions) -> Result<String, FormatError> {
    if source.trim().is_empty() {
        return Ok(String::new());
    }

    let allocator = Allocator::default();
    let source_type = SourceType::default().with_script(true);
    let parsed = Parser::new(&allocator, source, source_type).parse();

    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        return Err(FormatError::ScriptParseError(messages.join("; ")));
    }
    if parsed.panicked {
        return Err(FormatError::ScriptFormatError(
            "parser aborted".to_string(),
        ));
    }

    let codegen_options = CodegenOptions {
        single_quote: options.single_quote,
        ..CodegenOptions::default()
    };
    let printed = Codegen::new()
        .with_options(codegen_options)
        .build(&parsed.program)
        .code;

    let verbatim = template_text_ranges(&printed, source_type);
    Ok(reindent(&printed, options, &verbatim))
}

#[derive(Default)]
struct TemplateText {
    ranges: Vec<(usize, usize)>,
}

impl<'a> Visit<'a> for TemplateText {
    fn visit_template_element(&mut self, it: &TemplateElement<'a>) {
        self.ranges.push((it.span.start as usize, it.span.end as usize));
    }
}

/// Byte ranges of template literal text in printed code, sorted.
fn template_text_ranges(code: &str, source_type: SourceType) -> Vec<(usize, usize)> {
    if memchr(b'`', code.as_bytes()).is_none() {
        return Vec::new();
    }
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, code, source_type).parse();
    let mut text = TemplateText::default();
    text.visit_program(&parsed.program);
    text.ranges.sort_unstable();
    text.ranges
}

fn is_verbatim(ranges: &[(usize, usize)], pos: usize) -> bool {
    let index = ranges.partition_point(|&(_, end)| end <= pos);
    ranges
        .get(index)
        .is_some_and(|&(start, _)| start <= pos)
}

/// Replace codegen's tab indentation and trim trailing whitespace per line.
/// A line starting inside a `verbatim` range keeps its indentation; a line
/// ending inside one keeps its trailing whitespace.
fn reindent(source: &str, options: &FormatOptions, verbatim: &[(usize, usize)]) -> String {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let indent = options.indent_string();
    let mut result = String::with_capacity(len + len / 2);

    let mut pos = 0;
    while pos < len {
        let line_end = memchr(b'\n', &bytes[pos..]).map_or(len, |offset| pos + offset);
        let line = &source[pos..line_end];
        let starts_in_text = pos > 0 && is_verbatim(verbatim, pos - 1);
        let ends_in_text = line_end < len && is_verbatim(verbatim, line_end);

        let (levels, content) = if starts_in_text {
            (0, line)
        } else {
            let content = line.trim_start_matches('\t');
            (line.len() - content.len(), content)
        };
        let content = if ends_in_text { content } else { content.trim_end() };

        if !content.is_empty() {
            for _ in 0..levels {
                result.push_str(&indent);
            }
            result.push_str(content);
        }
        result.push('\n');

        pos = line_end + 1;
    }

    let trimmed = result.trim_end().len();
    result.truncate(trimmed);
    result
}
