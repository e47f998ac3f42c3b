//! Literal assignability check.
//!
//! Transpilation alone only reports syntax errors. This pass catches the most
//! common type mistake in snippets: a primitive type annotation initialized
//! with a literal of a different primitive type.
//!
//! ```text
//! let x: number = 'a';        // Type 'string' is not assignable to type 'number'.
//! const flag: string = true;  // Type 'true' is not assignable to type 'string'.
//! ```
//!
//! Only simple identifiers annotated with `number`, `string`, `boolean` or
//! `bigint` are checked; anything else is left to the author.

use oxc_ast::ast::{
    Expression, Program, PropertyDefinition, VariableDeclarationKind, VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;

use crate::diagnostic::{SpanDiagnostic, TypeErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primitive {
    Number,
    String,
    Boolean,
    BigInt,
}

impl Primitive {
    fn from_annotation(annotation: &str) -> Option<Self> {
        match annotation {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "bigint" => Some(Self::BigInt),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::BigInt => "bigint",
        }
    }
}

/// Primitive type of a literal initializer, with its literal type display.
struct LiteralType {
    primitive: Primitive,
    literal: String,
}

fn literal_type(source: &str, expr: &Expression<'_>) -> Option<LiteralType> {
    let text = || {
        let span = expr.span();
        source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
            .to_string()
    };

    let (primitive, literal) = match expr {
        Expression::StringLiteral(lit) => (Primitive::String, format!("\"{}\"", lit.value)),
        Expression::TemplateLiteral(_) => (Primitive::String, "string".to_string()),
        Expression::NumericLiteral(_) => (Primitive::Number, text()),
        Expression::BooleanLiteral(lit) => (Primitive::Boolean, lit.value.to_string()),
        Expression::BigIntLiteral(_) => (Primitive::BigInt, text()),
        Expression::UnaryExpression(unary)
            if text().starts_with('-')
                && matches!(
                    unary.argument,
                    Expression::NumericLiteral(_) | Expression::BigIntLiteral(_)
                ) =>
        {
            let inner = literal_type(source, &unary.argument)?;
            (inner.primitive, text())
        }
        Expression::ParenthesizedExpression(paren) => return literal_type(source, &paren.expression),
        _ => return None,
    };

    Some(LiteralType { primitive, literal })
}

/// Annotation of `name: type = ` given the text between the binding start and
/// the initializer start. Returns `None` unless the binding is a plain
/// identifier.
fn simple_annotation(head: &str) -> Option<&str> {
    let head = head.trim_end().strip_suffix('=')?;
    let (name, annotation) = head.split_once(':')?;
    let name = name.trim().trim_end_matches(['?', '!']);

    let is_identifier = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$');

    is_identifier.then(|| annotation.trim())
}

/// Visitor collecting literal assignability errors.
pub struct LiteralTypeChecker<'s> {
    source: &'s str,
    diagnostics: Vec<SpanDiagnostic>,
}

impl<'s> LiteralTypeChecker<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<SpanDiagnostic> {
        self.diagnostics
    }

    fn check(
        &mut self,
        binding_start: u32,
        init: &Expression<'_>,
        widen: bool,
        report_start: u32,
        report_end: u32,
    ) {
        let init_start = init.span().start;
        let Some(head) = self.source.get(binding_start as usize..init_start as usize) else {
            return;
        };
        let Some(target) = simple_annotation(head).and_then(Primitive::from_annotation) else {
            return;
        };
        let Some(actual) = literal_type(self.source, init) else {
            return;
        };
        if actual.primitive == target {
            return;
        }

        let shown = if widen {
            actual.primitive.name().to_string()
        } else {
            actual.literal
        };
        self.diagnostics.push(SpanDiagnostic::type_error(
            TypeErrorCode::TypeNotAssignable,
            format!(
                "Type '{}' is not assignable to type '{}'.",
                shown,
                target.name()
            ),
            report_start,
            report_end,
        ));
    }
}

impl<'a> Visit<'a> for LiteralTypeChecker<'_> {
    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        if let Some(init) = &it.init {
            let widen = it.kind != VariableDeclarationKind::Const;
            self.check(it.span.start, init, widen, it.span.start, it.span.end);
        }
        walk::walk_variable_declarator(self, it);
    }

    fn visit_property_definition(&mut self, it: &PropertyDefinition<'a>) {
        if let Some(value) = &it.value {
            let key_start = it.key.span().start;
            self.check(key_start, value, true, key_start, it.span.end);
        }
        walk::walk_property_definition(self, it);
    }
}

/// Run the literal assignability check over a parsed program.
pub fn check_literal_assignability(source: &str, program: &Program<'_>) -> Vec<SpanDiagnostic> {
    let mut checker = LiteralTypeChecker::new(source);
    checker.visit_program(program);
    checker.into_diagnostics()
}
