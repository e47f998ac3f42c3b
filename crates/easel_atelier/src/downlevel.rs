//! ES5 lowering of transpiled output.
//!
//! `oxc_transformer` lowers down to ES2015. This pass takes its output the
//! rest of the way: the code is parsed again, rewrites are collected as text
//! edits against it, applied, and the result is re-parsed and re-printed.
//!
//! Lowered:
//!
//! - `let` and `const` declarations become `var`
//! - arrow functions become function expressions, bound to `this` when
//!   their body uses it
//! - template literals become string concatenation
//! - classes made of methods and accessors become constructor functions
//!   with prototype assignments
//! - shorthand properties and methods in object literals
//!
//! Destructuring, default and rest parameters, spread, `for...of`,
//! generators and tagged templates are left as they are. `let` bindings in
//! loops take function scope once lowered.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, CallExpression, Class, ClassElement, ClassType, Expression, Function,
    MethodDefinition, MethodDefinitionKind, ObjectProperty, PropertyKey, Statement,
    StaticMemberExpression, Super, TaggedTemplateExpression, TemplateLiteral, ThisExpression,
    VariableDeclaration, VariableDeclarationKind,
};
use oxc_ast_visit::{walk, Visit};
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::scope::ScopeFlags;

use crate::error::CompileError;

/// Lower ES2015 JavaScript to ES5.
///
/// Returns [`CompileError::Internal`] when the input or the lowered code
/// does not parse; both are compiler output, never user input.
pub fn lower_to_es5(code: &str) -> Result<String, CompileError> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if let Some(error) = parsed.errors.first() {
        return Err(CompileError::Internal(format!(
            "transpiled output does not parse: {}",
            error.message
        )));
    }

    let mut lowering = Lowering::new(code);
    lowering.visit_program(&parsed.program);
    if lowering.edits.is_empty() {
        return Ok(code.to_string());
    }
    let lowered = apply_edits(code, lowering.edits);

    let allocator = Allocator::default();
    let reparsed = Parser::new(&allocator, &lowered, SourceType::mjs()).parse();
    if let Some(error) = reparsed.errors.first() {
        return Err(CompileError::Internal(format!(
            "es5 lowering produced invalid code: {}",
            error.message
        )));
    }
    Ok(Codegen::new().build(&reparsed.program).code)
}

#[derive(Debug)]
enum EditKind {
    /// Text inserted before everything else at its offset.
    Open,
    /// Text inserted after the node ending at its offset.
    Close,
    Replace { end: usize },
}

#[derive(Debug)]
struct Edit {
    start: usize,
    kind: EditKind,
    /// Nesting of the node that made the edit. Opens at one offset apply
    /// outermost first, closes innermost first.
    depth: u32,
    text: String,
}

impl Edit {
    fn insert_order(&self) -> (usize, u8, u32) {
        match self.kind {
            EditKind::Close => (self.start, 0, u32::MAX - self.depth),
            _ => (self.start, 1, self.depth),
        }
    }
}

/// Apply edits to `source`. Edits inside a replaced range are dropped.
fn apply_edits(source: &str, edits: Vec<Edit>) -> String {
    let mut inserts = Vec::new();
    let mut replacements = Vec::new();
    for edit in edits {
        match edit.kind {
            EditKind::Replace { end } => replacements.push((edit.start, end, edit.text)),
            EditKind::Open | EditKind::Close => inserts.push(edit),
        }
    }
    inserts.sort_by_key(Edit::insert_order);
    replacements.sort_by_key(|(start, end, _)| (*start, *end));

    let mut out = String::with_capacity(source.len() + source.len() / 4);
    let mut cursor = 0;
    let mut pending = inserts.into_iter().peekable();

    let boundaries = replacements
        .into_iter()
        .map(|(start, end, text)| (start, end, Some(text)))
        .chain(std::iter::once((source.len(), source.len(), None)));

    for (start, end, text) in boundaries {
        if start < cursor {
            continue;
        }
        while let Some(insert) = pending.next_if(|insert| insert.start <= start) {
            if insert.start < cursor {
                continue;
            }
            out.push_str(&source[cursor..insert.start]);
            cursor = insert.start;
            out.push_str(&insert.text);
        }
        out.push_str(&source[cursor..start]);
        if let Some(text) = text {
            out.push_str(&text);
        }
        cursor = end;
    }
    out
}

/// Quote `value` as an ES5 string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

fn function_keyword(function: &Function<'_>) -> &'static str {
    match (function.r#async, function.generator) {
        (false, false) => "function",
        (false, true) => "function*",
        (true, false) => "async function",
        (true, true) => "async function*",
    }
}

enum Scope {
    Arrow { uses_this: bool, uses_super: bool },
    Function,
}

#[derive(Debug, Clone, Copy)]
struct MethodContext {
    /// The enclosing class is being lowered, so `super` is rewritten.
    lowered: bool,
    is_static: bool,
}

impl MethodContext {
    fn super_base(self) -> &'static str {
        if self.is_static {
            "_super"
        } else {
            "_super.prototype"
        }
    }
}

struct Lowering<'s> {
    source: &'s str,
    edits: Vec<Edit>,
    depth: u32,
    scopes: Vec<Scope>,
    classes: Vec<bool>,
    methods: Vec<MethodContext>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            edits: Vec::new(),
            depth: 0,
            scopes: Vec::new(),
            classes: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn open(&mut self, at: u32, depth: u32, text: impl Into<String>) {
        self.edits.push(Edit {
            start: at as usize,
            kind: EditKind::Open,
            depth,
            text: text.into(),
        });
    }

    fn close(&mut self, at: u32, depth: u32, text: impl Into<String>) {
        self.edits.push(Edit {
            start: at as usize,
            kind: EditKind::Close,
            depth,
            text: text.into(),
        });
    }

    fn replace(&mut self, start: u32, end: u32, text: impl Into<String>) {
        self.edits.push(Edit {
            start: start as usize,
            kind: EditKind::Replace { end: end as usize },
            depth: self.depth,
            text: text.into(),
        });
    }

    fn slice(&self, span: Span) -> &'s str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    fn find_from(&self, from: u32, needle: &str) -> Option<u32> {
        let from = from as usize;
        self.source
            .get(from..)?
            .find(needle)
            .map(|index| (from + index) as u32)
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 2;
        f(self);
        self.depth -= 2;
    }

    /// Flag every arrow function between here and the nearest function.
    fn mark_arrows(&mut self, this: bool, sup: bool) {
        for scope in self.scopes.iter_mut().rev() {
            match scope {
                Scope::Arrow {
                    uses_this,
                    uses_super,
                } => {
                    *uses_this |= this;
                    *uses_super |= sup;
                }
                Scope::Function => break,
            }
        }
    }

    fn super_context(&self) -> Option<MethodContext> {
        self.methods.last().copied().filter(|context| context.lowered)
    }

    /// Rewrite `class` syntax into a constructor function inside an IIFE.
    /// Returns `false`, with no edits made, for classes it cannot lower.
    fn lower_class(&mut self, class: &Class<'_>) -> bool {
        if !class.decorators.is_empty() {
            return false;
        }

        let mut methods: Vec<(&MethodDefinition<'_>, u32)> = Vec::new();
        for element in &class.body.body {
            let ClassElement::MethodDefinition(method) = element else {
                return false;
            };
            if matches!(method.key, PropertyKey::PrivateIdentifier(_)) {
                return false;
            }
            let Some(paren) = self.find_from(method.key.span().end, "(") else {
                return false;
            };
            methods.push((method, paren));
        }
        let Some(body_open) = self.find_from(class.body.span.start, "{") else {
            return false;
        };

        let name = class
            .id
            .as_ref()
            .map_or_else(|| "_class".to_string(), |id| id.name.to_string());
        let is_declaration = matches!(class.r#type, ClassType::ClassDeclaration);
        let super_class = class
            .super_class
            .as_ref()
            .map(|expr| self.slice(expr.span()).to_string());

        let mut head = String::new();
        if is_declaration {
            head.push_str(&format!("var {} = ", name));
        }
        head.push_str(if super_class.is_some() {
            "(function (_super) {\n"
        } else {
            "(function () {\n"
        });
        let has_constructor = methods
            .iter()
            .any(|(method, _)| matches!(method.kind, MethodDefinitionKind::Constructor));
        if !has_constructor {
            if super_class.is_some() {
                head.push_str(&format!(
                    "function {}() {{\n_super.apply(this, arguments);\n}}\n",
                    name
                ));
            } else {
                head.push_str(&format!("function {}() {{}}\n", name));
            }
        }
        if super_class.is_some() {
            head.push_str(&format!(
                "{0}.prototype = Object.create(_super.prototype, {{ constructor: {{ value: {0}, writable: true, configurable: true }} }});\n",
                name
            ));
        }
        self.replace(class.span.start, body_open + 1, head);

        let method_depth = self.depth + 1;
        for (method, paren) in methods {
            let target = if method.r#static {
                name.clone()
            } else {
                format!("{}.prototype", name)
            };
            let key_text = self.slice(method.key.span());
            let keyword = function_keyword(&method.value);

            let (head, tail) = match method.kind {
                MethodDefinitionKind::Constructor => (format!("function {}", name), "\n".to_string()),
                MethodDefinitionKind::Method => {
                    let member = match &method.key {
                        PropertyKey::StaticIdentifier(id) if !method.computed => {
                            format!("{}.{}", target, id.name)
                        }
                        _ => format!("{}[{}]", target, key_text),
                    };
                    (format!("{} = {} ", member, keyword), ";\n".to_string())
                }
                MethodDefinitionKind::Get | MethodDefinitionKind::Set => {
                    let property = match &method.key {
                        PropertyKey::StaticIdentifier(id) if !method.computed => {
                            js_string(id.name.as_str())
                        }
                        _ => key_text.to_string(),
                    };
                    let accessor = if matches!(method.kind, MethodDefinitionKind::Get) {
                        "get"
                    } else {
                        "set"
                    };
                    (
                        format!(
                            "Object.defineProperty({}, {}, {{ configurable: true, {}: {} ",
                            target, property, accessor, keyword
                        ),
                        " });\n".to_string(),
                    )
                }
            };
            self.replace(method.span.start, paren, head);
            self.close(method.span.end, method_depth, tail);
        }

        let body_end = class.body.span.end;
        self.replace(
            body_end - 1,
            body_end,
            format!(
                "return {};\n}})({}){}",
                name,
                super_class.unwrap_or_default(),
                if is_declaration { ";" } else { "" }
            ),
        );
        true
    }
}

impl<'a> Visit<'a> for Lowering<'_> {
    fn visit_variable_declaration(&mut self, it: &VariableDeclaration<'a>) {
        let keyword = match it.kind {
            VariableDeclarationKind::Let => Some("let"),
            VariableDeclarationKind::Const => Some("const"),
            _ => None,
        };
        if let Some(keyword) = keyword {
            if self.slice(it.span).starts_with(keyword) {
                self.replace(it.span.start, it.span.start + keyword.len() as u32, "var");
            }
        }
        walk::walk_variable_declaration(self, it);
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        self.scopes.push(Scope::Function);
        walk::walk_function(self, it, flags);
        self.scopes.pop();
    }

    fn visit_this_expression(&mut self, _it: &ThisExpression) {
        self.mark_arrows(true, false);
    }

    fn visit_super(&mut self, _it: &Super) {
        self.mark_arrows(true, true);
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        self.scopes.push(Scope::Arrow {
            uses_this: false,
            uses_super: false,
        });
        self.nested(|v| walk::walk_arrow_function_expression(v, it));
        let Some(Scope::Arrow {
            uses_this,
            uses_super,
        }) = self.scopes.pop()
        else {
            return;
        };

        // A function expression cannot reach `super` of a class left as is.
        if it.r#async || uses_super {
            return;
        }
        let Some(arrow) = self.find_from(it.params.span.end, "=>") else {
            return;
        };

        let depth = self.depth;
        let params = it.params.span;
        self.open(it.span.start, depth, "(function ");
        if !self.slice(it.span).starts_with('(') {
            self.open(params.start, depth + 1, "(");
            self.close(params.end, depth + 1, ")");
        }
        self.replace(arrow, arrow + 2, "");
        if it.expression {
            if let Some(Statement::ExpressionStatement(statement)) = it.body.statements.first() {
                let body = statement.expression.span();
                self.open(body.start, depth + 1, "{ return ");
                self.close(body.end, depth + 1, "; }");
            }
        }
        self.close(
            it.span.end,
            depth,
            if uses_this { ").bind(this)" } else { ")" },
        );
    }

    fn visit_template_literal(&mut self, it: &TemplateLiteral<'a>) {
        self.nested(|v| walk::walk_template_literal(v, it));

        let pieces: Vec<String> = it
            .quasis
            .iter()
            .map(|quasi| {
                let value = quasi
                    .value
                    .cooked
                    .as_ref()
                    .map_or(quasi.value.raw.as_str(), |cooked| cooked.as_str());
                js_string(value)
            })
            .collect();
        let piece = |index: usize| {
            pieces
                .get(index)
                .cloned()
                .unwrap_or_else(|| "\"\"".to_string())
        };

        if it.expressions.is_empty() {
            self.replace(it.span.start, it.span.end, piece(0));
            return;
        }

        let mut from = it.span.start;
        for (index, expression) in it.expressions.iter().enumerate() {
            let span = expression.span();
            let text = if index == 0 {
                format!("({} + (", piece(0))
            } else {
                format!(") + {} + (", piece(index))
            };
            self.replace(from, span.start, text);
            from = span.end;
        }
        self.replace(
            from,
            it.span.end,
            format!(") + {})", piece(it.expressions.len())),
        );
    }

    fn visit_tagged_template_expression(&mut self, it: &TaggedTemplateExpression<'a>) {
        self.visit_expression(&it.tag);
        for expression in &it.quasi.expressions {
            self.visit_expression(expression);
        }
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        let lowered = self.lower_class(it);
        self.classes.push(lowered);
        self.nested(|v| walk::walk_class(v, it));
        self.classes.pop();
    }

    fn visit_method_definition(&mut self, it: &MethodDefinition<'a>) {
        self.methods.push(MethodContext {
            lowered: self.classes.last().copied().unwrap_or(false),
            is_static: it.r#static,
        });
        walk::walk_method_definition(self, it);
        self.methods.pop();
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        let callee = match (self.super_context(), &it.callee) {
            (Some(_), Expression::Super(_)) => "_super.call".to_string(),
            (Some(context), Expression::StaticMemberExpression(member))
                if matches!(member.object, Expression::Super(_)) =>
            {
                format!("{}.{}.call", context.super_base(), member.property.name)
            }
            _ => {
                walk::walk_call_expression(self, it);
                return;
            }
        };

        self.mark_arrows(true, false);
        let span = it.callee.span();
        self.replace(span.start, span.end, callee);
        match it.arguments.first() {
            Some(first) => {
                let depth = self.depth + 1;
                self.open(first.span().start, depth, "this, ");
            }
            None => self.replace(span.end, it.span.end, "(this)"),
        }
        self.nested(|v| {
            for argument in &it.arguments {
                v.visit_argument(argument);
            }
        });
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        if let (Expression::Super(sup), Some(context)) = (&it.object, self.super_context()) {
            self.replace(sup.span.start, sup.span.end, context.super_base());
            return;
        }
        walk::walk_static_member_expression(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if !it.computed {
            let key = it.key.span();
            if it.shorthand {
                if let PropertyKey::StaticIdentifier(id) = &it.key {
                    let depth = self.depth + 1;
                    self.close(key.end, depth, format!(": {}", id.name));
                }
            } else if it.method {
                if let Expression::FunctionExpression(function) = &it.value {
                    if let Some(paren) = self.find_from(key.end, "(") {
                        if it.span.start < key.start {
                            self.replace(it.span.start, key.start, "");
                        }
                        self.replace(key.end, paren, format!(": {} ", function_keyword(function)));
                    }
                }
            }
        }
        self.nested(|v| walk::walk_object_property(v, it));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(code: &str) -> String {
        lower_to_es5(code).unwrap()
    }

    fn assert_es5(code: &str) {
        for construct in ["const ", "let ", "=>", "class ", "`"] {
            assert!(!code.contains(construct), "found `{}` in:\n{}", construct, code);
        }
    }

    #[test]
    fn test_block_scoped_declarations() {
        let code = lower("const a = 1;\nlet b = 2;\nfor (let i = 0; i < a; i++) {}");
        assert_es5(&code);
        assert!(code.contains("var a = 1;"));
        assert!(code.contains("var b = 2;"));
        assert!(code.contains("for (var i = 0;"));
    }

    #[test]
    fn test_arrow_functions() {
        let code = lower("var add = (a, b) => a + b;\nvar id = x => x;\nvar run = () => { go(); };");
        assert_es5(&code);
        assert!(code.contains("return a + b;"));
        assert!(code.contains("return x;"));
        assert!(code.contains("go();"));
        assert!(!code.contains("bind"));
    }

    #[test]
    fn test_arrow_keeps_this() {
        let code = lower("function Timer() { setTimeout(() => this.tick(), 10); }");
        assert_es5(&code);
        assert!(code.contains(".bind(this)"));
    }

    #[test]
    fn test_nested_arrows() {
        let code = lower("var curry = a => b => a + b;");
        assert_es5(&code);
        assert_eq!(code.matches("function").count(), 2);
    }

    #[test]
    fn test_arrow_returning_object() {
        let code = lower("var make = () => ({ a: 1 });");
        assert_es5(&code);
        assert!(code.contains("return"));
        assert!(code.contains("a: 1"));
    }

    #[test]
    fn test_template_literals() {
        let code = lower("var name = 'x';\nvar greeting = `Hello, ${name}! ${1 + 1}`;\nvar plain = `line \"quoted\"`;");
        assert_es5(&code);
        assert!(code.contains("\"Hello, \""));
        assert!(code.contains("\"! \""));
        assert!(code.contains("quoted"));
    }

    #[test]
    fn test_template_with_arrow_inside() {
        let code = lower("var s = `${[1, 2].map(n => n * 2)}`;");
        assert_es5(&code);
        assert!(code.contains("return n * 2;"));
    }

    #[test]
    fn test_class_lowering() {
        let code = lower(
            "class Animal {\n\tconstructor(name) {\n\t\tthis.name = name;\n\t}\n\tspeak() {\n\t\treturn this.name;\n\t}\n\tstatic create(name) {\n\t\treturn new Animal(name);\n\t}\n\tget label() {\n\t\treturn `animal ${this.name}`;\n\t}\n}\nvar a = Animal.create('cat');",
        );
        assert_es5(&code);
        assert!(code.contains("var Animal ="));
        assert!(code.contains("function Animal(name)"));
        assert!(code.contains("Animal.prototype.speak = function"));
        assert!(code.contains("Animal.create = function"));
        assert!(code.contains("Object.defineProperty(Animal.prototype, \"label\""));
        assert!(code.contains("return Animal;"));
    }

    #[test]
    fn test_subclass_lowering() {
        let code = lower(
            "class Dog extends Animal {\n\tconstructor(name) {\n\t\tsuper(name);\n\t}\n\tspeak() {\n\t\treturn super.speak() + '!';\n\t}\n}\nclass Puppy extends Dog {}",
        );
        assert_es5(&code);
        assert!(code.contains("_super.call(this, name)"));
        assert!(code.contains("_super.prototype.speak.call(this)"));
        assert!(code.contains("Object.create(_super.prototype"));
        assert!(code.contains("_super.apply(this, arguments)"));
        assert!(code.contains("(Animal)"));
        assert!(code.contains("(Dog)"));
        assert!(!code.contains("super("));
    }

    #[test]
    fn test_class_expression() {
        let code = lower("var Point = class {\n\tnorm() {\n\t\treturn 1;\n\t}\n};");
        assert_es5(&code);
        assert!(code.contains("_class.prototype.norm = function"));
    }

    #[test]
    fn test_object_shorthand() {
        let code = lower("var a = 1;\nvar o = { a, b() { return a; } };");
        assert_es5(&code);
        assert!(code.contains("a: a"));
        assert!(code.contains("b: function"));
    }

    #[test]
    fn test_es5_input_is_untouched() {
        let code = "var a = function(x) {\n\treturn x;\n};\n";
        assert_eq!(lower(code), code);
    }

    #[test]
    fn test_unparseable_input_is_internal() {
        assert!(matches!(
            lower_to_es5("var = ;"),
            Err(CompileError::Internal(_))
        ));
    }

    #[test]
    fn test_apply_edits_ordering() {
        let edits = vec![
            Edit {
                start: 0,
                kind: EditKind::Open,
                depth: 2,
                text: "[".into(),
            },
            Edit {
                start: 0,
                kind: EditKind::Open,
                depth: 0,
                text: "(".into(),
            },
            Edit {
                start: 3,
                kind: EditKind::Close,
                depth: 0,
                text: ")".into(),
            },
            Edit {
                start: 3,
                kind: EditKind::Close,
                depth: 2,
                text: "]".into(),
            },
            Edit {
                start: 1,
                kind: EditKind::Replace { end: 2 },
                depth: 0,
                text: "-".into(),
            },
        ];
        assert_eq!(apply_edits("abc", edits), "([a-c])");
    }
}
