//! Source emission
//!
//! Prints a generated class as TypeScript-flavored source. The output is
//! meant to be read (and diffed) by people; whatever loads it only needs
//! the class to be deterministic for a given [`GeneratedClass`].

use std::fmt::{self, Write};

use crate::body::{ArgumentRef, Body, Expr, Stmt};
use crate::builder::{GeneratedClass, PropertyAccessorKind, SynthesizedMethod};
use crate::config::EmitConfig;
use crate::descriptor::{ClassKind, Literal, ParameterDescriptor};
use crate::error::MaterializeError;

use super::Materializer;

/// Well-known symbol of the clone hook
const CLONE_SYMBOL: &str = "surrogate.clone";
/// Well-known symbol of the serialization hook
const SERIALIZE_SYMBOL: &str = "surrogate.serialize";

/// Emits generated classes as source text
#[derive(Debug, Clone)]
pub struct SourceEmitter {
    indent: usize,
}

impl Default for SourceEmitter {
    fn default() -> Self {
        Self::with_config(&EmitConfig::default())
    }
}

impl SourceEmitter {
    /// Emitter indenting by `indent` spaces
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Emitter using the configured settings
    pub fn with_config(config: &EmitConfig) -> Self {
        Self::new(config.indent)
    }

    /// Render a body on its own, without any enclosing indentation
    pub fn render_body(&self, body: &Body) -> Result<String, fmt::Error> {
        let mut writer = SourceWriter::new(self.indent);
        writer.statements(&body.statements, 0)?;
        Ok(writer.finish())
    }

    fn render_class(&self, class: &GeneratedClass) -> Result<String, fmt::Error> {
        let mut w = SourceWriter::new(self.indent);
        let short_name = class.short_name();

        let mut level = 0;
        if let Some(namespace) = class.namespace() {
            w.line(level, format_args!("namespace {} {{", dotted(namespace)))?;
            level += 1;
        }

        let relation = match class.parent_kind {
            ClassKind::Interface => "implements",
            ClassKind::Concrete | ClassKind::Abstract => "extends",
        };
        w.line(
            level,
            format_args!("export class {short_name} {relation} {} {{", dotted(&class.parent)),
        )?;
        let member = level + 1;

        for property in &class.properties {
            w.line(member, format_args!("public {}: any;", property.name))?;
        }
        if let Some(hooks) = &class.hook_storage {
            for storage in [&hooks.prefix_storage, &hooks.suffix_storage] {
                w.line(member, format_args!("private {storage}: Map<string, Interceptor>;"))?;
            }
        }

        w.blank()?;
        Self::factory(&mut w, class, member)?;

        for method in &class.methods {
            w.blank()?;
            Self::method(&mut w, method, member)?;
        }

        w.blank()?;
        Self::lifecycle(&mut w, class, member)?;

        w.line(level, format_args!("}}"))?;
        if level > 0 {
            w.line(0, format_args!("}}"))?;
        }
        Ok(w.finish())
    }

    fn factory(w: &mut SourceWriter, class: &GeneratedClass, level: usize) -> fmt::Result {
        let short_name = class.short_name();
        w.line(
            level,
            format_args!("static {}(): {short_name} {{", class.factory.name),
        )?;
        w.line(
            level + 1,
            format_args!("const instance = Object.create({short_name}.prototype) as {short_name};"),
        )?;
        for property in &class.properties {
            let initial = match (property.accessor, &property.default) {
                (PropertyAccessorKind::Passthrough, Some(default)) => literal(default),
                _ => "null".to_string(),
            };
            w.line(level + 1, format_args!("instance.{} = {initial};", property.name))?;
        }
        if let Some(hooks) = &class.hook_storage {
            for storage in [&hooks.prefix_storage, &hooks.suffix_storage] {
                w.line(level + 1, format_args!("instance.{storage} = new Map();"))?;
            }
        }
        w.line(level + 1, format_args!("return instance;"))?;
        w.line(level, format_args!("}}"))
    }

    fn method(w: &mut SourceWriter, method: &SynthesizedMethod, level: usize) -> fmt::Result {
        let parameters: Vec<String> = method.parameters.iter().map(parameter).collect();
        let modifier = if method.implements_abstract { "" } else { "override " };
        let reference = if method.returns_reference { "ref " } else { "" };
        let return_type = method
            .return_type
            .as_deref()
            .map(|ty| format!(": {ty}"))
            .unwrap_or_default();

        w.line(
            level,
            format_args!(
                "{} {modifier}{reference}{}({}){return_type} {{",
                method.visibility.keyword(),
                method.name,
                parameters.join(", ")
            ),
        )?;
        w.statements(&method.body.statements, level + 1)?;
        w.line(level, format_args!("}}"))
    }

    fn lifecycle(w: &mut SourceWriter, class: &GeneratedClass, level: usize) -> fmt::Result {
        let short_name = class.short_name();

        w.line(
            level,
            format_args!("[Symbol.for(\"{CLONE_SYMBOL}\")](): {short_name} {{"),
        )?;
        w.line(
            level + 1,
            format_args!("const copy = Object.create({short_name}.prototype) as {short_name};"),
        )?;
        for property in &class.properties {
            w.line(
                level + 1,
                format_args!("copy.{0} = this.{0};", property.name),
            )?;
        }
        if let Some(hooks) = &class.hook_storage {
            for storage in [&hooks.prefix_storage, &hooks.suffix_storage] {
                w.line(level + 1, format_args!("copy.{storage} = new Map(this.{storage});"))?;
            }
        }
        w.line(level + 1, format_args!("return copy;"))?;
        w.line(level, format_args!("}}"))?;

        w.blank()?;
        let state: Vec<String> = class
            .lifecycle
            .serialized_state
            .iter()
            .map(|name| quote(name))
            .collect();
        w.line(
            level,
            format_args!("[Symbol.for(\"{SERIALIZE_SYMBOL}\")](): string[] {{"),
        )?;
        w.line(level + 1, format_args!("return [{}];", state.join(", ")))?;
        w.line(level, format_args!("}}"))
    }
}

impl Materializer for SourceEmitter {
    type Output = String;
    type Error = MaterializeError;

    fn materialize(&self, class: &GeneratedClass) -> Result<String, MaterializeError> {
        tracing::debug!(proxy = %class.name, "emitting source");
        Ok(self.render_class(class)?)
    }
}

/// Indentation-aware line writer
struct SourceWriter {
    output: String,
    unit: String,
}

impl SourceWriter {
    fn new(indent: usize) -> Self {
        Self {
            output: String::new(),
            unit: " ".repeat(indent),
        }
    }

    fn line(&mut self, level: usize, content: fmt::Arguments<'_>) -> fmt::Result {
        for _ in 0..level {
            self.output.push_str(&self.unit);
        }
        self.output.write_fmt(content)?;
        self.output.write_char('\n')
    }

    fn blank(&mut self) -> fmt::Result {
        self.output.write_char('\n')
    }

    /// Block statements are set apart from their neighbours by blank lines
    fn statements(&mut self, statements: &[Stmt], level: usize) -> fmt::Result {
        let mut previous_was_block = false;
        for (i, stmt) in statements.iter().enumerate() {
            let is_block = matches!(stmt, Stmt::IfHookRegistered { .. } | Stmt::IfSet { .. });
            if i > 0 && (is_block || previous_was_block) {
                self.blank()?;
            }
            self.statement(stmt, level)?;
            previous_was_block = is_block;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Stmt, level: usize) -> fmt::Result {
        match stmt {
            Stmt::Let { name, value } => {
                self.line(level, format_args!("let {name} = {};", expr(value)))
            }
            Stmt::IfHookRegistered {
                storage,
                method,
                then,
            } => {
                self.line(
                    level,
                    format_args!("if (this.{storage}.has({})) {{", quote(method)),
                )?;
                self.statements(then, level + 1)?;
                self.line(level, format_args!("}}"))
            }
            Stmt::IfSet { flag, then } => {
                self.line(level, format_args!("if ({flag}.value) {{"))?;
                self.statements(then, level + 1)?;
                self.line(level, format_args!("}}"))
            }
            Stmt::Return(value) => self.line(level, format_args!("return {};", expr(value))),
        }
    }

    fn finish(self) -> String {
        self.output
    }
}

fn expr(expr: &Expr) -> String {
    match expr {
        Expr::Null => "null".to_string(),
        Expr::FreshFlag => "{ value: false }".to_string(),
        Expr::Local { name } => name.clone(),
        Expr::Delegate { method, arguments } => {
            let forwarded: Vec<String> = arguments.iter().map(forward).collect();
            format!("super.{method}({})", forwarded.join(", "))
        }
        Expr::CallHook {
            storage,
            method,
            arguments,
            return_value,
            return_early,
            ..
        } => {
            let mut call_arguments = vec![
                "this".to_string(),
                "this".to_string(),
                quote(method),
                argument_map(arguments),
            ];
            if let Some(return_value) = return_value {
                call_arguments.push(return_value.clone());
            }
            call_arguments.push(return_early.clone());
            format!(
                "this.{storage}.get({})!({})",
                quote(method),
                call_arguments.join(", ")
            )
        }
    }
}

fn forward(argument: &ArgumentRef) -> String {
    if argument.is_variadic {
        format!("...{}", argument.name)
    } else {
        argument.name.clone()
    }
}

fn argument_map(arguments: &[ArgumentRef]) -> String {
    if arguments.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = arguments
        .iter()
        .map(|a| format!("{0}: {0}", a.name))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

fn parameter(param: &ParameterDescriptor) -> String {
    let mut out = String::new();
    if param.is_by_reference {
        out.push_str("ref ");
    }
    if param.is_variadic {
        out.push_str("...");
    }
    out.push_str(&param.name);
    if let Some(type_hint) = &param.type_hint {
        out.push_str(": ");
        out.push_str(type_hint);
        if param.is_variadic {
            out.push_str("[]");
        }
    }
    if let Some(default) = &param.default {
        out.push_str(" = ");
        out.push_str(&literal(default));
    }
    out
}

fn literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => format!("{f:?}"),
        Literal::Str(s) => quote(s),
        Literal::List(items) => {
            let items: Vec<String> = items.iter().map(self::literal).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn quote(s: &str) -> String {
    format!("{s:?}")
}

/// `A\B\C` → `A.B.C`
fn dotted(name: &str) -> String {
    name.trim_start_matches('\\').replace('\\', ".")
}
