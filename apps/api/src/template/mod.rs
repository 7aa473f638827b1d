//! Prompt templates — a small closed AST evaluated against a typed value context.
//!
//! Every capability declares its prompt as a sequence of nodes instead of a
//! format string with ad-hoc `replace` calls. Rendering is a pure function of
//! (template, context): no I/O, no clock, no randomness. Anything
//! time-dependent (e.g. today's date in trend prompts) is supplied by the
//! caller as an ordinary variable.

use std::collections::BTreeMap;

use thiserror::Error;

/// One node of a prompt template.
#[derive(Debug, Clone)]
pub enum Node {
    /// Fixed template text, emitted verbatim.
    Literal(&'static str),
    /// A named variable substituted from the render context.
    Var(&'static str),
    /// A block included or skipped based on a flag or an optional field.
    Conditional {
        field: &'static str,
        then_nodes: Vec<Node>,
        else_nodes: Vec<Node>,
    },
}

/// Shorthand constructors — templates read as a flat node list.
pub fn lit(text: &'static str) -> Node {
    Node::Literal(text)
}

pub fn var(name: &'static str) -> Node {
    Node::Var(name)
}

pub fn when(field: &'static str, then_nodes: Vec<Node>) -> Node {
    Node::Conditional {
        field,
        then_nodes,
        else_nodes: Vec::new(),
    }
}

pub fn when_else(field: &'static str, then_nodes: Vec<Node>, else_nodes: Vec<Node>) -> Node {
    Node::Conditional {
        field,
        then_nodes,
        else_nodes,
    }
}

/// A value bound to a template variable.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Text(String),
    Flag(bool),
}

/// Named values a template is rendered against.
///
/// Optional request fields that are absent are simply not bound; a
/// `Conditional` on an unbound field takes its else branch.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    values: BTreeMap<&'static str, TemplateValue>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, TemplateValue::Text(value.into()));
        self
    }

    /// Binds the variable only when the value is present.
    pub fn text_opt(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.values.insert(name, TemplateValue::Text(v.to_string()));
        }
        self
    }

    pub fn flag(mut self, name: &'static str, value: bool) -> Self {
        self.values.insert(name, TemplateValue::Flag(value));
        self
    }

    fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.values.get(name)
    }

    /// Conditional truth: a true flag, or any bound text value.
    fn truthy(&self, name: &str) -> bool {
        match self.get(name) {
            Some(TemplateValue::Flag(b)) => *b,
            Some(TemplateValue::Text(_)) => true,
            None => false,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("template '{template}' references unbound variable '{variable}'")]
    UnboundVariable {
        template: &'static str,
        variable: &'static str,
    },

    #[error("template '{template}' uses flag '{variable}' in a text position")]
    FlagInTextPosition {
        template: &'static str,
        variable: &'static str,
    },
}

/// A named prompt template.
#[derive(Debug, Clone)]
pub struct Template {
    name: &'static str,
    nodes: Vec<Node>,
}

impl Template {
    pub fn new(name: &'static str, nodes: Vec<Node>) -> Self {
        Self { name, nodes }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Renders the template against the context. Deterministic: identical
    /// (template, context) pairs always produce identical output.
    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render_nodes(&self.nodes, ctx, &mut out)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        ctx: &RenderContext,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Literal(text) => out.push_str(text),
                Node::Var(name) => match ctx.get(name) {
                    Some(TemplateValue::Text(value)) => out.push_str(value),
                    Some(TemplateValue::Flag(_)) => {
                        return Err(RenderError::FlagInTextPosition {
                            template: self.name,
                            variable: name,
                        })
                    }
                    None => {
                        return Err(RenderError::UnboundVariable {
                            template: self.name,
                            variable: name,
                        })
                    }
                },
                Node::Conditional {
                    field,
                    then_nodes,
                    else_nodes,
                } => {
                    let branch = if ctx.truthy(field) {
                        then_nodes
                    } else {
                        else_nodes
                    };
                    self.render_nodes(branch, ctx, out)?;
                }
            }
        }
        Ok(())
    }
}
