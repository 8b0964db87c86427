//! Module parser: configuration documents into resource graphs.
//!
//! The grammar layer is delegated to the HCL parser, which produces a tree
//! of keyed blocks. This module walks the top-level items, dispatches each
//! to its kind-specific decoder, enforces `(kind, name)` uniqueness, and
//! aggregates every semantic defect found across the whole document into a
//! single [`MultiError`] instead of failing on the first one.

use std::collections::{HashMap, HashSet};

use hcl::edit::Span;
use hcl::edit::parser::parse_body;
use hcl::edit::structure::{Block, BlockLabel};
use tracing::debug;

use crate::error::{MultiError, ParseError, Pos, Result, StewardError};
use crate::resource::{
    Container, Module, ModuleCall, Param, Reconcile, Resource, ShellTask, Template,
};

/// Parses configuration documents into modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    /// Creates a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::Syntax`] when the document fails at the
    /// grammar level, or [`StewardError::Parse`] carrying every semantic
    /// defect found in one pass.
    pub fn parse(&self, content: &[u8]) -> Result<Module> {
        let (module, errors) = self.parse_partial(content)?;
        if errors.is_empty() {
            Ok(module)
        } else {
            Err(StewardError::Parse(errors))
        }
    }

    /// Parses a configuration document, preserving partial results.
    ///
    /// Every resource that decodes cleanly is kept in document order even
    /// when sibling items fail, so tooling gets best-effort diagnostics
    /// from a single invocation.
    ///
    /// # Errors
    ///
    /// Returns an error only for grammar-level failures; semantic defects
    /// are collected into the returned [`MultiError`].
    pub fn parse_partial(&self, content: &[u8]) -> Result<(Module, MultiError)> {
        let source = std::str::from_utf8(content).map_err(|e| StewardError::Syntax {
            message: e.to_string(),
        })?;
        let body = parse_body(source).map_err(|e| StewardError::Syntax {
            message: e.to_string(),
        })?;

        let lines = LineIndex::new(source);
        let mut errors = MultiError::new();
        let mut module = Module::default();
        let mut names: HashSet<String> = HashSet::new();

        for structure in body.iter() {
            if let Some(block) = structure.as_block() {
                let pos = lines.locate(block.span());
                let keyword = block.ident.as_str();

                let decoded = match keyword {
                    "task" => decode_task(block, pos).map(Resource::Task),
                    "template" => decode_template(block, pos).map(Resource::Template),
                    "module" => decode_module_call(block, pos).map(Resource::Module),
                    "param" => decode_param(block, pos).map(Resource::Param),
                    "container" => decode_container(block, pos).map(Resource::Container),
                    other => Err(ParseError::new(
                        pos,
                        format!("unknown resource type {other:?}"),
                    )),
                };

                match decoded {
                    Ok(resource) => {
                        let key = format!("{keyword}.{}", resource.name());
                        if names.contains(&key) {
                            errors.push(ParseError::new(
                                pos,
                                format!("duplicate {keyword} {:?}", resource.name()),
                            ));
                        } else {
                            debug!("Parsed {keyword} {:?}", resource.name());
                            names.insert(key);
                            module.resources.push(resource);
                        }
                    }
                    Err(error) => errors.push(error),
                }
            } else if let Some(attribute) = structure.as_attribute() {
                // A bare top-level attribute has a single key token and no
                // recognized kind.
                let pos = lines.locate(attribute.span());
                errors.push(ParseError::new(
                    pos,
                    format!("unknown resource type {:?}", attribute.key.as_str()),
                ));
            }
        }

        Ok((module, errors))
    }
}

/// Decodes a block body onto a typed struct.
fn decode_body<T: serde::de::DeserializeOwned>(block: &Block, pos: Pos) -> std::result::Result<T, ParseError> {
    let body: hcl::Body = block.body.clone().into();
    hcl::from_body(body).map_err(|e| ParseError::new(pos, e.to_string()))
}

/// Returns a block label's text.
fn label_text(label: &BlockLabel) -> &str {
    match label {
        BlockLabel::Ident(ident) => ident.as_str(),
        BlockLabel::String(string) => string.as_str(),
    }
}

fn decode_task(block: &Block, pos: Pos) -> std::result::Result<ShellTask, ParseError> {
    if block.labels.is_empty() {
        return Err(ParseError::new(
            pos,
            "task has no name (expected `task \"name\"`)",
        ));
    }

    let mut task: ShellTask = decode_body(block, pos)?;
    task.name = label_text(&block.labels[0]).to_string();
    Ok(task)
}

fn decode_template(block: &Block, pos: Pos) -> std::result::Result<Template, ParseError> {
    if block.labels.is_empty() {
        return Err(ParseError::new(
            pos,
            "template has no name (expected `template \"name\"`)",
        ));
    }

    let mut template: Template = decode_body(block, pos)?;
    template.name = label_text(&block.labels[0]).to_string();
    Ok(template)
}

fn decode_param(block: &Block, pos: Pos) -> std::result::Result<Param, ParseError> {
    if block.labels.is_empty() {
        return Err(ParseError::new(
            pos,
            "param has no name (expected `param \"name\"`)",
        ));
    }

    let mut param: Param = decode_body(block, pos)?;
    param.name = label_text(&block.labels[0]).to_string();
    Ok(param)
}

fn decode_container(block: &Block, pos: Pos) -> std::result::Result<Container, ParseError> {
    if block.labels.is_empty() {
        return Err(ParseError::new(
            pos,
            "container has no name (expected `container \"name\"`)",
        ));
    }

    let mut container: Container = decode_body(block, pos)?;
    container.name = label_text(&block.labels[0]).to_string();
    Ok(container)
}

fn decode_module_call(block: &Block, pos: Pos) -> std::result::Result<ModuleCall, ParseError> {
    if block.labels.len() < 2 {
        return Err(ParseError::new(
            pos,
            "module missing source or name (expected `module \"source\" \"name\"`)",
        ));
    }

    // Arguments are a flat string map; scalar values are stringified.
    let raw: HashMap<String, hcl::Value> = decode_body(block, pos)?;
    let mut args = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let Some(value) = stringify(&value) else {
            return Err(ParseError::new(
                pos,
                format!("module argument {key:?} must be a scalar value"),
            ));
        };
        args.insert(key, value);
    }

    Ok(ModuleCall {
        source: label_text(&block.labels[0]).to_string(),
        name: label_text(&block.labels[1]).to_string(),
        args,
    })
}

/// Renders a scalar HCL value as a string.
fn stringify(value: &hcl::Value) -> Option<String> {
    match value {
        hcl::Value::String(s) => Some(s.clone()),
        hcl::Value::Bool(b) => Some(b.to_string()),
        hcl::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Maps byte offsets to line/column positions.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(idx + 1);
            }
        }
        Self { starts }
    }

    fn locate(&self, span: Option<std::ops::Range<usize>>) -> Pos {
        let Some(span) = span else {
            return Pos::default();
        };
        let line = self.starts.partition_point(|&start| start <= span.start);
        let column = span.start - self.starts[line - 1] + 1;
        Pos::new(line, column)
    }
}
