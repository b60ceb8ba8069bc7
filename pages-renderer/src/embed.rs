//! Embed directives: splicing one page's rendered output into another.
//!
//! Every registered page gets a directive named `<prefix>:<page-id>` in the
//! registry's [`FormatterSet`]. Templates reach them through a single Tera
//! filter named `<prefix>`:
//!
//! ```text
//! {{ this | embed(page="bits/header.tpl") }}
//! ```
//!
//! The piped value becomes the embedded page's data context. The filter is
//! marked safe, so rendered output is never escaped a second time.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde_json::Value;
use tera::ast::{Expr, ExprVal, FunctionCall, Node};

use pages_core::PageId;

use crate::context::DataContext;
use crate::error::PageError;
use crate::page::Page;

/// Parsed pages shared between the registry and its directives.
pub(crate) type PageTable = RwLock<HashMap<PageId, Arc<Page>>>;

thread_local! {
    static EMBED_DEPTH: Cell<usize> = const { Cell::new(0) };
}

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// A piece of output produced by an embed directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Already rendered text, spliced verbatim.
    Rendered(String),
    /// A value to stringify with the default rules.
    Value(Value),
}

impl Fragment {
    /// Classify a value piped into the filter without a `page` argument.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Fragment::Rendered(s.clone()),
            other => Fragment::Value(other.clone()),
        }
    }

    /// Null renders as nothing; every other value as compact JSON.
    pub fn into_string(self) -> String {
        match self {
            Fragment::Rendered(s) => s,
            Fragment::Value(Value::Null) => String::new(),
            Fragment::Value(v) => v.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// EmbedDirective
// ---------------------------------------------------------------------------

/// Renders one specific page on behalf of another.
#[derive(Debug, Clone)]
pub struct EmbedDirective {
    target: PageId,
    table: Weak<PageTable>,
    max_depth: usize,
}

impl EmbedDirective {
    pub fn target(&self) -> &PageId {
        &self.target
    }

    /// Render the target page against `data`.
    ///
    /// The target is looked up in the published table at call time and its
    /// already parsed template is executed; nothing is re-parsed.
    pub fn embed(&self, data: &Value) -> Result<Fragment, PageError> {
        let _guard = DepthGuard::enter(&self.target, self.max_depth)?;
        let table = self
            .table
            .upgrade()
            .ok_or_else(|| PageError::Detached { id: self.target.clone() })?;
        let page = table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.target)
            .cloned()
            .ok_or_else(|| PageError::NotFound { id: self.target.0.clone() })?;
        let rendered = page.render_to_string(&DataContext::from_value(data.clone()))?;
        Ok(Fragment::Rendered(rendered))
    }
}

struct DepthGuard;

impl DepthGuard {
    fn enter(id: &PageId, limit: usize) -> Result<Self, PageError> {
        EMBED_DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > limit {
                return Err(PageError::EmbedDepth { id: id.clone(), limit });
            }
            depth.set(next);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EMBED_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

// ---------------------------------------------------------------------------
// FormatterSet
// ---------------------------------------------------------------------------

/// Directive name → directive, one entry per registered page.
#[derive(Debug)]
pub struct FormatterSet {
    prefix: String,
    directives: BTreeMap<String, EmbedDirective>,
}

impl FormatterSet {
    /// Install one directive per id, all resolving pages through `table`.
    pub(crate) fn new<'a>(
        prefix: &str,
        max_depth: usize,
        ids: impl IntoIterator<Item = &'a PageId>,
        table: &Arc<PageTable>,
    ) -> Self {
        let mut directives = BTreeMap::new();
        for id in ids {
            let directive = EmbedDirective {
                target: id.clone(),
                table: Arc::downgrade(table),
                max_depth,
            };
            directives.insert(directive_name(prefix, id.as_str()), directive);
        }
        Self { prefix: prefix.to_string(), directives }
    }

    /// The filter name templates use, e.g. `embed`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get(&self, name: &str) -> Option<&EmbedDirective> {
        self.directives.get(name)
    }

    /// Directive names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.directives.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Page ids passed as a string literal to this set's filter in a
    /// parsed template. Comments, raw blocks and text are not calls.
    pub(crate) fn literal_targets<'a>(&self, ast: &'a [Node]) -> Vec<&'a str> {
        let mut targets = Vec::new();
        visit_nodes(&self.prefix, ast, &mut targets);
        targets
    }

    /// Whether `id` has a directive in this set.
    pub(crate) fn resolves(&self, id: &str) -> bool {
        self.directives.contains_key(&directive_name(&self.prefix, id))
    }
}

pub fn directive_name(prefix: &str, id: &str) -> String {
    format!("{prefix}:{id}")
}

// ---------------------------------------------------------------------------
// AST walk
// ---------------------------------------------------------------------------

fn visit_nodes<'a>(prefix: &str, nodes: &'a [Node], out: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            Node::VariableBlock(_, expr) => visit_expr(prefix, expr, out),
            Node::Set(_, set) => visit_expr(prefix, &set.value, out),
            Node::FilterSection(_, section, _) => {
                visit_call(prefix, &section.filter, out);
                visit_nodes(prefix, &section.body, out);
            }
            Node::MacroDefinition(_, def, _) => {
                for default in def.args.values().flatten() {
                    visit_expr(prefix, default, out);
                }
                visit_nodes(prefix, &def.body, out);
            }
            Node::Block(_, block, _) => visit_nodes(prefix, &block.body, out),
            Node::Forloop(_, forloop, _) => {
                visit_expr(prefix, &forloop.container, out);
                visit_nodes(prefix, &forloop.body, out);
                if let Some(empty) = &forloop.empty_body {
                    visit_nodes(prefix, empty, out);
                }
            }
            Node::If(cond, _) => {
                for (_, expr, body) in &cond.conditions {
                    visit_expr(prefix, expr, out);
                    visit_nodes(prefix, body, out);
                }
                if let Some((_, body)) = &cond.otherwise {
                    visit_nodes(prefix, body, out);
                }
            }
            Node::Super
            | Node::Text(_)
            | Node::Extends(..)
            | Node::Include(..)
            | Node::ImportMacro(..)
            | Node::Raw(..)
            | Node::Break(_)
            | Node::Continue(_)
            | Node::Comment(..) => {}
        }
    }
}

fn visit_expr<'a>(prefix: &str, expr: &'a Expr, out: &mut Vec<&'a str>) {
    visit_val(prefix, &expr.val, out);
    for call in &expr.filters {
        visit_call(prefix, call, out);
    }
}

fn visit_val<'a>(prefix: &str, val: &'a ExprVal, out: &mut Vec<&'a str>) {
    match val {
        ExprVal::Math(math) => {
            visit_expr(prefix, &math.lhs, out);
            visit_expr(prefix, &math.rhs, out);
        }
        ExprVal::Logic(logic) => {
            visit_expr(prefix, &logic.lhs, out);
            visit_expr(prefix, &logic.rhs, out);
        }
        ExprVal::In(within) => {
            visit_expr(prefix, &within.lhs, out);
            visit_expr(prefix, &within.rhs, out);
        }
        ExprVal::Test(test) => {
            for arg in &test.args {
                visit_expr(prefix, arg, out);
            }
        }
        ExprVal::MacroCall(call) => {
            for arg in call.args.values() {
                visit_expr(prefix, arg, out);
            }
        }
        ExprVal::FunctionCall(call) => {
            for arg in call.args.values() {
                visit_expr(prefix, arg, out);
            }
        }
        ExprVal::Array(items) => {
            for item in items {
                visit_expr(prefix, item, out);
            }
        }
        ExprVal::StringConcat(concat) => {
            for value in &concat.values {
                visit_val(prefix, value, out);
            }
        }
        ExprVal::String(_)
        | ExprVal::Int(_)
        | ExprVal::Float(_)
        | ExprVal::Bool(_)
        | ExprVal::Ident(_) => {}
    }
}

/// A filter call named `prefix` whose `page` argument is a bare string literal.
fn visit_call<'a>(prefix: &str, call: &'a FunctionCall, out: &mut Vec<&'a str>) {
    if call.name == prefix {
        if let Some(Expr { val: ExprVal::String(id), filters, .. }) = call.args.get("page") {
            if filters.is_empty() {
                out.push(id.as_str());
            }
        }
    }
    for arg in call.args.values() {
        visit_expr(prefix, arg, out);
    }
}

// ---------------------------------------------------------------------------
// Tera filter
// ---------------------------------------------------------------------------

/// The single Tera filter dispatching to the directives of a [`FormatterSet`].
pub(crate) struct EmbedFilter {
    formatters: Arc<FormatterSet>,
}

impl EmbedFilter {
    pub(crate) fn new(formatters: Arc<FormatterSet>) -> Self {
        Self { formatters }
    }
}

impl tera::Filter for EmbedFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let fragment = match args.get("page") {
            None => Fragment::from_value(value),
            Some(Value::String(id)) => {
                let name = directive_name(&self.formatters.prefix, id);
                let directive = self
                    .formatters
                    .get(&name)
                    .ok_or_else(|| tera::Error::msg(format!("no formatter named '{name}'")))?;
                directive
                    .embed(value)
                    .map_err(|e| tera::Error::chain(format!("cannot embed page '{id}'"), e))?
            }
            Some(other) => {
                return Err(tera::Error::msg(format!(
                    "`page` argument of `{}` must be a string, got {other}",
                    self.formatters.prefix
                )))
            }
        };
        Ok(Value::String(fragment.into_string()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
