//! The interpreter core.
//!
//! A pass scans the input once into an ordered node list (closing-bracket
//! order, so the list is already bottom-up with respect to nesting), then
//! resolves each node in turn: re-slice the working string at the node's
//! translated coordinates, parse the verb, dispatch to the first accepting
//! block, splice the output in place, and translate the coordinates of every
//! later node by the size delta. No recursive tree is ever built, and nodes
//! are never processed out of order — the coordinate translation depends on
//! sequential, monotonic application of splices.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::block::embed::Embed;
use crate::error::{Error, Result};
use crate::interface::{Adapter, AsyncBlock, Block};
use crate::verb::{DEFAULT_VERB_LIMIT, Verb};

/// Seed variables handed to a pass: name to adapter.
pub type AdapterMap = HashMap<String, Arc<dyn Adapter>>;

/// One matched bracket span.
///
/// Coordinates are byte offsets into the *current* working string and are
/// translated every time an earlier-processed node's substitution changes
/// the string length. `verb` and `output` are filled in when the node's own
/// turn to resolve arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Start and end offset of the bracketed span, braces included.
    pub coordinates: (usize, usize),
    /// The verb parsed for this node, once resolved.
    pub verb: Option<Verb>,
    /// The block-processed output for this node, once resolved.
    pub output: Option<String>,
}

impl Node {
    fn new(start: usize, end: usize) -> Self {
        Node {
            coordinates: (start, end),
            verb: None,
            output: None,
        }
    }
}

/// Find all matched bracket spans in a string.
///
/// Scans left to right with a bracket stack. `{` and `}` preceded by an
/// unescaped `\` are literal text. Unmatched trailing `{` are silently
/// dropped; this permissive behavior is intentional, since user-authored
/// templates rely on partial syntax being inert rather than fatal.
///
/// Nodes are appended in closing-bracket order: for nested brackets the
/// innermost span closes first and is appended first.
pub fn build_node_tree(message: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut starts = Vec::new();
    let mut escaped = false;
    for (index, ch) in message.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' => starts.push(index),
            '}' => {
                if let Some(start) = starts.pop() {
                    nodes.push(Node::new(start, index));
                }
            }
            _ => {}
        }
    }
    nodes
}

/// A named side-effect value declared by a block.
///
/// The action map is an open extension point between the engine and the
/// host: hosts consult the keys they understand and ignore the rest. The
/// `Data` variant carries arbitrary JSON for host-defined blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionValue {
    /// A single text value, e.g. a redirect target.
    Text(String),
    /// An ordered list of text values, e.g. queued commands.
    List(Vec<String>),
    /// Named boolean switches, e.g. permission overrides.
    Flags(HashMap<String, bool>),
    /// Rich embeds accumulated by the embed block.
    Embeds(Vec<Embed>),
    /// Arbitrary structured data for host-defined blocks.
    Data(serde_json::Value),
}

impl ActionValue {
    /// The text value, if this action holds one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ActionValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The list value, if this action holds one.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ActionValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// The flag map, if this action holds one.
    pub fn as_flags(&self) -> Option<&HashMap<String, bool>> {
        match self {
            ActionValue::Flags(flags) => Some(flags),
            _ => None,
        }
    }

    /// The embeds, if this action holds them.
    pub fn as_embeds(&self) -> Option<&[Embed]> {
        match self {
            ActionValue::Embeds(embeds) => Some(embeds),
            _ => None,
        }
    }
}

/// The single mutable record threaded through a pass.
pub struct Response {
    body: Option<String>,
    /// Side-effect actions declared by blocks, consumed by the host after
    /// the pass completes.
    pub actions: HashMap<String, ActionValue>,
    /// Variables readable by the variable getter block and writable by
    /// assignment blocks.
    pub variables: AdapterMap,
    /// Opaque pass-through data supplied by the host, such as cooldown
    /// partition keys.
    pub extra_kwargs: HashMap<String, serde_json::Value>,
}

impl Response {
    fn new(variables: AdapterMap, extra_kwargs: HashMap<String, serde_json::Value>) -> Self {
        Response {
            body: None,
            actions: HashMap::new(),
            variables,
            extra_kwargs,
        }
    }

    /// The rendered text. Empty until the pass completes or a block writes
    /// the body early.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Write the final body. The first write wins; later writes (including
    /// the interpreter's own, at the end of the pass) are ignored.
    pub fn set_body(&mut self, text: impl Into<String>) {
        if self.body.is_none() {
            self.body = Some(text.into());
        }
    }
}

impl Default for Response {
    /// An empty response, useful for exercising a block directly without
    /// running a full pass.
    fn default() -> Self {
        Response::new(AdapterMap::new(), HashMap::new())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("body", &self.body)
            .field("actions", &self.actions)
            .field("variables", &self.variables.keys().collect::<Vec<_>>())
            .field("extra_kwargs", &self.extra_kwargs)
            .finish()
    }
}

/// Read-only view handed to every block and adapter call: the parsed verb,
/// the shared response, and the original input string.
pub struct Context<'a> {
    /// The verb parsed from the node being resolved.
    pub verb: &'a Verb,
    /// The response being built by this pass.
    pub response: &'a mut Response,
    /// The original message passed to the interpreter, before any splices.
    pub original_message: &'a str,
}

/// Per-pass options for [`Interpreter::process`].
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Cumulative output-size budget in characters. Exceeding it aborts the
    /// pass with [`Error::WorkloadExceeded`]. `None` disables the check.
    pub charlimit: Option<usize>,
    /// Maximum characters parsed out of one bracketed span.
    pub verb_limit: usize,
    /// Parse `{declaration.parameter}` instead of `{declaration(parameter)}`.
    pub dot_parameter: bool,
    /// Opaque pass-through data exposed to blocks via the response.
    pub extra_kwargs: HashMap<String, serde_json::Value>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            charlimit: None,
            verb_limit: DEFAULT_VERB_LIMIT,
            dot_parameter: false,
            extra_kwargs: HashMap::new(),
        }
    }
}

fn check_workload(charlimit: Option<usize>, total_work: usize, output: &str) -> Result<usize> {
    let Some(limit) = charlimit else {
        return Ok(total_work);
    };
    let attempted = total_work + output.chars().count();
    if attempted > limit {
        return Err(Error::WorkloadExceeded { attempted, limit });
    }
    Ok(attempted)
}

/// Replace `working[start..=end]` with `output`, returning the new string
/// and the length delta applied to everything right of `start`.
fn text_deform(start: usize, end: usize, working: &str, output: &str) -> (String, isize) {
    let removed = end + 1 - start;
    let delta = output.len() as isize - removed as isize;
    let mut deformed = String::with_capacity(working.len().saturating_add_signed(delta));
    deformed.push_str(&working[..start]);
    deformed.push_str(output);
    deformed.push_str(&working[end + 1..]);
    (deformed, delta)
}

/// Translate the coordinates of every node after a splice at `start`.
///
/// A node's start and end move independently: each is shifted by `delta`
/// only when it lies strictly past the splice point, which keeps enclosing
/// nodes (whose start precedes the splice) anchored while their end tracks
/// the new length.
fn translate_nodes(nodes: &mut [Node], start: usize, delta: isize) {
    for node in nodes {
        let (node_start, node_end) = node.coordinates;
        let node_start = if node_start > start {
            node_start.saturating_add_signed(delta)
        } else {
            node_start
        };
        let node_end = if node_end > start {
            node_end.saturating_add_signed(delta)
        } else {
            node_end
        };
        node.coordinates = (node_start, node_end);
    }
}

fn finish_response(mut response: Response, output: String) -> Response {
    match response.body.take() {
        // Don't override a body a block already wrote.
        Some(body) => response.body = Some(body.trim().to_string()),
        None => response.body = Some(output.trim().to_string()),
    }
    response
}

fn truncate_at(working: &str, start: usize, message: &str) -> String {
    let mut truncated = working[..start].to_string();
    truncated.push_str(message);
    truncated
}

/// The synchronous block script interpreter.
///
/// Holds the ordered block catalog. Registration order is semantically
/// significant: the first block whose `will_accept` is true owns the node,
/// with no fallthrough to later blocks even when it produces no output.
pub struct Interpreter {
    blocks: Vec<Box<dyn Block>>,
}

impl Interpreter {
    /// Create an interpreter over an ordered block catalog.
    pub fn new(blocks: Vec<Box<dyn Block>>) -> Self {
        Interpreter { blocks }
    }

    /// Process a block script string into a [`Response`].
    ///
    /// Stop-class failures raised by blocks truncate the body and still
    /// succeed. [`Error::WorkloadExceeded`] and [`Error::EmbedParse`]
    /// propagate as-is; unexpected block errors are wrapped into
    /// [`Error::Process`] together with the partial response.
    pub fn process(
        &self,
        message: &str,
        seed_variables: AdapterMap,
        mut options: ProcessOptions,
    ) -> Result<Response> {
        let extra_kwargs = std::mem::take(&mut options.extra_kwargs);
        let mut response = Response::new(seed_variables, extra_kwargs);
        let mut nodes = build_node_tree(message);
        tracing::debug!(nodes = nodes.len(), "built node list");
        match self.solve(message, &mut nodes, &mut response, &options) {
            Ok(output) => Ok(finish_response(response, output)),
            Err(Error::Unexpected(source)) => Err(Error::Process {
                source,
                response: Box::new(response),
            }),
            Err(err) => Err(err),
        }
    }

    fn solve(
        &self,
        message: &str,
        nodes: &mut [Node],
        response: &mut Response,
        options: &ProcessOptions,
    ) -> Result<String> {
        let mut working = message.to_string();
        let mut total_work = 0;

        for index in 0..nodes.len() {
            let (start, end) = nodes[index].coordinates;
            let verb = Verb::parse(&working[start..=end], options.verb_limit, options.dot_parameter);
            tracing::debug!(verb = %verb, start, end, "resolving node");

            let outcome = {
                let mut ctx = Context {
                    verb: &verb,
                    response: &mut *response,
                    original_message: message,
                };
                self.process_blocks(&mut ctx)
            };
            nodes[index].verb = Some(verb);

            let output = match outcome {
                Ok(output) => output,
                Err(err) => {
                    if let Some(stop_message) = err.stop_message() {
                        tracing::debug!(message = stop_message, "pass stopped by block");
                        return Ok(truncate_at(&working, start, stop_message));
                    }
                    return Err(err);
                }
            };
            let Some(output) = output else {
                continue;
            };

            total_work = check_workload(options.charlimit, total_work, &output)?;
            let (deformed, delta) = text_deform(start, end, &working, &output);
            working = deformed;
            translate_nodes(&mut nodes[index + 1..], start, delta);
            nodes[index].output = Some(output);
        }
        Ok(working)
    }

    fn process_blocks(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(block) = self.blocks.iter().find(|block| block.will_accept(ctx)) else {
            return Ok(None);
        };
        block.process(ctx)
    }
}

/// Asynchronous variant of [`Interpreter`] whose block calls may be awaited.
///
/// The splicing and coordinate-translation algorithm is identical and
/// remains strictly sequential: while a block is suspended, no other node of
/// the same pass is touched. Independent `process` calls over different
/// inputs are fully independent.
pub struct AsyncInterpreter {
    blocks: Vec<Box<dyn AsyncBlock>>,
}

impl AsyncInterpreter {
    /// Create an async interpreter over an ordered block catalog.
    pub fn new(blocks: Vec<Box<dyn AsyncBlock>>) -> Self {
        AsyncInterpreter { blocks }
    }

    /// Asynchronously process a block script string into a [`Response`].
    ///
    /// See [`Interpreter::process`] for the full contract.
    pub async fn process(
        &self,
        message: &str,
        seed_variables: AdapterMap,
        mut options: ProcessOptions,
    ) -> Result<Response> {
        let extra_kwargs = std::mem::take(&mut options.extra_kwargs);
        let mut response = Response::new(seed_variables, extra_kwargs);
        let mut nodes = build_node_tree(message);
        tracing::debug!(nodes = nodes.len(), "built node list");
        match self.solve(message, &mut nodes, &mut response, &options).await {
            Ok(output) => Ok(finish_response(response, output)),
            Err(Error::Unexpected(source)) => Err(Error::Process {
                source,
                response: Box::new(response),
            }),
            Err(err) => Err(err),
        }
    }

    async fn solve(
        &self,
        message: &str,
        nodes: &mut [Node],
        response: &mut Response,
        options: &ProcessOptions,
    ) -> Result<String> {
        let mut working = message.to_string();
        let mut total_work = 0;

        for index in 0..nodes.len() {
            let (start, end) = nodes[index].coordinates;
            let verb = Verb::parse(&working[start..=end], options.verb_limit, options.dot_parameter);
            tracing::debug!(verb = %verb, start, end, "resolving node");

            let outcome = {
                let mut ctx = Context {
                    verb: &verb,
                    response: &mut *response,
                    original_message: message,
                };
                self.process_blocks(&mut ctx).await
            };
            nodes[index].verb = Some(verb);

            let output = match outcome {
                Ok(output) => output,
                Err(err) => {
                    if let Some(stop_message) = err.stop_message() {
                        tracing::debug!(message = stop_message, "pass stopped by block");
                        return Ok(truncate_at(&working, start, stop_message));
                    }
                    return Err(err);
                }
            };
            let Some(output) = output else {
                continue;
            };

            total_work = check_workload(options.charlimit, total_work, &output)?;
            let (deformed, delta) = text_deform(start, end, &working, &output);
            working = deformed;
            translate_nodes(&mut nodes[index + 1..], start, delta);
            nodes[index].output = Some(output);
        }
        Ok(working)
    }

    async fn process_blocks(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(block) = self.blocks.iter().find(|block| block.will_accept(ctx)) else {
            return Ok(None);
        };
        block.process(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_appear_in_closing_order() {
        let nodes = build_node_tree("{outer {inner} tail}");
        let coordinates: Vec<_> = nodes.iter().map(|node| node.coordinates).collect();
        assert_eq!(coordinates, vec![(7, 13), (0, 19)]);
    }

    #[test]
    fn unmatched_opening_brackets_are_dropped() {
        let nodes = build_node_tree("{{a}");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].coordinates, (1, 3));
    }

    #[test]
    fn unmatched_closing_brackets_are_ignored() {
        let nodes = build_node_tree("a} {b}");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].coordinates, (3, 5));
    }

    #[test]
    fn escaped_braces_are_literal() {
        assert!(build_node_tree("\\{not a node\\}").is_empty());
    }

    #[test]
    fn escaped_backslash_before_brace_still_opens() {
        let nodes = build_node_tree("\\\\{a}");
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn deform_computes_delta_both_directions() {
        let (grown, delta) = text_deform(0, 2, "{a} tail", "longer");
        assert_eq!(grown, "longer tail");
        assert_eq!(delta, 3);

        let (shrunk, delta) = text_deform(0, 2, "{a} tail", "");
        assert_eq!(shrunk, " tail");
        assert_eq!(delta, -3);
    }

    #[test]
    fn translation_shifts_only_coordinates_past_the_splice() {
        let mut nodes = vec![Node::new(7, 13), Node::new(0, 19)];
        // Splice at the inner node (start 7) grows the string by 4: the
        // enclosing node's start stays put while its end moves.
        translate_nodes(&mut nodes[1..], 7, 4);
        assert_eq!(nodes[1].coordinates, (0, 23));
    }
}
