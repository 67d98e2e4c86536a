//! Matching of an input line against an argument tree.
//!
//! Every child of a node is tried against the same remaining input, each
//! with its own copy of the [`ResolutionContext`]. The child producing the
//! longest chain of parsers wins; on a tie the child registered first wins.
//! This is greedy and local to each level, not a global optimum.
//!
//! Switches (nodes carrying a `switch` parameter) do not consume input where
//! they appear. They become eligible for the rest of the path and are
//! consumed wherever a `-flag value` pair shows up.

use crate::commands::{
    argument::Parser,
    context::{ResolutionContext, DEFAULT_COMPLETION_LIMIT},
    error::ParseError,
    node::{ArgTree, NodeId},
    registry::ParserRegistry,
};
use crate::config::EngineConfig;

pub(super) fn starts_switch(input: Option<&str>) -> bool {
    input.is_some_and(|input| input.starts_with('-'))
}

pub struct Resolver<'a, E> {
    tree: &'a ArgTree<E>,
    parsers: &'a ParserRegistry<E>,
    completion_limit: usize,
    pub(super) report_unhandled_errors: bool,
}

impl<'a, E> Resolver<'a, E> {
    pub fn new(tree: &'a ArgTree<E>, parsers: &'a ParserRegistry<E>) -> Self {
        Self {
            tree,
            parsers,
            completion_limit: DEFAULT_COMPLETION_LIMIT,
            report_unhandled_errors: false,
        }
    }

    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.completion_limit = config.completion_limit;
        self.report_unhandled_errors = config.report_unhandled_errors;
        self
    }

    pub fn tree(&self) -> &'a ArgTree<E> {
        self.tree
    }

    pub fn context(&self, env: &'a E) -> ResolutionContext<'a, E> {
        ResolutionContext::new(env).with_completion_limit(self.completion_limit)
    }

    pub(super) fn instantiate(&self, node: NodeId) -> Option<Parser<'a, E>> {
        let descriptor = self.tree.descriptor(node)?;
        Some(Parser::new(
            node,
            descriptor,
            self.parsers.lookup(descriptor.name()),
        ))
    }

    /// Returns the parsers matched along the best path starting at `node`.
    ///
    /// Switch nodes on the path appear as unparsed placeholders; the parser
    /// that actually consumed a switch is recorded in `ctx`. On return `ctx`
    /// holds the state of the winning branch.
    pub fn resolve(
        &self,
        node: NodeId,
        input: Option<&str>,
        ctx: &mut ResolutionContext<'a, E>,
    ) -> Vec<Parser<'a, E>> {
        let mut result = Vec::new();
        let mut input = input;

        if let Some(mut parser) = self.instantiate(node) {
            if parser.is_switch() {
                ctx.push_switch(parser.clone());
                result.push(parser);
            } else {
                if starts_switch(input) {
                    return self.resolve_switches(Some(node), input, ctx);
                }

                input = match parser.parse(input) {
                    Ok(rest) => rest,
                    Err(_) => return Vec::new(),
                };

                let outcome = parser.result(ctx);
                ctx.push_parser(parser.clone());
                result.push(parser);

                match outcome {
                    Ok(_) => {}
                    // Stop here so the dispatcher can find an error handler.
                    Err(ParseError::InvalidResult { .. }) => return result,
                    Err(_) => return Vec::new(),
                }
            }
        }

        let children = self.tree.children(node);
        if children.is_empty() {
            if starts_switch(input) {
                result.extend(self.resolve_switches(None, input, ctx));
            }
            return result;
        }

        let mut best = Vec::new();
        let mut best_ctx = None;
        for &child in children {
            let mut child_ctx = ctx.clone();
            let check = self.resolve(child, input, &mut child_ctx);
            if check.len() > best.len() {
                best = check;
                best_ctx = Some(child_ctx);
            }
        }

        if let Some(best_ctx) = best_ctx {
            *ctx = best_ctx;
        }
        result.extend(best);
        result
    }

    fn resolve_switches(
        &self,
        node: Option<NodeId>,
        input: Option<&str>,
        ctx: &mut ResolutionContext<'a, E>,
    ) -> Vec<Parser<'a, E>> {
        let mut input = input;

        while let Some(line) = input.and_then(|input| input.strip_prefix('-')) {
            let Some((flag, rest)) = line.split_once(' ') else {
                return Vec::new();
            };
            let Some(mut switch) = ctx.take_switch(flag) else {
                return Vec::new();
            };
            input = match switch.parse(Some(rest)) {
                Ok(rest) => rest,
                Err(_) => return Vec::new(),
            };
            ctx.consume_switch(switch);
        }

        match node {
            Some(node) => self.resolve(node, input, ctx),
            None => Vec::new(),
        }
    }
}
