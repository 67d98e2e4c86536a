use super::argument_set::ArgumentSet;
use crate::commands::{argument::Parser, node::NodeId};
use im::{OrdMap, Vector};

pub const DEFAULT_COMPLETION_LIMIT: usize = 20;

pub struct ResolutionContext<'a, E> {
    env: &'a E,
    completion_limit: usize,
    /// Switch parsers seen on the current path that have not been consumed yet.
    switches: Vector<Parser<'a, E>>,
    parsers: Vector<Parser<'a, E>>,
    /// Switches that were consumed out of order, keyed by the node they belong to.
    consumed: OrdMap<NodeId, Parser<'a, E>>,
}

impl<'a, E> ResolutionContext<'a, E> {
    pub fn new(env: &'a E) -> Self {
        Self {
            env,
            completion_limit: DEFAULT_COMPLETION_LIMIT,
            switches: Vector::new(),
            parsers: Vector::new(),
            consumed: OrdMap::new(),
        }
    }

    pub fn with_completion_limit(mut self, limit: usize) -> Self {
        self.completion_limit = limit;
        self
    }

    pub fn env(&self) -> &'a E {
        self.env
    }

    pub fn completion_limit(&self) -> usize {
        self.completion_limit
    }

    pub fn parsers(&self) -> impl Iterator<Item = &Parser<'a, E>> {
        self.parsers.iter()
    }

    pub fn switches(&self) -> impl Iterator<Item = &Parser<'a, E>> {
        self.switches.iter()
    }

    pub fn consumed(&self, node: NodeId) -> Option<&Parser<'a, E>> {
        self.consumed.get(&node)
    }

    pub(super) fn push_parser(&mut self, parser: Parser<'a, E>) {
        self.parsers.push_back(parser);
    }

    pub(super) fn push_switch(&mut self, parser: Parser<'a, E>) {
        self.switches.push_back(parser);
    }

    pub(super) fn take_switch(&mut self, flag: &str) -> Option<Parser<'a, E>> {
        let index = self.switches.iter().position(|s| s.answers_switch(flag))?;
        Some(self.switches.remove(index))
    }

    pub(super) fn consume_switch(&mut self, parser: Parser<'a, E>) {
        self.consumed.insert(parser.node(), parser);
    }
}

impl<E> Clone for ResolutionContext<'_, E> {
    fn clone(&self) -> Self {
        Self {
            env: self.env,
            completion_limit: self.completion_limit,
            switches: self.switches.clone(),
            parsers: self.parsers.clone(),
            consumed: self.consumed.clone(),
        }
    }
}

pub struct ExecutionContext<'a, E> {
    env: &'a E,
    arguments: ArgumentSet,
}

impl<'a, E> ExecutionContext<'a, E> {
    pub(super) fn new(env: &'a E, arguments: ArgumentSet) -> Self {
        Self { env, arguments }
    }

    pub fn env(&self) -> &'a E {
        self.env
    }

    pub fn args(&self) -> &ArgumentSet {
        &self.arguments
    }
}
