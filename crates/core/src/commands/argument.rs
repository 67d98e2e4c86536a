use crate::commands::{
    argument_parser::consume_token,
    context::ResolutionContext,
    error::ParseError,
    node::NodeId,
    spec::NodeDescriptor,
    value::Value,
};
use once_cell::unsync::OnceCell;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumed<'i> {
    pub token: Option<String>,
    pub rest: Option<&'i str>,
}

pub trait ArgumentType<E>: Send + Sync {
    fn consume<'i>(
        &self,
        descriptor: &NodeDescriptor,
        input: Option<&'i str>,
    ) -> Result<Consumed<'i>, ParseError> {
        consume_token(descriptor, input)
    }

    fn result(
        &self,
        token: &str,
        descriptor: &NodeDescriptor,
        ctx: &ResolutionContext<'_, E>,
    ) -> Result<Value, ParseError>;

    fn complete(
        &self,
        _token: &str,
        _descriptor: &NodeDescriptor,
        _ctx: &ResolutionContext<'_, E>,
    ) -> Vec<String> {
        Vec::new()
    }

    fn default_parameter(&self, _key: &str) -> Option<&'static str> {
        None
    }
}

pub struct Parser<'a, E> {
    node: NodeId,
    descriptor: &'a NodeDescriptor,
    kind: Arc<dyn ArgumentType<E>>,
    token: Option<String>,
    parsed: bool,
    result: OnceCell<Result<Value, ParseError>>,
    completions: OnceCell<Vec<String>>,
}

impl<'a, E> Parser<'a, E> {
    pub(super) fn new(
        node: NodeId,
        descriptor: &'a NodeDescriptor,
        kind: Arc<dyn ArgumentType<E>>,
    ) -> Self {
        Self {
            node,
            descriptor,
            kind,
            token: None,
            parsed: false,
            result: OnceCell::new(),
            completions: OnceCell::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn descriptor(&self) -> &'a NodeDescriptor {
        self.descriptor
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.descriptor
            .parameter(key)
            .or_else(|| self.kind.default_parameter(key))
    }

    /// Suppressed values route the path but are left out of handler arguments.
    pub fn is_suppressed(&self) -> bool {
        self.parameter("suppress") == Some("true")
    }

    pub fn is_switch(&self) -> bool {
        self.descriptor.is_switch()
    }

    pub fn answers_switch(&self, flag: &str) -> bool {
        self.descriptor.switch_aliases().any(|alias| alias == flag)
    }

    pub fn parse<'i>(&mut self, input: Option<&'i str>) -> Result<Option<&'i str>, ParseError> {
        self.parsed = true;
        let consumed = self.kind.consume(self.descriptor, input)?;
        self.token = consumed.token;
        self.result = OnceCell::new();
        self.completions = OnceCell::new();
        Ok(consumed.rest)
    }

    pub fn result(&self, ctx: &ResolutionContext<'_, E>) -> Result<Value, ParseError> {
        self.result
            .get_or_init(|| match &self.token {
                Some(token) => self.kind.result(token, self.descriptor, ctx),
                None => Ok(Value::Null),
            })
            .clone()
    }

    pub fn completions(&self, ctx: &ResolutionContext<'_, E>) -> &[String] {
        self.completions.get_or_init(|| match &self.token {
            Some(token) => self.kind.complete(token, self.descriptor, ctx),
            None => Vec::new(),
        })
    }
}

impl<E> Clone for Parser<'_, E> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            descriptor: self.descriptor,
            kind: Arc::clone(&self.kind),
            token: self.token.clone(),
            parsed: self.parsed,
            result: self.result.clone(),
            completions: self.completions.clone(),
        }
    }
}

impl<E> fmt::Debug for Parser<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("node", &self.node)
            .field("descriptor", &self.descriptor.to_string())
            .field("token", &self.token)
            .field("parsed", &self.parsed)
            .finish()
    }
}
