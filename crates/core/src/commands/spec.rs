use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;
use std::str::Chars;

/// Name and parameters of one node in the argument tree.
///
/// Equality only considers the name. Registering the same name twice under one
/// parent reuses the first node and its parameters.
#[derive(Debug, Clone, Default)]
pub struct NodeDescriptor {
    name: String,
    parameters: IndexMap<String, String>,
}

impl NodeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: IndexMap::new(),
        }
    }

    pub fn with_parameters(name: impl Into<String>, parameters: IndexMap<String, String>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &IndexMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.name.split('|')
    }

    pub fn is_switch(&self) -> bool {
        self.parameters.contains_key("switch")
    }

    pub fn switch_aliases(&self) -> impl Iterator<Item = &str> {
        self.parameter("switch")
            .into_iter()
            .flat_map(|aliases| aliases.split('|'))
    }
}

impl PartialEq for NodeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NodeDescriptor {}

impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.name,
            self.parameters
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Name,
    ParamKey,
    ParamValue,
    ParamValueQuoted(char),
    ParamValueQuotedEnd,
    ParamEnd,
}

pub struct SpecReader<'a> {
    chars: Chars<'a>,
}

impl<'a> SpecReader<'a> {
    pub fn new(spec: &'a str) -> Self {
        Self {
            chars: spec.chars(),
        }
    }

    pub fn next_segment(&mut self) -> Vec<NodeDescriptor> {
        let mut result = Vec::new();

        let mut state = State::Name;
        let mut name = String::new();
        let mut key = String::new();
        let mut value = String::new();
        let mut parameters = IndexMap::new();

        while let Some(c) = self.chars.next() {
            match state {
                State::Name => match c {
                    ' ' => {
                        if !name.trim().is_empty() {
                            result.push(NodeDescriptor::new(name.trim()));
                            return result;
                        }
                    }
                    '(' => {
                        state = State::ParamKey;
                        parameters = IndexMap::new();
                        key.clear();
                    }
                    ',' => {
                        if !name.trim().is_empty() {
                            result.push(NodeDescriptor::new(name.trim()));
                        }
                        name.clear();
                    }
                    _ => name.push(c),
                },
                State::ParamKey => match c {
                    '=' => {
                        state = State::ParamValue;
                        value.clear();
                    }
                    // A bare key (or an empty list) commits with an empty value.
                    ',' | ')' => {
                        if !key.trim().is_empty() {
                            parameters.insert(key.trim().to_string(), String::new());
                        }
                        key.clear();
                        if c == ')' {
                            result.push(NodeDescriptor::with_parameters(
                                name.trim(),
                                std::mem::take(&mut parameters),
                            ));
                            state = State::ParamEnd;
                        }
                    }
                    _ => key.push(c),
                },
                State::ParamValue => match c {
                    ',' => {
                        parameters.insert(key.trim().to_string(), value.trim().to_string());
                        key.clear();
                        state = State::ParamKey;
                    }
                    ')' => {
                        parameters.insert(key.trim().to_string(), value.trim().to_string());
                        key.clear();
                        result.push(NodeDescriptor::with_parameters(
                            name.trim(),
                            std::mem::take(&mut parameters),
                        ));
                        state = State::ParamEnd;
                    }
                    '"' | '\'' if value.trim().is_empty() => {
                        value.clear();
                        state = State::ParamValueQuoted(c);
                    }
                    '"' | '\'' => {}
                    _ => value.push(c),
                },
                State::ParamValueQuoted(quote) => match c {
                    '\\' => {
                        value.push(c);
                        if let Some(escaped) = self.chars.next() {
                            value.push(escaped);
                        }
                    }
                    _ if c == quote => {
                        parameters.insert(key.trim().to_string(), value.trim().to_string());
                        key.clear();
                        state = State::ParamValueQuotedEnd;
                    }
                    _ => value.push(c),
                },
                State::ParamValueQuotedEnd => match c {
                    ',' => state = State::ParamKey,
                    ')' => {
                        result.push(NodeDescriptor::with_parameters(
                            name.trim(),
                            std::mem::take(&mut parameters),
                        ));
                        state = State::ParamEnd;
                    }
                    _ => {}
                },
                State::ParamEnd => {
                    if c == ' ' {
                        return result;
                    }
                }
            }
        }

        if state == State::Name && !name.trim().is_empty() {
            result.push(NodeDescriptor::new(name.trim()));
        }

        result
    }
}

impl Iterator for SpecReader<'_> {
    type Item = Vec<NodeDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.next_segment();
        if segment.is_empty() {
            None
        } else {
            Some(segment)
        }
    }
}

pub fn parse_spec(spec: &str) -> Vec<Vec<NodeDescriptor>> {
    SpecReader::new(spec).collect()
}
