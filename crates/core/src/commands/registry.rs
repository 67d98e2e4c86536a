use crate::commands::{
    argument::ArgumentType,
    argument_parser::{DoubleType, IntegerType, LiteralType, StringType},
    context::ExecutionContext,
    error::CommandResult,
    executor::Dispatch,
    node::{ArgTree, Handler, HandlerKind},
    resolver::Resolver,
    value::Value,
};
use crate::config::EngineConfig;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Maps `@name` node names to value parsers. Anything not found here is
/// matched literally.
pub struct ParserRegistry<E> {
    types: FxHashMap<String, Arc<dyn ArgumentType<E>>>,
    literal: Arc<dyn ArgumentType<E>>,
}

impl<E> Default for ParserRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ParserRegistry<E> {
    pub fn new() -> Self {
        let mut registry = Self {
            types: FxHashMap::default(),
            literal: Arc::new(LiteralType),
        };
        registry.register("string", StringType);
        registry.register("int", IntegerType);
        registry.register("double", DoubleType);
        registry
    }

    pub fn register(&mut self, name: &str, kind: impl ArgumentType<E> + 'static) {
        self.types.insert(format!("@{name}"), Arc::new(kind));
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.types.remove(&format!("@{name}")).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(&format!("@{name}"))
    }

    pub fn lookup(&self, node_name: &str) -> Arc<dyn ArgumentType<E>> {
        self.types
            .get(node_name)
            .unwrap_or(&self.literal)
            .clone()
    }
}

pub struct RootCommand<E> {
    aliases: Vec<String>,
    tree: ArgTree<E>,
}

impl<E> RootCommand<E> {
    pub fn name(&self) -> &str {
        &self.aliases[0]
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn tree(&self) -> &ArgTree<E> {
        &self.tree
    }
}

pub struct CommandBuilder<'r, E> {
    tree: &'r mut ArgTree<E>,
}

impl<E> CommandBuilder<'_, E> {
    pub fn bind(&mut self, path: &str, kind: HandlerKind, handler: Handler<E>) -> &mut Self {
        let root = self.tree.root();
        for leaf in self.tree.insert(root, path) {
            self.tree.bind(leaf, kind, handler.clone());
        }
        self
    }

    pub fn on_execute<F>(&mut self, path: &str, arity: usize, executor: F) -> &mut Self
    where
        F: Fn(&mut ExecutionContext<'_, E>) -> CommandResult<()> + Send + Sync + 'static,
    {
        self.bind(path, HandlerKind::Execute, Handler::new(arity, executor))
    }

    pub fn on_default<F>(&mut self, path: &str, executor: F) -> &mut Self
    where
        F: Fn(&mut ExecutionContext<'_, E>) -> CommandResult<()> + Send + Sync + 'static,
    {
        self.bind(path, HandlerKind::Default, Handler::new(0, executor))
    }

    pub fn on_error<F>(&mut self, path: &str, executor: F) -> &mut Self
    where
        F: Fn(&mut ExecutionContext<'_, E>) -> CommandResult<()> + Send + Sync + 'static,
    {
        self.bind(path, HandlerKind::Error, Handler::new(1, executor))
    }
}

pub struct CommandRegistry<E> {
    commands: Vec<RootCommand<E>>,
    labels: FxHashMap<String, usize>,
    parsers: ParserRegistry<E>,
    config: EngineConfig,
}

impl<E> Default for CommandRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> CommandRegistry<E> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            commands: Vec::new(),
            labels: FxHashMap::default(),
            parsers: ParserRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn register_parser(&mut self, name: &str, kind: impl ArgumentType<E> + 'static) {
        self.parsers.register(name, kind);
    }

    pub fn unregister_parser(&mut self, name: &str) -> bool {
        self.parsers.unregister(name)
    }

    pub fn parsers(&self) -> &ParserRegistry<E> {
        &self.parsers
    }

    /// Returns a builder for the root command labelled `label`, creating it
    /// on first use. `label` may list `|` separated aliases; the first one
    /// names the command. Aliases already taken by another command are left
    /// with that command.
    pub fn command(&mut self, label: &str) -> CommandBuilder<'_, E> {
        let aliases = label
            .split('|')
            .map(|alias| alias.trim().to_lowercase())
            .filter(|alias| !alias.is_empty())
            .collect::<Vec<_>>();

        let index = match aliases.first().and_then(|name| self.labels.get(name)) {
            Some(&index) => index,
            None => {
                let index = self.commands.len();
                self.commands.push(RootCommand {
                    aliases: Vec::new(),
                    tree: ArgTree::new(),
                });
                index
            }
        };

        for alias in aliases {
            if !self.labels.contains_key(&alias) {
                self.labels.insert(alias.clone(), index);
                self.commands[index].aliases.push(alias);
            }
        }

        CommandBuilder {
            tree: &mut self.commands[index].tree,
        }
    }

    pub fn get(&self, label: &str) -> Option<&RootCommand<E>> {
        self.labels
            .get(&label.to_lowercase())
            .map(|&index| &self.commands[index])
    }

    pub fn tree(&self, label: &str) -> Option<&ArgTree<E>> {
        self.get(label).map(RootCommand::tree)
    }

    pub fn commands(&self) -> impl Iterator<Item = &RootCommand<E>> {
        self.commands.iter().filter(|command| !command.aliases.is_empty())
    }

    pub fn resolver(&self, label: &str) -> Option<Resolver<'_, E>> {
        self.tree(label)
            .map(|tree| Resolver::new(tree, &self.parsers).with_config(&self.config))
    }

    pub fn dispatch(
        &self,
        env: &E,
        line: &str,
        base_args: &[Value],
    ) -> Option<CommandResult<Dispatch>> {
        let (label, rest) = split_label(line);
        let resolver = self.resolver(label)?;
        let mut ctx = resolver.context(env);
        Some(resolver.dispatch(rest.unwrap_or(""), &mut ctx, base_args))
    }

    pub fn execute(&self, env: &E, line: &str) -> bool {
        match self.dispatch(env, line, &[]) {
            Some(Ok(outcome)) => {
                debug!("'{}' dispatched to {:?}", line, outcome);
                true
            }
            Some(Err(err)) => {
                error!("Command '{}' failed: {}", line, err);
                false
            }
            None => false,
        }
    }

    pub fn complete(&self, env: &E, line: &str) -> Vec<String> {
        let (label, rest) = split_label(line);
        let Some(rest) = rest else {
            let label = label.to_lowercase();
            return self
                .commands()
                .flat_map(|command| command.aliases.iter())
                .filter(|alias| alias.starts_with(&label))
                .take(self.config.completion_limit)
                .cloned()
                .collect();
        };

        match self.resolver(label) {
            Some(resolver) => {
                let mut ctx = resolver.context(env);
                resolver.complete(resolver.tree().root(), Some(rest), &mut ctx)
            }
            None => Vec::new(),
        }
    }
}

fn split_label(line: &str) -> (&str, Option<&str>) {
    let line = line.trim_start();
    match line.split_once(' ') {
        Some((label, rest)) => (label, Some(rest)),
        None => (line, None),
    }
}
