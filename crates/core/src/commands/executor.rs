use super::{argument_set::ArgumentSet, context::ExecutionContext};
use crate::commands::{
    context::ResolutionContext,
    error::{CommandResult, ParseError},
    node::{Handler, HandlerKind, NodeId},
    resolver::Resolver,
    value::Value,
};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Error,
    Execute,
    Default,
    NoOp,
    /// A value failed validation and no error handler was found on the path.
    /// Only produced when unhandled errors are configured to be reported.
    Unhandled(String),
}

impl<'a, E> Resolver<'a, E> {
    pub fn dispatch(
        &self,
        line: &str,
        ctx: &mut ResolutionContext<'a, E>,
        base_args: &[Value],
    ) -> CommandResult<Dispatch> {
        let root = self.tree().root();
        let line = line.trim();
        let input = (!line.is_empty()).then_some(line);
        let resolved = self.resolve(root, input, ctx);
        debug!("Resolved {} argument(s) from '{}'", resolved.len(), line);

        let mut path = vec![root];
        let mut values = Vec::new();

        for parser in resolved {
            // Switches are resolved as placeholders; use the parser that took the value.
            let mut parser = match ctx.consumed(parser.node()) {
                Some(consumed) => consumed.clone(),
                None => parser,
            };
            if !parser.is_parsed() && parser.parse(None).is_err() {
                break;
            }
            path.push(parser.node());

            match parser.result(ctx) {
                Ok(value) => {
                    if !parser.is_suppressed() {
                        values.push(value);
                    }
                }
                Err(ParseError::InvalidResult { message }) => {
                    return self.report_error(&path, message, ctx, base_args);
                }
                Err(err) => {
                    warn!("Argument '{}' of '{}': {}", parser.descriptor(), line, err);
                    return Ok(Dispatch::NoOp);
                }
            }
        }

        let last = path.last().copied().unwrap_or(root);
        if let Some(handler) = self.tree().handler(last, HandlerKind::Execute) {
            let mut args = base_args.to_vec();
            args.extend(values);
            if args.len() < handler.arity() {
                args.resize(handler.arity(), Value::Null);
            }
            invoke(handler, ctx, args)?;
            return Ok(Dispatch::Execute);
        }

        match self.nearest(&path, HandlerKind::Default) {
            Some(handler) => {
                invoke(handler, ctx, base_args.to_vec())?;
                Ok(Dispatch::Default)
            }
            None => Ok(Dispatch::NoOp),
        }
    }

    pub fn execute(
        &self,
        line: &str,
        ctx: &mut ResolutionContext<'a, E>,
        base_args: &[Value],
    ) -> bool {
        match self.dispatch(line, ctx, base_args) {
            Ok(_) => true,
            Err(err) => {
                error!("Handler for '{}' failed: {}", line, err);
                false
            }
        }
    }

    fn nearest(&self, path: &[NodeId], kind: HandlerKind) -> Option<&'a Handler<E>> {
        path.iter()
            .rev()
            .find_map(|&node| self.tree().handler(node, kind))
    }

    fn report_error(
        &self,
        path: &[NodeId],
        message: String,
        ctx: &ResolutionContext<'a, E>,
        base_args: &[Value],
    ) -> CommandResult<Dispatch> {
        let Some(handler) = self.nearest(path, HandlerKind::Error) else {
            if self.report_unhandled_errors {
                return Ok(Dispatch::Unhandled(message));
            }
            warn!("Dropping argument error with no handler: {}", message);
            return Ok(Dispatch::NoOp);
        };

        let mut args = base_args.to_vec();
        args.push(Value::String(message));
        invoke(handler, ctx, args)?;
        Ok(Dispatch::Error)
    }
}

fn invoke<E>(
    handler: &Handler<E>,
    ctx: &ResolutionContext<'_, E>,
    args: Vec<Value>,
) -> CommandResult<()> {
    let mut exec_ctx = ExecutionContext::new(ctx.env(), ArgumentSet::new(args));
    handler.invoke(&mut exec_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{error::CommandError, node::ArgTree, registry::ParserRegistry};
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(&'static str, Vec<Value>)>>>;

    fn recorder(calls: &Calls, name: &'static str, arity: usize) -> Handler<()> {
        let calls = calls.clone();
        Handler::new(arity, move |ctx| {
            calls
                .lock()
                .unwrap()
                .push((name, ctx.args().iter().cloned().collect()));
            Ok(())
        })
    }

    fn bind(tree: &mut ArgTree<()>, path: &str, kind: HandlerKind, handler: Handler<()>) {
        let root = tree.root();
        for leaf in tree.insert(root, path) {
            tree.bind(leaf, kind, handler.clone());
        }
    }

    fn portal_tree(calls: &Calls) -> ArgTree<()> {
        let mut tree = ArgTree::new();
        bind(&mut tree, "", HandlerKind::Default, recorder(calls, "help", 0));
        bind(&mut tree, "", HandlerKind::Error, recorder(calls, "error", 1));
        bind(&mut tree, "list", HandlerKind::Execute, recorder(calls, "list", 0));
        bind(
            &mut tree,
            "give|g @string(switch=type|t, default=NETHER) @string @int(min=1, max=5, required=false)",
            HandlerKind::Execute,
            recorder(calls, "give", 4),
        );
        tree
    }

    fn run(tree: &ArgTree<()>, line: &str) -> CommandResult<Dispatch> {
        let parsers = ParserRegistry::new();
        let resolver = Resolver::new(tree, &parsers);
        let mut ctx = resolver.context(&());
        resolver.dispatch(line, &mut ctx, &[Value::from("console")])
    }

    #[test]
    fn execute_receives_values_in_path_order() {
        let calls = Calls::default();
        let tree = portal_tree(&calls);

        assert_eq!(run(&tree, "g steve 2").unwrap(), Dispatch::Execute);
        assert_eq!(run(&tree, "give -t END alex").unwrap(), Dispatch::Execute);

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0],
            (
                "give",
                vec![
                    Value::from("console"),
                    Value::from("NETHER"),
                    Value::from("steve"),
                    Value::Integer(2),
                ]
            )
        );
        // The optional int is absent and the handler is padded to its arity.
        assert_eq!(
            calls[1],
            (
                "give",
                vec![
                    Value::from("console"),
                    Value::from("END"),
                    Value::from("alex"),
                    Value::Null,
                ]
            )
        );
    }

    #[test]
    fn invalid_value_goes_to_nearest_error_handler() {
        let calls = Calls::default();
        let tree = portal_tree(&calls);

        assert_eq!(run(&tree, "give steve 9").unwrap(), Dispatch::Error);
        assert_eq!(
            *calls.lock().unwrap(),
            [(
                "error",
                vec![Value::from("console"), Value::from("9 is greater than 5")]
            )]
        );
    }

    #[test]
    fn dead_end_falls_back_to_default() {
        let calls = Calls::default();
        let tree = portal_tree(&calls);

        assert_eq!(run(&tree, "").unwrap(), Dispatch::Default);
        assert_eq!(run(&tree, "give").unwrap(), Dispatch::Default);
        assert_eq!(run(&tree, "unknown words").unwrap(), Dispatch::Default);
        assert!(calls
            .lock()
            .unwrap()
            .iter()
            .all(|(name, args)| *name == "help" && args == &[Value::from("console")]));
    }

    #[test]
    fn unhandled_error_without_handler() {
        let calls = Calls::default();
        let mut tree = ArgTree::new();
        bind(&mut tree, "set @int(max=3)", HandlerKind::Execute, recorder(&calls, "set", 1));

        assert_eq!(run(&tree, "set 4").unwrap(), Dispatch::NoOp);
        assert_eq!(run(&tree, "set 2").unwrap(), Dispatch::Execute);

        let parsers = ParserRegistry::new();
        let config = crate::EngineConfig {
            report_unhandled_errors: true,
            ..Default::default()
        };
        let resolver = Resolver::new(&tree, &parsers).with_config(&config);
        let mut ctx = resolver.context(&());
        assert_eq!(
            resolver.dispatch("set 4", &mut ctx, &[]).unwrap(),
            Dispatch::Unhandled("4 is greater than 3".to_string())
        );
    }

    #[test]
    fn handler_failure_is_returned_and_logged() {
        let mut tree = ArgTree::<()>::new();
        bind(
            &mut tree,
            "fail",
            HandlerKind::Execute,
            Handler::new(0, |_| Err(CommandError::runtime("nope"))),
        );

        assert!(matches!(run(&tree, "fail"), Err(CommandError::Runtime(_))));

        let parsers = ParserRegistry::new();
        let resolver = Resolver::new(&tree, &parsers);
        let mut ctx = resolver.context(&());
        assert!(!resolver.execute("fail", &mut ctx, &[]));
    }
}
