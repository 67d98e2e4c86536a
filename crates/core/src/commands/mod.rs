mod argument;
mod argument_parser;
mod argument_set;
mod autocomplete;
mod context;
mod error;
mod executor;
mod node;
mod registry;
mod resolver;
mod spec;
mod value;

pub use argument::{ArgumentType, Consumed, Parser};
pub use argument_parser::{consume_token, DoubleType, IntegerType, LiteralType, StringType};
pub use argument_set::ArgumentSet;
pub use context::{ExecutionContext, ResolutionContext, DEFAULT_COMPLETION_LIMIT};
pub use error::{CommandError, CommandResult, InternalError, ParseError, RuntimeError};
pub use executor::Dispatch;
pub use node::{ArgNode, ArgTree, Executor, Handler, HandlerKind, NodeId};
pub use registry::{CommandBuilder, CommandRegistry, ParserRegistry, RootCommand};
pub use resolver::Resolver;
pub use spec::{parse_spec, NodeDescriptor, SpecReader};
pub use value::Value;
