//! The `portalnetwork` command set, run against an in-memory session.

use bcf_core::commands::{
    ArgumentType, CommandRegistry, NodeDescriptor, ParseError, ResolutionContext, Value,
};
use std::sync::{Mutex, PoisonError};
use tracing::info;

pub const PORTAL_TYPES: &[&str] = &["nether", "end", "hidden"];

const GIVE: &str =
    "give|g @portaltype(switch=type|t, default=NETHER) @player(required=true, default=%self, mode=online)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalBlock {
    pub owner: String,
    pub kind: String,
}

/// Who is typing, who else is around, and what has been handed out so far.
pub struct Session {
    name: String,
    online: Vec<String>,
    given: Mutex<Vec<PortalBlock>>,
    replies: Mutex<Vec<String>>,
}

impl Session {
    pub fn new(name: impl Into<String>, online: Vec<String>) -> Self {
        Self {
            name: name.into(),
            online,
            given: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_console(&self) -> bool {
        self.name.eq_ignore_ascii_case("console")
    }

    pub fn online(&self) -> &[String] {
        &self.online
    }

    pub fn reply(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.into());
    }

    pub fn take_replies(&self) -> Vec<String> {
        std::mem::take(&mut *self.replies.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn given(&self) -> Vec<PortalBlock> {
        self.given
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn give(&self, block: PortalBlock) {
        self.given
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(block);
    }
}

/// Name of a player.
///
/// `mode=online` only accepts players currently online, `mode=any` (the
/// default) accepts any name. `%self` is the player issuing the command.
pub struct PlayerArgument;

impl ArgumentType<Session> for PlayerArgument {
    fn result(
        &self,
        token: &str,
        descriptor: &NodeDescriptor,
        ctx: &ResolutionContext<'_, Session>,
    ) -> Result<Value, ParseError> {
        let session = ctx.env();
        if token == "%self" {
            if session.is_console() {
                return Err(ParseError::invalid("When console a player name is required"));
            }
            return Ok(Value::opaque(Player {
                name: session.name().to_string(),
            }));
        }

        let online = session
            .online()
            .iter()
            .find(|name| name.eq_ignore_ascii_case(token));

        match descriptor.parameter("mode").unwrap_or("any") {
            "online" => online
                .map(|name| Value::opaque(Player { name: name.clone() }))
                .ok_or_else(|| ParseError::invalid("No such player can be found online")),
            "any" => Ok(Value::opaque(Player {
                name: online.cloned().unwrap_or_else(|| token.to_string()),
            })),
            mode => Err(ParseError::invalid(format!("Invalid mode: {mode}"))),
        }
    }

    fn complete(
        &self,
        token: &str,
        _descriptor: &NodeDescriptor,
        ctx: &ResolutionContext<'_, Session>,
    ) -> Vec<String> {
        ctx.env()
            .online()
            .iter()
            .filter(|name| name.starts_with(token))
            .take(ctx.completion_limit())
            .cloned()
            .collect()
    }
}

pub struct PortalTypeArgument;

impl<E> ArgumentType<E> for PortalTypeArgument {
    fn result(
        &self,
        token: &str,
        _descriptor: &NodeDescriptor,
        _ctx: &ResolutionContext<'_, E>,
    ) -> Result<Value, ParseError> {
        let kind = token.to_lowercase();
        if PORTAL_TYPES.contains(&kind.as_str()) {
            Ok(Value::String(kind))
        } else {
            Err(ParseError::invalid(format!("Invalid Portal Type: {token}")))
        }
    }

    fn complete(
        &self,
        token: &str,
        _descriptor: &NodeDescriptor,
        ctx: &ResolutionContext<'_, E>,
    ) -> Vec<String> {
        let prefix = token.to_lowercase();
        PORTAL_TYPES
            .iter()
            .filter(|kind| kind.starts_with(&prefix))
            .take(ctx.completion_limit())
            .map(|kind| kind.to_string())
            .collect()
    }
}

pub fn register_commands(registry: &mut CommandRegistry<Session>) {
    registry.register_parser("player", PlayerArgument);
    registry.register_parser("portaltype", PortalTypeArgument);

    registry
        .command("portalnetwork|pn")
        .on_default("", |ctx| {
            let session = ctx.env();
            session.reply("========= [ PortalNetwork Help ] =========");
            session.reply("/pn reload - Reload the portal network");
            session.reply("/pn list - List handed out portal blocks");
            session.reply("/pn give [-type <type>] [player] - Give a player a portal block");
            Ok(())
        })
        .on_error("", |ctx| {
            ctx.env().reply(ctx.args().get_string(0)?);
            Ok(())
        })
        .on_execute("reload", 0, |ctx| {
            info!("{} reloaded the portal network", ctx.env().name());
            ctx.env().reply("Reloaded PortalNetwork");
            Ok(())
        })
        .on_execute("list", 0, |ctx| {
            let session = ctx.env();
            session.reply("========= [ List of Portals ] =========");
            for block in session.given() {
                session.reply(format!("[{}] {}", block.owner, block.kind));
            }
            session.reply("=====================================");
            Ok(())
        })
        .on_execute(GIVE, 2, |ctx| {
            let kind = ctx.args().get_string(0)?;
            let player = ctx.args().get_opaque::<Player>(1)?;
            let session = ctx.env();

            session.give(PortalBlock {
                owner: player.name.clone(),
                kind: kind.clone(),
            });
            session.reply(format!("Giving {} a {} portal block.", player.name, kind));
            Ok(())
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(name: &str) -> (CommandRegistry<Session>, Session) {
        let mut registry = CommandRegistry::new();
        register_commands(&mut registry);
        let session = Session::new(name, vec!["Steve".to_string(), "Alex".to_string()]);
        (registry, session)
    }

    #[test]
    fn give_defaults_to_self_and_nether() {
        let (registry, session) = setup("Steve");
        assert!(registry.execute(&session, "pn give"));
        assert_eq!(
            session.given(),
            [PortalBlock {
                owner: "Steve".to_string(),
                kind: "nether".to_string(),
            }]
        );
        assert_eq!(session.take_replies(), ["Giving Steve a nether portal block."]);
    }

    #[test]
    fn give_with_switch_after_player() {
        let (registry, session) = setup("Steve");
        assert!(registry.execute(&session, "portalnetwork g alex -t END"));
        assert_eq!(session.take_replies(), ["Giving Alex a end portal block."]);
    }

    #[test]
    fn validation_failures_reach_the_error_handler() {
        let (registry, session) = setup("Steve");
        registry.execute(&session, "pn give -t void");
        registry.execute(&session, "pn give bob");
        assert_eq!(
            session.take_replies(),
            ["Invalid Portal Type: void", "No such player can be found online"]
        );
        assert!(session.given().is_empty());

        let (registry, console) = setup("console");
        registry.execute(&console, "pn give");
        assert_eq!(
            console.take_replies(),
            ["When console a player name is required"]
        );
    }

    #[test]
    fn bare_label_shows_help() {
        let (registry, session) = setup("Steve");
        registry.execute(&session, "pn");
        registry.execute(&session, "pn nonsense");
        let replies = session.take_replies();
        assert_eq!(replies.len(), 8);
        assert_eq!(replies[0], "========= [ PortalNetwork Help ] =========");
    }

    #[test]
    fn list_shows_given_blocks() {
        let (registry, session) = setup("Steve");
        registry.execute(&session, "pn give -type hidden Alex");
        session.take_replies();
        registry.execute(&session, "pn list");
        assert_eq!(
            session.take_replies(),
            [
                "========= [ List of Portals ] =========",
                "[Alex] hidden",
                "====================================="
            ]
        );
    }

    #[test]
    fn completions() {
        let (registry, session) = setup("Steve");
        assert_eq!(registry.complete(&session, "pn "), ["reload", "list", "give"]);
        assert_eq!(registry.complete(&session, "pn give "), ["Steve", "Alex"]);
        assert_eq!(registry.complete(&session, "pn g -t "), PORTAL_TYPES);
        assert_eq!(registry.complete(&session, "pn g -t e"), ["end"]);
        assert_eq!(registry.complete(&session, "pn g -"), ["-type"]);
        assert_eq!(registry.complete(&session, "pn give -t end A"), ["Alex"]);
    }
}
