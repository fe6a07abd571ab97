use async_trait::async_trait;

use crate::bbs::args::ParsedArgs;
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::render;
use crate::bbs::session::SessionContext;
use crate::errors::Result;

struct ListCommand {
    addressed_only: bool,
}

#[async_trait]
impl CommandHandler for ListCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, _args: ParsedArgs) -> Result<Flow> {
        let caller = ctx.caller();
        let messages = if self.addressed_only {
            ctx.store.list_addressed(caller)?
        } else {
            ctx.store.list_public_or_addressed(caller)?
        };
        if messages.is_empty() {
            ctx.write_line("No messages.").await?;
        } else {
            ctx.write_line(&render::message_table(&messages)).await?;
        }
        Ok(Flow::Continue)
    }
}

pub fn list() -> CommandDescriptor {
    CommandDescriptor::new(
        "list",
        ListCommand {
            addressed_only: false,
        },
    )
    .aliases(&["l"])
    .help("List all public messages and private messages to you")
}

pub fn listm() -> CommandDescriptor {
    CommandDescriptor::new(
        "listm",
        ListCommand {
            addressed_only: true,
        },
    )
    .aliases(&["lm"])
    .help("List only messages addressed to you")
}
