use async_trait::async_trait;
use log::info;

use crate::bbs::args::{ArgSpec, ParsedArgs};
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::session::SessionContext;
use crate::errors::{BbsError, Result};

const CONFIRM_PROMPT: &str = "Delete all messages addressed to you? Y/N:";

struct DeleteCommand;

#[async_trait]
impl CommandHandler for DeleteCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, args: ParsedArgs) -> Result<Flow> {
        let id = args
            .number("number")?
            .ok_or_else(|| BbsError::Parse("missing message number".to_string()))?;
        let caller = ctx.caller();
        if ctx.store.delete_message(id, caller)? {
            ctx.write_line(&format!("Deleted message #{}", id)).await?;
            return Ok(Flow::Continue);
        }
        // Private messages to someone else are indistinguishable from missing ones.
        match ctx.store.get_message(id)? {
            Some(message) if message.is_visible_to(caller) => Err(BbsError::Permission(format!(
                "Message #{} is not addressed to you.",
                id
            ))),
            _ => Err(BbsError::NotFound("Message not found.".to_string())),
        }
    }
}

struct DeleteAllCommand;

#[async_trait]
impl CommandHandler for DeleteAllCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, _args: ParsedArgs) -> Result<Flow> {
        let answer = ctx.io.read_line(CONFIRM_PROMPT).await?;
        if !answer.eq_ignore_ascii_case("y") {
            return Ok(Flow::Continue);
        }
        let caller = ctx.caller();
        let result = ctx.store.delete_all_addressed_to(caller)?;
        if !result.deleted.is_empty() {
            info!("{} bulk-deleted {}", caller, result.id_list());
        }
        if result.count == 0 {
            ctx.write_line("No messages to delete.").await?;
        } else {
            ctx.write_line(&format!("Deleted {} messages", result.count))
                .await?;
        }
        Ok(Flow::Continue)
    }
}

pub fn delete() -> CommandDescriptor {
    CommandDescriptor::new("delete", DeleteCommand)
        .aliases(&["d", "k"])
        .help("Delete a message addressed to you")
        .arg(ArgSpec::required("number", "Message number to delete"))
}

pub fn deletem() -> CommandDescriptor {
    CommandDescriptor::new("deletem", DeleteAllCommand)
        .aliases(&["dm", "km"])
        .help("Delete all messages addressed to you")
}
