use async_trait::async_trait;

use crate::bbs::args::{ArgSpec, ParsedArgs};
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::render;
use crate::bbs::session::SessionContext;
use crate::errors::{BbsError, Result};
use crate::storage::Message;

/// Print one message in full and record the read receipt.
async fn show_message(ctx: &mut SessionContext<'_>, message: &Message) -> Result<()> {
    ctx.write_line(&render::full_message(message)).await?;
    ctx.store.mark_read(ctx.user.id, message.id)?;
    Ok(())
}

struct ReadCommand;

#[async_trait]
impl CommandHandler for ReadCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, args: ParsedArgs) -> Result<Flow> {
        let id = args
            .number("number")?
            .ok_or_else(|| BbsError::Parse("missing message number".to_string()))?;
        match ctx.store.get_message(id)? {
            Some(message) if message.is_visible_to(ctx.caller()) => {
                show_message(ctx, &message).await?;
                Ok(Flow::Continue)
            }
            _ => Err(BbsError::NotFound("Message not found.".to_string())),
        }
    }
}

struct ReadAllCommand {
    unread_only: bool,
}

#[async_trait]
impl CommandHandler for ReadAllCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, _args: ParsedArgs) -> Result<Flow> {
        let caller = ctx.caller();
        let messages = if self.unread_only {
            ctx.store.list_unread(caller, ctx.user.id)?
        } else {
            ctx.store.list_addressed(caller)?
        };
        if messages.is_empty() {
            ctx.write_line("No messages to read.").await?;
            return Ok(Flow::Continue);
        }
        ctx.write_line(&format!("Reading {} messages:", messages.len()))
            .await?;
        for message in &messages {
            show_message(ctx, message).await?;
            ctx.io.read_enter("Enter to continue...").await?;
        }
        Ok(Flow::Continue)
    }
}

pub fn read() -> CommandDescriptor {
    CommandDescriptor::new("read", ReadCommand)
        .aliases(&["r"])
        .help("Read a message")
        .arg(ArgSpec::required("number", "Message number to read"))
}

pub fn readm() -> CommandDescriptor {
    CommandDescriptor::new("readm", ReadAllCommand { unread_only: false })
        .aliases(&["rm"])
        .help("Read all messages addressed to you")
}

pub fn readnew() -> CommandDescriptor {
    CommandDescriptor::new("readnew", ReadAllCommand { unread_only: true })
        .aliases(&["rn"])
        .help("Read unread messages addressed to you")
}
