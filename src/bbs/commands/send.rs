use async_trait::async_trait;
use log::{debug, info};

use crate::bbs::args::{ArgSpec, ParsedArgs};
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::session::SessionContext;
use crate::errors::{BbsError, Result};
use crate::logutil::escape_log;
use crate::storage::NewMessage;
use crate::validation::validate_callsign;

const BODY_PROMPT: &str = "Message - end with /ex on a single line:";

struct SendCommand {
    private: bool,
}

/// A flag given with a blank value counts as missing and is prompted for.
fn supplied(args: &mut ParsedArgs, name: &str) -> Option<String> {
    args.take(name).filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl CommandHandler for SendCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, mut args: ParsedArgs) -> Result<Flow> {
        let recipient = match supplied(&mut args, "callsign") {
            Some(call) => call,
            None => ctx.io.read_line("Callsign:").await?,
        };
        let recipient = validate_callsign(&recipient)
            .map_err(|e| BbsError::InvalidInput(format!("{}.", e)))?;
        let subject = match supplied(&mut args, "subject") {
            Some(subject) => subject,
            None => ctx.io.read_line("Subject:").await?,
        };
        let body = match args.take("message") {
            Some(body) => body,
            None => ctx.io.read_multiline(BODY_PROMPT).await?,
        };

        let sender = ctx.caller();
        let message = ctx.store.create_message(&NewMessage {
            sender,
            recipient: &recipient,
            subject: &subject,
            body: &body,
            is_private: self.private,
        })?;
        info!(
            "{} saved message {} with subject {}",
            message.sender,
            message.id,
            escape_log(&message.subject)
        );
        debug!("message {} body: {}", message.id, escape_log(&message.body).limit(40));
        ctx.write_line("Message saved!").await?;
        Ok(Flow::Continue)
    }
}

fn with_message_args(descriptor: CommandDescriptor) -> CommandDescriptor {
    descriptor
        .arg(ArgSpec::optional("callsign", "Message recipient callsign"))
        .arg(ArgSpec::flag("subject", "Message subject"))
        .arg(ArgSpec::flag("message", "Message"))
}

pub fn send() -> CommandDescriptor {
    with_message_args(
        CommandDescriptor::new("send", SendCommand { private: false })
            .aliases(&["s"])
            .help("Send a new public message"),
    )
}

pub fn sendp() -> CommandDescriptor {
    with_message_args(
        CommandDescriptor::new("sendp", SendCommand { private: true })
            .aliases(&["sp"])
            .help("Send a new private message"),
    )
}
