use async_trait::async_trait;

use crate::bbs::args::ParsedArgs;
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::session::SessionContext;
use crate::errors::Result;

struct ByeCommand;

#[async_trait]
impl CommandHandler for ByeCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, _args: ParsedArgs) -> Result<Flow> {
        ctx.write_line("Bye!").await?;
        Ok(Flow::Disconnect)
    }
}

pub fn bye() -> CommandDescriptor {
    CommandDescriptor::new("bye", ByeCommand)
        .aliases(&["b", "q"])
        .help("Sign off and disconnect")
}
