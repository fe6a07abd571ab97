use async_trait::async_trait;

use crate::bbs::args::{ArgSpec, ParsedArgs};
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::render;
use crate::bbs::session::SessionContext;
use crate::errors::Result;

struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, args: ParsedArgs) -> Result<Flow> {
        let text = match args.get("command") {
            Some(name) => render::command_help(ctx.registry.resolve(name)?),
            None => render::help_listing(ctx.registry),
        };
        ctx.write_line(&text).await?;
        Ok(Flow::Continue)
    }
}

pub fn help() -> CommandDescriptor {
    CommandDescriptor::new("help", HelpCommand)
        .aliases(&["h", "?"])
        .help("Show help")
        .arg(ArgSpec::optional("command", "Show usage for one command"))
}
