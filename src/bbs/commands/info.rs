use async_trait::async_trait;

use crate::bbs::args::ParsedArgs;
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::session::SessionContext;
use crate::errors::Result;

struct InfoCommand;

#[async_trait]
impl CommandHandler for InfoCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, _args: ParsedArgs) -> Result<Flow> {
        let text = ctx.collaborators.info_text().await?;
        ctx.write_line(text.trim_end()).await?;
        Ok(Flow::Continue)
    }
}

pub fn info() -> CommandDescriptor {
    CommandDescriptor::new("info", InfoCommand)
        .aliases(&["i"])
        .help("Information about this BBS")
}
