use async_trait::async_trait;

use crate::bbs::args::ParsedArgs;
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::session::SessionContext;
use crate::errors::Result;

struct HeardCommand;

#[async_trait]
impl CommandHandler for HeardCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, _args: ParsedArgs) -> Result<Flow> {
        let output = ctx.collaborators.heard().await?;
        ctx.write_line("Heard stations:").await?;
        ctx.write_line(&output).await?;
        Ok(Flow::Continue)
    }
}

pub fn heard() -> CommandDescriptor {
    CommandDescriptor::new("heard", HeardCommand)
        .aliases(&["j"])
        .help("Show heard stations log")
}
