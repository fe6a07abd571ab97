use async_trait::async_trait;

use crate::bbs::args::ParsedArgs;
use crate::bbs::registry::{CommandDescriptor, CommandHandler, Flow};
use crate::bbs::render;
use crate::bbs::session::SessionContext;
use crate::errors::Result;

struct StatsCommand;

#[async_trait]
impl CommandHandler for StatsCommand {
    async fn run(&self, ctx: &mut SessionContext<'_>, _args: ParsedArgs) -> Result<Flow> {
        let users = ctx.store.count_users()?;
        let messages = ctx.store.count_messages()?;
        let uptime = match ctx.collaborators.uptime().await {
            Ok(out) => out.trim().to_string(),
            Err(_) => "not available".to_string(),
        };
        let text = format!(
            "{}\nUsers: {}\nMessages: {}\nUptime: {}",
            render::version_line(&ctx.config.callsign),
            users,
            messages,
            uptime
        );
        ctx.write_line(&text).await?;
        Ok(Flow::Continue)
    }
}

pub fn stats() -> CommandDescriptor {
    CommandDescriptor::new("stats", StatsCommand)
        .aliases(&["st"])
        .help("Show system statistics")
}
