//! Command descriptors and the registry that resolves verbs and aliases to handlers.
//!
//! Every command lives in its own module under [`crate::bbs::commands`] and contributes
//! one [`CommandDescriptor`]. The registry is assembled once at session start from that
//! static list; names and aliases share one namespace and a collision is a
//! registration-time error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::args::{ArgSpec, ParsedArgs};
use super::session::SessionContext;
use crate::errors::{BbsError, Result};

/// What the session loop does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Disconnect,
}

/// The behaviour bound to a command descriptor.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &mut SessionContext<'_>, args: ParsedArgs) -> Result<Flow>;
}

/// Canonical verb, aliases, help and argument spec plus the handler that implements it.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub help: &'static str,
    pub args: Vec<ArgSpec>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new(name: &'static str, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name,
            aliases: &[],
            help: "",
            args: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// One-line usage, e.g. `read <number>`.
    pub fn usage(&self) -> String {
        let mut line = self.name.to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.usage());
        }
        line
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("help", &self.help)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command token '{token}' for '{command}' is already registered by '{existing}'")]
    Collision {
        token: String,
        command: String,
        existing: String,
    },
}

/// Ordered table of registered commands.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    names: HashMap<&'static str, usize>,
    aliases: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of descriptors, stopping at the first collision.
    pub fn with_commands(
        descriptors: impl IntoIterator<Item = CommandDescriptor>,
    ) -> std::result::Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Add a command. Its name and every alias must be unused by all registered names and aliases.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> std::result::Result<(), RegistryError> {
        let mut tokens = vec![descriptor.name];
        tokens.extend_from_slice(descriptor.aliases);
        for (i, token) in tokens.iter().enumerate() {
            if let Some(existing) = self.owner_of(token) {
                return Err(RegistryError::Collision {
                    token: token.to_string(),
                    command: descriptor.name.to_string(),
                    existing: existing.to_string(),
                });
            }
            if tokens[..i].contains(token) {
                return Err(RegistryError::Collision {
                    token: token.to_string(),
                    command: descriptor.name.to_string(),
                    existing: descriptor.name.to_string(),
                });
            }
        }
        let idx = self.commands.len();
        self.names.insert(descriptor.name, idx);
        for alias in descriptor.aliases {
            self.aliases.insert(*alias, idx);
        }
        log::debug!("registered command {} {:?}", descriptor.name, descriptor.aliases);
        self.commands.push(descriptor);
        Ok(())
    }

    fn owner_of(&self, token: &str) -> Option<&'static str> {
        self.names
            .get(token)
            .or_else(|| self.aliases.get(token))
            .map(|idx| self.commands[*idx].name)
    }

    /// Resolve a verb: canonical names first, then aliases. Case-sensitive.
    pub fn resolve(&self, token: &str) -> Result<&CommandDescriptor> {
        self.names
            .get(token)
            .or_else(|| self.aliases.get(token))
            .map(|idx| &self.commands[*idx])
            .ok_or_else(|| BbsError::Parse(format!("unrecognized command '{}'", token)))
    }

    /// All commands sorted by canonical name.
    pub fn sorted(&self) -> Vec<&CommandDescriptor> {
        let mut all: Vec<&CommandDescriptor> = self.commands.iter().collect();
        all.sort_by_key(|d| d.name);
        all
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
