//! Built-in command set.
//!
//! Each submodule contributes one or more [`CommandDescriptor`]s. [`builtin_commands`]
//! is the static plugin list: adding a command means adding a module and one entry
//! there. Names and aliases must stay unique across the whole list; the registry
//! refuses to start otherwise.

use super::registry::{CommandDescriptor, CommandRegistry, RegistryError};

mod bye;
mod delete;
mod heard;
mod help;
mod info;
mod list;
mod read;
mod send;
mod stats;

/// Every built-in command, in registration order.
pub fn builtin_commands() -> Vec<CommandDescriptor> {
    vec![
        list::list(),
        list::listm(),
        read::read(),
        read::readm(),
        read::readnew(),
        send::send(),
        send::sendp(),
        delete::delete(),
        delete::deletem(),
        heard::heard(),
        help::help(),
        bye::bye(),
        stats::stats(),
        info::info(),
    ]
}

/// Registry holding the built-in command set.
pub fn builtin_registry() -> Result<CommandRegistry, RegistryError> {
    CommandRegistry::with_commands(builtin_commands())
}
