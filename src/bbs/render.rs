//! Text layout for everything the session prints: greeting, message table, full
//! message view and help listings. Functions return plain text with `\n` between
//! lines; [`SessionIo::write_line`](super::io::SessionIo::write_line) turns each into
//! a CR+LF terminated line on the wire.

use crate::config::SessionConfig;
use crate::storage::Message;

use super::args::ArgKind;
use super::registry::{CommandDescriptor, CommandRegistry};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_line(callsign: &str) -> String {
    format!("[RSBBS-{}] listening on {}", VERSION, callsign)
}

pub fn greeting(config: &SessionConfig) -> String {
    let mut lines = vec![
        version_line(&config.callsign),
        format!("Welcome to {}, {}", config.bbs_name, config.calling_station),
    ];
    if !config.banner_message.is_empty() {
        lines.push(config.banner_message.clone());
    }
    lines.push("For help, enter 'h'".to_string());
    lines.join("\n")
}

/// Column header plus one row per message.
pub fn message_table(messages: &[Message]) -> String {
    let mut out = format!("{:<5} {:<9} {:<9} {:<11} {}", "MSG#", "TO", "FROM", "DATE", "SUBJECT");
    for m in messages {
        out.push('\n');
        out.push_str(&format!(
            "{:<5} {:<9} {:<9} {:<11} {}",
            m.id,
            m.recipient,
            m.sender,
            m.created_at.format("%Y-%m-%d").to_string(),
            m.subject
        ));
    }
    out
}

pub fn full_message(m: &Message) -> String {
    format!(
        "\nMessage: {}\nDate:    {}\nFrom:    {}\nTo:      {}\nSubject: {}\n\n{}",
        m.id,
        m.created_at.format("%A, %B %-d, %Y at %-I:%M %p UTC"),
        m.sender,
        m.recipient,
        m.subject,
        m.body.trim_end_matches(&['\r', '\n'][..])
    )
}

fn names_with_aliases(d: &CommandDescriptor) -> String {
    if d.aliases.is_empty() {
        d.name.to_string()
    } else {
        format!("{} ({})", d.name, d.aliases.join(", "))
    }
}

/// Every registered command, sorted by canonical name.
pub fn help_listing(registry: &CommandRegistry) -> String {
    let mut out = String::from("Commands:");
    for d in registry.sorted() {
        out.push_str(&format!("\n  {:<20} {}", names_with_aliases(d), d.help));
    }
    out.push_str("\nFor details on one command, enter 'help <command>'");
    out
}

pub fn command_help(d: &CommandDescriptor) -> String {
    let mut out = format!("usage: {}\n{}", d.usage(), d.help);
    if !d.aliases.is_empty() {
        out.push_str(&format!("\naliases: {}", d.aliases.join(", ")));
    }
    for arg in &d.args {
        let label = match arg.kind {
            ArgKind::Flag => format!("--{}", arg.name),
            ArgKind::Positional { .. } => arg.name.to_string(),
        };
        out.push_str(&format!("\n  {:<12} {}", label, arg.help));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Message {
        Message {
            id: 7,
            sender: "N0CALL".into(),
            recipient: "N1ABC".into(),
            subject: "Net tonight".into(),
            body: "See you on 145.050\nat 8pm\n".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
            is_private: false,
        }
    }

    #[test]
    fn table_columns_line_up() {
        let table = message_table(&[sample()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "MSG#  TO        FROM      DATE        SUBJECT");
        assert_eq!(lines[1], "7     N1ABC     N0CALL    2024-03-09  Net tonight");
    }

    #[test]
    fn full_message_layout() {
        let text = full_message(&sample());
        assert_eq!(
            text,
            "\nMessage: 7\nDate:    Saturday, March 9, 2024 at 2:05 PM UTC\nFrom:    N0CALL\nTo:      N1ABC\n\
             Subject: Net tonight\n\nSee you on 145.050\nat 8pm"
        );
    }

    #[test]
    fn greeting_skips_empty_banner() {
        let config = SessionConfig {
            callsign: "N0CALL-10".into(),
            bbs_name: "Test BBS".into(),
            banner_message: String::new(),
            command_prompt: ">".into(),
            calling_station: "N1ABC".into(),
            debug: false,
        };
        let text = greeting(&config);
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("[RSBBS-"));
        assert!(text.contains("Welcome to Test BBS, N1ABC"));
        assert!(text.ends_with("For help, enter 'h'"));
    }
}
