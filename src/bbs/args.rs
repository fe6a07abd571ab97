//! Command-line tokenizing and per-command argument parsing.
//!
//! A command line is `<verb> [positional ...] [--flag value ...]`. Tokens split on
//! whitespace; a double-quoted segment stays one token (`--subject "Field day"`).
//! Parsing never exits or prints: every failure is a [`BbsError::Parse`] and the
//! session engine decides what (if anything) the caller sees.

use std::collections::HashMap;

use crate::errors::{BbsError, Result};

/// How one named parameter is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Bare token in declaration order.
    Positional { required: bool },
    /// `--name value` or `--name=value`.
    Flag,
}

/// One entry of a command's argument spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub help: &'static str,
}

impl ArgSpec {
    pub const fn required(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Positional { required: true },
            help,
        }
    }

    pub const fn optional(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Positional { required: false },
            help,
        }
    }

    pub const fn flag(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Flag,
            help,
        }
    }

    /// Usage fragment, e.g. `<number>`, `[callsign]`, `[--subject SUBJECT]`.
    pub fn usage(&self) -> String {
        match self.kind {
            ArgKind::Positional { required: true } => format!("<{}>", self.name),
            ArgKind::Positional { required: false } => format!("[{}]", self.name),
            ArgKind::Flag => format!("[--{} {}]", self.name, self.name.to_uppercase()),
        }
    }
}

/// Values bound to a command's argument spec, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    values: HashMap<&'static str, String>,
}

impl ParsedArgs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Take ownership of a value (used when a handler fills in missing fields interactively).
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Parse a positional as a message number (positive integer).
    pub fn number(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => match raw.trim_start_matches('#').parse::<i64>() {
                Ok(n) if n > 0 => Ok(Some(n)),
                _ => Err(BbsError::Parse(format!("{} must be a message number, got '{}'", name, raw))),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split a raw command line into tokens, honouring double quotes.
///
/// An unterminated quote runs to the end of the line.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Bind `tokens` (everything after the verb) to `spec`.
pub fn parse_args(spec: &[ArgSpec], tokens: &[String]) -> Result<ParsedArgs> {
    let mut values = HashMap::new();
    let mut positionals = spec
        .iter()
        .filter(|a| matches!(a.kind, ArgKind::Positional { .. }));
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        if let Some(flag) = token.strip_prefix("--") {
            let (name, inline) = match flag.split_once('=') {
                Some((n, v)) => (n, Some(v.to_string())),
                None => (flag, None),
            };
            let arg = spec
                .iter()
                .find(|a| a.kind == ArgKind::Flag && a.name == name)
                .ok_or_else(|| BbsError::Parse(format!("unrecognized option --{}", name)))?;
            let value = match inline {
                Some(v) => v,
                None => iter
                    .next()
                    .cloned()
                    .ok_or_else(|| BbsError::Parse(format!("option --{} needs a value", name)))?,
            };
            values.insert(arg.name, value);
        } else {
            let arg = positionals
                .next()
                .ok_or_else(|| BbsError::Parse(format!("unexpected argument '{}'", token)))?;
            values.insert(arg.name, token.clone());
        }
    }

    for missing in positionals {
        if missing.kind == (ArgKind::Positional { required: true }) {
            return Err(BbsError::Parse(format!("missing required argument <{}>", missing.name)));
        }
    }
    Ok(ParsedArgs { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        tokenize(line)
    }

    const SEND_SPEC: [ArgSpec; 3] = [
        ArgSpec::optional("callsign", "Message recipient callsign"),
        ArgSpec::flag("subject", "Message subject"),
        ArgSpec::flag("message", "Message"),
    ];

    #[test]
    fn tokenizer_honours_quotes() {
        assert_eq!(toks("  send  N1ABC  "), vec!["send", "N1ABC"]);
        assert_eq!(
            toks(r#"s N1ABC --subject "Field day" --message "say \"hi\"""#),
            vec!["s", "N1ABC", "--subject", "Field day", "--message", "say \"hi\""]
        );
        assert_eq!(toks(r#"s --subject """#), vec!["s", "--subject", ""]);
        assert!(toks("   ").is_empty());
    }

    #[test]
    fn binds_positionals_and_flags() {
        let args = parse_args(&SEND_SPEC, &toks("N1ABC --subject Test --message=Hi")).unwrap();
        assert_eq!(args.get("callsign"), Some("N1ABC"));
        assert_eq!(args.get("subject"), Some("Test"));
        assert_eq!(args.get("message"), Some("Hi"));
    }

    #[test]
    fn optional_positional_may_be_absent() {
        let args = parse_args(&SEND_SPEC, &toks("--subject Test")).unwrap();
        assert_eq!(args.get("callsign"), None);
        assert!(parse_args(&SEND_SPEC, &[]).unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_argument_sets() {
        let read = [ArgSpec::required("number", "Message number to read")];
        assert!(matches!(parse_args(&read, &[]), Err(BbsError::Parse(_))));
        assert!(matches!(parse_args(&read, &toks("1 2")), Err(BbsError::Parse(_))));
        assert!(matches!(parse_args(&read, &toks("1 --force")), Err(BbsError::Parse(_))));
        assert!(matches!(parse_args(&SEND_SPEC, &toks("N1ABC --subject")), Err(BbsError::Parse(_))));
    }

    #[test]
    fn numbers_must_be_positive_integers() {
        let read = [ArgSpec::required("number", "Message number to read")];
        let ok = parse_args(&read, &toks("#12")).unwrap();
        assert_eq!(ok.number("number").unwrap(), Some(12));
        for bad in ["abc", "0", "-3", "1.5"] {
            let args = parse_args(&read, &toks(bad)).unwrap();
            assert!(args.number("number").is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn usage_fragments() {
        assert_eq!(ArgSpec::required("number", "").usage(), "<number>");
        assert_eq!(SEND_SPEC[0].usage(), "[callsign]");
        assert_eq!(SEND_SPEC[1].usage(), "[--subject SUBJECT]");
    }
}
