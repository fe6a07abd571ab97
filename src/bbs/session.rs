use log::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::errors::{BbsError, Result};
use crate::logutil::escape_log;
use crate::storage::{Store, User};

use super::args::{parse_args, tokenize};
use super::collaborators::Collaborators;
use super::io::SessionIo;
use super::registry::{CommandRegistry, Flow};
use super::render;

/// # Session State Machine
///
/// One connected caller moves through these states:
///
/// 1. **Greeting** - banner written once at start
/// 2. **Prompt** - command prompt written
/// 3. **AwaitInput** - blocked on the next command line
/// 4. **Dispatch** - verb resolved, arguments parsed, handler run
/// 5. **Terminated** - `bye` or end of stream
///
/// From `Dispatch` the session always returns to `Prompt` unless the handler asked to
/// disconnect or the caller's link is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Greeting,
    Prompt,
    AwaitInput,
    Dispatch(Vec<String>),
    Terminated,
}

/// What a command handler gets to work with for one invocation.
///
/// Nothing here outlives the call: handlers re-read from the store every time.
pub struct SessionContext<'a> {
    pub io: &'a mut SessionIo,
    pub store: &'a mut Store,
    pub config: &'a SessionConfig,
    pub collaborators: &'a Collaborators,
    pub registry: &'a CommandRegistry,
    /// The caller's user record as looked up at session start.
    pub user: &'a User,
}

impl<'a> SessionContext<'a> {
    /// Upper-cased callsign of the connected operator.
    pub fn caller(&self) -> &'a str {
        let config: &'a SessionConfig = self.config;
        &config.calling_station
    }

    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        self.io.write_line(text).await
    }
}

/// Runs one caller's session from greeting to disconnect.
pub struct SessionEngine {
    config: SessionConfig,
    collaborators: Collaborators,
    store: Store,
    registry: CommandRegistry,
    io: SessionIo,
    state: SessionState,
}

impl SessionEngine {
    pub fn new(
        config: SessionConfig,
        collaborators: Collaborators,
        store: Store,
        registry: CommandRegistry,
        io: SessionIo,
    ) -> Self {
        Self {
            config,
            collaborators,
            store,
            registry,
            io,
            state: SessionState::Greeting,
        }
    }

    /// Drive the session until `bye` or end of stream.
    ///
    /// Only a storage fault while looking up the caller's user record is returned as an
    /// error; everything after that is handled inside the dispatch step.
    pub async fn run(mut self) -> Result<()> {
        let user = self.start_session()?;
        while self.state != SessionState::Terminated {
            self.state = self.step(&user).await;
        }
        if let Err(e) = self.io.shutdown().await {
            debug!("output already closed: {}", e);
        }
        info!("session ended for {}", self.config.calling_station);
        Ok(())
    }

    /// Get-or-create the caller's user and record the login for a returning user.
    fn start_session(&mut self) -> Result<User> {
        let (mut user, created) = self.store.find_or_create_user(&self.config.calling_station)?;
        if created {
            info!("new user {} connected", user.callsign);
        } else if let Some(previous) = self.store.record_login(user.id)? {
            user.login_count += 1;
            info!(
                "{} connected (login #{}, previous login {})",
                user.callsign,
                user.login_count,
                previous.format("%Y-%m-%d %H:%M:%S")
            );
        }
        Ok(user)
    }

    async fn step(&mut self, user: &User) -> SessionState {
        match std::mem::replace(&mut self.state, SessionState::Terminated) {
            SessionState::Greeting => {
                let text = render::greeting(&self.config);
                self.emit(&text, SessionState::Prompt).await
            }
            SessionState::Prompt => {
                let prompt = self.config.command_prompt.clone();
                self.emit(&prompt, SessionState::AwaitInput).await
            }
            SessionState::AwaitInput => match self.io.next_line().await {
                Ok(Some(line)) => {
                    debug!("command: {}", escape_log(line.trim_end()));
                    SessionState::Dispatch(tokenize(&line))
                }
                Ok(None) => {
                    info!("end of input stream");
                    SessionState::Terminated
                }
                Err(e) => {
                    warn!("input failed: {}", e);
                    SessionState::Terminated
                }
            },
            SessionState::Dispatch(tokens) => self.dispatch(user, &tokens).await,
            SessionState::Terminated => SessionState::Terminated,
        }
    }

    async fn emit(&mut self, text: &str, next: SessionState) -> SessionState {
        match self.io.write_line(text).await {
            Ok(()) => next,
            Err(e) => {
                warn!("output failed: {}", e);
                SessionState::Terminated
            }
        }
    }

    /// The single recovery boundary: every error raised while resolving, parsing or
    /// running a command ends here.
    async fn dispatch(&mut self, user: &User, tokens: &[String]) -> SessionState {
        match self.execute(user, tokens).await {
            Ok(Flow::Continue) => SessionState::Prompt,
            Ok(Flow::Disconnect) => SessionState::Terminated,
            Err(e) if e.ends_session() => {
                info!("caller gone during command: {}", e);
                SessionState::Terminated
            }
            Err(e) => self.report(e).await,
        }
    }

    async fn execute(&mut self, user: &User, tokens: &[String]) -> Result<Flow> {
        let (verb, rest) = tokens
            .split_first()
            .ok_or_else(|| BbsError::Parse("empty command line".to_string()))?;
        let descriptor = self.registry.resolve(verb)?;
        let args = parse_args(&descriptor.args, rest)?;
        let mut ctx = SessionContext {
            io: &mut self.io,
            store: &mut self.store,
            config: &self.config,
            collaborators: &self.collaborators,
            registry: &self.registry,
            user,
        };
        descriptor.handler.run(&mut ctx, args).await
    }

    async fn report(&mut self, err: BbsError) -> SessionState {
        let line = match &err {
            BbsError::Parse(_) if self.config.debug => {
                warn!("{}", err);
                Some(format!("Error: {}", err))
            }
            BbsError::Parse(_) => {
                debug!("ignored: {}", err);
                None
            }
            BbsError::Storage(_) => {
                error!("{}", err);
                err.user_message()
            }
            _ => {
                info!("{}", err);
                err.user_message()
            }
        };
        match line {
            Some(text) => self.emit(&text, SessionState::Prompt).await,
            None => SessionState::Prompt,
        }
    }
}
