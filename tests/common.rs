//! Test utilities & fixtures.
//! A throwaway station (database, info file, stub utilities) in a temp dir, plus a
//! helper that runs one scripted session against it and returns everything written.
#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use rsbbs::bbs::commands::builtin_registry;
use rsbbs::bbs::io::SessionIo;
use rsbbs::bbs::SessionEngine;
use rsbbs::config::Config;
use rsbbs::storage::Store;
use tokio::io::{duplex, AsyncReadExt};

pub const PROMPT: &str = "ENTER COMMAND >";
pub const INFO_TEXT: &str = "Station N0CALL-10, Grid FN42.\nSysop: N0CALL\n";

pub struct Station {
    pub dir: tempfile::TempDir,
    pub config: Config,
}

impl Station {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.config.storage.db_path)
    }

    pub fn store(&self) -> Store {
        Store::open(self.db_path()).expect("open store")
    }
}

/// Fresh station whose heard/uptime utilities are `echo` stubs.
pub fn station() -> Station {
    let dir = tempfile::tempdir().expect("tempdir");
    let info = dir.path().join("info.txt");
    std::fs::write(&info, INFO_TEXT).unwrap();
    let mut config = Config::default();
    config.bbs.banner_message = "Test banner".into();
    config.storage.db_path = dir.path().join("data").join("bbs.db").to_string_lossy().to_string();
    config.logging.file = None;
    config.utilities.heard_command = vec!["echo".into(), "N1ABC-7 145.050 12:00".into()];
    config.utilities.uptime_command = vec!["echo".into(), " 12:00:00 up 3 days".into()];
    config.utilities.info_file = info.to_string_lossy().to_string();
    Station { dir, config }
}

/// Run one session for `caller` over the scripted `input` and return its output.
pub async fn session(station: &Station, caller: &str, input: &str) -> String {
    run(station, caller, input, false).await
}

pub async fn debug_session(station: &Station, caller: &str, input: &str) -> String {
    run(station, caller, input, true).await
}

async fn run(station: &Station, caller: &str, input: &str, debug: bool) -> String {
    let (out, mut peer) = duplex(1 << 20);
    let io = SessionIo::new(Cursor::new(input.as_bytes().to_vec()), out);
    let engine = SessionEngine::new(
        station.config.session_config(caller, debug),
        station.config.collaborators(),
        station.store(),
        builtin_registry().unwrap(),
        io,
    );
    engine.run().await.expect("session");
    let mut text = String::new();
    peer.read_to_string(&mut text).await.unwrap();
    text
}

/// Everything after the greeting.
pub fn after_greeting(output: &str) -> &str {
    output
        .split_once("For help, enter 'h'\r\n")
        .map(|(_, rest)| rest)
        .unwrap_or(output)
}
