//! Line-oriented I/O over the caller's byte stream.
//!
//! Incoming lines may end in LF, CR or CR+LF (packet terminals usually send a bare CR).
//! Terminators are normalized to `\n`. Every outgoing line is terminated with CR+LF.
//!
//! All reads block until the caller sends something; there are no timeouts. The session
//! process lives exactly as long as the connection does.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::{BbsError, Result};

/// Line terminator on the wire.
pub const CRLF: &str = "\r\n";

/// Sentinel that ends multi-line capture (compared trimmed, case-insensitive).
pub const SENTINEL: &str = "/ex";

pub struct SessionIo {
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    writer: Box<dyn AsyncWrite + Unpin + Send>,
    /// Previous line ended in CR; swallow a directly following LF.
    skip_lf: bool,
}

impl SessionIo {
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            skip_lf: false,
        }
    }

    /// Read one raw line, terminator normalized to `\n`. `None` at end of stream.
    ///
    /// A final unterminated line is returned as-is before end of stream is reported.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let (consumed, done) = {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    if buf.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
                }
                if self.skip_lf {
                    self.skip_lf = false;
                    if available[0] == b'\n' {
                        (1, false)
                    } else {
                        scan_line(available, &mut buf, &mut self.skip_lf)
                    }
                } else {
                    scan_line(available, &mut buf, &mut self.skip_lf)
                }
            };
            self.reader.consume(consumed);
            if done {
                return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
            }
        }
    }

    /// Write `prompt` (if non-empty), then wait for a non-empty line and return it trimmed.
    /// Blank lines are skipped and the prompt is repeated.
    pub async fn read_line(&mut self, prompt: &str) -> Result<String> {
        loop {
            if !prompt.is_empty() {
                self.write_line(prompt).await?;
            }
            match self.next_line().await? {
                Some(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        return Ok(trimmed.to_string());
                    }
                }
                None => return Err(BbsError::Disconnected),
            }
        }
    }

    /// Write `prompt`, then collect lines up to (not including) the `/ex` sentinel.
    ///
    /// Blank lines inside the body are kept; each captured line keeps its `\n`.
    pub async fn read_multiline(&mut self, prompt: &str) -> Result<String> {
        if !prompt.is_empty() {
            self.write_line(prompt).await?;
        }
        let mut body = String::new();
        loop {
            let line = self.next_line().await?.ok_or(BbsError::Disconnected)?;
            if line.trim().eq_ignore_ascii_case(SENTINEL) {
                return Ok(body);
            }
            body.push_str(&line);
        }
    }

    /// Write `prompt` and discard exactly one line.
    pub async fn read_enter(&mut self, prompt: &str) -> Result<()> {
        if !prompt.is_empty() {
            self.write_line(prompt).await?;
        }
        self.next_line().await?.ok_or(BbsError::Disconnected)?;
        Ok(())
    }

    /// Write `text` as CR+LF terminated lines (one per embedded line; empty text is a blank line).
    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        let mut out = String::with_capacity(text.len() + 2);
        if text.is_empty() {
            out.push_str(CRLF);
        } else {
            for line in text.lines() {
                out.push_str(line.strip_suffix('\r').unwrap_or(line));
                out.push_str(CRLF);
            }
        }
        self.writer.write_all(out.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Flush and close the output side.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Copy bytes up to the first CR or LF into `buf`. Returns `(consumed, line_complete)`.
fn scan_line(available: &[u8], buf: &mut Vec<u8>, skip_lf: &mut bool) -> (usize, bool) {
    match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
        Some(pos) => {
            buf.extend_from_slice(&available[..pos]);
            buf.push(b'\n');
            if available[pos] == b'\r' {
                match available.get(pos + 1) {
                    Some(b'\n') => return (pos + 2, true),
                    Some(_) => {}
                    None => *skip_lf = true,
                }
            }
            (pos + 1, true)
        }
        None => {
            buf.extend_from_slice(available);
            (available.len(), false)
        }
    }
}
