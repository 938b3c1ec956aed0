//! Scripted transport for exercising SCPI code without an instrument.
//!
//! Queries are answered from per-command reply queues. The instrument's
//! error queue is modelled separately: `:SYSTem:ERRor?` pops queued error
//! strings and answers `0,"No error"` once it is empty. A query with no
//! scripted reply behaves like a silent instrument and times out.
//!
//! ```
//! use scopelab::transport::mock::MockTransport;
//! use scopelab::scpi::ScpiSession;
//!
//! let mut mock = MockTransport::new();
//! mock.on_query("*IDN?", "KEYSIGHT TECHNOLOGIES,EXR104A,MY00000001,11.50.00000");
//! let mut session = ScpiSession::new(mock);
//! assert!(session.query_text("*IDN?").unwrap().starts_with("KEYSIGHT"));
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::{Transport, DEFAULT_TIMEOUT_MS};

pub const NO_ERROR: &str = "0,\"No error\"";

fn is_error_query(cmd: &str) -> bool {
    let upper = cmd.to_ascii_uppercase();
    let head = upper.trim_start_matches(':');
    (head.starts_with("SYST:ERR") || head.starts_with("SYSTEM:ERR")) && upper.contains('?')
}

#[derive(Debug)]
pub struct MockTransport {
    replies: HashMap<String, VecDeque<Vec<u8>>>,
    error_queue: VecDeque<String>,
    failures: HashMap<String, Vec<String>>,
    silent_error_query: bool,
    pending: Option<Vec<u8>>,
    sent: Vec<String>,
    clears: usize,
    timeout: Duration,
    timeout_history: Vec<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            replies: HashMap::new(),
            error_queue: VecDeque::new(),
            failures: HashMap::new(),
            silent_error_query: false,
            pending: None,
            sent: Vec::new(),
            clears: 0,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            timeout_history: Vec::new(),
        }
    }

    /// Queues one text reply for `query`. Replies to the same query are used in order.
    pub fn on_query(&mut self, query: &str, reply: &str) -> &mut Self {
        let mut bytes = reply.as_bytes().to_vec();
        bytes.push(b'\n');
        self.on_query_bytes(query, bytes)
    }

    /// Queues one raw reply for `query`, sent back exactly as given.
    pub fn on_query_bytes(&mut self, query: &str, reply: Vec<u8>) -> &mut Self {
        self.replies.entry(query.to_owned()).or_default().push_back(reply);
        self
    }

    /// Puts an entry such as `-113,"Undefined header"` on the error queue now.
    pub fn push_error(&mut self, code: i32, message: &str) -> &mut Self {
        self.error_queue.push_back(format!("{},\"{}\"", code, message));
        self
    }

    /// Every time `command` is written, `code`/`message` lands on the error queue.
    pub fn fail_on(&mut self, command: &str, code: i32, message: &str) -> &mut Self {
        self.failures.entry(command.to_owned()).or_default().push(format!("{},\"{}\"", code, message));
        self
    }

    /// Makes the error query answer with an empty reply.
    pub fn silence_error_query(&mut self) -> &mut Self {
        self.silent_error_query = true;
        self
    }

    /// Every message written so far, terminator stripped.
    pub fn sent(&self) -> &[String] { &self.sent }

    /// Messages written so far, minus error-queue polls.
    pub fn sent_commands(&self) -> Vec<&str> {
        self.sent.iter().map(|s| s.as_str()).filter(|s| !is_error_query(s)).collect()
    }

    /// How many error-queue polls were written.
    pub fn error_queries(&self) -> usize {
        self.sent.iter().filter(|s| is_error_query(s)).count()
    }

    pub fn queued_errors(&self) -> usize { self.error_queue.len() }

    pub fn clears(&self) -> usize { self.clears }

    /// Every timeout passed to `set_timeout`, oldest first.
    pub fn timeout_history(&self) -> &[Duration] { &self.timeout_history }

    /// Scripted replies that were never asked for.
    pub fn unused_replies(&self) -> usize {
        self.replies.values().map(|q| q.len()).sum()
    }
}

impl Default for MockTransport {
    fn default() -> Self { Self::new() }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let cmd = String::from_utf8_lossy(data).trim_end().to_owned();
        self.sent.push(cmd.clone());

        if let Some(errors) = self.failures.get(&cmd) {
            self.error_queue.extend(errors.iter().cloned());
        }

        if is_error_query(&cmd) {
            let reply = if self.silent_error_query {
                String::new()
            } else {
                self.error_queue.pop_front().unwrap_or_else(|| NO_ERROR.to_owned())
            };
            self.pending = Some(format!("{}\n", reply).into_bytes());
        } else if cmd.contains('?') {
            self.pending = self.replies.get_mut(&cmd).and_then(|q| q.pop_front());
        }

        Ok(())
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        self.pending.take().ok_or(Error::Timeout)
    }

    fn clear(&mut self) -> Result<()> {
        self.pending = None;
        self.clears += 1;
        Ok(())
    }

    fn timeout(&self) -> Duration { self.timeout }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        self.timeout_history.push(timeout);
        Ok(())
    }
}
