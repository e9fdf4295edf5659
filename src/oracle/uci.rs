use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use cozy_chess::Move;
use log::{debug, warn};

use crate::board::Position;
use crate::error::OracleError;
use crate::oracle::Oracle;

/// A UCI engine (Stockfish or anything speaking the protocol) running as a
/// child process. Stdout is pumped by a reader thread so every wait can be
/// bounded. After a timeout or crash the process is killed and every later
/// request fails fast.
pub struct UciOracle {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    timeout: Duration,
    name: String,
    alive: bool,
}

impl UciOracle {
    pub fn launch(path: &Path, args: &[String], timeout: Duration) -> Result<Self, OracleError> {
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| OracleError::Unavailable(format!("{}: {e}", path.display())))?;
        let stdin = child.stdin.take().ok_or_else(|| OracleError::Unavailable("no stdin pipe".into()))?;
        let stdout = child.stdout.take().ok_or_else(|| OracleError::Unavailable("no stdout pipe".into()))?;

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() { break; }
            }
        });

        let name = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let mut oracle = Self { child, stdin, lines, timeout, name, alive: true };
        let handshake = oracle.handshake();
        if let Err(e) = handshake {
            oracle.shutdown();
            return Err(e);
        }
        Ok(oracle)
    }

    fn handshake(&mut self) -> Result<(), OracleError> {
        self.send("uci")?;
        let deadline = Instant::now() + self.timeout;
        loop {
            let line = self.recv_until(deadline)?;
            if let Some(rest) = line.strip_prefix("id name ") { self.name = rest.trim().to_string(); }
            if line.trim() == "uciok" { break; }
        }
        self.sync()
    }

    fn send(&mut self, cmd: &str) -> Result<(), OracleError> {
        debug!("oracle <- {cmd}");
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn recv_until(&mut self, deadline: Instant) -> Result<String, OracleError> {
        let left = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(left) {
            Ok(line) => {
                debug!("oracle -> {line}");
                Ok(line)
            }
            Err(RecvTimeoutError::Timeout) => Err(OracleError::Timeout(self.timeout.as_millis() as u64)),
            Err(RecvTimeoutError::Disconnected) => Err(OracleError::Unavailable("engine process exited".into())),
        }
    }

    fn sync(&mut self) -> Result<(), OracleError> {
        self.send("isready")?;
        let deadline = Instant::now() + self.timeout;
        while self.recv_until(deadline)?.trim() != "readyok" {}
        Ok(())
    }

    fn search(&mut self, pos: &Position, depth: u32) -> Result<Move, OracleError> {
        self.sync()?;
        self.send(&format!("position fen {}", pos.fen()))?;
        self.send(&format!("go depth {depth}"))?;
        let deadline = Instant::now() + self.timeout;
        let reply = loop {
            let line = self.recv_until(deadline)?;
            if let Some(rest) = line.trim().strip_prefix("bestmove") { break rest.trim().to_string(); }
        };
        let token = reply.split_whitespace().next().unwrap_or("(none)");
        if token == "(none)" || token == "0000" { return Err(OracleError::NoMove); }
        pos.parse_coordinates(token)
            .ok_or_else(|| OracleError::Protocol(format!("bestmove {token} is not legal in {}", pos.fen())))
    }

    fn shutdown(&mut self) {
        self.alive = false;
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Oracle for UciOracle {
    fn name(&self) -> &str { &self.name }

    fn best_move(&mut self, pos: &Position, depth: u32) -> Result<Move, OracleError> {
        if !self.alive { return Err(OracleError::Unavailable(format!("{} is no longer running", self.name))); }
        let res = self.search(pos, depth);
        if let Err(e) = &res {
            if !matches!(e, OracleError::NoMove | OracleError::Protocol(_)) {
                warn!("{}: {e}; shutting the engine down", self.name);
                self.shutdown();
            }
        }
        res
    }

    fn new_game(&mut self) {
        if self.alive && self.send("ucinewgame").is_err() { self.shutdown(); }
    }
}

impl Drop for UciOracle {
    fn drop(&mut self) {
        if self.alive { self.shutdown(); }
    }
}
