use std::{
    fs,
    net::Ipv4Addr,
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};
use wifi_station::{Notification, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceStep {
    Start,
    Notify(Notification),
    // The next begin_attempt call fails at the stack.
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceLine {
    pub line_no: usize,
    pub step: TraceStep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expectation {
    Connected(Option<Ipv4Addr>),
    Failed,
    Timeout,
}

impl Expectation {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        match raw.split_once(':') {
            Some(("connected", address)) => {
                let address = address
                    .parse::<Ipv4Addr>()
                    .with_context(|| format!("invalid expected address '{address}'"))?;
                Ok(Self::Connected(Some(address)))
            }
            None if raw == "connected" => Ok(Self::Connected(None)),
            None if raw == "failed" => Ok(Self::Failed),
            None if raw == "timeout" => Ok(Self::Timeout),
            _ => bail!("invalid expectation '{raw}', use connected[:addr]|failed|timeout"),
        }
    }

    pub fn matches(self, actual: Option<Outcome>) -> bool {
        match (self, actual) {
            (Self::Connected(None), Some(Outcome::Connected(_))) => true,
            (Self::Connected(Some(want)), Some(Outcome::Connected(got))) => want == got,
            (Self::Failed, Some(Outcome::Failed)) => true,
            (Self::Timeout, None) => true,
            _ => false,
        }
    }
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceLine>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    parse_trace(&raw).with_context(|| format!("invalid trace {}", path.display()))
}

pub fn parse_trace(raw: &str) -> Result<Vec<TraceLine>> {
    let mut out = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.split('#').next().unwrap_or("").trim();
        if trimmed.is_empty() {
            continue;
        }
        let step = parse_step(trimmed).map_err(|err| anyhow!("line {line_no}: {err}"))?;
        out.push(TraceLine { line_no, step });
    }
    Ok(out)
}

fn parse_step(line: &str) -> Result<TraceStep> {
    let mut parts = line.split_whitespace();
    let keyword = parts.next().unwrap_or("").to_ascii_lowercase();
    let arg = parts.next();
    if let Some(extra) = parts.next() {
        bail!("unexpected token '{extra}'");
    }

    match (keyword.as_str(), arg) {
        ("start", None) => Ok(TraceStep::Start),
        ("startable", None) => Ok(TraceStep::Notify(Notification::AttemptStartable)),
        ("reject", None) => Ok(TraceStep::Reject),
        ("lost", reason) => {
            let reason = match reason {
                Some(raw) => raw
                    .parse::<u8>()
                    .with_context(|| format!("invalid reason '{raw}'"))?,
                None => 0,
            };
            Ok(TraceStep::Notify(Notification::LinkLost { reason }))
        }
        ("got_ip", Some(raw)) => {
            let address = raw
                .parse::<Ipv4Addr>()
                .with_context(|| format!("invalid address '{raw}'"))?;
            Ok(TraceStep::Notify(Notification::AddressAcquired(address)))
        }
        ("got_ip", None) => bail!("got_ip needs an address"),
        (other, _) => bail!("unknown step '{other}'"),
    }
}
