use crate::shared::collector::LineBuffer;
use crate::shared::error::CollectionError;
use crate::shared::traits::StreamParser;
use regex::Regex;
use std::sync::OnceLock;

/// Prefix of the summary line `top` prints once per refresh.
pub const SUMMARY_PREFIX: &str = "%Cpu(s):";

fn idle_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+(\d+\.\d+)\s+id").expect("idle pattern is valid"))
}

/// Load for an idle percentage. The busy share is truncated to whole percent
/// before normalizing, so 37.5% idle yields 0.62.
pub fn load_from_idle(idle_percent: f64) -> f64 {
    (100.0 - idle_percent).floor() / 100.0
}

/// Extracts the idle percentage from the first summary line in `lines`.
pub fn parse_idle<'a, I>(lines: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let summary = lines.into_iter().find(|line| line.starts_with(SUMMARY_PREFIX))?;
    idle_pattern()
        .captures(summary)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Parses `top -b` batch output.
#[derive(Debug, Default)]
pub struct CpuParser {
    lines: LineBuffer,
}

impl CpuParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamParser for CpuParser {
    fn feed(&mut self, chunk: &[u8]) -> Result<Option<f64>, CollectionError> {
        let lines = self.lines.push(chunk);
        Ok(parse_idle(lines.iter().map(String::as_str)).map(load_from_idle))
    }
}
