use crate::shared::error::CollectionError;
use crate::shared::traits::StreamParser;
use regex::Regex;
use std::sync::OnceLock;

/// `nload` repaints in place; every redraw segment starts at an escape.
const REDRAW_SEPARATOR: char = '\u{1b}';
const AVERAGE_MARKER: &str = "Avg:";

fn average_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Avg:\s+(\S+)\s+MBit/s").expect("average pattern is valid"))
}

/// Receive and send averages from one `nload` redraw, in Mbit/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub receive: f64,
    pub send: f64,
}

impl Throughput {
    /// Not clamped: traffic above `max_scale` yields more than 1.0.
    pub fn load(&self, max_scale: f64) -> f64 {
        self.receive.max(self.send) / max_scale
    }
}

fn parse_average(segment: &str) -> Result<f64, CollectionError> {
    average_pattern()
        .captures(segment)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .ok_or_else(|| {
            CollectionError::MalformedOutput(format!(
                "Not ordinary nload data: {:?}",
                segment.trim()
            ))
        })
}

/// Finds the two average lines of a redraw, incoming first.
pub fn parse_throughput(text: &str) -> Result<Throughput, CollectionError> {
    let averages: Vec<&str> = text
        .split(REDRAW_SEPARATOR)
        .filter(|segment| segment.contains(AVERAGE_MARKER))
        .collect();

    match averages.as_slice() {
        [incoming, outgoing] => Ok(Throughput {
            receive: parse_average(incoming)?,
            send: parse_average(outgoing)?,
        }),
        _ => Err(CollectionError::MalformedOutput(format!(
            "Not ordinary nload data: expected 2 average lines, found {}",
            averages.len()
        ))),
    }
}

/// Parses `nload -u m` output, one redraw per chunk.
#[derive(Debug)]
pub struct NetworkParser {
    max_scale: f64,
}

impl NetworkParser {
    pub fn new(max_scale: f64) -> Self {
        Self { max_scale }
    }
}

impl StreamParser for NetworkParser {
    fn feed(&mut self, chunk: &[u8]) -> Result<Option<f64>, CollectionError> {
        let text = String::from_utf8_lossy(chunk);
        let throughput = parse_throughput(&text)?;
        Ok(Some(throughput.load(self.max_scale)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redraw(receive: &str, send: &str) -> String {
        format!(
            "\u{1b}[1;1HDevice eth0 [10.0.0.2] (1/1):\
             \u{1b}[3;1HIncoming:\
             \u{1b}[10;40HCurr: 0.51 MBit/s\
             \u{1b}[11;40HAvg: {} MBit/s\
             \u{1b}[12;40HMin: 0.00 MBit/s\
             \u{1b}[15;1HOutgoing:\
             \u{1b}[22;40HCurr: 0.20 MBit/s\
             \u{1b}[23;40HAvg: {} MBit/s\
             \u{1b}[24;40HTtl: 12.34 GByte",
            receive, send
        )
    }

    #[test]
    fn test_parse_redraw() {
        let throughput = parse_throughput(&redraw("1.25", "0.50")).unwrap();
        assert_eq!(throughput, Throughput { receive: 1.25, send: 0.5 });
    }

    #[test]
    fn test_load_is_not_clamped() {
        let mut parser = NetworkParser::new(100.0);
        let load = parser.feed(redraw("120.00", "80.00").as_bytes()).unwrap();
        assert_eq!(load, Some(1.2));
    }

    #[test]
    fn test_send_can_dominate() {
        let mut parser = NetworkParser::new(10.0);
        let load = parser.feed(redraw("1.00", "5.00").as_bytes()).unwrap();
        assert_eq!(load, Some(0.5));
    }

    #[test]
    fn test_partial_redraw_is_malformed() {
        let partial = "\u{1b}[11;40HAvg: 1.00 MBit/s\u{1b}[12;40HMin: 0.00 MBit/s";
        assert!(matches!(
            parse_throughput(partial),
            Err(CollectionError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_unparsable_average_is_malformed() {
        let mut parser = NetworkParser::new(100.0);
        let result = parser.feed(redraw("n/a", "1.00").as_bytes());
        assert!(matches!(result, Err(CollectionError::MalformedOutput(_))));
    }

    #[test]
    fn test_three_averages_is_malformed() {
        let text = format!("{}\u{1b}[30;1HAvg: 9.00 MBit/s", redraw("1.00", "1.00"));
        assert!(parse_throughput(&text).is_err());
    }
}
