use crate::features::gpu::window::SlidingWindow;
use crate::shared::collector::LineBuffer;
use crate::shared::error::CollectionError;
use crate::shared::traits::StreamParser;
use regex::Regex;
use std::sync::OnceLock;

/// GPU engines reported by `intel_gpu_top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Render,
    Bitstream,
    Blitter,
}

fn engine_patterns() -> &'static [(Engine, Regex); 3] {
    static PATTERNS: OnceLock<[(Engine, Regex); 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let busy = |engine: &str| Regex::new(&format!(r"\s+{} busy:\s+(\d+)%", engine)).expect("busy pattern is valid");
        [
            (Engine::Render, busy("render")),
            (Engine::Bitstream, busy("bitstream")),
            (Engine::Blitter, busy("blitter")),
        ]
    })
}

/// Matches one line against the engine patterns, first match wins.
pub fn parse_engine_line(line: &str) -> Option<(Engine, u32)> {
    engine_patterns().iter().find_map(|(engine, pattern)| {
        pattern
            .captures(line)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(|busy| (*engine, busy))
    })
}

/// Rolling GPU utilization over the render, video and copy engines.
///
/// The blitter line closes each `intel_gpu_top` report, so the load is
/// recomputed only when a blitter sample arrives: the highest of the three
/// window averages, truncated to whole percent.
#[derive(Debug, Default)]
pub struct GpuParser {
    lines: LineBuffer,
    render: SlidingWindow,
    bitstream: SlidingWindow,
    blitter: SlidingWindow,
    load: f64,
}

impl GpuParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    /// Returns the new load when `line` completed a report.
    pub fn observe_line(&mut self, line: &str) -> Option<f64> {
        let (engine, busy) = parse_engine_line(line)?;
        match engine {
            Engine::Render => {
                self.render.push(busy);
                None
            }
            Engine::Bitstream => {
                self.bitstream.push(busy);
                None
            }
            Engine::Blitter => {
                self.blitter.push(busy);
                self.load = self.aggregate();
                Some(self.load)
            }
        }
    }

    fn aggregate(&self) -> f64 {
        let busiest = self
            .render
            .sum()
            .max(self.bitstream.sum())
            .max(self.blitter.sum());
        (busiest / self.blitter.capacity() as u64) as f64 / 100.0
    }
}

impl StreamParser for GpuParser {
    fn feed(&mut self, chunk: &[u8]) -> Result<Option<f64>, CollectionError> {
        let mut latest = None;
        for line in self.lines.push(chunk) {
            if let Some(load) = self.observe_line(&line) {
                latest = Some(load);
            }
        }
        Ok(latest)
    }
}
