//! Console frontend: the consumer side of the snapshot bridge
//!
//! The consumer polls on a fixed period, takes one snapshot per tick and
//! renders it. It never blocks on the acquisition loop.
//!
//! - [`PollClock`] - Measures the actual interval between ticks
//! - [`ConsoleRenderer`] - Text or JSON-lines rendering of a [`Snapshot`]

use crate::config::DisplayConfig;
use crate::error::{Result, ScopeError};
use crate::pipeline::Snapshot;
use crate::types::SampleValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::time::{Duration, Instant};

/// Measures the time between consecutive render ticks
#[derive(Debug, Default)]
pub struct PollClock {
    last: Option<Instant>,
}

impl PollClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick, returning the interval since the previous one
    pub fn tick(&mut self) -> Option<Duration> {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Option<Duration> {
        let interval = self.last.map(|last| now.saturating_duration_since(last));
        self.last = Some(now);
        interval
    }
}

/// Output format of the renderer, selectable with `--format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per tick
    #[default]
    Text,
    /// One JSON object per tick
    Json,
}

/// One channel as emitted in JSON lines
#[derive(Debug, Serialize)]
struct RenderedChannel<'a> {
    label: String,
    style: &'a str,
    latest: Option<SampleValue>,
    series: Vec<f64>,
}

/// One snapshot as emitted in JSON lines
#[derive(Debug, Serialize)]
struct RenderedFrame<'a> {
    generation: u64,
    taken_at: DateTime<Utc>,
    interval_ms: Option<u64>,
    channels: Vec<RenderedChannel<'a>>,
}

/// Writes one line per rendered snapshot
pub struct ConsoleRenderer<W: Write> {
    out: W,
    format: OutputFormat,
    display: DisplayConfig,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, format: OutputFormat, display: DisplayConfig) -> Self {
        Self {
            out,
            format,
            display,
        }
    }

    /// Render one snapshot with the measured poll interval
    pub fn render(&mut self, snapshot: &Snapshot, interval: Option<Duration>) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.render_text(snapshot, interval),
            OutputFormat::Json => self.render_json(snapshot, interval),
        }?;
        self.out.flush()?;
        Ok(())
    }

    fn render_text(&mut self, snapshot: &Snapshot, interval: Option<Duration>) -> Result<()> {
        let mut line = match interval {
            Some(interval) => format!("Plot Interval = {} ms", interval.as_millis()),
            None => "Plot Interval = - ms".to_string(),
        };
        for (i, value) in snapshot.latest.iter().enumerate() {
            line.push_str(&format!("  {} = {}", self.display.label(i), value));
        }
        if !snapshot.has_data() {
            line.push_str("  (waiting for data)");
        }
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    fn render_json(&mut self, snapshot: &Snapshot, interval: Option<Duration>) -> Result<()> {
        let channels = snapshot
            .channels
            .iter()
            .enumerate()
            .map(|(i, history)| RenderedChannel {
                label: self.display.label(i),
                style: self
                    .display
                    .channels
                    .get(i)
                    .map(|c| c.style.as_str())
                    .unwrap_or(""),
                latest: snapshot.latest(i),
                series: history.as_f64_series(),
            })
            .collect();
        let frame = RenderedFrame {
            generation: snapshot.generation,
            taken_at: snapshot.taken_at,
            interval_ms: interval.map(|d| d.as_millis() as u64),
            channels,
        };
        let json =
            serde_json::to_string(&frame).map_err(|e| ScopeError::Serialization(e.to_string()))?;
        writeln!(self.out, "{}", json)?;
        Ok(())
    }

    /// Consume the renderer, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SnapshotBridge;
    use crate::types::SampleWidth;

    fn bridge_with_frame() -> SnapshotBridge {
        let bridge = SnapshotBridge::new(SampleWidth::F32, 3, 2);
        let values = [
            SampleValue::Float(1.5),
            SampleValue::Float(1.0),
            SampleValue::Float(0.5),
        ];
        let raw: Vec<u8> = [1.5f32, 1.0, 0.5]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        bridge.publish(&raw, &values);
        bridge
    }

    #[test]
    fn test_poll_clock_measures_interval() {
        let mut clock = PollClock::new();
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), None);
        assert_eq!(
            clock.tick_at(start + Duration::from_millis(50)),
            Some(Duration::from_millis(50))
        );
    }

    #[test]
    fn test_output_format_values() {
        use clap::ValueEnum;

        assert_eq!(OutputFormat::from_str("JSON", true), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("text", false), Ok(OutputFormat::Text));
        assert!(OutputFormat::from_str("csv", true).is_err());

        let names: Vec<_> = OutputFormat::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, ["text", "json"]);
    }

    #[test]
    fn test_text_line_uses_labels() {
        let snapshot = bridge_with_frame().take_snapshot();
        let mut renderer =
            ConsoleRenderer::new(Vec::new(), OutputFormat::Text, DisplayConfig::default());
        renderer
            .render(&snapshot, Some(Duration::from_millis(52)))
            .unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(
            out,
            "Plot Interval = 52 ms  Desired = 1.5  Actual = 1  Error = 0.5\n"
        );
    }

    #[test]
    fn test_text_line_before_first_frame() {
        let snapshot = SnapshotBridge::new(SampleWidth::I16, 1, 2).take_snapshot();
        let display = DisplayConfig {
            channels: Vec::new(),
            ..DisplayConfig::default()
        };
        let mut renderer = ConsoleRenderer::new(Vec::new(), OutputFormat::Text, display);
        renderer.render(&snapshot, None).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.starts_with("Plot Interval = - ms  ch0 = 0"));
        assert!(out.contains("waiting for data"));
    }

    #[test]
    fn test_json_line_carries_series() {
        let snapshot = bridge_with_frame().take_snapshot();
        let mut renderer =
            ConsoleRenderer::new(Vec::new(), OutputFormat::Json, DisplayConfig::default());
        renderer
            .render(&snapshot, Some(Duration::from_millis(50)))
            .unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["generation"], 1);
        assert_eq!(value["interval_ms"], 50);
        assert_eq!(value["channels"][0]["label"], "Desired");
        assert_eq!(value["channels"][0]["style"], "r-");
        assert_eq!(value["channels"][2]["series"], serde_json::json!([0.0, 0.5]));
        assert_eq!(value["channels"][1]["latest"], 1.0);
    }
}
