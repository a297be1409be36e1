//! A two-widget dashboard built from in-process data.
//!
//! Run with `cargo run -p gridboard --example system_dashboard`, then press
//! `1` to focus the list, `j`/`k` to move, `/` for help and `Ctrl+C` to quit.
//! Set `GRIDBOARD_LOG_FILE=/tmp/gridboard.log` to capture logs.

use std::time::{SystemTime, UNIX_EPOCH};

use gridboard::prelude::*;
use gridboard::{BarGraph, ListWidget};
use serde_json::json;

/// Progress through the current minute and hour.
struct ClockBars;

impl BarSource for ClockBars {
    fn fetch(&mut self) -> std::result::Result<Vec<Bar>, FetchError> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| FetchError::new(e.to_string()))?
            .as_secs();
        let minute = secs % 60;
        let hour = secs % 3600;
        Ok(vec![
            Bar::new("minute", i64::try_from(minute * 100 / 60).unwrap_or(0))
                .with_value_label(format!("{minute}s"))
                .with_color("green"),
            Bar::new("hour", i64::try_from(hour * 100 / 3600).unwrap_or(0))
                .with_value_label(format!("{}m", hour / 60))
                .with_color("yellow"),
        ])
    }
}

/// Names of the process environment variables.
struct EnvNames;

impl ItemSource for EnvNames {
    type Item = String;

    fn fetch(&mut self) -> std::result::Result<Vec<String>, FetchError> {
        let mut names: Vec<String> = std::env::vars().map(|(name, _)| name).collect();
        names.sort();
        Ok(names)
    }

    fn row_text(&self, item: &String) -> String {
        item.clone()
    }
}

fn main() -> Result<()> {
    let config = GlobalConfig::from_value(json!({
        "grid": { "columns": [40, 40], "rows": [8, 16] },
        "refreshInterval": 1,
        "mods": {
            "clock": {
                "type": "bars",
                "enabled": true,
                "graphStars": 25,
                "position": { "top": 0, "left": 0, "width": 2, "height": 1 }
            },
            "env": {
                "type": "env",
                "enabled": true,
                "refreshInterval": 30,
                "position": { "top": 1, "left": 0, "width": 1, "height": 1 }
            },
            "todo": {
                "enabled": true,
                "position": { "top": 1, "left": 1, "width": 1, "height": 1 }
            }
        }
    }))?;

    let registry = WidgetRegistry::new()
        .with("bars", |name, module, global| {
            let settings = CommonSettings::from_module(name, "Clock", false, module, global);
            Box::new(BarGraph::new(settings, module, ClockBars))
        })
        .with("env", |name, module, global| {
            let settings = CommonSettings::from_module(name, "Environment", true, module, global);
            Box::new(ListWidget::new(settings, EnvNames))
        });

    gridboard::run(&config, &registry)
}
