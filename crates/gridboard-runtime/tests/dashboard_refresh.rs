//! End-to-end checks: config in, refreshed content out, without a terminal.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gridboard_core::event::{Event, KeyCode, KeyEvent};
use gridboard_core::{CommonSettings, GlobalConfig};
use gridboard_runtime::{Dashboard, WidgetRegistry, help_for};
use gridboard_widgets::bar_chart::Bar;
use gridboard_widgets::list::ItemSource;
use gridboard_widgets::{BarGraph, BarSource, FetchError, ListWidget};
use serde_json::json;

const WAIT: Duration = Duration::from_secs(5);

struct Counting {
    fetches: Arc<AtomicUsize>,
}

impl BarSource for Counting {
    fn fetch(&mut self) -> Result<Vec<Bar>, FetchError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(vec![Bar::new("runs", 50).with_value_label(n.to_string())])
    }
}

struct Feed;

impl ItemSource for Feed {
    type Item = String;

    fn fetch(&mut self) -> Result<Vec<String>, FetchError> {
        Err(FetchError::new("feed unreachable"))
    }

    fn row_text(&self, item: &String) -> String {
        item.clone()
    }
}

fn registry(fetches: &Arc<AtomicUsize>) -> WidgetRegistry {
    let fetches = Arc::clone(fetches);
    WidgetRegistry::new()
        .with("bars", move |name, module, global| {
            let settings = CommonSettings::from_module(name, "Bars", false, module, global);
            Box::new(BarGraph::new(
                settings,
                module,
                Counting {
                    fetches: Arc::clone(&fetches),
                },
            ))
        })
        .with("feed", |name, module, global| {
            let settings = CommonSettings::from_module(name, "Feed", true, module, global);
            Box::new(ListWidget::new(settings, Feed))
        })
}

fn config() -> GlobalConfig {
    GlobalConfig::from_value(json!({
        "grid": { "columns": [30, 30], "rows": [6, 6] },
        "refreshInterval": 0,
        "mods": {
            "load": {
                "type": "bars",
                "enabled": true,
                "graphStars": 4,
                "position": { "top": 0, "left": 0, "width": 1, "height": 1 }
            },
            "news": {
                "type": "feed",
                "enabled": true,
                "position": { "top": 0, "left": 1, "width": 1, "height": 2 }
            },
            "weather": {
                "enabled": true,
                "position": { "top": 1, "left": 0, "width": 1, "height": 1 }
            },
            "off": { "type": "bars", "enabled": false }
        }
    }))
    .unwrap()
}

fn drain(dashboard: &mut Dashboard, count: usize) {
    for _ in 0..count {
        assert!(dashboard.pump_timeout(WAIT), "refresh did not arrive");
    }
}

#[test]
fn refreshed_content_reaches_every_slot() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let mut dashboard = Dashboard::from_config(&config(), &registry(&fetches)).unwrap();
    assert_eq!(dashboard.len(), 3);
    assert_eq!(dashboard.start(), 3);
    drain(&mut dashboard, 3);

    assert_eq!(dashboard.content(0).unwrap().body, "runs[[default]||[default]  ] 1\n");
    assert_eq!(dashboard.content(1).unwrap().body, "feed unreachable");
    assert!(dashboard.content(1).unwrap().wrap);
    assert_eq!(dashboard.content(2).unwrap().title, " Unknown ");

    dashboard.stop_all();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn refresh_key_triggers_out_of_band_fetch() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let mut dashboard = Dashboard::from_config(&config(), &registry(&fetches)).unwrap();
    dashboard.start();
    drain(&mut dashboard, 3);

    // The list is the only focusable widget, so it owns focus char 1.
    dashboard.handle_event(&Event::Key(KeyEvent::char('1')));
    assert_eq!(dashboard.focused(), Some(1));
    dashboard.handle_event(&Event::Key(KeyEvent::char('r')));
    drain(&mut dashboard, 1);

    dashboard.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)));
    assert_eq!(dashboard.focused(), None);
    dashboard.stop_all();
}

#[test]
fn stopped_dashboard_gets_no_more_content() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let mut dashboard = Dashboard::from_config(&config(), &registry(&fetches)).unwrap();
    dashboard.start();
    drain(&mut dashboard, 3);
    dashboard.stop_all();
    dashboard.pump();
    assert!(!dashboard.pump_timeout(Duration::from_millis(50)));
}

#[test]
fn help_lookup_by_kind() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let registry = registry(&fetches);
    assert_eq!(help_for("clocks", &registry), "Unable to find module clocks");

    let help = help_for("feed", &registry);
    assert!(help.starts_with("Keyboard commands for Feed:\n\n"));
    assert!(help.contains("    /: Show/hide this help window\n"));
    assert!(help.contains("\nConfiguration Attributes\n\n bordered\n"));
}
