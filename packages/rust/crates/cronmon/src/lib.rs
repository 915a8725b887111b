//! cronmon - terminal front end for the cron job health monitor.
//!
//! Job evaluation lives in `cronmon-sniffer`; this crate adds the settings
//! layer and rendering used by the `cronmon` binary.
//!
//! # Architecture
//!
//! ```text
//! cronmon/src/
//! ├── lib.rs       # Re-exports
//! ├── settings.rs  # YAML settings (system + user merge)
//! ├── render.rs    # Status table and JSON output
//! ├── watch.rs     # Refresh loop for `watch`
//! ├── main.rs      # Binary entry: tracing, settings, dispatch
//! ├── cli.rs       # clap definitions
//! └── commands.rs  # status / log / watch
//! ```

pub mod render;
pub mod settings;
pub mod watch;

pub use render::{RenderOptions, render_json, render_table, status_icon};
pub use settings::{
    MonitorConfig, MonitorSettings, load_settings, load_settings_from_paths, resolve_config_home,
};
pub use watch::{WatchOutcome, watch_until};
