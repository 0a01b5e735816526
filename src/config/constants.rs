//! Constants for kiln

/// Configuration file name
pub const CONFIG_FILE: &str = "kiln.json";

/// Local configuration overlay file name
pub const LOCAL_CONFIG_FILE: &str = "kiln.local.json";

/// Log file name
pub const LOG_FILE: &str = "kiln.log";

/// Default port for the live-reload server
pub const DEFAULT_LIVE_RELOAD_PORT: u16 = 35729;

/// Default root for page sources
pub const PAGES_ROOT: &str = "client/ui/pages";

/// Default root for layout sources
pub const LAYOUTS_ROOT: &str = "client/ui/layouts";

/// Default root for customization page sources
pub const CUSTOM_PAGES_ROOT: &str = "customization/ui/pages";

/// Default root for customization layout sources
pub const CUSTOM_LAYOUTS_ROOT: &str = "customization/ui/layouts";
