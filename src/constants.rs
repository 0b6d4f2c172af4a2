//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Run config location (relative to the platform config dir)
pub mod config {
    /// Directory under `dirs::config_dir()`
    pub const APP_DIR: &str = "backdrop-rotator";

    /// Config file name
    pub const FILENAME: &str = "config.json";
}

/// Host terminal settings file locations (relative to `dirs::data_local_dir()`)
pub mod paths {
    /// Stable release, installed from the store
    pub const STABLE_SETTINGS: &str =
        "Packages/Microsoft.WindowsTerminal_8wekyb3d8bbwe/LocalState/settings.json";

    /// Preview release, installed from the store
    pub const PREVIEW_SETTINGS: &str =
        "Packages/Microsoft.WindowsTerminalPreview_8wekyb3d8bbwe/LocalState/settings.json";

    /// Unpackaged install (scoop, chocolatey, zip)
    pub const UNPACKAGED_SETTINGS: &str = "Microsoft/Windows Terminal/settings.json";
}

/// Field names inside the host settings document
pub mod settings {
    pub const PROFILES: &str = "profiles";
    pub const DEFAULTS: &str = "defaults";
    pub const LIST: &str = "list";

    pub const BACKGROUND_IMAGE: &str = "backgroundImage";
    pub const BACKGROUND_IMAGE_ALIGNMENT: &str = "backgroundImageAlignment";
    pub const BACKGROUND_IMAGE_STRETCH_MODE: &str = "backgroundImageStretchMode";
    pub const BACKGROUND_IMAGE_OPACITY: &str = "backgroundImageOpacity";

    /// Indentation used when writing the document back (matches the host's own output)
    pub const INDENT: &[u8] = b"    ";

    /// Decimal places kept when writing opacity
    pub const OPACITY_DECIMALS: usize = 4;
}

/// File extensions treated as images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "ico", "jxr",
];

/// Defaults used when the run config leaves a field out
pub mod defaults {
    pub const INTERVAL_MINUTES: u32 = 30;
    pub const OPACITY: f64 = 0.35;
}

/// Interactive single-key commands
pub mod keys {
    pub const QUIT: char = 'q';
    pub const NEXT_IMAGE: char = 'n';
    pub const PREVIOUS_IMAGE: char = 'p';
    pub const NEXT_COLLECTION: char = 'N';
    pub const PREVIOUS_COLLECTION: char = 'P';
    pub const SHUFFLE_IMAGES: char = 's';
    pub const SHUFFLE_COLLECTIONS: char = 'S';
    pub const HELP: char = 'h';
    pub const DEBUG_STATE: char = 'd';
}

/// Key listener timing
pub mod input {
    /// How long one terminal poll blocks before checking whether the loop went away
    pub const POLL_INTERVAL_MS: u64 = 200;

    /// Buffered key presses between the listener and the rotation loop
    pub const CHANNEL_CAPACITY: usize = 32;
}
