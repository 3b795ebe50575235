use log::warn;

use crate::config::Settings;

/// Load settings, falling back to defaults when the file or environment
/// cannot be parsed or fails validation.
pub fn load_settings() -> Settings {
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            warn!("could not load settings, using defaults: {e}");
            Settings::default()
        }
    };
    if let Err(e) = settings.validate() {
        warn!("invalid settings, using defaults: {e}");
        return Settings::default();
    }
    settings
}
