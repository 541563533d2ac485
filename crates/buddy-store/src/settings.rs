use tracing::{debug, warn};

use crate::database::Database;
use crate::error::Result;
use crate::keys;
use crate::models::Theme;
use crate::persist;

impl Database {
    /// Stored theme, or the host preference when none (or garbage) is stored.
    pub fn load_theme(&self, prefers_light: bool) -> Theme {
        let fallback = if prefers_light { Theme::Light } else { Theme::Dark };

        let stored = self.with_substrate(|sub| sub.get(keys::THEME));
        match stored {
            Ok(Some(token)) => Theme::parse(&token).unwrap_or_else(|| {
                warn!(token = %token, "unknown theme token");
                fallback
            }),
            Ok(None) => fallback,
            Err(e) => {
                warn!(error = %e, "theme read failed");
                fallback
            }
        }
    }

    // stored bare, not as JSON
    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.with_substrate(|sub| persist::write_with_recovery(sub, keys::THEME, theme.as_str()))?;
        debug!(theme = theme.as_str(), "theme saved");
        Ok(())
    }
}
