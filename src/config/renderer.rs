//! PDF renderer configuration from environment variables.
//!
//! `PDF_BROWSER` names the headless browser binary (default `chromium`) and
//! `PDF_RENDER_TIMEOUT_SECS` bounds a single render (default 30 seconds).

use crate::{
    errors::{Error, Result},
    export::pdf::HeadlessRenderer,
};
use std::time::Duration;

const DEFAULT_BROWSER: &str = "chromium";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the headless PDF renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererSettings {
    /// Browser binary name or path
    pub browser: String,
    /// Maximum duration of one render
    pub timeout: Duration,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            browser: DEFAULT_BROWSER.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RendererSettings {
    /// Builds settings from explicit values, falling back to defaults for unset ones.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the timeout is not a positive whole number of seconds.
    pub fn from_values(browser: Option<String>, timeout_secs: Option<&str>) -> Result<Self> {
        let browser = browser
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_BROWSER.to_string());

        let timeout = match timeout_secs {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::Config {
                        message: format!(
                            "PDF_RENDER_TIMEOUT_SECS must be a positive number of seconds, got '{raw}'"
                        ),
                    });
                }
            },
        };

        Ok(Self { browser, timeout })
    }

    /// Reads `PDF_BROWSER` and `PDF_RENDER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let timeout = std::env::var("PDF_RENDER_TIMEOUT_SECS").ok();
        Self::from_values(std::env::var("PDF_BROWSER").ok(), timeout.as_deref())
    }

    /// Renderer configured with these settings.
    #[must_use]
    pub fn renderer(&self) -> HeadlessRenderer {
        HeadlessRenderer::new(&self.browser).with_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<()> {
        let settings = RendererSettings::from_values(None, None)?;
        assert_eq!(settings, RendererSettings::default());
        assert_eq!(settings.renderer().browser(), std::path::Path::new("chromium"));
        Ok(())
    }

    #[test]
    fn test_explicit_values() -> Result<()> {
        let settings =
            RendererSettings::from_values(Some(" /usr/bin/chromium-browser ".into()), Some("45"))?;
        assert_eq!(settings.browser, "/usr/bin/chromium-browser");
        assert_eq!(settings.timeout, Duration::from_secs(45));
        Ok(())
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        for bad in ["0", "-3", "soon"] {
            let result = RendererSettings::from_values(None, Some(bad));
            assert!(matches!(result, Err(Error::Config { .. })), "{bad}");
        }
    }
}
