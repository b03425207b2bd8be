use std::time::Duration;

use placefinder_geocoding::Coordinate;

use crate::error::PlacefinderError;

/// Behaviour of one autocomplete session.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteConfig {
    /// Quiet time after the last keystroke before the provider is queried
    pub debounce: Duration,
    /// Trimmed queries shorter than this never reach the provider
    pub min_query_chars: usize,
    /// Text placed in the input when the session starts
    pub initial_text: Option<String>,
    /// Used for ranking when the device location is unavailable or denied
    pub fallback_location: Option<Coordinate>,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            min_query_chars: 2,
            initial_text: None,
            fallback_location: None,
        }
    }
}

impl AutocompleteConfig {
    pub fn builder() -> AutocompleteConfigBuilder {
        AutocompleteConfigBuilder::new()
    }
}

/// Builder for [`AutocompleteConfig`].
#[derive(Debug, Clone, Default)]
pub struct AutocompleteConfigBuilder {
    config: AutocompleteConfig,
}

impl AutocompleteConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AutocompleteConfig::default(),
        }
    }

    /// Shorter quiet interval for fast typists on a low-latency provider
    pub fn responsive() -> Self {
        let mut builder = Self::new();
        builder.config.debounce = Duration::from_millis(250);
        builder
    }

    /// Quiet interval after the last keystroke before searching
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce = debounce;
        self
    }

    /// Minimum trimmed length before searching; never below one character.
    pub fn min_query_chars(mut self, chars: usize) -> Self {
        self.config.min_query_chars = chars.max(1);
        self
    }

    /// Prefill the input. Blank text is ignored.
    pub fn initial_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.config.initial_text = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Position used for ranking when the device has none. Fails outside
    /// valid latitude/longitude ranges.
    pub fn fallback_location(mut self, lat: f64, lon: f64) -> Result<Self, PlacefinderError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(PlacefinderError::ConfigError(format!(
                "Fallback location out of range: lat {lat}, lon {lon}"
            )));
        }
        self.config.fallback_location = Some(Coordinate::new(lat, lon));
        Ok(self)
    }

    /// Finish building the configuration
    pub fn build(self) -> AutocompleteConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = AutocompleteConfigBuilder::new().build();
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.min_query_chars, 2);
        assert!(config.initial_text.is_none());
        assert!(config.fallback_location.is_none());
        assert_eq!(config, AutocompleteConfig::default());
    }

    #[test]
    fn test_responsive_preset() {
        let config = AutocompleteConfigBuilder::responsive().build();
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.min_query_chars, 2);
    }

    #[test]
    fn test_method_chaining() {
        let config = AutocompleteConfig::builder()
            .debounce(Duration::from_millis(300))
            .min_query_chars(3)
            .initial_text("Cape Town")
            .fallback_location(-33.92, 18.42)
            .unwrap()
            .build();

        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.min_query_chars, 3);
        assert_eq!(config.initial_text.as_deref(), Some("Cape Town"));
        assert_eq!(config.fallback_location, Some(Coordinate::new(-33.92, 18.42)));
    }

    #[test]
    fn test_blank_initial_text_is_ignored() {
        let config = AutocompleteConfigBuilder::new().initial_text("   ").build();
        assert!(config.initial_text.is_none());
    }

    #[test]
    fn test_min_query_chars_floor() {
        let config = AutocompleteConfigBuilder::new().min_query_chars(0).build();
        assert_eq!(config.min_query_chars, 1);
    }

    #[test]
    fn test_fallback_location_validation() {
        assert!(AutocompleteConfigBuilder::new().fallback_location(90.0, 180.0).is_ok());
        assert!(matches!(
            AutocompleteConfigBuilder::new().fallback_location(91.0, 0.0),
            Err(PlacefinderError::ConfigError(_))
        ));
        assert!(AutocompleteConfigBuilder::new().fallback_location(0.0, -180.5).is_err());
        assert!(AutocompleteConfigBuilder::new().fallback_location(f64::NAN, 0.0).is_err());
    }
}
