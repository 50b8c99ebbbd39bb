use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub globe: GlobeSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct GlobeSettings {
    pub latitude: Option<f64>,        // Marker latitude, degrees north
    pub longitude: Option<f64>,       // Marker longitude, degrees east
    pub tilt: Option<f64>,            // Initial tilt, degrees
    pub spin_speed: Option<f64>,      // Autospin step, radians per frame
    pub show_terminator: Option<bool>,
    pub geolocate: Option<bool>,      // Look up the marker via IP on startup
    pub color_scheme: Option<u8>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termglobe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_globe_section() {
        let settings: Settings = toml::from_str(
            r#"
            [globe]
            latitude = 35.0
            longitude = 139.0
            tilt = 20.0
            spin_speed = 0.004
            show_terminator = false
            geolocate = false
            color_scheme = 2
            "#,
        )
        .unwrap();
        assert_eq!(settings.globe.latitude, Some(35.0));
        assert_eq!(settings.globe.longitude, Some(139.0));
        assert_eq!(settings.globe.tilt, Some(20.0));
        assert_eq!(settings.globe.spin_speed, Some(0.004));
        assert_eq!(settings.globe.show_terminator, Some(false));
        assert_eq!(settings.globe.geolocate, Some(false));
        assert_eq!(settings.globe.color_scheme, Some(2));
    }

    #[test]
    fn missing_sections_default_to_none() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.globe.latitude, None);
        assert_eq!(settings.globe.show_terminator, None);
    }
}
