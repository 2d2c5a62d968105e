use std::env;
use std::net::SocketAddr;

use crate::{
    canvas::ViewportSize,
    entities::Coordinates,
    error::{config_error, Error},
    format::Locale,
};

pub const DEFAULT_API_BASE: &str = "https://test-js.zmaps-api.com";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Kagurazaka station.
pub const DEFAULT_ORIGIN: Coordinates = Coordinates {
    lat: 35.703874744612726,
    lng: 139.73442305859913,
};

/// Mos Burger Kagurazaka-shita.
pub const DEFAULT_DESTINATION: Coordinates = Coordinates {
    lat: 35.700504770928035,
    lng: 139.74237209059712,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub api_key: Option<String>,
    pub listen_addr: SocketAddr,
    pub locale: Locale,
    pub viewport: ViewportSize,
    pub zoom_margin: f64,
    pub origin: Coordinates,
    pub destination: Coordinates,
}

impl Config {
    /// Reads `ITINERA_*` variables, loading `.env` first when present.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("ITINERA_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let api_key = lookup("ITINERA_API_KEY").filter(|key| !key.is_empty());

        let listen_addr = lookup("ITINERA_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into())
            .parse::<SocketAddr>()
            .map_err(|err| config_error(format!("ITINERA_LISTEN_ADDR: {}", err)))?;

        let locale = match lookup("ITINERA_LOCALE") {
            Some(value) => value.parse()?,
            None => Locale::default(),
        };

        let viewport = match lookup("ITINERA_VIEWPORT") {
            Some(value) => value.parse()?,
            None => ViewportSize::default(),
        };

        let zoom_margin = match lookup("ITINERA_ZOOM_MARGIN") {
            Some(value) => value
                .parse::<f64>()
                .map_err(|err| config_error(format!("ITINERA_ZOOM_MARGIN: {}", err)))?,
            None => 0.5,
        };

        Ok(Self {
            api_base,
            api_key,
            listen_addr,
            locale,
            viewport,
            zoom_margin,
            origin: DEFAULT_ORIGIN,
            destination: DEFAULT_DESTINATION,
        })
    }
}

#[cfg(test)]
fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn defaults_without_environment() {
    let config = Config::from_lookup(lookup_from(&[])).unwrap();

    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(config.api_key, None);
    assert_eq!(config.listen_addr.port(), 3000);
    assert_eq!(config.locale, Locale::En);
    assert_eq!(config.viewport, ViewportSize::default());
    assert_eq!(config.zoom_margin, 0.5);
    assert_eq!(config.origin, DEFAULT_ORIGIN);
}

#[test]
fn reads_overrides() {
    let config = Config::from_lookup(lookup_from(&[
        ("ITINERA_API_BASE", "http://localhost:8080"),
        ("ITINERA_API_KEY", "secret"),
        ("ITINERA_LISTEN_ADDR", "0.0.0.0:8000"),
        ("ITINERA_LOCALE", "ja"),
        ("ITINERA_VIEWPORT", "1280x720"),
    ]))
    .unwrap();

    assert_eq!(config.api_base, "http://localhost:8080");
    assert_eq!(config.api_key.as_deref(), Some("secret"));
    assert_eq!(config.listen_addr.port(), 8000);
    assert_eq!(config.locale, Locale::Ja);
    assert_eq!(config.viewport.width, 1280.0);
}

#[test]
fn rejects_malformed_values() {
    use crate::error::CONFIG;

    let err = Config::from_lookup(lookup_from(&[("ITINERA_LISTEN_ADDR", "nowhere")])).unwrap_err();
    assert_eq!(err.code, CONFIG);

    let err = Config::from_lookup(lookup_from(&[("ITINERA_LOCALE", "xx")])).unwrap_err();
    assert_eq!(err.code, CONFIG);
}
