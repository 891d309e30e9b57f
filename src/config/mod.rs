use std::path::PathBuf;
use log::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_FRONT_PAGE: &str = "FrontPage";

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub template_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub front_page: String,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            template_dir: PathBuf::from("tmpl"),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            front_page: DEFAULT_FRONT_PAGE.to_string(),
        }
    }

    /// Defaults overridden by `WIKILET_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();
        if let Some(dir) = lookup("WIKILET_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("WIKILET_TEMPLATE_DIR") {
            config.template_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("WIKILET_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("WIKILET_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("Ignoring invalid WIKILET_PORT {:?}, using {}", port, DEFAULT_PORT),
            }
        }
        if let Some(title) = lookup("WIKILET_FRONT_PAGE") {
            if is_valid_title(&title) {
                config.front_page = title;
            } else {
                warn!("Ignoring invalid WIKILET_FRONT_PAGE {:?}, using {}", title, DEFAULT_FRONT_PAGE);
            }
        }
        config
    }

    /// Address string for binding the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Titles the router accepts: one or more ASCII letters or digits
fn is_valid_title(title: &str) -> bool {
    !title.is_empty() && title.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_original_layout() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.template_dir, PathBuf::from("tmpl"));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.front_page, "FrontPage");
    }

    #[test]
    fn env_overrides_apply() {
        let config = Config::from_lookup(lookup(&[
            ("WIKILET_DATA_DIR", "/srv/pages"),
            ("WIKILET_HOST", "127.0.0.1"),
            ("WIKILET_PORT", "9000"),
            ("WIKILET_FRONT_PAGE", "Home"),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/srv/pages"));
        assert_eq!(config.template_dir, PathBuf::from("tmpl"));
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.front_page, "Home");
    }

    #[test]
    fn bad_port_keeps_default() {
        let config = Config::from_lookup(lookup(&[("WIKILET_PORT", "eighty")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn front_page_must_be_routable() {
        for title in ["Front Page", "", "a/b", "Café"] {
            let config = Config::from_lookup(lookup(&[("WIKILET_FRONT_PAGE", title)]));
            assert_eq!(config.front_page, "FrontPage", "{title:?}");
        }
    }
}
