use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Resolved runtime settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Directory scanned for `HW*` assignment files.
    pub data_dir: PathBuf,
    /// Dashboard root holding `index.html` and `assets/`.
    pub web_dir: PathBuf,
    pub bind: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            web_dir: PathBuf::from("web"),
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
        }
    }
}

impl Config {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn index_html(&self) -> PathBuf {
        self.web_dir.join("index.html")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.web_dir.join("assets")
    }
}
