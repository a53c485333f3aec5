use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local configuration, read from ./hoadon.toml when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Menu CSV files loaded into the catalog snapshot.
    pub menus: Vec<PathBuf>,
    /// Directory invoice files are written into.
    pub out_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menus: vec![
                PathBuf::from("menu/simple-place-menu.csv"),
                PathBuf::from("menu/taco-place-menu.csv"),
            ],
            out_dir: PathBuf::from("tax_files"),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("hoadon.toml"));
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}
