use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{DqError, Result};
use crate::storage::Database;

pub struct AppContext {
    pub dq_root: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub db: Arc<Database>,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let dq_root = Self::find_dq_root()?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| default_config_path(&dq_root));
        let config = Config::load(cli.config.as_deref(), &dq_root)?;

        Ok(Self {
            dq_root: dq_root.clone(),
            config_path,
            config,
            db: Arc::new(Database::open(dq_root.join("dq.db"))?),
            robot_mode: cli.robot,
            verbosity: cli.verbose,
        })
    }

    fn find_dq_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("DQ_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".dq")? {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| DqError::MissingConfig("data directory not found".to_string()))?;
        Ok(data_dir.join("dq"))
    }
}

fn default_config_path(dq_root: &Path) -> PathBuf {
    if dq_root.ends_with(".dq") {
        dq_root.join("config.toml")
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| dq_root.to_path_buf())
            .join("dq/config.toml")
    }
}

fn find_upwards(start: &Path, name: &str) -> Result<Option<PathBuf>> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Ok(Some(candidate));
        }
        current = dir.parent();
    }
    Ok(None)
}
