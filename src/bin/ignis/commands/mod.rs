//! Command implementations

pub mod completions;
pub mod create;
pub mod destroy;
pub mod graph;

use std::path::PathBuf;

use ignis::util::Config;
use ignis::GlobalContext;

/// The asset directory: command line, then config, then the working directory.
pub fn asset_dir(ctx: &GlobalContext, config: &Config, dir: Option<PathBuf>) -> PathBuf {
    match dir.or_else(|| config.assets.dir.clone()) {
        Some(dir) => ctx.resolve_path(&dir),
        None => ctx.cwd().to_path_buf(),
    }
}
