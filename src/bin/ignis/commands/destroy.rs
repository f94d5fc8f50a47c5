//! `ignis destroy` command

use anyhow::Result;

use crate::cli::DestroyArgs;
use crate::commands::asset_dir;
use ignis::ops::destroy_cluster;
use ignis::{DestroyerRegistry, GlobalContext};

pub fn execute(ctx: &GlobalContext, args: DestroyArgs) -> Result<()> {
    let config = ctx.load_config();
    let dir = asset_dir(ctx, &config, args.dir);
    let registry = DestroyerRegistry::with_builtin();

    destroy_cluster(&registry, &dir)?;
    eprintln!("   Destroyed cluster in {}", dir.display());

    Ok(())
}
