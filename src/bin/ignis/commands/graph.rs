//! `ignis graph` command

use anyhow::Result;

use crate::cli::GraphArgs;
use ignis::assets::bootstrap::default_data_dir;
use ignis::assets::{self, BOOTSTRAP};
use ignis::ops::{asset_graph, format_list, format_tree};
use ignis::{BootstrapSettings, GlobalContext};

pub fn execute(ctx: &GlobalContext, args: GraphArgs) -> Result<()> {
    let config = ctx.load_config();
    let data_dir = match config.bootstrap.data_dir {
        Some(path) => ctx.resolve_path(&path),
        None => default_data_dir(),
    };

    let catalog = assets::catalog(&BootstrapSettings::new(data_dir));
    catalog.validate()?;

    if args.list {
        print!("{}", format_list(&catalog));
        return Ok(());
    }

    let root = args.root.as_deref().unwrap_or(BOOTSTRAP.as_str());
    let graph = asset_graph(&catalog, root)?;
    print!("{}", format_tree(&graph, args.depth));

    Ok(())
}
