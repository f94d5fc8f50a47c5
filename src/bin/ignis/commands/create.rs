//! `ignis create` command

use anyhow::Result;

use crate::cli::CreateArgs;
use crate::commands::asset_dir;
use ignis::assets::bootstrap::default_data_dir;
use ignis::ops::{create, CreateOptions};
use ignis::util::fs::relative_path;
use ignis::{BootstrapSettings, GlobalContext};

pub fn execute(ctx: &GlobalContext, args: CreateArgs) -> Result<()> {
    let config = ctx.load_config();
    let dir = asset_dir(ctx, &config, args.dir);

    let data_dir = match args.data_dir.or(config.bootstrap.data_dir) {
        Some(path) => ctx.resolve_path(&path),
        None => default_data_dir(),
    };
    let release_image = args.release_image.or(config.bootstrap.release_image);

    let opts = CreateOptions {
        dir: dir.clone(),
        targets: args.targets,
        settings: BootstrapSettings::new(data_dir).with_release_image(release_image),
    };

    let result = create(&opts)?;

    for asset in result.generated() {
        eprintln!("   Generated {}", asset.name);
    }
    if ctx.is_verbose() {
        for path in result.written() {
            eprintln!("       Wrote {}", relative_path(ctx.cwd(), path).display());
        }
    }
    eprintln!(
        "    Finished {} asset(s) in {}",
        result.assets.len(),
        dir.display()
    );

    Ok(())
}
