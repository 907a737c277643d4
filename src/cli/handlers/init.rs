use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::CONFIG_FILE;
use crate::io::store::atomic_write;

const CONFIG_TEMPLATE: &str = r##"# homeshell configuration. Every setting is optional.

[ui]
# show_key_hints = true

# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# red = "#FF4444"
# green = "#44FF88"
# selection_bg = "#3D1438"
# selection_border = "#FB4196"
# selection_id = "#DAB8F0"
# match_bg = "#40E0D0"
# match_fg = "#0C001B"

# [ui.tag_colors]
# home = "#44FF88"
# work = "#4488FF"

[log]
# level = "info"          # RUST_LOG overrides this
# file = "homeshell.log"  # relative to this directory
"##;

/// Create the data directory and write a commented `config.toml`
pub fn cmd_init(args: InitArgs, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    fs::create_dir_all(data_dir)
        .map_err(|e| format!("could not create {}: {}", data_dir.display(), e))?;
    atomic_write(&config_path, CONFIG_TEMPLATE.as_bytes())?;

    println!("Initialized {}", data_dir.display());
    Ok(())
}
