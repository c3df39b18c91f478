use std::path::PathBuf;

use wgsl_reflect::tasks::{self, Config};
use wgsl_reflect::util::relative_path;

/// Reflects each wgsl source shader into json
/// reads WGSL_SOURCE_DIR and WGSL_REFLECTION_DIR, relative to the working directory by default
pub fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let dir_arg = |name: &str, default: PathBuf| match std::env::var(name).ok() {
        None => default,
        Some(s) if s.is_empty() => default,
        Some(s) => PathBuf::from(s),
    };

    let shaders_source_dir = dir_arg("WGSL_SOURCE_DIR", relative_path(["shaders", "source"]));
    let reflection_json_dir =
        dir_arg("WGSL_REFLECTION_DIR", relative_path(["shaders", "reflection"]));
    let config = Config {
        shaders_source_dir,
        reflection_json_dir,
    };

    tasks::write_reflection_json(&config)?;

    Ok(())
}
