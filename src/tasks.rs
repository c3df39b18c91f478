use std::path::{Path, PathBuf};

use log::*;

use crate::json::ReflectionJson;
use crate::reflect::Reflect;

pub struct Config {
    /// the directory to read wgsl files from
    pub shaders_source_dir: PathBuf,
    /// the directory to write reflection json to
    pub reflection_json_dir: PathBuf,
}

/// reflects every .wgsl file in the source dir into `<name>.json`;
/// returns the written paths
pub fn write_reflection_json(config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut wgsl_paths: Vec<_> = std::fs::read_dir(&config.shaders_source_dir)?
        .filter_map(|entry_res| entry_res.ok())
        .map(|dir_entry| dir_entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "wgsl"))
        .collect();
    wgsl_paths.sort();

    std::fs::create_dir_all(&config.reflection_json_dir)?;

    let mut written = vec![];
    for wgsl_path in &wgsl_paths {
        let Some(file_stem) = wgsl_path.file_stem() else {
            continue;
        };

        let reflect = Reflect::from_path(wgsl_path)?;
        let reflection_json = ReflectionJson::from_reflect(&reflect);
        let reflection_json = serde_json::to_string_pretty(&reflection_json)?;

        let json_path = config
            .reflection_json_dir
            .join(file_stem)
            .with_extension("json");
        std::fs::write(&json_path, reflection_json)?;

        info!("{} -> {}", wgsl_path.display(), json_path.display());
        written.push(json_path);
    }

    Ok(written)
}

pub fn load_reflection_json(json_path: &Path) -> anyhow::Result<ReflectionJson> {
    let json = std::fs::read_to_string(json_path)?;
    let reflection_json: ReflectionJson = serde_json::from_str(&json)?;

    Ok(reflection_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::util::{manifest_path, relative_path};

    #[test]
    fn writes_one_json_per_shader() {
        let tmp_prefix = format!("wgsl-reflect-test-{}", uuid::Uuid::new_v4());
        let tmp_dir_path = std::env::temp_dir().join(tmp_prefix);

        let config = Config {
            shaders_source_dir: manifest_path(["shaders", "source"]),
            reflection_json_dir: tmp_dir_path.join(relative_path(["shaders", "reflection"])),
        };

        let written = write_reflection_json(&config).unwrap();

        let file_names: Vec<_> = written
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(file_names, ["reference.json", "simple.json"]);

        let simple = load_reflection_json(&written[1]).unwrap();
        assert_eq!(simple.entries.vertex, ["vs_main"]);
        assert_eq!(simple.entries.fragment, ["fs_main"]);

        let reflect =
            Reflect::from_path(manifest_path(["shaders", "source", "reference.wgsl"])).unwrap();
        let reference = load_reflection_json(&written[0]).unwrap();
        assert_eq!(reference, ReflectionJson::from_reflect(&reflect));

        std::fs::remove_dir_all(&tmp_dir_path).unwrap();
    }
}
