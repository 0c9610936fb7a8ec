//! Built-in demo migrations. Each one manages a piece of `<root>/data/`.

use serde::Serialize;
use std::path::{Path, PathBuf};
use strata_core::{BoxError, Register};

pub const DATA_DIR: &str = "data";

#[derive(Serialize)]
struct Settings {
    version: u32,
    features: Vec<&'static str>,
}

pub fn register(r: &mut impl Register, root: &Path) {
    let data = root.join(DATA_DIR);

    r.register(
        "create_data_dir",
        {
            let data = data.clone();
            move || std::fs::create_dir_all(&data)
        },
        {
            let data = data.clone();
            move || std::fs::remove_dir(&data)
        },
    );

    let readme = data.join("README.md");
    r.register(
        "write_readme",
        {
            let readme = readme.clone();
            move || std::fs::write(&readme, "# data\n\nManaged by strata migrations.\n")
        },
        remove(readme),
    );

    let settings = data.join("settings.json");
    r.register(
        "seed_settings",
        {
            let settings = settings.clone();
            move || -> Result<(), BoxError> {
                let value = Settings {
                    version: 1,
                    features: vec!["audit-log", "exports"],
                };
                std::fs::write(&settings, serde_json::to_vec_pretty(&value)?)?;
                Ok(())
            }
        },
        remove(settings),
    );
}

fn remove(path: PathBuf) -> impl Fn() -> std::io::Result<()> + Send + Sync + 'static {
    move || std::fs::remove_file(&path)
}
