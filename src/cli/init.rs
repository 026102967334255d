//! thesis init command implementation
//!
//! Creates the store directory, an empty snapshot and `.thesis.toml`.

use std::path::PathBuf;

use crate::cli::Globals;
use crate::config::CONFIG_FILE;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::storage::STORE_DIR;
use crate::store::ThesisStore;

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    created: bool,
    store: PathBuf,
    config: PathBuf,
}

pub fn run(globals: &Globals) -> Result<()> {
    let root = globals.root_dir()?;
    let (store, created) = ThesisStore::init(&root)?;

    let report = InitReport {
        root: root.clone(),
        created,
        store: store.storage().store_file(),
        config: store.storage().config_file(),
    };

    let header = if created {
        "thesis init: initialized store".to_string()
    } else {
        "thesis init: nothing to do".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("root", root.display().to_string());
    human.push_summary("store", format!("{STORE_DIR}/"));
    human.push_summary("config", CONFIG_FILE);
    human.push_next_step("thesis project new \"<title>\" --templates");

    emit_success(globals.output(), "init", &report, Some(&human))
}
