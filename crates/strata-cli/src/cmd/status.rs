use super::migrator;
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut m = migrator(root)?;
    let status = m.status().context("failed to read migration status")?;

    if json {
        return print_json(&status);
    }

    let rows: Vec<Vec<String>> = status
        .iter()
        .map(|s| {
            let state = if s.applied { "applied" } else { "pending" };
            vec![s.id.clone(), state.to_string()]
        })
        .collect();
    print_table(&["ID", "STATUS"], &rows);
    Ok(())
}
