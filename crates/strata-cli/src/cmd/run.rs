use super::migrator;
use crate::output::print_json;
use anyhow::Context;
use serde_json::json;
use std::path::Path;

pub fn migrate(root: &Path, redo_last: bool, json: bool) -> anyhow::Result<()> {
    let mut m = migrator(root)?;
    let applied = m.migrate(redo_last).context("migrate failed")?;

    if json {
        return print_json(&json!({ "applied": applied }));
    }
    println!("{}", migrate_summary(applied, redo_last && !m.is_empty()));
    Ok(())
}

/// A redo only happens when nothing was outstanding and something is registered.
fn migrate_summary(applied: usize, redo_possible: bool) -> String {
    match applied {
        0 if redo_possible => "nothing outstanding, redid last migration".to_string(),
        0 => "nothing to migrate".to_string(),
        1 => "applied 1 migration".to_string(),
        n => format!("applied {n} migrations"),
    }
}

pub fn rollback(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut m = migrator(root)?;
    m.rollback(id)
        .with_context(|| format!("rollback to '{id}' failed"))?;

    if json {
        return print_json(&json!({ "rolled_back_to": id }));
    }
    println!("rolled back to {id}");
    Ok(())
}

pub fn reset(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut m = migrator(root)?;
    m.reset().context("reset failed")?;

    if json {
        return print_json(&json!({ "reset": true }));
    }
    println!("all migrations reverted");
    Ok(())
}

pub fn refresh(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut m = migrator(root)?;
    m.refresh().context("refresh failed")?;

    if json {
        return print_json(&json!({ "refreshed": true }));
    }
    println!("all migrations reverted and re-applied");
    Ok(())
}
