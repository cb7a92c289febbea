use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pageforge_common::Catalog;
use pageforge_editor::{ConditionGroup, EditorConfig};

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Print the catalogs as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Print the scope and device catalogs sessions will validate against
pub fn catalog(args: CatalogArgs, config: &EditorConfig) -> Result<()> {
    let catalogs = config.catalogs(Catalog::default())?;

    if args.json {
        let value = serde_json::json!({
            "locale": config.locale,
            "scopeConditions": catalogs.group(ConditionGroup::Scope),
            "deviceConditions": catalogs.group(ConditionGroup::Device),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for group in [ConditionGroup::Scope, ConditionGroup::Device] {
        for line in describe(group, catalogs.group(group)) {
            println!("{}", line);
        }
        println!();
    }

    Ok(())
}

fn describe(group: ConditionGroup, catalog: &Catalog) -> Vec<String> {
    let mode = if group.is_multiple() { "multiple" } else { "single" };
    let mut lines = vec![format!("{} ({})", group.to_string().bright_white().bold(), mode)];

    for (index, condition) in catalog.iter().enumerate() {
        let marker = if index == 0 && group == ConditionGroup::Scope {
            " (initial)"
        } else {
            ""
        };
        lines.push(format!("  {:<10} {}{}", condition.id, condition.label, marker));
    }

    lines
}
