use crate::prelude::*;
use colored::Colorize;
use hiretools_core::catalog::{ToolSpec, TOOLS};

/// Print the tool catalog as a table
pub fn handler() -> Result<()> {
    let mut table = crate::prelude::new_table();
    table.add_row(prettytable::row![
        "Tool".bold().cyan(),
        "Method".bold().cyan(),
        "Path".bold().cyan(),
        "Parameters".bold().cyan()
    ]);

    for tool in TOOLS {
        table.add_row(prettytable::row![
            tool.name.bright_white(),
            tool.method.as_str().bright_yellow(),
            tool.path.bright_green(),
            param_summary(tool)
        ]);
    }

    table.printstd();

    Ok(())
}

fn param_summary(tool: &ToolSpec) -> String {
    tool.params
        .iter()
        .map(|param| {
            if param.required {
                format!("{}*", param.name)
            } else {
                param.name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
