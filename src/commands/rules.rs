use super::{AppContext, RuleFields, RulesCommand};
use crate::error::Result;
use crate::models::{Rule, Settings, Table};
use crate::schedule::{Operation, RuleLifecycle};
use crate::utils::datetime::{parse_days, parse_time_string};
use crate::utils::messages::{format_info, format_success};

pub async fn run<T>(ctx: &AppContext<T>, command: RulesCommand) -> Result<()> {
    let lifecycle = RuleLifecycle::new(&ctx.db);

    match command {
        RulesCommand::List { table } => {
            let summaries = lifecycle.summaries(table).await?;
            if summaries.is_empty() {
                println!("{}", format_info(&format!("No {} rules", table)));
            }
            for summary in summaries {
                println!("{}", summary);
            }
        }
        RulesCommand::Add { table, fields } => {
            let rule = build_rule(table, fields, &ctx.settings)?;
            let summary = lifecycle.commit(Operation::Add, rule).await?;
            println!("{}", format_success(&format!("Added {} rule {}", table, summary.id)));
            println!("{}", summary);
        }
        RulesCommand::Edit { table, id, fields } => {
            let rule = build_rule(table, fields, &ctx.settings)?;
            let summary = lifecycle.commit(Operation::Edit(id), rule).await?;
            println!("{}", format_success(&format!("Updated {} rule {}", table, id)));
            println!("{}", summary);
        }
        RulesCommand::Delete { table, id } => {
            lifecycle.delete(id, table).await?;
            println!("{}", format_success(&format!("Deleted {} rule {}", table, id)));
        }
        RulesCommand::Enable { table, id } => {
            let summary = lifecycle.set_active(id, table, true).await?;
            println!("{}", summary);
        }
        RulesCommand::Disable { table, id } => {
            let summary = lifecycle.set_active(id, table, false).await?;
            println!("{}", summary);
        }
    }

    Ok(())
}

/// Candidate rule from command line fields
///
/// Turn-off rules without `--mode` get the default mode. A mode on a
/// turn-on rule is kept so that validation rejects it.
fn build_rule(table: Table, fields: RuleFields, settings: &Settings) -> Result<Rule> {
    let (hour, minutes) = parse_time_string(&fields.time)?;
    let days = parse_days(&fields.days)?;

    let mut rule = Rule::new(table, fields.name, hour, minutes, days);
    rule.active = !fields.inactive;
    rule.mode = match table {
        Table::Off => Some(fields.mode.unwrap_or(settings.default_mode)),
        Table::On => fields.mode,
    };
    Ok(rule)
}
