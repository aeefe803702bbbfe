//! Rules command - administer persisted correction rules.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use mingpian_core::correction::RuleScope;
use mingpian_core::{CorrectionRuleSet, CustomRuleStore, JsonFileStore, MingpianConfig};

use super::config::{config_dir, load_config};

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    command: RulesCommand,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// List custom correction rules
    List,

    /// Add or replace a custom rule
    Add {
        /// Text as the recognizer produces it
        wrong: String,
        /// Replacement text
        correct: String,
    },

    /// Remove a custom rule
    Remove {
        /// Text the rule matches
        wrong: String,
    },

    /// Remove all custom rules
    Clear,

    /// List built-in rules
    Builtin,

    /// Apply all rules to a piece of text
    Test {
        /// Text to correct
        text: String,

        /// Only apply built-in rules
        #[arg(long)]
        no_custom_rules: bool,
    },
}

pub async fn run(args: RulesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut store = open_store(&config);

    match args.command {
        RulesCommand::List => list_rules(&store),
        RulesCommand::Add { wrong, correct } => {
            if wrong.is_empty() {
                anyhow::bail!("The text to replace must not be empty");
            }
            store.add(&wrong, &correct)?;
            info!("Rule store: {}", rules_path(&config).display());
            println!(
                "{} Added rule {:?} -> {:?}",
                style("✓").green(),
                wrong,
                correct
            );
            Ok(())
        }
        RulesCommand::Remove { wrong } => {
            if !store.remove(&wrong)? {
                anyhow::bail!("No custom rule for {:?}", wrong);
            }
            println!("{} Removed rule {:?}", style("✓").green(), wrong);
            Ok(())
        }
        RulesCommand::Clear => {
            store.clear()?;
            println!("{} Cleared all custom rules", style("✓").green());
            Ok(())
        }
        RulesCommand::Builtin => {
            list_builtin();
            Ok(())
        }
        RulesCommand::Test { text, no_custom_rules } => {
            let rules = load_rule_set(&config, no_custom_rules)?;
            println!("{}", rules.correct(&text));
            Ok(())
        }
    }
}

/// Where the rule store lives for this config.
pub fn rules_path(config: &MingpianConfig) -> PathBuf {
    config
        .rules
        .path
        .clone()
        .unwrap_or_else(|| config_dir().join("rules.json"))
}

pub fn open_store(config: &MingpianConfig) -> CustomRuleStore<JsonFileStore> {
    CustomRuleStore::with_key(JsonFileStore::new(rules_path(config)), config.rules.key.as_str())
}

/// Built-in rules, followed by the persisted overrides unless `builtin_only`.
pub fn load_rule_set(config: &MingpianConfig, builtin_only: bool) -> anyhow::Result<CorrectionRuleSet> {
    if builtin_only {
        return Ok(CorrectionRuleSet::builtin());
    }
    Ok(CorrectionRuleSet::from_store(&open_store(config))?)
}

fn list_rules(store: &CustomRuleStore<JsonFileStore>) -> anyhow::Result<()> {
    let rules = store.load()?;

    if rules.is_empty() {
        println!("{} No custom rules defined.", style("ℹ").blue());
        return Ok(());
    }

    println!("{}", style(format!("Custom rules ({}):", rules.len())).bold());
    for (wrong, correct) in &rules {
        println!("  {:?} -> {:?}", wrong, correct);
    }

    Ok(())
}

fn list_builtin() {
    let rules = CorrectionRuleSet::builtin();

    println!("{}", style(format!("Built-in rules ({}):", rules.len())).bold());
    for rule in rules.builtin_rules() {
        let scope = match rule.scope {
            RuleScope::Anywhere => "",
            RuleScope::NextToDigit => "  (next to a digit)",
            RuleScope::PlainText => "  (outside email and web addresses)",
        };
        println!("  {:?} -> {:?}{}", rule.wrong, rule.correct, scope);
    }
}
