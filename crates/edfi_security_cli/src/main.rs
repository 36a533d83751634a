//! CLI probe for a provisioned security database.
//!
//! # Usage
//! - `edfi_security_cli <db-path> <http-verb>`
//! - `edfi_security_cli <db-path> strategy <name>`
//! - `edfi_security_cli <db-path> snapshot <application-name>`
//!
//! Prints one `key=value` line per fact and exits with status 1 on error.

use edfi_security_core::{
    core_version, SecurityRepository, SqliteSecurityContextFactory, SqliteSecurityRepository,
};
use std::process::ExitCode;

const USAGE: &str = "usage: edfi_security_cli <db-path> (<http-verb> | strategy <name> | snapshot <application>)";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<Vec<String>, String> {
    let (db_path, command) = args.split_first().ok_or_else(|| USAGE.to_string())?;
    let repo = SqliteSecurityRepository::new(SqliteSecurityContextFactory::new(db_path));

    let mut lines = vec![format!("edfi_security_core version={}", core_version())];
    match command {
        [verb] => {
            let action = repo
                .get_action_by_http_verb(verb)
                .map_err(|err| err.to_string())?;
            lines.push(format!(
                "action id={} name={} uri={}",
                action.action_id, action.action_name, action.action_uri
            ));
        }
        [kind, name] if kind == "strategy" => {
            let strategy = repo
                .get_authorization_strategy_by_name(name)
                .map_err(|err| err.to_string())?;
            lines.push(format!(
                "authorization_strategy id={} name={} display_name={}",
                strategy.authorization_strategy_id,
                strategy.authorization_strategy_name,
                strategy.display_name
            ));
        }
        [kind, name] if kind == "snapshot" => {
            let cache = repo
                .load_instance_cache_object(name)
                .map_err(|err| err.to_string())?;
            lines.push(format!(
                "application id={} name={}",
                cache.application().application_id,
                cache.application().application_name
            ));
            lines.push(format!(
                "counts actions={} claim_sets={} resource_claims={} authorization_strategies={} claim_set_resource_claims={} metadata={}",
                cache.actions().len(),
                cache.claim_sets().len(),
                cache.resource_claims().len(),
                cache.authorization_strategies().len(),
                cache.claim_set_resource_claims().len(),
                cache.resource_claim_authorization_metadata().len()
            ));
        }
        _ => return Err(USAGE.to_string()),
    }

    Ok(lines)
}
