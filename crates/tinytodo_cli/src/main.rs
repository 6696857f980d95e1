//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load configuration, the entity fixture and the policy file the way a
//!   server would.
//! - Print deterministic store statistics for quick local sanity checks.

use std::process::ExitCode;
use tinytodo_core::{
    core_version, init_from_config, CedarPdp, EntityStore, ServiceConfig, TodoService,
};

fn main() -> ExitCode {
    let config = ServiceConfig::from_env();
    if let Err(err) = init_from_config(&config) {
        eprintln!("tinytodo logging disabled: {err}");
    }

    let store = match EntityStore::load(&config.entities_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!(
                "tinytodo failed to load `{}`: {err}",
                config.entities_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let pdp = match CedarPdp::load(&config.policies_path) {
        Ok(pdp) => pdp,
        Err(err) => {
            eprintln!("tinytodo failed to load policies: {err}");
            return ExitCode::FAILURE;
        }
    };

    let policies = pdp.policy_count();
    let service = TodoService::new(store, pdp);
    println!("tinytodo_core version={}", core_version());
    println!("tinytodo application={}", service.application_uid());
    service.inspect(|store| {
        println!(
            "tinytodo users={} teams={} lists={} policies={}",
            store.user_count(),
            store.team_count(),
            store.list_count(),
            policies
        );
    });
    ExitCode::SUCCESS
}
