//! Store smoke entry point.
//!
//! # Responsibility
//! - Read configuration, select the backend and load every working set.
//! - Print the active mode and collection sizes for a quick sanity check.

use log::error;
use sipintar_core::service::{AnnouncementService, LedgerService, ResidentService};
use sipintar_core::{init_logging, init_process_backend, Repositories, StoreConfig, WorkingSet};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("sipintar: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        let level = config
            .log_level
            .as_deref()
            .unwrap_or(sipintar_core::default_log_level());
        init_logging(level, log_dir).map_err(|err| err.to_string())?;
    }

    let backend = init_process_backend(&config).map_err(|err| err.to_string())?;
    let repos = Repositories::new(backend);

    let residents = ResidentService::new(repos.residents.clone(), Arc::new(WorkingSet::default()));
    let ledger = LedgerService::new(repos.transactions.clone(), Arc::new(WorkingSet::default()));
    let announcements = AnnouncementService::new(
        repos.announcements.clone(),
        Arc::new(WorkingSet::default()),
    );

    residents.load().await.map_err(|err| err.to_string())?;
    ledger.load().await.map_err(|err| err.to_string())?;
    announcements.load().await.map_err(|err| err.to_string())?;

    let summary = ledger.summary();
    println!("sipintar_core version={}", sipintar_core::core_version());
    println!("mode={}", repos.mode().as_str());
    println!("residents={}", residents.working_set().len());
    println!("transactions={}", ledger.working_set().len());
    println!("announcements={}", announcements.working_set().len());
    println!(
        "balance={} income={} expense={}",
        summary.balance, summary.income, summary.expense
    );
    Ok(())
}
