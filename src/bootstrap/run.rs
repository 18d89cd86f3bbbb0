//! Command execution on top of the assembled [`App`].

use nm_app::App;
use nm_core::config::AppConfig;
use nm_core::SessionSnapshot;
use nm_infra::SignUpOutcome;
use nm_platform::DirsAppDirsAdapter;
use tracing::info;

use super::wiring::wire_dependencies;
use crate::cli::Command;

/// One-line rendering of the read model.
pub fn describe_snapshot(snapshot: &SessionSnapshot) -> String {
    let user = snapshot
        .user()
        .map(|user| user.email.clone().unwrap_or_else(|| user.id.to_string()))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "state={} user={} onboarded={} loading={}",
        snapshot.state.label(),
        user,
        snapshot.is_onboarded(),
        snapshot.is_loading()
    )
}

fn print_purge_report(report: &nm_app::usecases::PurgeReport) {
    println!(
        "Deleted {} local stores and {} cache buckets",
        report.deleted_stores.len(),
        report.deleted_caches.len()
    );
    for failure in &report.failures {
        println!("  failed: {} ({})", failure.target, failure.error);
    }
}

pub async fn run_command(command: Command, config: AppConfig) -> anyhow::Result<()> {
    let wired = wire_dependencies(&config, &DirsAppDirsAdapter::new()).await?;
    let identity = wired.identity.clone();
    let app = App::new(wired.deps, &config);

    match command {
        Command::Run => run_session(&app).await,
        Command::Status => {
            let monitor = app.start()?;
            let snapshot = app.session.wait_until_ready().await;
            println!("{}", describe_snapshot(&snapshot));
            println!("online={}", app.session.is_online());
            app.session.shutdown();
            monitor.abort();
            Ok(())
        }
        Command::Login { email, password } => {
            let session = identity.sign_in_with_password(&email, &password).await?;
            println!(
                "Signed in as {}",
                session.user.email.as_deref().unwrap_or(session.user.id.as_str())
            );
            Ok(())
        }
        Command::Signup { email, password } => {
            match identity.sign_up(&email, &password).await? {
                SignUpOutcome::SignedIn(session) => {
                    println!("Account created, signed in as {}", session.user.id)
                }
                SignUpOutcome::ConfirmationPending(_) => {
                    println!("Account created; check {email} to confirm it before signing in")
                }
            }
            Ok(())
        }
        Command::Logout => {
            let report = app.session.sign_out().await?;
            println!("Signed out");
            print_purge_report(&report);
            Ok(())
        }
        Command::Purge => {
            let report = app.purge.execute().await;
            print_purge_report(&report);
            Ok(())
        }
    }
}

/// Log every snapshot change until Ctrl-C.
async fn run_session(app: &App) -> anyhow::Result<()> {
    let monitor = app.start()?;
    let mut snapshots = app.session.subscribe();
    info!(snapshot = %describe_snapshot(&snapshots.borrow_and_update()), "session layer started");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                info!("shutting down");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = describe_snapshot(&snapshots.borrow_and_update());
                info!(snapshot = %line, "session changed");
            }
        }
    }

    app.session.shutdown();
    monitor.abort();
    Ok(())
}
