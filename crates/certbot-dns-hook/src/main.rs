// # certbot-dns-hook
//
// certbot `--manual-auth-hook` / `--manual-cleanup-hook` for DNS-01.
//
// This binary is a THIN integration layer:
// 1. Parse the single argument certbot passes
// 2. Load settings from the environment (and an optional JSON file)
// 3. Register the compiled-in providers
// 4. Run one `ValidationOrchestrator` on a single-threaded runtime
// 5. Map the outcome to an exit code
//
// All DNS logic lives in `acme-hook-core` and the provider crates.
//
// ## Usage
//
// ```bash
// export CERTBOT_HOOK_PROVIDER=godaddy
// export CERTBOT_HOOK_API_KEY=...
// export CERTBOT_HOOK_API_SECRET=...
//
// certbot-dns-hook "www.example.com <validation-token> auth"
// certbot-dns-hook "www.example.com <validation-token> cleanup"
// ```
//
// See `settings.rs` for the full list of variables.

mod settings;

use acme_hook_core::log::DomainLog;
use acme_hook_core::traits::LogSink;
use acme_hook_core::{HookConfig, Invocation, ProviderRegistry, ValidationOrchestrator};
use anyhow::{Context, Result};
use settings::Settings;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// File (inside the log directory) collecting construction failures
const ERROR_LOG_NAME: &str = "certbot-hook-errors.log";

/// The only stderr output for a malformed invocation
const BAD_PARAMETERS: &str = "The manual hook didn't receive the appropriate parameters. Aborting.";

/// Exit codes for the hook
///
/// certbot treats any non-zero exit of an auth hook as fatal for the
/// whole run.
#[derive(Debug, Clone, Copy)]
enum HookExitCode {
    /// Finished (the DNS outcome is reported on stdout and in the log)
    Done = 0,
    /// The argument did not match the invocation grammar
    InvalidInvocation = 1,
    /// Bad settings, or the orchestrator could not be constructed
    ConfigError = 2,
    /// The DNS change did not succeed and strict exit is enabled
    ValidationFailed = 3,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // A non-UTF-8 argument is just another malformed invocation
    let args: Option<Vec<String>> = env::args_os()
        .skip(1)
        .map(|arg| arg.into_string().ok())
        .collect();
    let invocation = match args.map(Invocation::from_args) {
        Some(Ok(invocation)) => invocation,
        _ => {
            eprintln!("{}", BAD_PARAMETERS);
            return HookExitCode::InvalidInvocation.into();
        }
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    let log_level = match settings.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout belongs to certbot's console output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    rt.block_on(run_hook(invocation, settings.config)).into()
}

/// Build the registry from the compiled-in provider crates
fn build_registry() -> ProviderRegistry {
    #[allow(unused_mut)]
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "godaddy")]
    acme_hook_provider_godaddy::register(&mut registry);

    #[cfg(feature = "cloudflare")]
    acme_hook_provider_cloudflare::register(&mut registry);

    debug!("Registered providers: {:?}", registry.list_providers());
    registry
}

/// Run one validation request
async fn run_hook(invocation: Invocation, config: HookConfig) -> HookExitCode {
    let registry = build_registry();
    let phase = invocation.phase;
    let domain = invocation.domain.clone();

    let mut orchestrator = match ValidationOrchestrator::new(invocation, &config, &registry) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("Could not construct the certbot worker: the given parameters are NOT valid!");
            error!("Construction failed for {} ({}): {}", domain, phase, e);
            if let Err(log_err) = record_construction_error(&config, &domain, &e) {
                error!("{:#}", log_err);
            }
            return HookExitCode::ConfigError;
        }
    };

    println!(
        "Using '{}' certbot hook for domain '{}'...",
        phase,
        orchestrator.domain().base_domain()
    );
    info!(
        "Running {} validation for {} via {}",
        phase,
        orchestrator.domain(),
        orchestrator.provider_name()
    );

    let outcome = orchestrator.run().await;
    info!("Validation finished: {}", outcome);

    if config.strict_exit && !outcome.is_success() {
        HookExitCode::ValidationFailed
    } else {
        HookExitCode::Done
    }
}

/// Append a construction failure to the hook's error log
///
/// No per-domain log exists yet at this point (the base domain may not
/// even be known), so failures go to a shared file.
fn record_construction_error(
    config: &HookConfig,
    domain: &str,
    err: &acme_hook_core::Error,
) -> Result<()> {
    let path = config.log_dir.join(ERROR_LOG_NAME);
    let log = DomainLog::open_file(&path)
        .with_context(|| format!("cannot open error log {}", path.display()))?;
    log.log(&format!(
        "Could not construct the validation worker for '{}' (provider '{}'): {}",
        domain, config.provider, err
    ));
    Ok(())
}
