use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use composer_cli::cli::{Cli, Command, ExecutionArgs, RunArgs, ValidateLinksArgs};
use composer_cli::{RunMode, Wizard, WizardOptions, WizardSummary};
use composer_client::{BackendClient, ClientConfig, ProgressSocket};
use composer_core::domain::LinkStatus;
use composer_core::{
    ArtifactBody, AutomationBackend, CoordinatorConfig, ProgressChannel, SimulationConfig,
    StepSequence, WorkflowCoordinator,
};
use composer_links::{LinkValidator, ValidatorConfig};
use composer_monitoring::{init_logging, LogExt, MonitoringConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut monitoring = MonitoringConfig::from_env().with_service_name("composer");
    if cli.log_json {
        monitoring.enable_json_logging = true;
    }
    init_logging(&monitoring).context("Failed to initialize logging")?;

    match &cli.command {
        Command::Run(args) => run(&cli, args).await,
        Command::ValidateLinks(args) => validate_links(&cli, args).await,
        Command::Status(args) => status(&cli, args).await,
        Command::Cancel(args) => cancel(&cli, args).await,
    }
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ClientConfig::load().context("Failed to load configuration")?,
    };
    if let Some(url) = &cli.backend_url {
        config = config.with_base_url(url.clone());
    }
    config.validate().context("Invalid backend configuration")?;
    Ok(config)
}

async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mode = if args.simulate {
        RunMode::Simulate
    } else if args.fallback {
        RunMode::Fallback
    } else {
        RunMode::Live
    };

    let mut simulation = SimulationConfig::default();
    if let Some(ms) = args.simulation_ms {
        simulation.duration = Duration::from_millis(ms);
    }
    let sequence = if args.fold_scoring {
        StepSequence::folded()
    } else {
        StepSequence::standard()
    };
    let config = CoordinatorConfig {
        sequence,
        simulation,
    };

    let mut socket = None;
    let mut validator_config = ValidatorConfig::default();
    let coordinator = if mode == RunMode::Simulate {
        validator_config = ValidatorConfig::offline();
        WorkflowCoordinator::offline(config)
    } else {
        let client_config = client_config(cli).log_err("Backend configuration rejected")?;
        validator_config.cors_relay_url = client_config.cors_relay_url.clone();
        let client =
            BackendClient::new(client_config.clone()).context("Failed to create backend client")?;
        let channel = ProgressChannel::new();
        match ProgressSocket::spawn(&client_config, channel.clone()) {
            Ok(s) => socket = Some(s),
            Err(e) => warn!("Progress updates unavailable: {}", e),
        }
        WorkflowCoordinator::new(Arc::new(client), config).with_progress(channel)
    };

    let mut options = WizardOptions::new(args.query.clone(), mode);
    options.deep_research = args.deep;
    options.format = args.format.into();
    options.threshold = args.threshold;
    options.progress_wait = Duration::from_millis(args.progress_wait_ms);

    let mut wizard = Wizard::new(coordinator, options);
    if !args.skip_link_check {
        let validator =
            LinkValidator::new(validator_config).context("Failed to create link validator")?;
        wizard = wizard.with_link_validator(validator);
    }

    let summary = wizard.run().await;
    if let Some(socket) = &socket {
        socket.shutdown();
    }
    let summary = summary.context("Wizard run failed")?;

    write_artifact(&summary, args.out.clone()).await?;
    print_summary(&summary);
    Ok(())
}

async fn write_artifact(summary: &WizardSummary, out: Option<PathBuf>) -> Result<()> {
    let artifact = &summary.artifact;
    match &artifact.body {
        ArtifactBody::Inline { text } => {
            let path = out.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
            tokio::fs::write(&path, text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                format = %artifact.format,
                mime = artifact.format.mime_type(),
                "Article written"
            );
            println!("Wrote {} ({})", path.display(), artifact.format);
        }
        ArtifactBody::Remote { download_url } => {
            println!("Download {} from {}", artifact.file_name, download_url);
        }
    }
    if let Some(reason) = &artifact.fallback {
        println!(
            "Requested {} but produced {}: {}",
            artifact.requested, artifact.format, reason
        );
    }
    Ok(())
}

fn print_summary(summary: &WizardSummary) {
    if let Some(report) = &summary.link_report {
        println!(
            "Links: {} valid, {} invalid, {} competitor",
            report.valid_links.len(),
            report.invalid_links.len(),
            report.competitor_links.len()
        );
    }
    if let Some(quality) = &summary.quality {
        let scores: Vec<String> = quality
            .scores()
            .iter()
            .map(|(name, score)| format!("{} {:.1}", name, score))
            .collect();
        println!("Quality: {} (average {:.1})", scores.join(", "), quality.average());
    }
    if summary.refined {
        println!("Draft was refined once");
    }
    if !summary.simulated_fallbacks.is_empty() {
        let names: Vec<&str> = summary.simulated_fallbacks.iter().map(|op| op.name()).collect();
        println!("Simulated after backend failure: {}", names.join(", "));
    }
}

async fn validate_links(cli: &Cli, args: &ValidateLinksArgs) -> Result<()> {
    let mut config = if args.offline {
        ValidatorConfig::offline()
    } else {
        ValidatorConfig::default()
    };
    config.request_delay = Duration::from_millis(args.delay_ms);
    if !args.offline {
        config.cors_relay_url = client_config(cli).ok().and_then(|c| c.cors_relay_url);
    }

    let mut validator = LinkValidator::new(config).context("Failed to create link validator")?;
    for domain in &args.competitors {
        validator.blocklist_mut().add_domain(domain);
    }

    let results = validator
        .sweep(args.urls.as_slice(), |percent, url| info!(percent, %url, "Checking link"))
        .await;

    let (mut valid, mut invalid, mut competitor) = (0, 0, 0);
    for result in &results {
        let label = match result.link_status() {
            LinkStatus::Valid => {
                valid += 1;
                "valid"
            }
            LinkStatus::Invalid => {
                invalid += 1;
                "invalid"
            }
            LinkStatus::Competitor => {
                competitor += 1;
                "competitor"
            }
        };
        match &result.error {
            Some(error) => println!("{:<10} {:>3}  {}  ({})", label, result.status, result.url, error),
            None => println!("{:<10} {:>3}  {}", label, result.status, result.url),
        }
    }
    println!("{} valid, {} invalid, {} competitor", valid, invalid, competitor);
    Ok(())
}

async fn status(cli: &Cli, args: &ExecutionArgs) -> Result<()> {
    let client = BackendClient::new(client_config(cli)?).context("Failed to create backend client")?;
    let accepted = client
        .execution_status(&args.execution_id)
        .await
        .and_then(|response| response.into_result("Failed to fetch execution status"))
        .with_context(|| format!("Status request for {} failed", args.execution_id))?;
    let text = serde_json::to_string_pretty(&accepted.data).context("Failed to render status")?;
    println!("{}", text);
    Ok(())
}

async fn cancel(cli: &Cli, args: &ExecutionArgs) -> Result<()> {
    let client = BackendClient::new(client_config(cli)?).context("Failed to create backend client")?;
    let mut coordinator = WorkflowCoordinator::new(Arc::new(client), CoordinatorConfig::default());
    let cancelled = coordinator
        .cancel(&args.execution_id)
        .await
        .with_context(|| format!("Cancel request for {} failed", args.execution_id))?;
    if cancelled {
        println!("Cancelled {}", args.execution_id);
    } else {
        println!("{} was not cancelled", args.execution_id);
    }
    Ok(())
}
