// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use outfitter::cluster::{ClusterApi, Reconciler};
use outfitter::component::{Aggregator, Component, ComponentSpec, TemplateGroups};
use outfitter::config::Config;
use outfitter::error::OutfitterError;
use outfitter::kubernetes::{create_client, ensure_namespace_exists, run_discovery};
use outfitter::state::ComponentState;

#[derive(Parser, Debug)]
#[command(name = "outfitter", version, about = "Render a component's manifests and reconcile them against a cluster")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create every object and wait for each to become ready
    Create {
        #[command(flatten)]
        component: ComponentArgs,
        /// Create the component namespace first if it does not exist
        #[arg(long)]
        create_namespace: bool,
    },
    /// Check which recorded objects still exist and refresh the state file
    Read {
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Replace every object with its freshly rendered form
    Update {
        #[command(flatten)]
        component: ComponentArgs,
    },
    /// Delete every object and wait until the cluster confirms it is gone
    Delete {
        #[command(flatten)]
        component: ComponentArgs,
    },
}

#[derive(Args, Debug)]
struct ClusterArgs {
    /// State file recording the objects of the component
    #[arg(long, env = "OUTFITTER_STATE", default_value = "outfitter-state.json")]
    state: PathBuf,
    /// Kubeconfig file; inferred from the environment when omitted
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ComponentArgs {
    /// Component file with name, namespace and config
    #[arg(long)]
    component: PathBuf,
    /// Directory with one sub-directory of manifest templates per resource category
    #[arg(long)]
    templates: PathBuf,
    #[command(flatten)]
    cluster: ClusterArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Create {
            component,
            create_namespace,
        } => create(&config, &component, create_namespace, &cancel).await,
        Command::Read { cluster } => read(&config, &cluster, &cancel).await,
        Command::Update { component } => update(&config, &component, &cancel).await,
        Command::Delete { component } => delete(&config, &component, &cancel).await,
    }
}

async fn create(
    config: &Config,
    args: &ComponentArgs,
    create_namespace: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let component = load_component(config, args)?;
    let reconciler = connect(config, &args.cluster).await?;

    if create_namespace {
        ensure_namespace_exists(reconciler.api().client(), component.namespace()).await?;
    }

    match reconciler.create(&component, cancel).await {
        Ok(()) => {
            ComponentState::from_component(&component).save(&args.cluster.state)?;
            info!("Component {} created", component.name());
            Ok(())
        }
        Err(e) => {
            if let OutfitterError::Lifecycle { applied, .. } = &e {
                ComponentState::partial(&component, applied).save(&args.cluster.state)?;
                warn!("Recorded {} objects created before the failure", applied.len());
            }
            Err(e.into())
        }
    }
}

async fn read(config: &Config, args: &ClusterArgs, cancel: &CancellationToken) -> Result<()> {
    let Some(mut state) = ComponentState::load(&args.state)? else {
        bail!("No state found at {}", args.state.display());
    };
    let reconciler = connect(config, args).await?;

    state.objects = reconciler.read(&state.objects, cancel).await?;
    state.save(&args.state)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&state).context("Failed to render state")?
    );
    Ok(())
}

async fn update(config: &Config, args: &ComponentArgs, cancel: &CancellationToken) -> Result<()> {
    let component = load_component(config, args)?;
    let reconciler = connect(config, &args.cluster).await?;

    reconciler.update(&component, cancel).await?;
    ComponentState::from_component(&component).save(&args.cluster.state)?;
    info!("Component {} updated", component.name());
    Ok(())
}

async fn delete(config: &Config, args: &ComponentArgs, cancel: &CancellationToken) -> Result<()> {
    let component = load_component(config, args)?;
    let reconciler = connect(config, &args.cluster).await?;

    match reconciler.delete(&component, cancel).await {
        Ok(()) => {
            ComponentState::remove(&args.cluster.state)?;
            info!("Component {} deleted", component.name());
            Ok(())
        }
        Err(e) => {
            if let OutfitterError::Lifecycle { applied, .. } = &e {
                if let Some(mut state) = ComponentState::load(&args.cluster.state)? {
                    state.forget(applied);
                    state.save(&args.cluster.state)?;
                }
            }
            Err(e.into())
        }
    }
}

fn load_component(config: &Config, args: &ComponentArgs) -> Result<Component> {
    let spec = read_component_spec(&args.component)?;
    let templates = TemplateGroups::from_dir(&args.templates)?;
    info!(
        "Loaded {} templates from {}",
        templates.len(),
        args.templates.display()
    );

    let component = Aggregator::new(templates)
        .with_render_policy(config.render_policy())
        .with_hash_options(config.hash_options())
        .build_spec(&spec)?;

    for failure in component.failures() {
        warn!("Skipped template {}: {}", failure.template, failure.message);
    }
    Ok(component)
}

fn read_component_spec(path: &Path) -> Result<ComponentSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read component file {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse component file {}", path.display()))
}

async fn connect(config: &Config, args: &ClusterArgs) -> Result<Reconciler> {
    let client = create_client(args.kubeconfig.as_deref()).await?;
    info!("Connected to Kubernetes cluster");

    let mut api = ClusterApi::new(client.clone());
    if config.use_discovery {
        api = api.with_discovery(run_discovery(&client).await?);
    }

    Ok(Reconciler::new(api).with_options(config.reconcile_options()))
}
