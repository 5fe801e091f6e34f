mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use kubetop_k8s::{KubeClient, Selector, fetch_pod_metrics, supports_metrics_api};

use crate::config::{Config, DEFAULT_NAMESPACE, default_kubeconfig_path, resolve_kubeconfig};
use crate::output::OutputFormat;

/// Kubetop - CPU and memory usage per pod from the Kubernetes Metrics API
#[derive(Parser, Debug)]
#[command(name = "kubetop")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pod name (optional, lists all pods in scope if not provided)
    #[arg(value_name = "POD")]
    pod: Option<String>,

    /// Absolute path to the kubeconfig file (default: ~/.kube/config)
    #[arg(long, value_name = "PATH")]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context (default: current context)
    #[arg(long)]
    context: Option<String>,

    /// Namespace to query
    #[arg(short, long)]
    namespace: Option<String>,

    /// Query pods in all namespaces
    #[arg(short = 'A', long)]
    all_namespaces: bool,

    /// Label selector, e.g. `app=web,tier!=db` (ignored when POD is given)
    #[arg(short = 'l', long)]
    selector: Option<Selector>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Config file (default: ~/.kubetop/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only report whether the cluster serves a supported Metrics API version
    #[arg(long)]
    check_metrics_api: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = Config::load(args.config.as_deref())?;

    let kubeconfig = resolve_kubeconfig(
        args.kubeconfig,
        &config,
        default_kubeconfig_path(|key| std::env::var(key).ok()),
    );
    let context = args.context.or(config.context);

    tracing::debug!(kubeconfig = ?kubeconfig, context = ?context, "Resolved cluster settings");

    let client = KubeClient::connect(kubeconfig.as_deref(), context.as_deref()).await?;
    tracing::debug!(
        context = client.context().unwrap_or("<current>"),
        "Connected to cluster"
    );

    if args.check_metrics_api {
        let supported = supports_metrics_api(&client).await;
        println!("metrics API supported: {}", supported);
        return Ok(metrics_api_exit_code(supported));
    }

    let namespace = args
        .namespace
        .or(config.namespace)
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let selector = args.selector.unwrap_or_default();
    let format = args.output.or(config.output).unwrap_or_default();

    let records = fetch_pod_metrics(
        &client,
        &namespace,
        args.pod.as_deref().unwrap_or_default(),
        args.all_namespaces,
        &selector,
    )
    .await?;

    let stdout = std::io::stdout();
    output::write_report(&mut stdout.lock(), &records, format)?;

    Ok(ExitCode::SUCCESS)
}

/// Exit status of `--check-metrics-api`
fn metrics_api_exit_code(supported: bool) -> ExitCode {
    if supported {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["kubetop"]).unwrap();
        assert!(args.pod.is_none());
        assert!(args.namespace.is_none());
        assert!(!args.all_namespaces);
        assert!(args.selector.is_none());
        assert!(!args.check_metrics_api);
    }

    #[test]
    fn test_args_full() {
        let args = Args::try_parse_from([
            "kubetop",
            "web-0",
            "--kubeconfig",
            "/tmp/kubeconfig",
            "-n",
            "shop",
            "-A",
            "-l",
            "app=web",
            "-o",
            "json",
        ])
        .unwrap();
        assert_eq!(args.pod.as_deref(), Some("web-0"));
        assert_eq!(args.kubeconfig, Some(PathBuf::from("/tmp/kubeconfig")));
        assert_eq!(args.namespace.as_deref(), Some("shop"));
        assert!(args.all_namespaces);
        assert_eq!(args.selector.map(|s| s.to_string()).as_deref(), Some("app=web"));
        assert_eq!(args.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_args_invalid_selector() {
        assert!(Args::try_parse_from(["kubetop", "-l", "app=we b"]).is_err());
    }

    #[test]
    fn test_metrics_api_exit_code() {
        assert_eq!(metrics_api_exit_code(true), ExitCode::SUCCESS);
        assert_eq!(metrics_api_exit_code(false), ExitCode::FAILURE);
    }

    #[test]
    fn test_args_verify() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
