use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use oss_bucket_lifecycle::{
    adapters::inbound::schema::{LifecycleResourceConfig, LifecycleResourceState},
    app::{gateway_backend_from, AppBuilder, AppConfig, AppServices},
    domain::value_objects::{BucketName, RuleId},
    ports::services::LifecycleService,
    services::ServicePolicy,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "oss-lifecycle")]
#[command(about = "Manage Alibaba Cloud OSS bucket lifecycle rules declaratively", long_about = None)]
struct Cli {
    /// Gateway backend
    #[arg(long, env = "OSS_BACKEND", value_enum, default_value_t = Backend::Memory)]
    backend: Backend,

    /// OSS region endpoint, e.g. oss-cn-hangzhou.aliyuncs.com
    #[arg(long, env = "OSS_ENDPOINT")]
    endpoint: Option<String>,

    /// Region used to derive the endpoint when none is given
    #[arg(long, env = "ALICLOUD_REGION")]
    region: Option<String>,

    /// Access key ID
    #[arg(long, env = "ALICLOUD_ACCESS_KEY")]
    access_key: Option<String>,

    /// Access key secret
    #[arg(long, env = "ALICLOUD_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// STS security token
    #[arg(long, env = "ALICLOUD_SECURITY_TOKEN", hide_env_values = true)]
    security_token: Option<String>,

    /// Talk to OSS over HTTPS
    #[arg(long, env = "OSS_USE_HTTPS", default_value_t = true, action = clap::ArgAction::Set)]
    use_https: bool,

    /// Print state as a Terraform flatmap instead of JSON documents
    #[arg(long)]
    flatmap: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Memory,
    Oss,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the rule described by a resource configuration
    Apply {
        /// Resource configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Read one rule back
    Read {
        /// Bucket name
        bucket: String,
        /// Rule ID
        rule_id: String,
    },

    /// Remove one rule, keeping the others
    RemoveRule {
        /// Bucket name
        bucket: String,
        /// Rule ID
        rule_id: String,
    },

    /// Delete the bucket's whole lifecycle configuration
    Delete {
        /// Bucket name
        bucket: String,
    },

    /// Import every rule of a bucket
    Import {
        /// Bucket name
        bucket: String,
    },
}

impl Cli {
    /// Flag values under the environment names the shared resolver reads
    fn setting(&self, key: &str) -> Option<String> {
        match key {
            "OSS_BACKEND" => Some(
                match self.backend {
                    Backend::Memory => "memory",
                    Backend::Oss => "oss",
                }
                .to_string(),
            ),
            "OSS_ENDPOINT" => self.endpoint.clone(),
            "ALICLOUD_REGION" => self.region.clone(),
            "ALICLOUD_ACCESS_KEY" => self.access_key.clone(),
            "ALICLOUD_SECRET_KEY" => self.secret_key.clone(),
            "ALICLOUD_SECURITY_TOKEN" => self.security_token.clone(),
            "OSS_USE_HTTPS" => Some(self.use_https.to_string()),
            _ => None,
        }
    }

    fn to_app_config(&self) -> Result<AppConfig> {
        let gateway_backend = gateway_backend_from(|key| self.setting(key))
            .context("Invalid gateway configuration")?;

        Ok(AppConfig {
            gateway_backend,
            policy: ServicePolicy::default(),
        })
    }

    fn init_logging(&self) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.log_level.to_lowercase()))
            .context("Invalid log level")?;

        // stdout carries the state documents
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();

        Ok(())
    }

    fn print_state(&self, state: &LifecycleResourceState) -> Result<()> {
        if self.flatmap {
            print_json(&state.flatten())
        } else {
            print_json(state)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render state")?;
    println!("{}", rendered);
    Ok(())
}

fn parse_bucket(bucket: &str) -> Result<BucketName> {
    BucketName::new(bucket.to_string()).with_context(|| format!("Invalid bucket name '{}'", bucket))
}

fn parse_rule_id(rule_id: &str) -> Result<RuleId> {
    RuleId::new(rule_id.to_string()).with_context(|| format!("Invalid rule ID '{}'", rule_id))
}

async fn run(cli: &Cli, app: AppServices) -> Result<()> {
    let service = &app.lifecycle_service;

    match &cli.command {
        Commands::Apply { config } => {
            let raw = tokio::fs::read_to_string(config)
                .await
                .with_context(|| format!("Failed to read {}", config.display()))?;
            let resource: LifecycleResourceConfig =
                serde_json::from_str(&raw).context("Invalid resource configuration")?;
            let (bucket, rule) = resource
                .into_rule()
                .context("Invalid resource configuration")?;

            if let Some(memory) = &app.memory_gateway {
                memory.create_bucket(&bucket).await;
            }

            let stored = service
                .apply_rule(&bucket, rule)
                .await
                .with_context(|| format!("Failed to apply lifecycle rule on bucket '{}'", bucket))?;
            cli.print_state(&LifecycleResourceState::from_rule(&bucket, &stored))?;
        }
        Commands::Read { bucket, rule_id } => {
            let bucket = parse_bucket(bucket)?;
            let rule_id = parse_rule_id(rule_id)?;

            match service
                .read_rule(&bucket, &rule_id)
                .await
                .with_context(|| format!("Failed to read lifecycle rule '{}'", rule_id))?
            {
                Some(rule) => cli.print_state(&LifecycleResourceState::from_rule(&bucket, &rule))?,
                None => {
                    info!(bucket = %bucket, rule_id = %rule_id, "Lifecycle rule is gone");
                    print_json(&serde_json::Value::Null)?;
                }
            }
        }
        Commands::RemoveRule { bucket, rule_id } => {
            let bucket = parse_bucket(bucket)?;
            let rule_id = parse_rule_id(rule_id)?;
            service
                .remove_rule(&bucket, &rule_id)
                .await
                .with_context(|| format!("Failed to remove lifecycle rule '{}'", rule_id))?;
        }
        Commands::Delete { bucket } => {
            let bucket = parse_bucket(bucket)?;
            service
                .delete_lifecycle(&bucket)
                .await
                .with_context(|| format!("Failed to delete lifecycle of bucket '{}'", bucket))?;
        }
        Commands::Import { bucket } => {
            let bucket = parse_bucket(bucket)?;
            let rules = service
                .list_rules(&bucket)
                .await
                .with_context(|| format!("Failed to import lifecycle of bucket '{}'", bucket))?;

            let states: Vec<LifecycleResourceState> = rules
                .iter()
                .map(|rule| LifecycleResourceState::from_rule(&bucket, rule))
                .collect();
            if cli.flatmap {
                let flat: Vec<_> = states.iter().map(|s| s.flatten()).collect();
                print_json(&flat)?;
            } else {
                print_json(&states)?;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!(backend = ?cli.backend, "Starting oss-lifecycle");

    let config = cli.to_app_config()?;
    let app = AppBuilder::new()
        .with_config(config)
        .build()
        .context("Failed to build application")?;

    run(&cli, app).await
}
