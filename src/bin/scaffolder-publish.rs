//! scaffolder-publish
//!
//! Create a GitLab project for a scaffolded directory and push it.
//!
//! Usage:
//!   scaffolder-publish --store-path https://gitlab.com/group/name --owner group [--org] [--dir PATH]

use anyhow::Context;
use clap::Parser;
use scaffolder_publish::{
    CliOverrides, ConfigFile, GitLabPublisher, PublishRequest, PublishValues, Publisher, Visibility,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scaffolder-publish")]
#[command(about = "Create a GitLab project for a scaffolded directory and push it")]
struct Args {
    /// Config file (default: ~/.config/scaffolder-publish/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// GitLab host, e.g. gitlab.com
    #[arg(long, env = "GITLAB_HOST")]
    host: Option<String>,

    /// Access token with the `api` scope
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Where the repository should live, e.g. https://gitlab.com/group/name
    #[arg(long)]
    store_path: String,

    /// Namespace (group or user) to create the project under
    #[arg(long)]
    owner: String,

    /// The owner is a group
    #[arg(long)]
    org: bool,

    /// Directory to publish
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Project visibility (public, internal, private)
    #[arg(long, value_parser = parse_visibility)]
    visibility: Option<Visibility>,

    /// Initial branch name
    #[arg(long)]
    branch: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn parse_visibility(s: &str) -> Result<Visibility, String> {
    match s {
        "public" => Ok(Visibility::Public),
        "internal" => Ok(Visibility::Internal),
        "private" => Ok(Visibility::Private),
        other => Err(format!("unknown visibility '{other}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr to keep stdout clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("warn,scaffolder_publish=info")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = match args.config {
        Some(path) => path,
        None => ConfigFile::default_path()?,
    };
    let config = ConfigFile::load(&config_path)
        .await?
        .gitlab
        .apply_env()
        .apply_cli(CliOverrides {
            host: args.host,
            token: args.token,
            repo_visibility: args.visibility,
            default_branch: args.branch,
        });

    let publisher = GitLabPublisher::from_config(&config)?;

    let mut values = PublishValues::new(args.store_path, args.owner);
    if args.org {
        values = values.org();
    }

    let span = tracing::info_span!("publish", owner = %values.owner, store_path = %values.store_path);
    let result = publisher
        .publish(PublishRequest::new(values, args.dir).with_span(span))
        .await
        .context("Publishing to GitLab failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Remote URL:       {}", result.remote_url);
        println!("Catalog info URL: {}", result.catalog_info_url);
    }

    Ok(())
}
