//! Command line interface for the `ipconn` binary.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use ip_connection_map::config::{
    RuntimeConfig, COUNT_MAX, DEFAULT_COUNT, DEFAULT_INPUT_FILE, DEFAULT_MOCK_OUTPUT_FILE,
    DEFAULT_OUTPUT_FILE, ENV_FIREBASE_TOKEN, ENV_FIREBASE_URL,
};
use ip_connection_map::output::{print_publish_summary, write_root_config};
use ip_connection_map::processing::{
    generate_mock_root, resolve, GroupBySettings, Ipv4GroupBy, Ipv6GroupBy, RootConfig,
};
use ip_connection_map::store::JsonFileStore;
use ip_connection_map::{deploy, generate_config, lookup, report_shadowed};
use std::error::Error;

#[derive(Parser)]
#[command(name = "ipconn")]
#[command(about = "Map IP addresses to connections by CIDR range", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Clone, Copy)]
pub struct GroupByArgs {
    /// IPv4 grouping level: none, 8, 16, 24
    #[arg(long = "ipv4GroupBy", default_value = "none")]
    pub ipv4_group_by: Ipv4GroupBy,

    /// IPv6 grouping level: none, 16, 32, 48
    #[arg(long = "ipv6GroupBy", default_value = "none")]
    pub ipv6_group_by: Ipv6GroupBy,
}

impl GroupByArgs {
    fn settings(&self) -> GroupBySettings {
        GroupBySettings::new(self.ipv4_group_by, self.ipv6_group_by)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a config from a mapping CSV
    Generate {
        #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
        input: String,
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: String,
        #[command(flatten)]
        group_by: GroupByArgs,
        /// Overwrite the remote store with the result
        #[arg(long)]
        deploy: bool,
    },
    /// Build a config of random, non-overlapping mappings
    Mock {
        /// Mappings per family
        #[arg(short, long, default_value_t = DEFAULT_COUNT, value_parser = parse_count)]
        count: usize,
        /// Put the known test fixtures in front of the random mappings
        #[arg(long = "testfixtures")]
        test_fixtures: bool,
        #[arg(short, long, default_value = DEFAULT_MOCK_OUTPUT_FILE)]
        output: String,
        #[command(flatten)]
        group_by: GroupByArgs,
        #[arg(long)]
        deploy: bool,
    },
    /// Resolve one address
    Resolve {
        #[arg(long)]
        ip: String,
        /// Runtime config `<endpoint>|<secret>|<ipv4GroupBy>|<ipv6GroupBy>`
        #[arg(long, env = "IPCONN_CONFIG")]
        config: Option<String>,
        /// Resolve against a generated config file instead of the store,
        /// using the grouping flags below
        #[arg(long)]
        file: Option<String>,
        #[command(flatten)]
        group_by: GroupByArgs,
    },
}

fn parse_count(s: &str) -> Result<usize, String> {
    let count: usize = s.parse().map_err(|e| format!("invalid count '{s}': {e}"))?;
    if count > COUNT_MAX {
        return Err(format!("count must be at most {COUNT_MAX}"));
    }
    Ok(count)
}

/// Endpoint and secret for deploys, from the environment.
fn deploy_target() -> Result<(String, String), Box<dyn Error>> {
    let endpoint = std::env::var(ENV_FIREBASE_URL)
        .map_err(|_| format!("{ENV_FIREBASE_URL} must be set to deploy"))?;
    let secret = std::env::var(ENV_FIREBASE_TOKEN)
        .map_err(|_| format!("{ENV_FIREBASE_TOKEN} must be set to deploy"))?;
    Ok((endpoint, secret))
}

impl Cli {
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        match self.command {
            Command::Generate {
                ref input,
                ref output,
                group_by,
                deploy,
            } => {
                let settings = group_by.settings();
                log::info!("Generating config from {input} ({settings})");
                let root = generate_config(input, &settings)?;
                publish(&root, output, group_by, deploy).await
            }
            Command::Mock {
                count,
                test_fixtures,
                ref output,
                group_by,
                deploy,
            } => {
                let settings = group_by.settings();
                log::info!("Generating {count} mock mappings per family ({settings})");
                let root =
                    generate_mock_root(&settings, count, test_fixtures, &mut rand::thread_rng())?;
                report_shadowed(&root);
                publish(&root, output, group_by, deploy).await
            }
            Command::Resolve {
                ref ip,
                ref config,
                ref file,
                group_by,
            } => {
                let resolution = match (file, config) {
                    (Some(file), _) => {
                        let store = JsonFileStore::open(file)?;
                        resolve(Some(ip.as_str()), &group_by.settings(), &store).await?
                    }
                    (None, config) => lookup(config.as_deref(), Some(ip.as_str())).await?,
                };
                println!("{}", serde_json::to_string(&resolution)?);
                Ok(())
            }
        }
    }
}

/// Write the config, optionally deploy it, and print the summary.
async fn publish(
    root: &RootConfig,
    output: &str,
    group_by: GroupByArgs,
    deploy_root: bool,
) -> Result<(), Box<dyn Error>> {
    write_root_config(output, root)?;

    let endpoint = if deploy_root {
        let (endpoint, secret) = deploy_target()?;
        deploy(&endpoint, &secret, root).await?;
        println!("{} {endpoint}", "Deployed to".green());
        endpoint
    } else {
        format!("<{ENV_FIREBASE_URL}>")
    };

    let runtime_config = RuntimeConfig {
        endpoint,
        secret: String::new(),
        ipv4_group_by: group_by.ipv4_group_by,
        ipv6_group_by: group_by.ipv6_group_by,
    };
    print_publish_summary(root, &group_by.settings(), Some(&runtime_config.redacted()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("10"), Ok(10));
        assert!(parse_count("10001").is_err());
        assert!(parse_count("-1").is_err());
    }

    #[test]
    fn test_cli_group_by_flags() {
        let cli = Cli::try_parse_from([
            "ipconn",
            "generate",
            "--ipv4GroupBy",
            "16",
            "--ipv6GroupBy",
            "48",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                group_by, deploy, ..
            } => {
                assert_eq!(group_by.ipv4_group_by, Ipv4GroupBy::By16Bits);
                assert_eq!(group_by.ipv6_group_by, Ipv6GroupBy::By48Bits);
                assert!(!deploy);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_level_and_count() {
        assert!(Cli::try_parse_from(["ipconn", "generate", "--ipv4GroupBy", "12"]).is_err());
        assert!(Cli::try_parse_from(["ipconn", "mock", "--count", "20000"]).is_err());
    }

    #[test]
    fn test_cli_mock_defaults() {
        let cli = Cli::try_parse_from(["ipconn", "mock", "--testfixtures"]).unwrap();
        match cli.command {
            Command::Mock {
                count,
                test_fixtures,
                output,
                ..
            } => {
                assert_eq!(count, DEFAULT_COUNT);
                assert!(test_fixtures);
                assert_eq!(output, DEFAULT_MOCK_OUTPUT_FILE);
            }
            _ => panic!("expected mock"),
        }
    }
}
