//! CLI argument parsing and command dispatch

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use frostbench_core::{
    AdminCredentials, ConnectParams, OrchestratorBuilder, RunConfig, RunSummary, TargetConfig,
    WarehouseClient, WarehouseSession,
};
use frostbench_connector::HttpWarehouseClient;

/// frostbench - ephemeral-user load testing for a cloud data warehouse
#[derive(Parser, Debug)]
#[command(name = "frostbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection options shared by all commands
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Account identifier
    #[arg(long, env = "FROSTBENCH_ACCOUNT")]
    pub account: String,

    /// Administrative login name
    #[arg(long, env = "FROSTBENCH_USER")]
    pub user: String,

    /// Administrative login secret
    #[arg(long, env = "FROSTBENCH_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Override the HTTP endpoint (defaults to the account's hosted URL)
    #[arg(long, env = "FROSTBENCH_BASE_URL")]
    pub base_url: Option<String>,
}

impl ConnectionArgs {
    fn credentials(&self) -> AdminCredentials {
        AdminCredentials {
            account: self.account.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }

    fn client(&self) -> HttpWarehouseClient {
        HttpWarehouseClient::new(&self.account, self.base_url.clone())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create temporary users that continuously run sample queries for a while
    Run {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Number of users
        #[arg(short, long, default_value_t = 3)]
        users: usize,

        /// How long each user runs queries, in seconds
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,

        /// Role used for the administrative connection
        #[arg(long, default_value = "accountadmin")]
        admin_role: String,

        /// Prefix for generated user names
        #[arg(long, default_value = "concurrent")]
        prefix: String,

        /// Virtual warehouse that executes the sample query
        #[arg(long, default_value = "xsmall")]
        warehouse: String,

        /// Database holding the sample data
        #[arg(long, default_value = "SNOWFLAKE_SAMPLE_DATA")]
        database: String,

        /// Schema holding the sample data (case preserved exactly)
        #[arg(long, default_value = "TPCDS_SF10TCL")]
        schema: String,

        /// Sample query each user runs in a loop
        #[arg(long, default_value = "select * from store_sales limit 100000")]
        query: String,
    },

    /// Check connectivity: print the warehouse version and exit
    Check {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

impl Cli {
    /// Dispatch the selected command
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Run {
                connection,
                users,
                seconds,
                admin_role,
                prefix,
                warehouse,
                database,
                schema,
                query,
            } => {
                let target = TargetConfig {
                    warehouse: warehouse.clone(),
                    database: database.clone(),
                    schema: schema.clone(),
                    query: query.clone(),
                };
                let config = RunConfig::new(*users, Duration::from_secs(*seconds))
                    .with_user_prefix(prefix.clone())
                    .with_target(target);
                run_load_test(connection, config, admin_role).await
            }
            Commands::Check { connection } => check_version(connection).await,
        }
    }
}

async fn run_load_test(
    connection: &ConnectionArgs,
    config: RunConfig,
    admin_role: &str,
) -> Result<()> {
    let client: Arc<dyn WarehouseClient> = Arc::new(connection.client());

    let orchestrator = OrchestratorBuilder::new()
        .config(config)
        .client(client)
        .admin_credentials(connection.credentials())
        .admin_role(admin_role)
        .build()
        .context("invalid run configuration")?;

    println!("Press ctrl-c to cancel at any time starting now.");

    let summary = orchestrator.run_with_signal_handling().await?;
    print_summary(&summary);

    Ok(())
}

async fn check_version(connection: &ConnectionArgs) -> Result<()> {
    let client = connection.client();
    let params = ConnectParams::new(&connection.user, &connection.password);

    let mut session = client
        .connect(&params)
        .await
        .context("failed to connect to the warehouse")?;

    let result = session.execute("select current_version()").await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close session");
    }

    let rows = result.context("version query failed")?;
    match rows.scalar_text() {
        Some(version) => println!("{version}"),
        None => anyhow::bail!("version query returned no rows"),
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("   Load Test Results");
    println!("{}", "=".repeat(60));
    println!("  Users:            {}", summary.total_principals);
    println!("  Provisioned:      {}", summary.provisioned);
    println!("  Completed:        {}", summary.completed);
    println!("  Failed:           {}", summary.failed);
    println!("  Torn down:        {}", summary.torn_down);
    println!("  Queries run:      {}", summary.total_queries);
    println!("  Query errors:     {}", summary.query_errors);
    println!("  Queries/second:   {:.2}", summary.queries_per_second());
    println!("  Elapsed:          {:.2} s", summary.elapsed.as_secs_f64());
    println!("{}", "=".repeat(60));
}
