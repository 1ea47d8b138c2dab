use clap::{Parser, Subcommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Winners { month, config } => {
            codewars_admin::commands::winners(month.clone(), config).await?;
        }
        Commands::Upload { config, yes } => {
            codewars_admin::commands::upload(config, *yes).await?;
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate last month's top 3 winners and save the monthly record
    Winners {
        /// Target month in YYYY-MM format, defaults to the previous month
        #[arg(long)]
        month: Option<String>,
        #[arg(long, default_value = "codewars.toml")]
        config: String,
    },
    /// Upload the monthly challenge defined in the config file
    Upload {
        #[arg(long, default_value = "codewars.toml")]
        config: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
