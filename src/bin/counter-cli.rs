use clap::{Parser, Subcommand};
use counter_sdk::{Counter, CounterClient};

#[derive(Parser)]
#[command(name = "counter-cli")]
#[command(about = "Command-line client for the session counter API", long_about = None)]
struct Cli {
    /// API base URL; `/counter` is appended.
    #[arg(short, long, default_value = "http://localhost:3000", env = "API_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current count
    Get,
    /// Increment the count
    Up {
        /// Number of increments to send within one session
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        times: u32,
    },
    /// Decrement the count (never below zero)
    Down {
        /// Number of decrements to send within one session
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        times: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = CounterClient::new(&cli.url)?;

    let counter = match cli.command {
        Commands::Get => client.get_count().await?,
        Commands::Up { times } => repeat(times, || client.increment()).await?,
        Commands::Down { times } => repeat(times, || client.decrement()).await?,
    };

    println!("{}", serde_json::to_string_pretty(&counter)?);
    Ok(())
}

async fn repeat<F, Fut>(times: u32, mut call: F) -> Result<Counter, counter_sdk::ClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Counter, counter_sdk::ClientError>>,
{
    let mut counter = call().await?;
    for _ in 1..times {
        counter = call().await?;
    }
    Ok(counter)
}
