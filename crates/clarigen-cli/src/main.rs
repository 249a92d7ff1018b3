use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clarigen_core::{generate_interface, parse_json_abi, ClarityValue, TransactionResult};
use clarigen_test::{create_clarity_bin, tx, ClarityBinConfig, Contract, ContractInstance, TestProvider};
use colored::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Devnet deployer used when no address is given
const DEFAULT_DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

#[derive(Parser)]
#[command(name = "clarigen")]
#[command(about = "Typed interfaces and test calls for Clarity contracts", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the typed interface of a contract ABI
    Interface {
        /// Path to the contract ABI (JSON)
        abi: PathBuf,

        /// Contract name; defaults to the ABI file stem
        #[arg(long)]
        name: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = InterfaceFormat::Decl)]
        format: InterfaceFormat,
    },

    /// Deploy a contract and run a read-only function
    Call {
        #[command(flatten)]
        target: Target,
    },

    /// Deploy a contract and execute a public function
    Execute {
        #[command(flatten)]
        target: Target,

        /// Principal sending the transaction
        #[arg(long)]
        sender: String,
    },
}

#[derive(clap::Args)]
struct Target {
    /// Path to the contract source (.clar)
    contract: PathBuf,

    /// Function to call, by Clarity or camelCase name
    function: String,

    /// Arguments; JSON literals, anything else is passed as a string
    args: Vec<String>,

    /// Path to the contract ABI; defaults to the source path with a .json extension
    #[arg(long)]
    abi: Option<PathBuf>,

    /// Address the contract is deployed under
    #[arg(long, default_value = DEFAULT_DEPLOYER)]
    address: String,

    /// Path to Clarigen.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InterfaceFormat {
    /// Interface declaration
    Decl,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clarigen=info,clarigen_test=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Interface { abi, name, format } => interface_command(&abi, name, format)?,
        Commands::Call { target } => call_command(target).await?,
        Commands::Execute { target, sender } => return execute_command(target, &sender).await,
    }

    Ok(ExitCode::SUCCESS)
}

fn interface_command(abi_path: &Path, name: Option<String>, format: InterfaceFormat) -> Result<()> {
    let content = fs::read_to_string(abi_path)
        .with_context(|| format!("Failed to read ABI {}", abi_path.display()))?;
    let abi = parse_json_abi(&content)?;
    let name = name.unwrap_or_else(|| file_stem(abi_path));
    let interface = generate_interface(&abi, &name)?;

    match format {
        InterfaceFormat::Json => println!("{}", serde_json::to_string_pretty(&interface)?),
        InterfaceFormat::Decl => println!("{}", interface),
    }
    Ok(())
}

async fn call_command(target: Target) -> Result<()> {
    let instance = deploy(&target).await?;
    let value = instance
        .read_only(&target.function, parse_args(&target.args))
        .await?;

    if target.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&json!({ "result": value.to_json() }))?);
    } else {
        print_value(&value);
    }
    Ok(())
}

/// Exits non-zero when the call returned `(err …)`
async fn execute_command(target: Target, sender: &str) -> Result<ExitCode> {
    let instance = deploy(&target).await?;
    let transaction = instance.public(&target.function, parse_args(&target.args))?;
    let result = tx(transaction, sender).await?;

    if target.format == OutputFormat::Json {
        let output = json!({
            "is_ok": result.is_ok,
            "value": result.value.to_json(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_result(&result);
    }

    Ok(if result.is_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn deploy(target: &Target) -> Result<ContractInstance> {
    let config = ClarityBinConfig::load(target.config.as_deref())?;
    let abi_path = target
        .abi
        .clone()
        .unwrap_or_else(|| target.contract.with_extension("json"));

    let contract = Contract::from_abi_file(file_stem(&target.contract), &target.contract, &abi_path)?
        .with_address(target.address.clone());

    let backend = create_clarity_bin(&config)
        .await
        .with_context(|| format!("Failed to start {}", config.bin_path.display()))?;
    info!(db = %backend.db_path().display(), "VM database initialized");

    Ok(TestProvider::from_contract(&contract, backend).await?)
}

fn parse_args(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contract".to_string())
}

fn print_value(value: &ClarityValue) {
    println!("{} {}", value.render().bold(), format!("({})", value.kind()).dimmed());
}

fn print_result(result: &TransactionResult) {
    let label = if result.is_ok {
        "[OK]".green().bold()
    } else {
        "[ERR]".red().bold()
    };
    println!("{} {}", label, result.response.render());
}
