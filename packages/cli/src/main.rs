use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use circfile_webfs::{
    discover_hostname, DeviceBackend, DeviceEndpoint, EndpointConfig, RemotePath, WebBackend,
    DEFAULT_HOST,
};

/// CircFile - manage files on a CircuitPython device over the web workflow
#[derive(Parser, Debug)]
#[command(name = "circfile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Comprehensive logging is sent to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Hostname or IP address of the device
    #[arg(long, global = true, default_value = DEFAULT_HOST)]
    host: String,

    /// Web workflow password. Falls back to the CIRCUP_WEBWORKFLOW_PASSWORD
    /// environment variable
    #[arg(long, global = true)]
    password: Option<String>,

    /// Timeout in seconds for any network operation
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the contents of a directory
    Ls {
        #[arg(default_value = "/")]
        dir: String,
    },

    /// Upload a file or directory to the device
    Put {
        file: PathBuf,
        /// Directory on the device, relative to its root (default: lib/)
        location: Option<String>,
    },

    /// Download a file from the device
    Get {
        file: String,
        /// Local directory (default: current directory)
        location: Option<PathBuf>,
    },

    /// Delete a file, or a directory (trailing `/`) recursively
    Rm { path: String },

    /// Create a directory on the device
    Mkdir { path: String },

    /// Show free space on the device
    Df,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Device(#[from] circfile_webfs::Error),

    #[error("Could not find a connected CircuitPython device at {0}.")]
    NotPresent(String),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn connect(cli: &Cli) -> Result<WebBackend, CliError> {
    let timeout = Duration::from_secs(cli.timeout);
    let host = discover_hostname(&cli.host, timeout)?;

    let config = EndpointConfig::new(host)
        .with_timeout(timeout)
        .with_password(cli.password.clone())
        .with_env_password();
    let endpoint = DeviceEndpoint::from_config(&config)?;
    let backend = WebBackend::connect(endpoint)?;

    if !backend.is_device_present() {
        return Err(CliError::NotPresent(
            backend.endpoint().base_url().to_string(),
        ));
    }
    tracing::info!("Found device at {}", backend.endpoint().base_url());
    Ok(backend)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let backend = connect(&cli)?;

    match cli.command {
        Command::Ls { dir } => {
            let entries = backend.list_directory(&RemotePath::dir(&dir))?;
            println!("Size\tName");
            for entry in entries {
                let suffix = if entry.is_directory { "/" } else { "" };
                println!("{}\t{}{}", entry.size_bytes, entry.name, suffix);
            }
        }
        Command::Put { file, location } => {
            let target = backend.upload(&file, location.as_deref())?;
            println!("Uploaded: {}", target);
        }
        Command::Get { file, location } => {
            let written = backend.download_file(&RemotePath::parse(&file), location.as_deref())?;
            println!("Downloaded File: {}", written.display());
        }
        Command::Rm { path } => {
            let target = RemotePath::parse(&path);
            backend.delete_path(&target)?;
            println!("Deleted: {}", target);
        }
        Command::Mkdir { path } => {
            let target = RemotePath::dir(&path);
            backend.make_directory(&target)?;
            println!("Created: {}", target);
        }
        Command::Df => {
            let bytes = backend.free_space_bytes()?;
            println!("{} bytes free", bytes);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::info!("### Started circfile ###");

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
