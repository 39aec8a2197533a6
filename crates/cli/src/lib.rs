use clap::Parser;
use gnodriver_api::DriverRequest;
use gnodriver_core::{DriverConfig, LoaderMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gnopackagesdriver",
    version,
    about = "External package driver for Gno sources",
    long_about = "Reads a package driver request as JSON on stdin, resolves the requested Gno \
                  packages and their imports, and writes the response as JSON on stdout. \
                  Point GOPACKAGESDRIVER at this binary to use it from go/packages clients."
)]
pub struct Cli {
    /// Gno installation root. Defaults to $GNOROOT.
    #[arg(long, value_name = "DIR")]
    pub gnoroot: Option<PathBuf>,

    /// Load imports transitively through the resolution cache
    #[arg(long)]
    pub resident: bool,

    /// Worker threads used to scan packages
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the JSON schema of the request and exit
    #[arg(long)]
    pub print_schema: bool,

    /// Query patterns, appended to the request's own
    #[arg(value_name = "PATTERNS")]
    pub patterns: Vec<String>,
}

impl Cli {
    pub fn config(&self) -> DriverConfig {
        let mut config = DriverConfig::from_env();
        if let Some(root) = &self.gnoroot {
            config.gno_root = Some(root.clone());
        }
        if self.resident {
            config.mode = LoaderMode::Resident;
        }
        if self.jobs.is_some() {
            config.jobs = self.jobs;
        }
        config
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_schema {
        let schema = schemars::schema_for!(DriverRequest);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let _guard = gnodriver_runtime::init_logging("gnopackagesdriver");
    tracing::info!(args = ?cli.patterns, "started gnopackagesdriver");

    let driver = gnodriver_runtime::build_default_driver(&cli.config())
        .map_err(|e| e.to_string())?
        .with_patterns(cli.patterns);

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    if let Err(e) = driver.serve(stdin, stdout) {
        tracing::error!(error = %e, "exchange failed");
        return Err(e.into());
    }
    Ok(())
}
