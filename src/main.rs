use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sdkpack::Section;

mod commands;

/// sdkpack - Android SDK components as NuGet packages
#[derive(Parser)]
#[command(name = "sdkpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Which manifest to read and which of its entries to use
#[derive(Args, Debug, Clone)]
pub struct Selection {
    /// Manifest URL (defaults to repository.url from the config)
    #[arg(long)]
    pub url: Option<String>,

    /// Addon manifest merged into a first-generation repository
    #[arg(long)]
    pub addon_url: Option<String>,

    /// Manifest section: build-tools, platform-tools or extras
    #[arg(short, long, default_value = "build-tools")]
    pub section: Section,

    /// Only these revisions (repeatable, e.g. --revision 30.0.3 --revision 26)
    #[arg(short, long = "revision", value_name = "REVISION")]
    pub revisions: Vec<String>,

    /// Only revisions at or above this one
    #[arg(long, value_name = "REVISION")]
    pub min_revision: Option<String>,

    /// Include preview revisions
    #[arg(long)]
    pub include_preview: bool,

    /// Include obsolete entries
    #[arg(long)]
    pub include_obsolete: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entries of a manifest section
    List {
        #[command(flatten)]
        selection: Selection,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Download, verify and extract the selected entries
    Fetch {
        #[command(flatten)]
        selection: Selection,

        /// Directory to extract into (defaults to download.cache_dir)
        #[arg(short, long)]
        dir: Option<String>,

        /// Delete and re-download entries that are already present
        #[arg(long)]
        overwrite: bool,
    },

    /// Fetch the selected entries and build NuGet packages from them
    Pack {
        #[command(flatten)]
        selection: Selection,

        /// Path to the .nuspec template (defaults to packaging.template)
        #[arg(short, long)]
        template: Option<String>,

        /// Suffix appended to every package version (e.g. -beta1)
        #[arg(long, allow_hyphen_values = true)]
        version_suffix: Option<String>,

        /// Directory for the .nupkg files (defaults to packaging.output_dir)
        #[arg(short, long)]
        output: Option<String>,

        /// Directory to extract into (defaults to download.cache_dir)
        #[arg(short, long)]
        dir: Option<String>,

        /// Delete and re-download entries that are already present
        #[arg(long)]
        overwrite: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., download.overwrite)
        key: String,
        /// Configuration value (empty clears optional keys)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = sdkpack::logging::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let result = match cli.command {
        Commands::List { selection, json } => commands::list::run(&selection, json),
        Commands::Fetch {
            selection,
            dir,
            overwrite,
        } => commands::fetch::run(&selection, dir, overwrite),
        Commands::Pack {
            selection,
            template,
            version_suffix,
            output,
            dir,
            overwrite,
        } => commands::pack::run(&selection, template, version_suffix, output, dir, overwrite),
        Commands::Config { action } => commands::config::run(&action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sdkpack", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
