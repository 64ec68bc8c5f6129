//! `subdir`: embed a repository's history inside a subdirectory of another,
//! with rebaseable projection back to its remote.

use clap::{Parser, Subcommand};
use subdir::commands::{add, branch, push, rebase, status};
use subdir::styling::{ERROR, ERROR_EMOJI, eprintln};
use subdir::vcs::Repository;
use subdir::vcs::error::SubdirError;

#[derive(Parser, Debug)]
#[command(name = "subdir", version, about)]
struct Cli {
    /// Enable verbose VCS plumbing tracing.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed an external repository into a new subdirectory.
    Add(add::AddArgs),
    /// Project the local delta since the last squash onto a branch.
    Branch(branch::BranchArgs),
    /// Fetch, rebase, and squash a subdir against its external remote.
    Rebase(rebase::RebaseArgs),
    /// Publish the last rebase's result to the external remote.
    Push(push::PushArgs),
    /// Report whether a subdir has unfolded or unpublished work.
    Status(status::StatusArgs),
    /// Print shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::new();
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else if debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Warn);
    }
    builder.init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let container = Repository::discover()?;
    match &cli.command {
        Commands::Add(args) => add::run(&container, args),
        Commands::Branch(args) => branch::run(&container, args),
        Commands::Rebase(args) => rebase::run(&container, args),
        Commands::Push(args) => push::run(&container, args),
        Commands::Status(args) => status::run(&container, args),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(&cli) {
        match err.downcast_ref::<SubdirError>() {
            Some(subdir_err) => {
                eprintln!("{}", subdir_err.styled());
                std::process::exit(subdir_err.code());
            }
            None => {
                eprintln!("{ERROR_EMOJI} {ERROR}{err:#}{ERROR:#}");
                std::process::exit(1);
            }
        }
    }
}
