use clap::{Parser, Subcommand};

use git_rb::client::GitClient;
use git_rb::commands::annotate::{AnnotateArgs, handle_annotate};
use git_rb::commands::diff::{DiffArgs, handle_diff};
use git_rb::commands::info::handle_info;
use git_rb::commands::server::handle_server;
use git_rb::commands::RepositoryArgs;
use git_rb::config::ClientOptions;

#[derive(Parser)]
#[command(name = "git-rb")]
#[command(version, about = "Produce review-ready diffs from git and git-svn checkouts", long_about = None)]
struct Cli {
    /// Run as if started in <path>
    #[arg(short = 'C', global = true, value_name = "path")]
    path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show repository type, upstream branch and repository paths
    Info {
        #[command(flatten)]
        repository: RepositoryArgs,

        #[arg(long)]
        json: bool,
    },
    /// Print the diff to post for review
    Diff(DiffArgs),
    /// Add Reviewed-By notes to the commits of a posted review
    Annotate(AnnotateArgs),
    /// Print the review server URL configured for this repository
    Server,
}

fn client_for(path: &Option<String>, options: ClientOptions) -> GitClient {
    match path {
        Some(path) => GitClient::in_path(path, options),
        None => GitClient::new(options),
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Info { repository, json } => {
            let mut options = ClientOptions::default();
            repository.apply(&mut options);
            handle_info(&client_for(&cli.path, options), *json)
        }
        Command::Diff(args) => handle_diff(&client_for(&cli.path, args.client_options()), args),
        Command::Annotate(args) => {
            handle_annotate(&client_for(&cli.path, args.client_options()), args)
        }
        Command::Server => handle_server(&client_for(&cli.path, ClientOptions::default())),
    };

    if let Err(e) = result {
        eprintln!("git-rb: {}", e);
        std::process::exit(1);
    }
}
