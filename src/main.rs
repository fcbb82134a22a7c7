use clap::{Parser, Subcommand};

mod commands;
mod tty;

use commands::{db, deploy, dev, local, provision, repo, style, GlobalArgs};
use stagehand::config::ProjectConfig;
use stagehand::{hooks, output};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = VERSION)]
#[command(about = "CLI for provisioning managed web hosts and deploying application updates")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy once
    Deploy(deploy::DeployArgs),
    /// Check the coding style
    CheckStyle,
    /// Format the code
    FormatCode,
    /// Update virtualenv and node_modules to match the lockfiles
    UpdateLocalEnvironment,
    /// Set up the local environment from scratch
    SetupLocalEnvironment,
    /// Re-create the virtualenv with the newest versions of all libraries
    UpgradeRequirements(local::UpgradeArgs),
    /// Freeze the virtualenv state into requirements.txt
    FreezeRequirements,
    /// Update the translation catalogs
    MakeMessages,
    /// Compile the translation catalogs
    CompileMessages,
    /// Run the development server for the frontend and backend
    DevelopmentServer(dev::DevServerArgs),
    /// Pull a local copy of the remote database and reset all passwords
    PullDatabaseCopy,
    /// Checkout the repository on the target host
    CheckoutOnRemote,
    /// Create the backend dependency environment on the target host
    CreateRemoteEnvironment,
    /// Create database, role and configuration file on the target host
    CreateDatabaseAndConfig,
    /// Register the virtual host and create runtime directories
    CreateRemoteHost,
    /// Start and enable the persistent service unit
    EnableServiceUnit,
    /// Run all provisioning steps in order against a pristine host
    RunAllProvisioningSteps,
    /// Activate TLS for the virtual host
    ActivateTls,
    /// Add an alias to the virtual host
    AddDomainAlias(provision::AliasArgs),
    /// Remove an alias from the virtual host
    RemoveDomainAlias(provision::AliasArgs),
    /// Dump the database and take the host out of service
    DecommissionHost,
    /// Ensure a git remote for the target host exists and fetch from it
    FetchFromHost,
    /// Create a remote repository and push the configured branch
    CreateRemoteRepositoryAndPush(repo::RepoArgs),
}

fn is_interactive(command: &Commands) -> bool {
    matches!(command, Commands::DevelopmentServer(_))
}

fn run_json(
    command: Commands,
    config: &ProjectConfig,
) -> (stagehand::Result<serde_json::Value>, i32) {
    use stagehand::output::map_cmd_result_to_json as map;

    match command {
        Commands::Deploy(args) => map(deploy::run(args, config)),
        Commands::CheckStyle => map(style::check(config)),
        Commands::FormatCode => map(style::format(config)),
        Commands::UpdateLocalEnvironment => map(local::update()),
        Commands::SetupLocalEnvironment => map(local::setup(config)),
        Commands::UpgradeRequirements(args) => map(local::upgrade(args)),
        Commands::FreezeRequirements => map(local::freeze()),
        Commands::MakeMessages => map(local::make_messages()),
        Commands::CompileMessages => map(local::compile_messages()),
        Commands::DevelopmentServer(args) => map(dev::run(args)),
        Commands::PullDatabaseCopy => map(db::pull(config)),
        Commands::CheckoutOnRemote => map(provision::checkout(config)),
        Commands::CreateRemoteEnvironment => map(provision::create_environment(config)),
        Commands::CreateDatabaseAndConfig => map(provision::create_database(config)),
        Commands::CreateRemoteHost => map(provision::create_host(config)),
        Commands::EnableServiceUnit => map(provision::enable_unit(config)),
        Commands::RunAllProvisioningSteps => map(provision::run_all(config)),
        Commands::ActivateTls => map(provision::activate_tls(config)),
        Commands::AddDomainAlias(args) => map(provision::add_alias(args, config)),
        Commands::RemoveDomainAlias(args) => map(provision::remove_alias(args, config)),
        Commands::DecommissionHost => map(provision::decommission(config)),
        Commands::FetchFromHost => map(repo::fetch(config)),
        Commands::CreateRemoteRepositoryAndPush(args) => map(repo::create(args, config)),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let config = cli.global.to_config();

    // Two deliberate top-level operations, not configuration side effects:
    // move into the project root, then re-check the pre-commit hook.
    let prepared = config
        .enter_project_root()
        .and_then(|_| hooks::install_pre_commit(&config).map(|_| ()));
    if let Err(err) = prepared {
        let exit_code = output::exit_code_for_error(&err);
        let _ = output::print_result::<serde_json::Value>(Err(err));
        return std::process::ExitCode::from(exit_code_to_u8(exit_code));
    }

    let interactive = is_interactive(&cli.command);
    let (json_result, exit_code) = run_json(cli.command, &config);

    if interactive {
        // Child output already went to the terminal; only surface errors.
        if let Err(err) = json_result {
            let _ = output::print_result::<serde_json::Value>(Err(err));
        }
    } else {
        let _ = output::print_json_result(json_result);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
