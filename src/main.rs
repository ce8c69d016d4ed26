use anyhow::Result;
use clap::{Parser, Subcommand};

use snapmirror::backup::{mirror_for, SnapshotNamer};
use snapmirror::cli::{
    handle_list, handle_prune, handle_run, handle_schedule_command, RunArgs, ScheduleCommands,
    SnapshotArgs,
};
use snapmirror::config::{SnapPaths, Settings};
use snapmirror::logging;
use snapmirror::process::SystemRunner;
use snapmirror::schedule::Schtasks;
use snapmirror::setup::{Prompter, SetupWizard};

#[derive(Parser)]
#[command(
    name = "snapmirror",
    version,
    about = "Versioned folder backups into dated snapshot folders",
    long_about = "snapmirror mirrors a folder (by default your OneDrive) into a new \
                  dated folder under a backup root on every run, and deletes dated \
                  folders older than the retention window. Run without a command \
                  to start the interactive setup."
)]
struct Cli {
    /// Increase console log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backup cycle without prompts (used by the scheduled task)
    #[command(alias = "headless-run")]
    Run(RunArgs),

    /// Interactive setup: retention, backup root, schedule
    Setup,

    /// List snapshot folders
    List(SnapshotArgs),

    /// Delete snapshots older than the retention window
    Prune {
        #[command(flatten)]
        target: SnapshotArgs,

        /// Delete the listed snapshots instead of only previewing them
        #[arg(short, long)]
        force: bool,
    },

    /// Scheduled task management
    #[command(subcommand)]
    Schedule(ScheduleCommands),

    /// Show current configuration and paths
    Config,
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let paths = SnapPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    // Scheduled runs have no console, so they also log to a file
    let log_dir = match cli.command {
        Some(Commands::Run(_)) => paths
            .ensure_directories()
            .ok()
            .map(|_| paths.log_dir()),
        _ => None,
    };
    let _guard = logging::init(cli.verbose, log_dir.as_deref());

    match cli.command {
        Some(Commands::Run(args)) => return Ok(handle_run(&settings, args)),
        Some(Commands::List(args)) => handle_list(&settings, &args)?,
        Some(Commands::Prune { target, force }) => handle_prune(&settings, &target, force)?,
        Some(Commands::Schedule(cmd)) => {
            let registrar = Schtasks::new(SystemRunner);
            let program = std::env::current_exe()?;
            handle_schedule_command(&registrar, &settings, program, cmd)?;
        }
        Some(Commands::Config) => {
            println!("snapmirror Configuration");
            println!("========================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Log directory:    {}", paths.log_dir().display());
            println!();
            println!("Settings:");
            println!("  Backup root:    {}", settings.backup_root.display());
            println!("  Retention days: {}", settings.retention_days);
            match &settings.source {
                Some(source) => println!("  Source:         {}", source.display()),
                None => println!("  Source:         (OneDrive, resolved at run time)"),
            }
            println!("  Mirror backend: {}", settings.mirror_backend);
            println!(
                "  Schedule:       {} {} at {}",
                settings.schedule.task_name, settings.schedule.kind, settings.schedule.start_time
            );
        }
        Some(Commands::Setup) | None => {
            let mirror = mirror_for(settings.mirror_backend, settings.retry);
            let namer = SnapshotNamer::system();
            let registrar = Schtasks::new(SystemRunner);
            let program = std::env::current_exe()?;
            let wizard = SetupWizard::new(
                paths.clone(),
                mirror.as_ref(),
                &namer,
                &registrar,
                program,
            );
            wizard.run(&mut Prompter::stdio(), &mut settings)?;
        }
    }

    Ok(0)
}
