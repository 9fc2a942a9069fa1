use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use site_core::{
    AccessGate, Dialog, ExportOutcome, HttpRemoteSource, NoRemoteSource, PageLayout,
    PresetDialog, RemoteRecordSource, Site, SiteServices,
};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::load_settings;
use terminal::{print_notifications, DirectoryDownloadSink, TerminalDialog};

#[derive(Parser, Debug)]
#[command(name = "awoc", about = "AWOC-JKWOC 2025 registration desk")]
struct Cli {
    /// Settings file, `awoc.toml` in the working directory by default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and save one registration.
    Register(RegisterArgs),
    /// Print every locally stored registration.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the number of locally stored registrations.
    Count,
    /// Write the spreadsheet and JSON backup after the password check.
    Export {
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Skip the interactive prompt.
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete every local registration.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
struct RegisterArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    affiliation: Option<String>,
    #[arg(long)]
    banquet: Option<String>,
    #[arg(long)]
    dietary: Option<String>,
    #[arg(long)]
    other_dietary: Option<String>,
    /// Repeat for each tutorial; "No Tutorials" unchecks the others.
    #[arg(long = "tutorial")]
    tutorials: Vec<String>,
}

impl RegisterArgs {
    fn tutorial_options(&self) -> Vec<String> {
        let mut options: Vec<String> = Vec::new();
        for tutorial in &self.tutorials {
            if !options.contains(tutorial) {
                options.push(tutorial.clone());
            }
        }
        options
    }

    fn fill(&self, site: &mut Site) {
        let form = &mut site.registration_form;
        form.name = self.name.clone().unwrap_or_default();
        form.email = self.email.clone().unwrap_or_default();
        form.affiliation = self.affiliation.clone().unwrap_or_default();
        form.banquet = self.banquet.clone().unwrap_or_default();
        form.set_dietary(self.dietary.clone().unwrap_or_default());
        form.other_dietary_text = self.other_dietary.clone().unwrap_or_default();
        for tutorial in &self.tutorials {
            form.set_tutorial(tutorial, true);
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref());

    let store = Arc::new(Storage::new(&settings.database_url).await?);
    let remote: Arc<dyn RemoteRecordSource> = match settings.remote_endpoint()? {
        Some(url) => {
            let source = HttpRemoteSource::new(url);
            info!(url = %source.url(), "awoc: remote records enabled");
            Arc::new(source)
        }
        None => Arc::new(NoRemoteSource),
    };

    let dialog: Arc<dyn Dialog> = match &cli.command {
        Command::Export {
            password: Some(secret),
            ..
        } => Arc::new(PresetDialog {
            secret: Some(secret.clone()),
            confirm: false,
        }),
        Command::Clear { yes: true } => Arc::new(PresetDialog {
            secret: None,
            confirm: true,
        }),
        _ => Arc::new(TerminalDialog),
    };
    let export_dir = match &cli.command {
        Command::Export {
            out_dir: Some(dir),
            ..
        } => dir.clone(),
        _ => settings.export_dir.clone(),
    };

    let tutorial_options = match &cli.command {
        Command::Register(args) => args.tutorial_options(),
        _ => Vec::new(),
    };
    let mut site = Site::init(
        PageLayout {
            tutorial_options,
            ..PageLayout::default()
        },
        SiteServices {
            store,
            remote,
            dialog,
            downloads: Arc::new(DirectoryDownloadSink::new(export_dir)),
            gate: AccessGate::new(settings.export_secret.clone()),
        },
    );
    let mut events = site.notifier.subscribe();

    let code = match cli.command {
        Command::Register(args) => {
            args.fill(&mut site);
            let result = site.submit_registration().await;
            print_notifications(&mut events);
            match result {
                Ok(saved) => {
                    println!(
                        "registration id={} ({} stored)",
                        saved.record.id.0, saved.total_records
                    );
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    info!(error = %err, "awoc: registration not saved");
                    ExitCode::FAILURE
                }
            }
        }
        Command::List { json } => {
            let records = site.admin.records().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!(
                        "{}\t{}\t{} <{}>\t{}\t{}",
                        record.id.0,
                        record.timestamp,
                        record.name,
                        record.email,
                        record.affiliation,
                        record.tutorials
                    );
                }
            }
            ExitCode::SUCCESS
        }
        Command::Count => {
            println!("{}", site.admin.registration_count().await?);
            ExitCode::SUCCESS
        }
        Command::Export { .. } => {
            let result = site.admin.export().await;
            print_notifications(&mut events);
            match result? {
                ExportOutcome::Exported { record_count, .. } => {
                    info!(record_count, "awoc: export finished");
                    ExitCode::SUCCESS
                }
                ExportOutcome::Denied | ExportOutcome::NoData => ExitCode::FAILURE,
            }
        }
        Command::Clear { .. } => {
            let result = site.admin.clear_all().await;
            print_notifications(&mut events);
            let cleared = result?;
            if !cleared {
                println!("nothing cleared");
            }
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
