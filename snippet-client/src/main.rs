use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use snippet_client::{
    render::{render_detail, render_view},
    DashboardController, FeatureFlags, HttpSnippetApi, LoadState, NewSnippetForm, SystemClipboard,
};

#[derive(Parser)]
#[command(name = "snippets", about = "Manage your code snippets")]
struct Cli {
    /// Base URL of the snippet service.
    #[arg(long, env = "SNIPPETS_URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Bearer token identifying you to the service.
    #[arg(long, env = "SNIPPETS_TOKEN", hide_env_values = true)]
    token: String,

    /// Show snippets read-only.
    #[arg(long)]
    no_edit: bool,

    /// Syntax-highlight code according to its language.
    #[arg(long)]
    highlight: bool,

    #[arg(long)]
    no_illustration: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List your snippets.
    List,
    /// Show one snippet in full.
    Show { id: i64 },
    /// Copy a snippet's code to the clipboard, or print it when there is none.
    Copy { id: i64 },
    /// Create a snippet.
    New {
        #[arg(long)]
        heading: String,
        #[arg(long)]
        language: String,
        #[command(flatten)]
        code: CodeSource,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change the heading, code or language of a snippet.
    Edit {
        id: i64,
        #[arg(long)]
        heading: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[command(flatten)]
        code: CodeSource,
    },
    /// Delete a snippet.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
#[group(multiple = false)]
struct CodeSource {
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    code_file: Option<PathBuf>,
}

impl CodeSource {
    fn read(&self) -> Result<Option<String>> {
        match (&self.code, &self.code_file) {
            (Some(code), _) => Ok(Some(code.clone())),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("reading {}", path.display())),
            (None, None) => Ok(None),
        }
    }
}

type Controller = DashboardController<HttpSnippetApi>;

/// Loads the list, or renders the error view when that fails.
async fn load(controller: &mut Controller) -> bool {
    controller.load().await;
    if let LoadState::Failed(_) = controller.dashboard().load_state() {
        eprint!("{}", render_view(&controller.dashboard().view()));
        return false;
    }
    true
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn report_action_error(controller: &Controller) -> Result<()> {
    match controller.dashboard().action_error() {
        Some(message) => bail!("{message}"),
        None => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let features = FeatureFlags {
        edit_mode: !cli.no_edit,
        syntax_highlighting: cli.highlight,
        empty_state_illustration: !cli.no_illustration,
    };
    let mut controller = DashboardController::new(HttpSnippetApi::new(cli.url, cli.token), features);
    if !load(&mut controller).await {
        return Ok(ExitCode::FAILURE);
    }

    match cli.command {
        Command::List => {
            print!("{}", render_view(&controller.dashboard().view()));
        }

        Command::Show { id } => {
            let snippet = controller.open(id).await?;
            print!("{}", render_detail(snippet, false, features));
        }

        Command::Copy { id } => {
            let dashboard = controller.dashboard_mut();
            let code = dashboard.select(id)?.code.clone();
            let now = Instant::now();
            let copied = match SystemClipboard::open() {
                Ok(mut clipboard) => match dashboard.copy_code(&mut clipboard, now) {
                    Ok(()) => true,
                    Err(err) => {
                        log::warn!("{err}");
                        false
                    }
                },
                Err(err) => {
                    log::warn!("no clipboard available: {err}");
                    false
                }
            };
            if copied && dashboard.is_copied(now) {
                println!("Copied!");
            } else {
                print!("{code}");
            }
        }

        Command::New { heading, language, code, tags } => {
            let mut form = NewSnippetForm::default();
            form.heading = heading;
            form.language = language;
            form.code = code.read()?.unwrap_or_default();
            for tag in tags {
                form.current_tag = tag;
                form.add_tag();
            }
            let created = controller.submit(&mut form).await?;
            println!("created snippet #{}", created.id);
        }

        Command::Edit { id, heading, language, code } => {
            let code = code.read()?;
            let dashboard = controller.dashboard_mut();
            dashboard.select(id)?;
            dashboard.start_edit()?;
            if let Some(draft) = dashboard.draft_mut() {
                if let Some(heading) = heading {
                    draft.heading = heading;
                }
                if let Some(language) = language {
                    draft.language = language;
                }
                if let Some(code) = code {
                    draft.code = code;
                }
            }
            controller.save().await?;
            report_action_error(&controller)?;
            println!("updated snippet #{id}");
        }

        Command::Delete { id, yes } => {
            let heading = controller.dashboard_mut().select(id)?.heading.clone();
            controller.dashboard_mut().request_delete()?;
            if !yes && !confirm(&format!("Delete \"{heading}\"?"))? {
                controller.dashboard_mut().cancel_delete();
                println!("cancelled");
                return Ok(ExitCode::SUCCESS);
            }
            controller.delete_confirmed().await?;
            report_action_error(&controller)?;
            println!("deleted snippet #{id}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
