//! editor-sync: Keep local files and in-browser code editors in sync.
//!
//! Talks to a Chromium tab through its remote debugging port, i.e. a browser
//! started with `chromium-browser --remote-debugging-port=9222`.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use editor_sync::commands::{self, FileArg};
use editor_sync::config::{Config, DevToolsEndpoint};
use editor_sync::devtools::DevToolsClient;
use editor_sync::session::sync_folder;
use editor_sync_core::editor::DEFAULT_SELECTOR;
use editor_sync_core::{Bindings, QueueOrder, RemoteEditor, SyncConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "editor-sync")]
#[command(about = "Synchronize CodeMirror editors inside a browser tab with local files or stdin/stdout")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Chromium debug port, i.e. chromium-browser --remote-debugging-port=9222
    #[arg(long, global = true, default_value_t = 9222)]
    chromium_port: u16,

    /// Host the debug port listens on
    #[arg(long, global = true, default_value = "127.0.0.1")]
    host: String,

    /// Which page tab to attach to (0 = first)
    #[arg(long, global = true, default_value_t = 0)]
    tab: usize,

    /// CSS selector of the editor widgets
    #[arg(long, global = true, default_value = DEFAULT_SELECTOR)]
    selector: String,

    /// Print more debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Push a file (or - for stdin) into an editor
    Push {
        file: String,
        /// Editor index
        #[arg(default_value_t = 0)]
        index: usize,
    },
    /// Pull an editor into a file (or - for stdout)
    Pull {
        file: String,
        /// Editor index
        #[arg(default_value_t = 0)]
        index: usize,
    },
    /// Execute a script in the page and print the raw result
    Execjs { script: String },
    /// Keep files in a folder in sync with editors; file order gives the index
    Syncfolder {
        folder: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Browser poll period in milliseconds
        #[arg(long, default_value_t = 1000)]
        period_ms: u64,

        /// Debounce window in milliseconds
        #[arg(long, default_value_t = 1000)]
        debounce_ms: u64,

        /// Order in which pending changes are handled
        #[arg(long, value_enum, default_value_t = Order::Lifo)]
        order: Order,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Order {
    /// Newest change first
    Lifo,
    /// Oldest change first
    Fifo,
}

impl From<Order> for QueueOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Lifo => QueueOrder::Lifo,
            Order::Fifo => QueueOrder::Fifo,
        }
    }
}

impl Args {
    fn config(&self) -> Config {
        let mut sync = SyncConfig::default();
        if let Command::Syncfolder {
            period_ms,
            debounce_ms,
            order,
            ..
        } = &self.command
        {
            sync.poll_period = Duration::from_millis(*period_ms);
            sync.debounce_window = Duration::from_millis(*debounce_ms);
            sync.queue_order = (*order).into();
        }

        Config {
            endpoint: DevToolsEndpoint {
                host: self.host.clone(),
                port: self.chromium_port,
                tab: self.tab,
            },
            selector: self.selector.clone(),
            sync,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging - respects RUST_LOG env var, defaults to info (or debug with --debug).
    // Logs go to stderr so `pull -` output stays clean.
    let default_filter = if args.debug {
        "debug,editor_sync=debug,editor_sync_core=debug"
    } else {
        "info,editor_sync=info,editor_sync_core=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.config();
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let client = DevToolsClient::discover(&config.endpoint).await?;
    let editor = Arc::new(RemoteEditor::with_selector(client, &config.selector));

    match args.command {
        Command::Push { file, index } => {
            commands::push(&editor, &FileArg::from(file.as_str()), index).await?;
        }
        Command::Pull { file, index } => {
            commands::pull(&editor, &FileArg::from(file.as_str()), index).await?;
        }
        Command::Execjs { script } => {
            let response = commands::execjs(&editor, &script).await?;
            println!("{}", response);
        }
        Command::Syncfolder { folder, files, .. } => {
            let bindings = Bindings::new(&files)?;
            sync_folder(editor, &folder, bindings, &config.sync).await?;
        }
    }

    debug!("Done");
    Ok(())
}
