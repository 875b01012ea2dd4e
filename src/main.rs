//! tcc-runner binary entry point.

use std::process::ExitCode;

use tcc_runner::cli::{self, Args};
use tcc_runner::config::Config;
use tcc_runner::palette::run_palette;
use tcc_runner::{logging, Dispatcher, EditorState, PtyTerminalHost};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("try 'tcc-runner --help'");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(Some(config.log_filter()));

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &Config) -> tcc_runner::Result<()> {
    info!("tcc-runner v{}", env!("CARGO_PKG_VERSION"));

    let editor = match args.file {
        Some(ref file) => EditorState::with_document(file)?,
        None => EditorState::new(),
    };
    let resolver = config.resolver()?;
    info!(
        "platform {} (install dir {})",
        resolver.platform(),
        resolver.install_dir().display()
    );

    let host = PtyTerminalHost::new(config.shell())?.with_size(config.pty_size());
    let mut dispatcher = Dispatcher::new(host, config.user_settings(args), editor, resolver);

    if args.print {
        let mode = args.action.unwrap_or(tcc_runner::Mode::Compile);
        println!("{}", dispatcher.preview(mode)?);
        return Ok(());
    }

    let result = match args.action {
        Some(mode) => dispatcher.dispatch(mode).map(|_| ()),
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_palette(&mut dispatcher, stdin, tokio::io::stdout())
                .await
                .map_err(Into::into)
        }
    };

    dispatcher.shutdown().await;
    result
}
