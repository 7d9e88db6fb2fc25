use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use log::{info, LevelFilter};

mod console;
mod dreaming;
mod external_time;
mod language;
mod migrate_command;
mod normalize;

use console::ConsoleText;
use dreaming::{DreamingClient, DEFAULT_API_URL};
use language::Language;
use migrate_command::{MigrateArgs, MigrateCommand};

/// Dreamingのexternal timeを別のアカウント・言語へ移行するためのCLIアプリケーション。
///
/// `--execute`を指定しない場合はdry runとなり、移行対象の表示のみを行う。
///
/// # Examples
/// ```
/// $ cargo run -- --source-token <TOKEN> --target-token <TOKEN>
/// $ cargo run -- --source-token <TOKEN> --target-token <TOKEN> --execute
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(long = "source-token", help = "Bearer token for the source account")]
    source_token: String,

    #[clap(long = "target-token", help = "Bearer token for the target account")]
    target_token: String,

    #[clap(
        long = "source-language",
        arg_enum,
        default_value = "es",
        help = "Source language code: es (Spanish) or fr (French)"
    )]
    source_language: Language,

    #[clap(
        long = "target-language",
        arg_enum,
        default_value = "fr",
        help = "Target language code: es (Spanish) or fr (French)"
    )]
    target_language: Language,

    #[clap(
        long = "execute",
        help = "Actually perform the migration (default is dry-run)"
    )]
    execute: bool,

    #[clap(
        long = "api-url",
        default_value = DEFAULT_API_URL,
        help = "Base URL of the Dreaming functions API"
    )]
    api_url: String,

    #[clap(short = 'v', long = "verbose", help = "Show debug logs")]
    verbose: bool,
}

/// ログの出力先を標準エラー出力に設定する。
fn setup_logger(level: LevelFilter) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
        .debug(Color::Blue);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Warn)
        .level_for(env!("CARGO_CRATE_NAME"), level)
        .chain(io::stderr())
        .apply()
        .context("Failed to set up logger")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    setup_logger(level)?;
    info!(
        "Migrate external times: {} -> {}",
        args.source_language, args.target_language
    );

    let source = DreamingClient::new(&args.api_url, &args.source_token)
        .context("Failed to create source client")?;
    let target = DreamingClient::new(&args.api_url, &args.target_token)
        .context("Failed to create target client")?;

    let mut stdout = io::stdout();
    let mut presenter = ConsoleText::new(&mut stdout);
    MigrateCommand::new(&source, &target)
        .run(
            MigrateArgs {
                source_language: args.source_language,
                target_language: args.target_language,
                execute: args.execute,
            },
            &mut presenter,
        )
        .await?;

    Ok(())
}
