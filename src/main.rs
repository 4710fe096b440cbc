use chat_stats::normalizer::Normalizer;
use chat_stats::stop_words::StopWords;
use chat_stats::word_cloud::WordCloudConfig;
use chat_stats::{ChatStatistics, MainError};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Reply and word-cloud statistics for an exported Telegram chat
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Exported chat (result.json)
    #[arg(short, long, env = "CHAT_STATS_CHAT", default_value = "data/result.json")]
    chat: PathBuf,

    /// Directory the word cloud is written to
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// Stop word list, one word per line
    #[arg(long, env = "CHAT_STATS_STOP_WORDS", default_value = "data/stop_words.txt")]
    stop_words: PathBuf,

    /// Font used to render the word cloud
    #[arg(long, env = "CHAT_STATS_FONT", default_value = "data/fonts/DejaVuSans.ttf")]
    font: PathBuf,

    /// Number of top repliers to report
    #[arg(short = 'n', long, default_value_t = 10)]
    top_n: usize,

    /// Flatten rich-text messages into the word cloud as well
    #[arg(long)]
    include_rich_text: bool,

    #[arg(long, default_value = "logs.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(log_file: &Path, verbose: bool) -> Result<(), MainError> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .chain(fern::log_file(log_file)?)
        .apply()?;
    Ok(())
}

fn main() -> Result<(), MainError> {
    let args = Args::parse();
    setup_logging(&args.log_file, args.verbose)?;

    let normalizer = Normalizer::default();
    let stop_words = StopWords::load(&args.stop_words, &normalizer)?;
    let mut chat_stats = ChatStatistics::new(&args.chat, normalizer, stop_words)?
        .with_rich_text(args.include_rich_text);

    let top_users = chat_stats.top_users(args.top_n);
    println!("{}", serde_json::to_string_pretty(&top_users)?);

    chat_stats.generate_word_cloud(&args.output_dir, &args.font, &WordCloudConfig::default())?;
    println!("Done!");

    Ok(())
}
