use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use alice_find::engine::pipeline::FindEngine;

/// Find text in a web page, highlight every match and select one.
#[derive(Parser, Debug)]
#[command(name = "alice-find", version, about)]
struct Cli {
    /// Local HTML file or URL
    source: String,

    /// Phrase to search for (matched literally, case-insensitive)
    phrase: String,

    /// Time budget per search slice, in milliseconds
    #[arg(long, default_value_t = 100)]
    timeout_ms: u64,

    /// Visible match to select (0-based)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    select: isize,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Print the highlighted document
    #[arg(long)]
    print_html: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let engine = FindEngine::new(cli.width)
        .with_viewport_height(cli.height)
        .with_timeout(Duration::from_millis(cli.timeout_ms));

    let mut page = match engine.load_page(&cli.source) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("alice-find: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if !page.dom.title.is_empty() {
        log::info!("loaded \"{}\" from {}", page.dom.title, page.dom.url);
    }

    let first = page.find_string(&cli.phrase);
    let (status, pumps) = page.finish_search(first);
    log::info!("search finished after {} extra pumps", pumps);

    let visible = status.count().unwrap_or(0);
    println!(
        "{} visible matches ({} total)",
        visible,
        page.find().match_count()
    );

    if visible > 0 {
        let selection = page.select_and_scroll_to_visible_match(cli.select);
        match selection.index {
            Some(index) => {
                println!("selected {}/{}", index + 1, selection.matches);
                if let Some(context) = selection.context {
                    println!("context: {}", context.trim());
                }
                let (x, y) = page.document().scroll_offset();
                println!("scrolled to ({:.0}, {:.0})", x, y);
            }
            None => println!("no match selected"),
        }
    }

    if cli.print_html {
        println!("{}", page.html());
    }

    ExitCode::SUCCESS
}
