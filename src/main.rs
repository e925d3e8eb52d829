use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bookcard::export::encode::FileSink;
use bookcard::state::{CARD_WIDTH_MAX, CARD_WIDTH_MIN, FONT_SIZE_MAX, FONT_SIZE_MIN};
use bookcard::{
    new_rasterizer, AppState, BookExcerptApp, CardContent, ConfigSet, ContentCache, ExportFormat,
    FixedPlatform, Layout, TextAlign,
};

#[derive(Parser)]
#[command(name = "bookcard", version, about = "Headless book-excerpt card generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the card and export it as image files
    Export {
        /// Quote text; falls back to cached content when omitted
        #[arg(long)]
        quote: Option<String>,
        #[arg(long)]
        book: Option<String>,
        #[arg(long)]
        author: Option<String>,
        /// Seal text (up to four characters are rendered)
        #[arg(long)]
        seal: Option<String>,
        #[arg(long, default_value = "theme-clean")]
        theme: String,
        /// horizontal or vertical
        #[arg(long, default_value = "horizontal")]
        layout: String,
        /// CSS font-family for the quote text
        #[arg(long)]
        font: Option<String>,
        #[arg(long, default_value_t = 20)]
        font_size: u32,
        #[arg(long)]
        font_color: Option<String>,
        /// Card width in px (300-600)
        #[arg(long, default_value_t = 400)]
        width: u32,
        /// left, center, right, or justify
        #[arg(long, default_value = "justify")]
        align: String,
        /// Output format, repeatable (png, jpeg, jpg, webp, svg)
        #[arg(long = "format")]
        formats: Vec<String>,
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Emulate a phone-sized device (exercises the offscreen-clone path)
        #[arg(long)]
        mobile: bool,
        /// Directory for the content cache; omitted disables persistence
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        /// Hostname used to locate the remote config server
        #[arg(long)]
        config_host: Option<String>,
    },
    /// List the available themes, fonts, and font colors
    Themes,
    /// Import a config bundle (content + style)
    Import {
        file: PathBuf,
        /// Accept a major-version mismatch without prompting
        #[arg(long)]
        yes: bool,
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Export {
            quote,
            book,
            author,
            seal,
            theme,
            layout,
            font,
            font_size,
            font_color,
            width,
            align,
            formats,
            out,
            mobile,
            cache_dir,
            config_host,
        } => {
            let configs = load_configs(config_host.as_deref());
            if configs.find_theme(&theme).is_none() {
                log::warn!("unknown theme {:?}; the card keeps its computed background", theme);
            }

            let mut state = AppState::default();
            state.theme = theme;
            state.layout = layout.parse::<Layout>()?;
            state.text_align = align.parse::<TextAlign>()?;
            state.font_size = font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
            state.card_width = width.clamp(CARD_WIDTH_MIN, CARD_WIDTH_MAX);
            if let Some(font) = font {
                state.font = font;
            }
            if let Some(color) = font_color {
                state.font_color = color;
            }

            let formats = formats
                .iter()
                .map(|f| f.parse::<ExportFormat>())
                .collect::<bookcard::Result<Vec<_>>>()?;

            let platform = if mobile { FixedPlatform::mobile() } else { FixedPlatform::new() };
            let mut app = BookExcerptApp::new(
                configs,
                state,
                Arc::new(platform),
                new_rasterizer(),
                open_cache(cache_dir),
            );

            // CLI input wins over cached content, field by field
            let cached = app.preview.content().clone();
            app.set_content(CardContent {
                quote: quote.unwrap_or(cached.quote),
                book: book.unwrap_or(cached.book),
                author: author.unwrap_or(cached.author),
                seal: seal.unwrap_or(cached.seal),
            });

            let mut sink = FileSink::new(&out);
            let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
            runtime.block_on(app.export(&formats, &mut sink))?;
            println!("exported {} file(s) to {}", sink.delivered.len(), out.display());
            Ok(())
        }
        Command::Themes => {
            let configs = ConfigSet::defaults();
            println!("themes:");
            for theme in &configs.themes {
                let style =
                    theme.background.as_deref().or(theme.color.as_deref()).unwrap_or("-");
                println!("  {:24} {}", theme.id, style);
            }
            println!("fonts:");
            for font in &configs.fonts {
                println!("  {:24} {} ({})", font.id, font.name, font.value);
            }
            println!("font colors:");
            for color in &configs.font_colors {
                println!("  {:24} {} {}", color.id, color.value, color.name);
            }
            Ok(())
        }
        Command::Import { file, yes, cache_dir } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let mut app = BookExcerptApp::new(
                ConfigSet::defaults(),
                AppState::default(),
                Arc::new(FixedPlatform::new()),
                new_rasterizer(),
                open_cache(cache_dir),
            );
            app.import_config(&json, |prompt| yes || confirm(prompt))?;
            println!("config imported from {}", file.display());
            Ok(())
        }
    }
}

fn open_cache(dir: Option<PathBuf>) -> ContentCache {
    match dir {
        Some(dir) => ContentCache::new(dir.join("content.json")),
        None => ContentCache::disabled(),
    }
}

#[cfg(feature = "remote-config")]
fn load_configs(config_host: Option<&str>) -> ConfigSet {
    use bookcard::remote::{detect_base_url, ConfigService};
    match config_host {
        Some(host) => ConfigService::new(detect_base_url(host)).load_config_set(),
        None => ConfigSet::defaults(),
    }
}

#[cfg(not(feature = "remote-config"))]
fn load_configs(_config_host: Option<&str>) -> ConfigSet {
    ConfigSet::defaults()
}

fn confirm(prompt: &str) -> bool {
    eprint!("{}; continue? [y/N] ", prompt);
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}
