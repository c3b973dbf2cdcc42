//! boletin CLI - Official Bulletin generation and reading tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use crossbeam_channel::{unbounded, Sender};
use indicatif::{ProgressBar, ProgressStyle};

use boletin::config::{ApiConfig, ENV_BASE_URL};
use boletin::speech::{self, Utterance, Voice};
use boletin::{
    fetch_bulletin_data, ApiClient, Boletin, BoletinResult, ChunkOptions, JsonFormat, PagePlan,
    PdfConfig, Player, SpeechEngine, SpeechEvent, VoiceSettings,
};

#[derive(Parser)]
#[command(name = "boletin")]
#[command(author = "Municipalidad de Río Gallegos")]
#[command(version)]
#[command(about = "Generate the Official Bulletin PDF and read bulletins aloud", long_about = None)]
struct Cli {
    /// Bulletin API base URL
    #[arg(long, global = true, env = ENV_BASE_URL, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bulletins
    List {
        /// List published bulletins instead
        #[arg(long)]
        published: bool,
    },

    /// List bulletin types
    Types,

    /// Show the page map and index of a bulletin
    Plan {
        /// Bulletin id
        #[arg(value_name = "ID")]
        id: i64,

        /// Plan without an index page
        #[arg(long)]
        no_index: bool,
    },

    /// Generate the bulletin PDF
    Pdf {
        /// Bulletin id
        #[arg(value_name = "ID")]
        id: i64,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Omit the cover page
        #[arg(long)]
        no_cover: bool,

        /// Omit the index page
        #[arg(long)]
        no_index: bool,

        /// Omit the header band
        #[arg(long)]
        no_header: bool,

        /// Footer template ({pageNumber} is replaced)
        #[arg(long, value_name = "TEMPLATE")]
        footer: Option<String>,
    },

    /// Print the composed page tree as JSON
    Json {
        /// Bulletin id
        #[arg(value_name = "ID")]
        id: i64,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the speech chunks of a bulletin
    Chunks {
        #[command(flatten)]
        source: TextSource,

        /// Maximum chunk length in characters
        #[arg(long, default_value_t = speech::DEFAULT_MAX_CHUNK_LEN)]
        max_len: usize,
    },

    /// Read a bulletin aloud (console transcript)
    Speak {
        #[command(flatten)]
        source: TextSource,

        /// Chunk to start from (1-based)
        #[arg(long, default_value_t = 1)]
        from: usize,

        /// Speech rate (0.1 - 10)
        #[arg(long, default_value_t = 1.0)]
        rate: f32,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TextSource {
    /// Bulletin id
    #[arg(value_name = "ID")]
    id: Option<i64>,

    /// Read an existing bulletin PDF instead
    #[arg(long, value_name = "FILE")]
    pdf: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let api_url = cli.api_url;

    let result = match cli.command {
        Commands::List { published } => cmd_list(api_url, published),
        Commands::Types => cmd_types(api_url),
        Commands::Plan { id, no_index } => cmd_plan(api_url, id, no_index),
        Commands::Pdf {
            id,
            output,
            no_cover,
            no_index,
            no_header,
            footer,
        } => {
            let mut config = PdfConfig::new()
                .with_cover(!no_cover)
                .with_index(!no_index)
                .with_header(!no_header);
            if let Some(template) = footer {
                config = config.with_footer(template);
            }
            cmd_pdf(api_url, id, output.as_deref(), config)
        }
        Commands::Json { id, compact } => cmd_json(api_url, id, compact),
        Commands::Chunks { source, max_len } => cmd_chunks(api_url, &source, max_len),
        Commands::Speak { source, from, rate } => cmd_speak(api_url, &source, from, rate),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        let code = report(&*e);
        if code != 0 {
            std::process::exit(code);
        }
    }
}

/// Print a command failure and return the exit code. An empty bulletin is
/// informational and exits cleanly.
fn report(e: &(dyn std::error::Error + 'static)) -> i32 {
    if matches!(e.downcast_ref::<boletin::Error>(), Some(err) if err.is_empty_content()) {
        eprintln!("{}: {}", "Empty".yellow().bold(), e);
        0
    } else {
        log::debug!("Command failed: {:?}", e);
        eprintln!("{}: {}", "Error".red().bold(), e);
        1
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn client(api_url: Option<String>) -> boletin::Result<ApiClient> {
    let mut config = ApiConfig::from_env();
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }
    log::debug!("Using API at {}", config.base_url);
    ApiClient::new(config)
}

fn cmd_list(api_url: Option<String>, published: bool) -> CliResult {
    let client = client(api_url)?;

    if published {
        let bulletins = client.published_bulletins()?;
        println!("{}", "Published bulletins".cyan().bold());
        println!("{}", "─".repeat(60).dimmed());
        for b in &bulletins {
            println!(
                "{:>5}  Nº {:03}  {}  {}  {} resúmenes",
                b.id.to_string().bold(),
                b.edicion,
                boletin::dates::format_short(&b.fecha),
                b.tipo_boletin_nombre.as_deref().unwrap_or("-"),
                b.resumenes_count
            );
        }
        println!("\n{} bulletins", bulletins.len());
    } else {
        let bulletins = client.bulletins()?;
        println!("{}", "Bulletins".cyan().bold());
        println!("{}", "─".repeat(60).dimmed());
        for b in &bulletins {
            let id = b.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
            println!(
                "{:>5}  Nº {:03}  {}",
                id.bold(),
                b.edition(),
                boletin::dates::format_long(b.date())
            );
        }
        println!("\n{} bulletins", bulletins.len());
    }

    Ok(())
}

fn cmd_types(api_url: Option<String>) -> CliResult {
    let client = client(api_url)?;
    for t in client.bulletin_types()? {
        match t.observacion.as_deref().filter(|o| !o.trim().is_empty()) {
            Some(note) => println!("{:>5}  {}  {}", t.id, t.nombre.bold(), note.dimmed()),
            None => println!("{:>5}  {}", t.id, t.nombre.bold()),
        }
    }
    Ok(())
}

fn cmd_plan(api_url: Option<String>, id: i64, no_index: bool) -> CliResult {
    let client = client(api_url)?;
    let data = fetch_bulletin_data(&client, id)?;
    let config = PdfConfig::new().with_index(!no_index);
    let plan = PagePlan::for_sections(&data.categories, &config);

    println!(
        "{} Nº {:03} • {} • {}",
        "Boletín".cyan().bold(),
        data.edition(),
        data.bulletin_type,
        boletin::dates::format_long(data.bulletin.date())
    );
    println!("{}", "─".repeat(60).dimmed());
    println!("{}: {}", "Summaries".bold(), data.total_summaries);
    println!("{}: {}", "Pages".bold(), plan.total_pages);
    println!(
        "{}: {}",
        "Estimated".bold(),
        data.estimated_pages(!no_index)
    );
    println!();

    for (i, (section, pages)) in data.categories.iter().zip(&plan.sections).enumerate() {
        let (first, last) = section.number_range();
        println!(
            "{:02} {} ({}) Nº {} al {} {}",
            i + 1,
            section.category.nombre.to_uppercase().bold(),
            section.category.abreviatura,
            first,
            last,
            format!("p. {}", pages.start_page).green()
        );
        for (j, (summary, page)) in section.summaries.iter().zip(&pages.summary_pages).enumerate() {
            println!(
                "   {}.{} {} {}",
                i + 1,
                j + 1,
                boletin::dates::format_short(summary.fecha.as_deref().unwrap_or("")),
                format!("p. {}", page).dimmed()
            );
        }
    }

    Ok(())
}

fn cmd_pdf(api_url: Option<String>, id: i64, output: Option<&Path>, config: PdfConfig) -> CliResult {
    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Fetching bulletin...");
    let client = client(api_url)?;
    let data = fetch_bulletin_data(&client, id)?;
    pb.inc(1);

    pb.set_message("Composing pages...");
    let result = Boletin::new().with_config(config).compose(data);
    pb.inc(1);

    pb.set_message("Writing PDF...");
    let path = write_pdf(&result, output)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{} {}", "Saved to".green(), path.display());
    println!(
        "  {} {} pages, {} summaries in {} categories",
        "└─".dimmed(),
        result.document.page_count(),
        result.data.total_summaries,
        result.data.categories.len()
    );

    Ok(())
}

/// Write the PDF into `output` (default: the current directory), creating it
/// when missing.
fn write_pdf(result: &BoletinResult, output: Option<&Path>) -> boletin::Result<PathBuf> {
    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;
    let path = output_dir.join(result.file_name());
    log::debug!("Writing {}", path.display());
    result.save_pdf(&path)?;
    Ok(path)
}

fn cmd_json(api_url: Option<String>, id: i64, compact: bool) -> CliResult {
    let client = client(api_url)?;
    let result = Boletin::new().fetch(&client, id)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", result.to_json(format)?);

    Ok(())
}

fn load_chunks(api_url: Option<String>, source: &TextSource, options: ChunkOptions) -> boletin::Result<Vec<String>> {
    match (&source.pdf, source.id) {
        (Some(path), _) => {
            log::debug!("Reading text from {}", path.display());
            let raw = speech::extract_pdf_text(path)?;
            Ok(speech::prepare_chunks(&raw, &options))
        }
        (None, Some(id)) => {
            let client = client(api_url)?;
            let result = Boletin::new()
                .with_chunk_options(options)
                .fetch(&client, id)?;
            Ok(result.chunks())
        }
        (None, None) => Err(boletin::Error::Other(
            "a bulletin id or --pdf is required".to_string(),
        )),
    }
}

fn cmd_chunks(api_url: Option<String>, source: &TextSource, max_len: usize) -> CliResult {
    let chunks = load_chunks(api_url, source, ChunkOptions::new().with_max_len(max_len))?;
    for (i, chunk) in chunks.iter().enumerate() {
        println!(
            "{} {}",
            format!("[{}/{}]", i + 1, chunks.len()).cyan(),
            chunk
        );
    }
    println!("\n{} {} chunks", "Done!".green().bold(), chunks.len());
    Ok(())
}

/// Speech engine that prints each utterance and completes it immediately.
struct ConsoleEngine {
    events: Sender<SpeechEvent>,
}

impl SpeechEngine for ConsoleEngine {
    fn speak(&mut self, utterance: Utterance) -> boletin::Result<()> {
        self.events
            .send(SpeechEvent::Started(utterance.id))
            .map_err(|e| boletin::Error::Speech(e.to_string()))?;
        if !utterance.text.trim().is_empty() {
            println!("{} {}", "»".green(), utterance.text);
        }
        self.events
            .send(SpeechEvent::Ended(utterance.id))
            .map_err(|e| boletin::Error::Speech(e.to_string()))
    }

    fn cancel(&mut self) {}

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn voices(&self) -> Vec<Voice> {
        vec![Voice::new("Consola", "es-AR", true)]
    }
}

fn cmd_speak(api_url: Option<String>, source: &TextSource, from: usize, rate: f32) -> CliResult {
    let chunks = load_chunks(api_url, source, ChunkOptions::default())?;
    if chunks.is_empty() {
        println!("{}", "No text to read".yellow());
        return Ok(());
    }

    let (tx, rx) = unbounded();
    let engine = ConsoleEngine { events: tx };
    let total = chunks.len();
    let mut player = Player::new(engine, chunks)
        .with_settings(VoiceSettings::default().with_rate(rate));
    player.load_voices();

    let start = from.saturating_sub(1).min(total - 1);
    println!(
        "{} {} chunks from {}",
        "Reading".cyan().bold(),
        total,
        start + 1
    );
    let stats = speech::run_session(&mut player, &rx, start)?;

    println!(
        "\n{} {} spoken, {} failed, {} skipped",
        "Done!".green().bold(),
        stats.spoken,
        stats.failed,
        stats.skipped
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "boletin".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Official Bulletin generation and reading tool");
    println!();
    println!("Library: boletin {}", boletin::VERSION);
    println!("License: MIT");
}
