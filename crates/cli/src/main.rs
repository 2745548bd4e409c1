use clap::{Parser, Subcommand};

use civic::chat::ChatThread;
use civic::gateway::CivicGateway;
use civic::llm::GeminiClient;
use civic::model::{Bill, BillAnalysis, ChatMessage, MediaKind};
use civic::view::{self, SortKey, YearFilter};

#[derive(Parser)]
#[command(name = "civic")]
#[command(about = "Civic CLI: search Indian bills, read AI analyses, join the discussion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and an empty config file.
    Init {
        /// Config file path (default: CIVIC_CONFIG_PATH or ~/.civic/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Search recent bills and policies using web-grounded generation.
    Search {
        /// What to look for, e.g. "data privacy"
        query: String,

        /// Keep bills whose date mentions this year ("all" or YYYY)
        #[arg(long, default_value = "all")]
        year: YearFilter,

        /// recent, oldest, title-asc or title-desc
        #[arg(long, default_value = "recent")]
        sort: SortKey,

        /// Print the bills as JSON
        #[arg(long)]
        json: bool,

        /// Config file path (default: CIVIC_CONFIG_PATH or ~/.civic/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Analyze one bill by title.
    Analyze {
        title: String,

        /// Analysis language (default from ui.language)
        #[arg(long)]
        language: Option<String>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Config file path (default: CIVIC_CONFIG_PATH or ~/.civic/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Discuss a bill with simulated participants (interactive).
    Chat {
        /// Bill title the discussion is about
        title: String,

        /// Config file path (default: CIVIC_CONFIG_PATH or ~/.civic/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("civic {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Search {
            query,
            year,
            sort,
            json,
            config,
        }) => {
            if let Err(e) = run_search(config, &query, year, sort, json).await {
                log::error!("search failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Analyze {
            title,
            language,
            json,
            config,
        }) => {
            if let Err(e) = run_analyze(config, &title, language, json).await {
                log::error!("analyze failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { title, config }) => {
            if let Err(e) = run_chat(config, &title).await {
                log::error!("chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(civic::config::default_config_path);
    let dir = civic::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

/// Load config and build the gateway. Fails before any request when no API key resolves.
fn connect(
    config_path: Option<std::path::PathBuf>,
) -> anyhow::Result<(CivicGateway<GeminiClient>, civic::config::Config)> {
    let (config, path) = civic::config::load_config(config_path)?;
    log::debug!("using config {}", path.display());
    let client = GeminiClient::from_config(&config)?;
    log::info!("generation model: {}", client.model());
    Ok((CivicGateway::new(client), config))
}

async fn run_search(
    config_path: Option<std::path::PathBuf>,
    query: &str,
    year: YearFilter,
    sort: SortKey,
    json: bool,
) -> anyhow::Result<()> {
    let (gateway, _) = connect(config_path)?;
    let bills = gateway.search_bills(query).await?;
    let list = view::display_list(&bills, year, sort);

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    if bills.is_empty() {
        println!("No bills found for {:?}. Try a different search term.", query);
    } else if list.is_empty() {
        println!("No bills match the year {}.", year);
    } else {
        for bill in list {
            print_bill(bill);
        }
    }
    Ok(())
}

fn print_bill(bill: &Bill) {
    println!("{}  [{}]", bill.title, bill.id);
    println!("  {} | {} | {}", bill.status, bill.category, bill.date);
    println!("  {}", bill.summary);
    println!("  votes: {} for, {} against", bill.vote_count.for_votes, bill.vote_count.against);
    println!();
}

async fn run_analyze(
    config_path: Option<std::path::PathBuf>,
    title: &str,
    language: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (gateway, config) = connect(config_path)?;
    let language = language.unwrap_or_else(|| civic::config::resolve_language(&config).to_string());
    let analysis = gateway.analyze_bill(title, &language).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(title, &analysis);
    }
    Ok(())
}

fn print_analysis(title: &str, a: &BillAnalysis) {
    println!("# {}\n", title);
    println!("## Explanation\n{}\n", a.explanation);

    println!("## Viewpoints");
    println!("  For:     {}", a.viewpoints.pro);
    println!("  Against: {}", a.viewpoints.con);
    println!("  Neutral: {}\n", a.viewpoints.neutral);

    println!("## Impact (if passed / if not passed)");
    for p in &a.impact {
        println!("  {:<24} {:>6.0} / {:>6.0}", p.name, p.if_passed, p.if_not_passed);
    }
    println!();

    println!("## Parliamentary debate");
    for d in &a.debate {
        println!("  {} ({}): {}", d.speaker, d.party, d.statement);
    }
    println!();

    println!("## Media");
    for m in &a.media {
        match (&m.kind, &m.uri) {
            (MediaKind::News, Some(uri)) => println!("  [{}] {} <{}>", m.kind, m.title, uri),
            _ => println!("  [{}] {}", m.kind, m.title),
        }
        println!("      {}", m.description);
    }
    println!();

    println!("## Mind map: {}", a.mind_map.central_topic);
    for branch in &a.mind_map.branches {
        println!("  - {}", branch.title);
        for child in &branch.children {
            println!("      - {}", child);
        }
    }
    println!();

    println!("## Flashcards");
    for (i, card) in a.flashcards.iter().enumerate() {
        println!("  Q{}: {}", i + 1, card.question);
        println!("  A{}: {}", i + 1, card.answer);
    }
}

fn print_message(message: &ChatMessage) {
    println!("{}: {}", message.name, message.text);
}

async fn run_chat(config_path: Option<std::path::PathBuf>, title: &str) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (gateway, _) = connect(config_path)?;
    let mut thread = ChatThread::new();
    println!("Discussion: {} (type /exit to leave)\n", title);
    for message in thread.messages() {
        print_message(message);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }
        let Some(snapshot) = thread.begin_submit(input) else {
            continue;
        };
        let before = thread.len();
        let outcome = gateway.continue_chat(&snapshot, title).await;
        if outcome.is_degraded() {
            log::warn!("discussion turn degraded");
        }
        thread.complete(outcome.into_messages());
        for message in &thread.messages()[before..] {
            print_message(message);
        }
    }

    Ok(())
}
