use clap::{Args, Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use review_forge::{
    compose_prompt, layout_response, AppConfig, HistoryStore, ProductFacts, ReviewComposer,
};

#[derive(Parser)]
#[command(name = "review-forge")]
#[command(about = "Compose, parse and lay out AI-written product review posts")]
#[command(version)]
struct Cli {
    /// History file; defaults to the configured or per-user location
    #[arg(long, global = true, env = "REVIEW_FORGE_HISTORY")]
    history: Option<PathBuf>,

    /// Seed for every random choice
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

/// Product data passed on the command line
#[derive(Args)]
struct ProductArgs {
    /// Product title
    #[arg(long)]
    title: String,
    /// Price as displayed on the shopping page
    #[arg(long, default_value = "")]
    price: String,
    /// Product description
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Subcommand)]
enum Command {
    /// Print the prompt that would be sent to the provider
    Prompt {
        #[command(flatten)]
        product: ProductArgs,
        /// Number of product images
        #[arg(long, default_value_t = 0)]
        images: usize,
    },
    /// Parse a saved model response and print the laid-out elements as JSON
    Parse {
        /// File holding the raw response
        file: PathBuf,
        /// Image references, in [IMAGE:n] order
        #[arg(long = "image", value_name = "REF")]
        image_refs: Vec<String>,
        /// Shopping link for [LINK]
        #[arg(long, default_value = "")]
        link: String,
    },
    /// Show the category and angle suggestion for a product title
    Suggest {
        title: String,
    },
    /// Run the full generation with the configured provider
    Generate {
        #[command(flatten)]
        product: ProductArgs,
        /// Image files sent along with the prompt
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,
        /// Shopping link for [LINK]
        #[arg(long, default_value = "")]
        link: String,
    },
}

fn history_store(path: Option<PathBuf>, config: &AppConfig) -> HistoryStore {
    match path {
        Some(path) => HistoryStore::from_config(&config.history).with_path(path),
        None => HistoryStore::from_config(&config.history),
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Prompt { product, images } => {
            let facts = ProductFacts::new(product.title, product.price, product.description, images);
            let history = history_store(cli.history, &config);
            let prompt = compose_prompt(&facts, &history, &config, &mut rng(cli.seed));
            println!("{}", prompt);
        }
        Command::Parse {
            file,
            image_refs,
            link,
        } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let blocks = layout_response(&raw, &image_refs, &link, &mut rng(cli.seed));
            info!("Parsed {} elements from {}", blocks.len(), file.display());
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::Suggest { title } => {
            let history = history_store(cli.history, &config);
            let suggestion = history.suggest(&title, config.history.recent_limit);
            println!("{}", serde_json::to_string_pretty(&suggestion)?);
        }
        Command::Generate {
            product,
            images,
            link,
        } => {
            let facts = ProductFacts::new(product.title, product.price, product.description, 0);
            let mut builder = ReviewComposer::builder()
                .product(facts)
                .image_paths(images)
                .link(link)
                .history(history_store(cli.history, &config))
                .config(config);
            if let Some(seed) = cli.seed {
                builder = builder.seed(seed);
            }
            let review = builder.build().await?;
            println!("{}", serde_json::to_string_pretty(&review)?);
        }
    }

    Ok(())
}
