//! One-shot digest from the command line: runs the same pipeline as the webhook and prints
//! the result to stdout instead of sending it to a chat.
//!
//! ```text
//! digest python --size 3
//! digest r/rust --json --seed 42
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kataskopos::source::RedditClient;
use kataskopos::{DigestPipeline, RelayConfig};

#[derive(Parser, Debug)]
#[command(name = "digest", about = "Print a random digest of today's popular posts in a subreddit")]
struct Args {
    /// Subreddit name, with or without the `r/` prefix
    topic: String,

    /// Maximum listing pages to read
    #[arg(long)]
    pages: Option<usize>,

    /// Number of posts in the digest
    #[arg(long)]
    size: Option<usize>,

    /// Minimum score for a post to be considered
    #[arg(long)]
    min_score: Option<i64>,

    /// Seed the sampler for a reproducible pick
    #[arg(long)]
    seed: Option<u64>,

    /// Print the selected posts as JSON instead of rendered text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    kataskopos::init_tracing();
    let args = Args::parse();

    let mut cfg = RelayConfig::load_default().context("loading relay config")?;
    if let Some(p) = args.pages {
        cfg.max_pages = p.max(1);
    }
    if let Some(s) = args.size {
        cfg.digest_size = s.max(1);
    }
    if let Some(m) = args.min_score {
        cfg.min_score = m;
    }

    let source = RedditClient::from_config(&cfg).context("building reddit client")?;
    let pipeline = DigestPipeline::new(Arc::new(source), cfg)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let digest = match pipeline.run(&args.topic, Utc::now(), &mut rng).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e.user_message(&args.topic));
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&digest.posts)?);
    } else {
        for entry in &digest.entries {
            println!("{entry}\n");
        }
    }
    eprintln!(
        "r/{}: {} posts over {} pages, {} admissible, {} selected",
        digest.topic,
        digest.collected,
        digest.pages,
        digest.admissible,
        digest.posts.len()
    );
    Ok(())
}
