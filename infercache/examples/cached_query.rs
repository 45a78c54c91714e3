//! Cached query example.
//!
//! Sends the same prompt twice and shows that the second answer comes from
//! the local cache.
//!
//! Run with:
//! ```bash
//! HUGGINGFACE_API_TOKEN=sk-or-v1-... cargo run --example cached_query
//! ```

use infercache::prelude::*;
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let client = InferenceClient::from_env()?;
    let prompt = "List 3 benefits of retrieval-augmented generation:";

    let started = Instant::now();
    let first = client.text_generation(prompt, None).await?;
    println!("First call ({:.2?}):\n{}\n", started.elapsed(), first);

    let started = Instant::now();
    let second = client.text_generation(prompt, None).await?;
    println!("Second call ({:.2?}):\n{}\n", started.elapsed(), second);

    let label = client
        .text_classification("This library saved me hours of waiting.", None)
        .await?;
    println!("Sentiment: {}", label);

    let stats = client.stats();
    println!(
        "Cache: {} hits, {} misses, {} stored (hit ratio {:.0}%)",
        stats.hits,
        stats.misses,
        stats.stores,
        stats.hit_ratio() * 100.0
    );

    Ok(())
}
