use anyhow::Result;
use std::fmt::Write;

use super::chat::{self, sanitize_for_prompt, ChatMessage};
use crate::config::LlmConfig;
use crate::models::ProductHit;

/// Ask the chat model for a friendly recommendation over the search results.
pub async fn summarize(
    client: &reqwest::Client,
    config: &LlmConfig,
    query: &str,
    hits: &[ProductHit],
) -> Result<String> {
    let messages = [
        ChatMessage::system(
            "You are a helpful shopping assistant. Based on the user's query and the \
             product search results, write a friendly and informative answer. Highlight key \
             features like price, discount, brand and rating. If no products were found, \
             say so kindly.",
        ),
        ChatMessage::user(build_prompt(query, hits)),
    ];

    let reply = chat::complete(client, config, &messages, 0.7, None).await?;
    if reply.trim().is_empty() {
        anyhow::bail!("LLM returned an empty response");
    }
    Ok(reply)
}

fn build_prompt(query: &str, hits: &[ProductHit]) -> String {
    let mut prompt = format!("Query: {}\n\nSearch results:\n", sanitize_for_prompt(query));

    if hits.is_empty() {
        prompt.push_str("(none)\n");
    } else {
        for hit in hits {
            let _ = writeln!(
                prompt,
                "- {} | brand: {} | price: {} (was {}) | discount: {} | rating: {} | {}",
                sanitize_for_prompt(&hit.title),
                hit.brand,
                hit.selling_price,
                hit.actual_price,
                hit.discount,
                hit.average_rating,
                hit.url
            );
        }
    }

    prompt
}

/// Plain-text answer used when the model is unavailable.
pub fn render_fallback(hits: &[ProductHit]) -> String {
    if hits.is_empty() {
        return "Sorry, I couldn't find any products matching your request. \
                Try a broader description or a different price range."
            .to_string();
    }

    let mut out = format!("Here are {} products that match your request:\n", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        let _ = write!(out, "{}. {}", i + 1, hit.title);
        if !hit.brand.is_empty() {
            let _ = write!(out, " by {}", hit.brand);
        }
        let _ = write!(out, " for {}", hit.selling_price);
        if !hit.discount.is_empty() {
            let _ = write!(out, " ({})", hit.discount);
        }
        if hit.average_rating > 0.0 {
            let _ = write!(out, ", rated {:.1}", hit.average_rating);
        }
        out.push('\n');
    }
    out
}
