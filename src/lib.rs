//! # shop-assist
//!
//! A conversational shopping assistant: a free-text product request is
//! turned into structured filters, matched against a product catalog, and
//! answered with a short recommendation.
//!
//! ## Architecture
//!
//! ```text
//!        ┌──────────────────┐
//!        │ Catalog (JSON)   │  loaded once at startup
//!        └────────┬─────────┘
//!          ┌──────┴───────────────┐
//!          ▼                      ▼
//!   ┌──────────────┐      ┌───────────────┐
//!   │  Vocabulary  │      │ Catalog index │
//!   │ colors/types │      │   (tantivy)   │
//!   │ brands/attrs │      └───────▲───────┘
//!   └──────┬───────┘              │
//!          ▼                      │
//!   ┌──────────────────────┐      │
//!   │  Decision policy     │      │
//!   │  learned path (LLM,  │      │
//!   │  bounded, 1 attempt) │      │
//!   │      │ on failure    │      │
//!   │      ▼               │      │
//!   │  rule-based engine   │      │
//!   └──────┬───────────────┘      │
//!          │ FilterSet            │
//!          └──────────────────────┘
//!                                 │ top 5 products
//!                                 ▼
//!                      ┌─────────────────────┐
//!                      │ Response generation │
//!                      │ LLM or plain list   │
//!                      └─────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, catalog and LLM settings
//! - [`models`] - Catalog `Product`, `ProductHit` and request/response types
//! - [`catalog`] - Catalog snapshot loading from the JSON dataset
//! - [`interpret`] - Vocabulary, fuzzy matching, rule-based engine and decision policy
//! - [`llm::chat`] - Ollama / OpenAI-compatible chat completion calls
//! - [`llm::extract`] - Schema-constrained filter extraction (the learned path)
//! - [`llm::summarize`] - Recommendation text over search results
//! - [`search::catalog_index`] - Filter-driven product search on tantivy
//! - [`api`] - Axum HTTP handlers for interpretation, search and config
//! - [`state`] - Shared application state built at startup

pub mod api;
pub mod catalog;
pub mod config;
pub mod interpret;
pub mod llm;
pub mod models;
pub mod search;
pub mod state;
