//! # Spotify Integration Module
//!
//! This module is the integration layer between the ingestion pipeline and the Spotify
//! Web API. It owns every outbound request: credential exchange, paced and retried GET
//! calls, playlist pagination, and the batch collectors that reshape API answers into
//! dataset rows.
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator (cli::ingest)
//!          ↓
//! Batch Collectors (tracks, artists)   Pagination Walker (playlists)
//!          ↓                                   ↓
//!          └──────── Endpoint Caller (client) ─┘
//!                           ↓
//!          Credential Provider (auth) + Transport (transport)
//!                           ↓
//!                    Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`transport`] - the HTTP seam; [`transport::ReqwestTransport`] in production
//! - [`auth`] - client-credentials exchange and the [`auth::CredentialProvider`] contract
//! - [`client`] - [`client::EndpointCaller`]: pacing, status classification, bounded retry
//! - [`endpoints`] - endpoint URL construction
//! - [`playlists`] - follows `next` links to gather playlist track ids
//! - [`tracks`] - track metadata + audio features batches
//! - [`artists`] - artist metadata batches
//!
//! ## Error Handling Philosophy
//!
//! ### Rate Limiting
//! - **Pacing**: at least one second between the start of two calls
//! - **Retry-After Headers**: a 429 sleeps for the advertised delay before retrying
//!
//! ### Authentication Errors
//! - **Token Expiration**: a 401 forces a credential refresh visible to all later calls
//! - **Exchange Failure**: fatal, propagated to the caller
//!
//! ### Rejections
//! - 403, 404 and unhandled statuses are logged and treated as "no data"
//! - 429 and 401 retries share a ceiling of three per logical request
//!
//! ## Thread Safety
//!
//! Calls are issued one at a time. The credential cell and the pacing clock sit behind
//! async mutexes so that shared ownership stays sound, not to enable parallel requests.

pub mod artists;
pub mod auth;
pub mod client;
pub mod endpoints;
pub mod playlists;
pub mod tracks;
pub mod transport;
