/*! Integration tests for feedvault.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - crypto: key and identity derivation through the public API
 * - vault: sealing, opening and the payload wire format
 * - feed: FeedSync over the in-memory store and over HTTP against a local gateway
 * - cache: the file cache as a session collaborator
 * - session: end-to-end login, mutation and fallback flows
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("feedvault=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod cache;
mod crypto;
mod helpers;
mod session;
