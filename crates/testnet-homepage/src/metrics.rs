//! Prometheus metrics for the testnet homepage.
//!
//! Every metric is prefixed `ethereum_testnet_homepage_`. The recorder is
//! installed by the binary; without one the macros are no-ops.

#![allow(clippy::cast_precision_loss)]

use metrics::{
    Unit,
    counter,
    describe_counter,
    describe_gauge,
    describe_histogram,
    gauge,
    histogram,
};
use std::time::Duration;

/// Registers help text for every metric below.
pub fn describe() {
    describe_counter!(
        "ethereum_testnet_homepage_service_ethereum_calls_total",
        "Calls made to the ethereum service"
    );
    describe_counter!(
        "ethereum_testnet_homepage_inventory_fetches_total",
        "Inventory fetches by result"
    );
    describe_gauge!(
        "ethereum_testnet_homepage_inventory_tracked_nodes",
        "Nodes currently tracked from the inventory"
    );
    describe_counter!(
        "ethereum_testnet_homepage_inventory_node_changes_total",
        "Nodes added, updated, removed or failed during reconciliation"
    );
    describe_counter!(
        "ethereum_testnet_homepage_http_requests_total",
        "HTTP requests received"
    );
    describe_counter!(
        "ethereum_testnet_homepage_http_responses_total",
        "HTTP responses sent"
    );
    describe_histogram!(
        "ethereum_testnet_homepage_http_response_duration_seconds",
        Unit::Seconds,
        "Time taken to serve an HTTP request"
    );
}

/// `ethereum_testnet_homepage_service_ethereum_calls_total{call,network}`
pub fn record_ethereum_call(call: &'static str, network: &str) {
    counter!(
        "ethereum_testnet_homepage_service_ethereum_calls_total",
        "call" => call,
        "network" => network.to_string()
    )
    .increment(1);
}

/// `ethereum_testnet_homepage_inventory_fetches_total{result}`, where result
/// is `success` or `error`.
pub fn record_inventory_fetch(success: bool) {
    let result = if success { "success" } else { "error" };
    counter!("ethereum_testnet_homepage_inventory_fetches_total", "result" => result).increment(1);
}

pub fn set_tracked_nodes(count: usize) {
    gauge!("ethereum_testnet_homepage_inventory_tracked_nodes").set(count as f64);
}

/// `ethereum_testnet_homepage_inventory_node_changes_total{change}`
pub fn record_node_changes(change: &'static str, count: usize) {
    if count == 0 {
        return;
    }

    counter!("ethereum_testnet_homepage_inventory_node_changes_total", "change" => change)
        .increment(count as u64);
}

pub fn record_http_request(method: &str, path: &str) {
    counter!(
        "ethereum_testnet_homepage_http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .increment(1);
}

pub fn record_http_response(
    method: &str,
    path: &str,
    code: u16,
    encoding: &str,
    duration: Duration,
) {
    counter!(
        "ethereum_testnet_homepage_http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "code" => code.to_string(),
        "encoding" => encoding.to_string()
    )
    .increment(1);

    histogram!(
        "ethereum_testnet_homepage_http_response_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration.as_secs_f64());
}
