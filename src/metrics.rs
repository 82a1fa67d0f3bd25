//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Authentication Metrics
    pub static ref AUTH_CALLBACKS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("discord_arcade_auth_callbacks_total", "OAuth callbacks by outcome"),
        &["outcome"]
    ).expect("metric can be created");

    // Session Metrics
    pub static ref SESSIONS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "discord_arcade_sessions_created_total",
        "Total number of sessions created"
    ).expect("metric can be created");
    pub static ref SESSIONS_ACTIVE: IntGauge = IntGauge::new(
        "discord_arcade_sessions_active",
        "Current number of stored sessions"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("discord_arcade_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
///
/// Call once at startup; registering twice panics.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(AUTH_CALLBACKS_TOTAL.clone()))
        .expect("AUTH_CALLBACKS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SESSIONS_CREATED_TOTAL.clone()))
        .expect("SESSIONS_CREATED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SESSIONS_ACTIVE.clone()))
        .expect("SESSIONS_ACTIVE can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");
}
