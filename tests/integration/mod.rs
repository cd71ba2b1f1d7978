//! Integration Tests Module
//!
//! End-to-end interview flows against scripted gateways, gateway outage
//! behaviour, the session store contract and session maintenance.

mod support;

// Full interview lifecycle with a cooperative gateway
mod interview_flow_test;

// Canned questions and keyword scoring when the gateway is down or slow
mod outage_test;

// Shared contract for the in-memory and SQLite stores
mod store_test;

// Candidates, auxiliary records, cleanup and health
mod maintenance_test;
