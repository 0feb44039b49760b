//! Cross-crate integration tests for the Veilwalk workspace; see `tests/`.
