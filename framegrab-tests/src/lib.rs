//! Cross-crate integration tests for the framegrab workspace, wiring the
//! simulated capture hardware through a real server and client over
//! localhost. See `tests/`.
