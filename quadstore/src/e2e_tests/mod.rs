//! End-to-end tests against a full store.
//!
//! Each test file covers one behavior of the public surface, using
//! deterministic inputs and, where it matters, a brute-force oracle.

#![cfg(test)]


mod test_custom_index;
mod test_delete;
mod test_index_independence;
mod test_log_replay;
mod test_paging;
mod test_patch;
mod test_range_filters;
mod test_round_trip;
mod test_size_estimate;
