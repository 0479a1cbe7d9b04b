//! Integration tests for the radio clock binary.
//!
//! These run the full decode path on synthetic signals: simulator edges in,
//! decoded status out, with no hardware involved.

mod decoder_tests;
