//! Unit tests for the session shell.
