//! Helpers shared by tests across the library
