//! Tests for defmap-core.
