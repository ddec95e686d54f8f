//! Tests for braid-graph.
//!
//! Fast, deterministic tests live in the `*_tests` modules and run on every
//! build. Property-based tests require the `proptest` feature.

mod graph_tests;

use crate::graph::EdgeKind;

/// Edge kinds used across the test modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TestEdge {
    Sync,
    Lazy,
}

impl EdgeKind for TestEdge {
    fn into_raw(self) -> u32 {
        match self {
            TestEdge::Sync => 1,
            TestEdge::Lazy => 2,
        }
    }

    fn from_raw(raw: u32) -> Self {
        match raw {
            1 => TestEdge::Sync,
            2 => TestEdge::Lazy,
            other => panic!("unknown test edge type {other}"),
        }
    }
}
