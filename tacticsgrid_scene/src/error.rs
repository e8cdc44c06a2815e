// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for scene queries and collision optimization.

use thiserror::Error;

use crate::types::NodeId;

/// A query or rebuild that could not be answered.
///
/// A failed query is never reported as "no collision".
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QueryError {
    /// The scene was modified after the last [`Scene::commit`](crate::Scene::commit).
    #[error("scene has uncommitted changes")]
    Uncommitted,

    /// A node id does not refer to a live node.
    #[error("node {0:?} is not alive")]
    DanglingNode(NodeId),

    /// A collision solid that a query had to test is malformed.
    #[error("solid {index} of node {node:?} is malformed: {reason}")]
    MalformedSolid {
        /// Owning node.
        node: NodeId,
        /// Position of the solid in the node.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A mesh triangle that a query had to test is malformed.
    #[error("triangle {triangle} of mesh {node:?} is malformed: {reason}")]
    MalformedMesh {
        /// Owning node.
        node: NodeId,
        /// Position of the triangle in the mesh.
        triangle: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The probe itself is malformed.
    #[error("invalid probe: {0}")]
    InvalidProbe(&'static str),
}

/// Result type for scene queries.
pub type QueryResult<T> = Result<T, QueryError>;
