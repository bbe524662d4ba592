/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 12/06/2021
Last Modified: 04/02/2023
License: MIT
*/

//! StreamNet reconstructs the implicit flow graph of a vector stream
//! network. Given the network's polyline features, a digital elevation
//! model, and an optional polygon lake layer, it locates basin outlets,
//! determines the flow direction of every link, and derives the standard
//! suite of network indices (Horton, Strahler, Shreve, and Hack stream
//! orders, total upstream channel length, maximum upstream distance,
//! distance to mouth, tributary id, and mainstem designation).
//!
//! The library performs no file I/O of its own. Callers load the inputs
//! into [`vector::VectorLayer`] and [`dem::DemGrid`] values, provide a
//! [`reporter::Reporter`] to receive progress notices and output records,
//! and call [`analysis::run_network_analysis`].

pub mod analysis;
pub mod attributes;
pub mod dem;
pub mod flood;
pub mod indices;
pub mod network;
pub mod outlets;
pub mod records;
pub mod reporter;
pub mod structures;
pub mod utils;
pub mod vector;

pub use crate::analysis::{run_network_analysis, AnalysisSummary, NetworkAnalysisParams};
pub use crate::attributes::{AttributeField, FieldData, FieldDataType};
pub use crate::dem::{DemConfigs, DemGrid};
pub use crate::records::OutputRecord;
pub use crate::reporter::{ConsoleReporter, RecordCollector, Reporter};
pub use crate::structures::{Array2D, Point2D};
pub use crate::vector::{ShapeGeometry, ShapeType, VectorLayer};
