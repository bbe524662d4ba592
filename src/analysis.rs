/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 28/06/2021
Last Modified: 04/02/2023
License: MIT
*/
use crate::dem::{find_edge_cells, DemGrid};
use crate::flood::orient_network;
use crate::indices::compute_indices;
use crate::network::StreamNetwork;
use crate::outlets::detect_outlets;
use crate::records::emit_records;
use crate::reporter::Reporter;
use crate::utils::get_formatted_elapsed_time;
use crate::vector::{ShapeType, VectorLayer};
use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};
use std::time::Instant;

/// Analysis parameters. The snap distance is given in the xy units of the
/// input data and is used for grouping link endpoints into nodes; the
/// output path names the destination that the host writes emitted records
/// to and is simply carried through.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkAnalysisParams {
    pub snap_distance: f64,
    pub output_path: String,
}

impl NetworkAnalysisParams {
    pub fn new() -> NetworkAnalysisParams {
        NetworkAnalysisParams {
            snap_distance: 0.001,
            output_path: String::new(),
        }
    }

    /// Reads parameters from a JSON object, in the style of a settings
    /// file; missing fields keep their default values.
    pub fn from_json(json_str: &str) -> Result<NetworkAnalysisParams, Error> {
        serde_json::from_str(json_str).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Error parsing the parameters: {}", e),
            )
        })
    }
}

impl Default for NetworkAnalysisParams {
    fn default() -> NetworkAnalysisParams {
        NetworkAnalysisParams::new()
    }
}

/// Feature counts reported by a completed analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub num_links: usize,
    pub num_mapped_links: usize,
    pub num_outlets: usize,
    pub num_nodes: usize,
    pub num_link_records: usize,
    pub num_node_records: usize,
}

/// Runs the full analysis pipeline: DEM edge-cell scan, link and endpoint
/// characterization, outlet detection, node formation, the priority flood,
/// index computation, and record emission. Output records are pushed
/// through the reporter only after all computation succeeds; a cancelled or
/// failed run yields no records.
pub fn run_network_analysis(
    streams: &VectorLayer,
    dem: &DemGrid,
    lakes: Option<&VectorLayer>,
    params: &NetworkAnalysisParams,
    reporter: &mut dyn Reporter,
) -> Result<AnalysisSummary, Error> {
    let start = Instant::now();

    if streams.shape_type.base_shape_type() != ShapeType::PolyLine {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "The input streams data must be of PolyLine base shape type.",
        ));
    }
    if let Some(lakes) = lakes {
        if lakes.shape_type.base_shape_type() != ShapeType::Polygon {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The input lakes data must be of Polygon base shape type.",
            ));
        }
    }

    // If the DEM is in geographic coordinates, link lengths are scaled to
    // metres and the snap distance is converted into degrees.
    let dist_multiplier = dem.metric_conversion_factor();
    let mut snap_distance = params.snap_distance;
    if dist_multiplier != 1f64 {
        snap_distance = snap_distance / dist_multiplier;
    }
    let snap_dist_sq = snap_distance * snap_distance;

    let edge_cells = find_edge_cells(dem, reporter)?;

    let (mut network, end_point_tree) =
        StreamNetwork::build(streams, dem, &edge_cells, dist_multiplier, reporter)?;

    let mut queue = detect_outlets(&mut network, dem, &edge_cells, reporter)?;
    if queue.is_empty() {
        reporter.feedback(
            "No outlets were located; every link will be flagged as discontinuous.",
        );
    }

    network.form_nodes(&end_point_tree, lakes, snap_dist_sq, reporter)?;

    let node_points = orient_network(&mut network, &mut queue, reporter)?;

    compute_indices(&mut network, reporter)?;

    let (num_link_records, num_node_records) =
        emit_records(streams, &network, &node_points, reporter)?;

    let summary = AnalysisSummary {
        num_links: network.links.len(),
        num_mapped_links: network
            .links
            .iter()
            .filter(|link| link.is_feature_mapped)
            .count(),
        num_outlets: network
            .links
            .iter()
            .filter(|link| link.is_outlet_link)
            .count(),
        num_nodes: network.nodes.len(),
        num_link_records: num_link_records,
        num_node_records: num_node_records,
    };

    reporter.feedback(&format!(
        "Elapsed Time (excluding I/O): {}",
        get_formatted_elapsed_time(start)
    ));

    Ok(summary)
}
