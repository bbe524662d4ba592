/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 28/06/2021
Last Modified: 04/02/2023
License: MIT
*/
use crate::attributes::{AttributeField, FieldData, FieldDataType};
use crate::flood::NodePoint;
use crate::network::StreamNetwork;
use crate::reporter::Reporter;
use crate::structures::Point2D;
use crate::vector::{ShapeGeometry, ShapeType, VectorLayer};
use std::io::{Error, ErrorKind};

/// An output record returned through the reporter: an analysed link with
/// its attribute row, or a classified network node.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputRecord {
    Link {
        geometry: ShapeGeometry,
        attributes: Vec<FieldData>,
    },
    Node {
        point: Point2D,
        attributes: Vec<FieldData>,
    },
}

/// The attribute schema of the link output. Field widths and precisions
/// are part of the output contract.
pub fn link_attribute_fields() -> Vec<AttributeField> {
    vec![
        AttributeField::new("FID", FieldDataType::Int, 6u8, 0u8),
        AttributeField::new("OUTLET", FieldDataType::Int, 10u8, 0u8),
        AttributeField::new("TUCL", FieldDataType::Real, 10u8, 3u8),
        AttributeField::new("MAXUPSDIST", FieldDataType::Real, 10u8, 3u8),
        AttributeField::new("DS_NODES", FieldDataType::Int, 6u8, 0u8),
        AttributeField::new("DIST2MOUTH", FieldDataType::Real, 10u8, 3u8),
        AttributeField::new("HORTON", FieldDataType::Int, 6u8, 0u8),
        AttributeField::new("STRAHLER", FieldDataType::Int, 6u8, 0u8),
        AttributeField::new("SHREVE", FieldDataType::Real, 10u8, 3u8),
        AttributeField::new("HACK", FieldDataType::Int, 6u8, 0u8),
        AttributeField::new("MAINSTEM", FieldDataType::Int, 1u8, 0u8),
        AttributeField::new("TRIB_ID", FieldDataType::Int, 6u8, 0u8),
        AttributeField::new("DISCONT", FieldDataType::Int, 4u8, 0u8),
    ]
}

/// The attribute schema of the node output.
pub fn node_attribute_fields() -> Vec<AttributeField> {
    vec![
        AttributeField::new("FID", FieldDataType::Int, 6u8, 0u8),
        AttributeField::new("TYPE", FieldDataType::Text, 14u8, 0u8),
    ]
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Emits one polyline record per mapped link, in input part order, followed
/// by the node records accumulated during the flood. Unmapped links receive
/// no record. Returns the emitted (link, node) record counts.
pub fn emit_records(
    streams: &VectorLayer,
    network: &StreamNetwork,
    node_points: &[NodePoint],
    reporter: &mut dyn Reporter,
) -> Result<(usize, usize), Error> {
    // the last cancellation point; records returned below are final output
    if reporter.cancel_requested() {
        return Err(Error::new(
            ErrorKind::Interrupted,
            "The operation was cancelled.",
        ));
    }

    let num_features = streams.num_records();
    let (mut part_start, mut part_end): (usize, usize);
    let mut feature_num = 0usize;
    let mut fid = 1i32;
    let mut progress: usize;
    let mut old_progress: usize = 1;
    for record_num in 0..num_features {
        let record = streams.get_record(record_num);
        for part in 0..record.num_parts as usize {
            if network.links[feature_num].is_feature_mapped {
                part_start = record.parts[part] as usize;
                part_end = if part < record.num_parts as usize - 1 {
                    record.parts[part + 1] as usize - 1
                } else {
                    record.num_points as usize - 1
                };
                let mut sfg = ShapeGeometry::new(ShapeType::PolyLine);
                sfg.add_part(&record.points[part_start..=part_end]);

                let link = &network.links[feature_num];
                let mut att_data: Vec<FieldData> = Vec::with_capacity(13);
                att_data.push(FieldData::Int(fid));
                att_data.push(FieldData::Int(link.outlet as i32));
                att_data.push(FieldData::Real(round3(link.tucl)));
                att_data.push(FieldData::Real(round3(link.max_upstream_dist)));
                att_data.push(FieldData::Int(link.num_downstream_nodes as i32));
                att_data.push(FieldData::Real(round3(link.dist_to_outlet)));
                att_data.push(FieldData::Int(link.horton_order as i32));
                att_data.push(FieldData::Int(link.strahler_order as i32));
                att_data.push(FieldData::Real(round3(link.shreve_order)));
                att_data.push(FieldData::Int(link.hack_order as i32));
                att_data.push(FieldData::Int(if link.is_mainstem { 1 } else { 0 }));
                att_data.push(FieldData::Int(link.trib_id as i32));
                att_data.push(FieldData::Int(if link.outlet == -1 { 1 } else { 0 }));

                reporter.return_record(OutputRecord::Link {
                    geometry: sfg,
                    attributes: att_data,
                });
                fid += 1;
            }
            feature_num += 1;
        }

        progress = (100.0_f64 * (record_num + 1) as f64 / num_features as f64) as usize;
        if progress != old_progress {
            reporter.progress("Saving output:", progress);
            old_progress = progress;
        }
    }
    let num_link_records = (fid - 1) as usize;

    let mut node_fid = 1i32;
    for node_point in node_points {
        reporter.return_record(OutputRecord::Node {
            point: Point2D::new(node_point.x, node_point.y),
            attributes: vec![
                FieldData::Int(node_fid),
                FieldData::Text(node_point.kind.as_str().to_string()),
            ],
        });
        node_fid += 1;
    }

    Ok((num_link_records, node_points.len()))
}
