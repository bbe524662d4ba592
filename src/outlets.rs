/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 21/06/2021
Last Modified: 23/03/2023
License: MIT
*/
use crate::dem::DemGrid;
use crate::network::StreamNetwork;
use crate::reporter::Reporter;
use crate::structures::Array2D;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::{Error, ErrorKind};

/// A queued endpoint, keyed by its elevation. Items carry an insertion
/// sequence number so that equal elevations pop in insertion order.
#[derive(Clone, Copy, Debug)]
pub struct QueuedPoint {
    pub end_point: usize,
    pub priority: f64,
    seq: usize,
}

impl PartialEq for QueuedPoint {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedPoint {}

impl PartialOrd for QueuedPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed, so that the lowest elevation pops first
        match other.priority.partial_cmp(&self.priority) {
            Some(Ordering::Equal) | None => other.seq.cmp(&self.seq),
            Some(ordering) => ordering,
        }
    }
}

/// The min-priority queue that drives the flood, keyed by endpoint
/// elevation with a stable insertion-order tie-break.
pub struct StreamQueue {
    heap: BinaryHeap<QueuedPoint>,
    next_seq: usize,
}

impl StreamQueue {
    pub fn new() -> StreamQueue {
        StreamQueue {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, end_point: usize, priority: f64) {
        self.heap.push(QueuedPoint {
            end_point: end_point,
            priority: priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    pub fn pop(&mut self) -> Option<QueuedPoint> {
        self.heap.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Selects one outlet seed per boundary-crossing link and queues it. The
/// seed is the endpoint lying in nodata while the other holds data, failing
/// that the endpoint on a DEM edge cell while the other is not, failing
/// that the endpoint with the lower valid elevation. When none of the rules
/// discriminate, endpoint 1 is retained.
pub fn detect_outlets(
    network: &mut StreamNetwork,
    dem: &DemGrid,
    edge_cells: &Array2D<i8>,
    reporter: &mut dyn Reporter,
) -> Result<StreamQueue, Error> {
    let nodata = dem.configs.nodata;
    let num_links = network.links.len();
    let mut queue = StreamQueue::new();
    let (mut row, mut col): (isize, isize);
    let mut progress: usize;
    let mut old_progress: usize = 1;
    for link_id in 0..num_links {
        if network.links[link_id].is_feature_mapped && network.links[link_id].crosses_dem_edge {
            let ep1 = network.links[link_id].endpoint1;
            let ep2 = network.links[link_id].endpoint2;
            let z1 = network.end_points[ep1].z;
            let z2 = network.end_points[ep2].z;
            row = dem.get_row_from_y(network.end_points[ep1].y);
            col = dem.get_column_from_x(network.end_points[ep1].x);
            let edge_value1 = edge_cells.get_value(row, col) == 1;
            row = dem.get_row_from_y(network.end_points[ep2].y);
            col = dem.get_column_from_x(network.end_points[ep2].x);
            let edge_value2 = edge_cells.get_value(row, col) == 1;

            let mut e3 = ep1;
            if z1 == nodata && z2 != nodata {
                // first rule: one of the endpoints is nodata and not the other
                e3 = ep1;
            } else if z2 == nodata && z1 != nodata {
                e3 = ep2;
            } else if edge_value1 && (!edge_value2 && z2 != nodata) {
                // second rule: one of the endpoints is an edge cell and not the other
                e3 = ep1;
            } else if edge_value2 && (!edge_value1 && z1 != nodata) {
                e3 = ep2;
            } else if z1 < z2 && z2 != nodata {
                // third rule: one of the endpoints is lower
                e3 = ep1;
            } else if z2 < z1 && z1 != nodata {
                e3 = ep2;
            }

            queue.push(e3, network.end_points[e3].z);
            network.end_points[e3].outflowing = true;
        }

        progress = (100.0_f64 * (link_id + 1) as f64 / num_links as f64) as usize;
        if progress != old_progress {
            reporter.progress("Finding outlets:", progress);
            old_progress = progress;
            if reporter.cancel_requested() {
                return Err(Error::new(
                    ErrorKind::Interrupted,
                    "The operation was cancelled.",
                ));
            }
        }
    }
    Ok(queue)
}
