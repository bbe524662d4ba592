/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 21/06/2021
Last Modified: 23/03/2023
License: MIT
*/
use crate::network::StreamNetwork;
use crate::outlets::StreamQueue;
use crate::reporter::Reporter;
use std::io::{Error, ErrorKind};

/// Classification of a point of interest recorded during the flood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodePointKind {
    Outlet,
    Diffluence,
    JoinedHead,
}

impl NodePointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodePointKind::Outlet => "outlet",
            NodePointKind::Diffluence => "diffluence",
            NodePointKind::JoinedHead => "joined head",
        }
    }
}

/// A classified network node located during the flood. The node id is kept
/// for callers even though the emitted record carries only FID and TYPE.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePoint {
    pub node_id: isize,
    pub x: f64,
    pub y: f64,
    pub kind: NodePointKind,
}

/// Orients the network by flooding upstream from the queued outlet seeds.
/// Each popped endpoint claims the unclaimed links meeting its own node and
/// the node at its link's other end, handing them the outlet id, the outlet
/// link id, a downstream-node count of parent plus one, and a distance to
/// mouth of parent plus own length. A link claimed once is never revisited
/// (the min-z path wins), which is what makes diffluence and joined-head
/// detection sound: both are recognized against already-claimed links.
pub fn orient_network(
    network: &mut StreamNetwork,
    queue: &mut StreamQueue,
    reporter: &mut dyn Reporter,
) -> Result<Vec<NodePoint>, Error> {
    let mut node_points: Vec<NodePoint> = vec![];
    let mut outlet_num = 1isize;
    let num_end_points = network.end_points.len();
    let mut num_popped = 0usize;
    let mut progress: usize;
    let mut old_progress: usize = 1;
    while let Some(queued) = queue.pop() {
        num_popped += 1;
        let ep_id = queued.end_point;
        let link_id = network.end_points[ep_id].link_id;

        let num_downstream_nodes = network.links[link_id].num_downstream_nodes;
        let mut dist_to_outlet = network.links[link_id].dist_to_outlet;
        let mut outlet_id = network.links[link_id].outlet;
        if outlet_id == -1 {
            // a fresh outlet; the link drains to its own mouth
            outlet_id = outlet_num;
            outlet_num += 1;
            dist_to_outlet = network.links[link_id].length;
            let link = &mut network.links[link_id];
            link.outlet = outlet_id;
            link.outlet_link_id = link_id as isize;
            link.is_outlet_link = true;
            link.dist_to_outlet = dist_to_outlet;
            node_points.push(NodePoint {
                node_id: network.end_points[ep_id].node_id,
                x: network.end_points[ep_id].x,
                y: network.end_points[ep_id].y,
                kind: NodePointKind::Outlet,
            });
        }
        let outlet_link_id = network.links[link_id].outlet_link_id;

        // are there any unvisited links connected to this node directly?
        let node_id = network.end_points[ep_id].node_id as usize;
        for j in 0..network.nodes[node_id].points.len() {
            let ep2_id = network.nodes[node_id].points[j];
            let link2_id = network.end_points[ep2_id].link_id;
            if network.links[link2_id].outlet == -1 {
                // hasn't previously been encountered
                let link2 = &mut network.links[link2_id];
                link2.outlet = outlet_id;
                link2.outlet_link_id = outlet_link_id;
                link2.num_downstream_nodes = num_downstream_nodes + 1;
                link2.dist_to_outlet = dist_to_outlet + link2.length;
                link2.outflowing_links.push(link_id);
                let z2 = network.end_points[ep2_id].z;
                queue.push(ep2_id, z2);
                network.end_points[ep2_id].outflowing = true;
            }
        }

        // visit the node at the upstream end of the link
        let ep_up = network.links[link_id].other_end_point(ep_id);
        let node_up = network.end_points[ep_up].node_id as usize;
        for j in 0..network.nodes[node_up].points.len() {
            let ep2_id = network.nodes[node_up].points[j];
            let link2_id = network.end_points[ep2_id].link_id;
            if network.links[link2_id].outlet == -1 {
                // hasn't previously been encountered
                let link2 = &mut network.links[link2_id];
                link2.outlet = outlet_id;
                link2.outlet_link_id = outlet_link_id;
                link2.num_downstream_nodes = num_downstream_nodes + 1;
                link2.dist_to_outlet = dist_to_outlet + link2.length;
                link2.outflowing_links.push(link_id);
                let z2 = network.end_points[ep2_id].z;
                queue.push(ep2_id, z2);
                network.end_points[ep2_id].outflowing = true;
            } else if network.links[link2_id].outlet == outlet_id
                && link2_id != link_id
                && network.end_points[ep2_id].outflowing
            {
                // a diffluence: the claimed link gains a second outflow
                network.links[link2_id].outflowing_links.push(link_id);
                node_points.push(NodePoint {
                    node_id: network.end_points[ep2_id].node_id,
                    x: network.end_points[ep2_id].x,
                    y: network.end_points[ep2_id].y,
                    kind: NodePointKind::Diffluence,
                });
            } else if network.links[link2_id].outlet != outlet_id
                && !network.links[link2_id].is_outlet_link
            {
                // two catchments meet here and neither link is an outlet
                node_points.push(NodePoint {
                    node_id: network.end_points[ep2_id].node_id,
                    x: network.end_points[ep2_id].x,
                    y: network.end_points[ep2_id].y,
                    kind: NodePointKind::JoinedHead,
                });
            }
        }

        progress = (100.0_f64 * num_popped as f64 / num_end_points as f64) as usize;
        if progress != old_progress {
            reporter.progress("Priority flood:", progress);
            old_progress = progress;
            if reporter.cancel_requested() {
                return Err(Error::new(
                    ErrorKind::Interrupted,
                    "The operation was cancelled.",
                ));
            }
        }
    }
    Ok(node_points)
}
