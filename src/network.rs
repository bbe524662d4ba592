/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 18/06/2021
Last Modified: 23/03/2023
License: MIT
*/
use crate::dem::DemGrid;
use crate::reporter::Reporter;
use crate::structures::Array2D;
use crate::vector::VectorLayer;
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use std::io::{Error, ErrorKind};

/// One end of a link. `z` is the DEM sample at the vertex and `outflowing`
/// indicates that water leaves the link through this end.
#[derive(Clone, Debug)]
pub struct EndPoint {
    pub id: usize,
    pub link_id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub node_id: isize,
    pub outflowing: bool,
}

impl EndPoint {
    pub fn new(id: usize, link_id: usize, x: f64, y: f64, z: f64) -> EndPoint {
        EndPoint {
            id: id,
            link_id: link_id,
            x: x,
            y: y,
            z: z,
            node_id: -1,
            outflowing: false,
        }
    }
}

/// One part of one polyline feature; a single arc in the network. Index
/// fields hold -1 until the priority flood assigns them.
#[derive(Clone, Debug)]
pub struct Link {
    pub id: usize,
    pub endpoint1: usize,
    pub endpoint2: usize,
    pub length: f64,
    pub is_feature_mapped: bool,
    pub crosses_dem_edge: bool,
    pub outlet: isize,
    pub outlet_link_id: isize,
    pub is_outlet_link: bool,
    pub num_downstream_nodes: usize,
    pub dist_to_outlet: f64,
    pub tucl: f64,
    pub max_upstream_dist: f64,
    pub horton_order: usize,
    pub strahler_order: usize,
    pub shreve_order: f64,
    pub hack_order: usize,
    pub trib_id: usize,
    pub is_mainstem: bool,
    pub outflowing_links: Vec<usize>,
    pub inflowing_links: Vec<usize>,
}

impl Link {
    pub fn new(id: usize, endpoint1: usize, endpoint2: usize, length: f64) -> Link {
        Link {
            id: id,
            endpoint1: endpoint1,
            endpoint2: endpoint2,
            length: length,
            is_feature_mapped: false,
            crosses_dem_edge: false,
            outlet: -1,
            outlet_link_id: -1,
            is_outlet_link: false,
            num_downstream_nodes: 0,
            dist_to_outlet: 0f64,
            tucl: 0f64,
            max_upstream_dist: 0f64,
            horton_order: 0,
            strahler_order: 0,
            shreve_order: 0f64,
            hack_order: 0,
            trib_id: 0,
            is_mainstem: false,
            outflowing_links: vec![],
            inflowing_links: vec![],
        }
    }

    pub fn other_end_point(&self, end_point_id: usize) -> usize {
        if end_point_id == self.endpoint1 {
            self.endpoint2
        } else {
            self.endpoint1
        }
    }
}

/// A spatial equivalence class of endpoints: a junction, channel head,
/// outlet terminus, or lake connector.
#[derive(Default, Clone, Debug)]
pub struct Node {
    pub points: Vec<usize>,
}

impl Node {
    pub fn add_point(&mut self, end_point_id: usize) {
        self.points.push(end_point_id);
    }
}

/// The endpoint, link, and node arenas of a stream network. Entities refer
/// to one another by index.
pub struct StreamNetwork {
    pub end_points: Vec<EndPoint>,
    pub links: Vec<Link>,
    pub nodes: Vec<Node>,
}

impl StreamNetwork {
    /// Builds the link and endpoint arenas from the polyline records. Each
    /// part becomes one link with its endpoints sampled against the DEM; the
    /// endpoints of mapped links are registered in the returned k-d tree.
    pub fn build(
        streams: &VectorLayer,
        dem: &DemGrid,
        edge_cells: &Array2D<i8>,
        dist_multiplier: f64,
        reporter: &mut dyn Reporter,
    ) -> Result<(StreamNetwork, KdTree<f64, usize, [f64; 2]>), Error> {
        let num_features = streams.num_records();
        let nodata = dem.configs.nodata;

        let mut total_num_parts = 0;
        for record_num in 0..num_features {
            total_num_parts += streams.get_record(record_num).num_parts as usize;
        }

        let mut links: Vec<Link> = Vec::new();
        let mut end_points: Vec<EndPoint> = Vec::new();
        if links.try_reserve_exact(total_num_parts).is_err()
            || end_points.try_reserve_exact(total_num_parts * 2).is_err()
        {
            return Err(Error::new(
                ErrorKind::OutOfMemory,
                "Insufficient memory to allocate the network arenas.",
            ));
        }

        let mut end_point_tree: KdTree<f64, usize, [f64; 2]> = KdTree::with_capacity(2, 64);

        let (mut part_start, mut part_end): (usize, usize);
        let mut length: f64;
        let (mut row, mut col): (isize, isize);
        let mut z: f64;
        let mut progress: usize;
        let mut old_progress: usize = 1;
        for record_num in 0..num_features {
            let record = streams.get_record(record_num);
            for part in 0..record.num_parts as usize {
                part_start = record.parts[part] as usize;
                part_end = if part < record.num_parts as usize - 1 {
                    record.parts[part + 1] as usize - 1
                } else {
                    record.num_points as usize - 1
                };

                length = 0.0;
                for i in part_start + 1..=part_end {
                    length += dist_multiplier * record.points[i].distance(&record.points[i - 1]);
                }

                let mut crosses_valid_data = false;
                let mut crosses_nodata = false;
                for i in part_start..=part_end {
                    row = dem.get_row_from_y(record.points[i].y);
                    col = dem.get_column_from_x(record.points[i].x);
                    z = dem.get_value(row, col);
                    if z != nodata {
                        crosses_valid_data = true;
                    } else {
                        crosses_nodata = true;
                    }
                    if edge_cells.get_value(row, col) == 1 {
                        crosses_nodata = true;
                    }
                }

                let p1 = record.points[part_start];
                let p2 = record.points[part_end];
                row = dem.get_row_from_y(p1.y);
                col = dem.get_column_from_x(p1.x);
                let z1 = dem.get_value(row, col);
                row = dem.get_row_from_y(p2.y);
                col = dem.get_column_from_x(p2.x);
                let z2 = dem.get_value(row, col);

                let link_id = links.len();
                let ep1_id = end_points.len();
                let ep2_id = ep1_id + 1;
                if crosses_valid_data {
                    end_point_tree.add([p1.x, p1.y], ep1_id).unwrap();
                    end_point_tree.add([p2.x, p2.y], ep2_id).unwrap();
                }
                end_points.push(EndPoint::new(ep1_id, link_id, p1.x, p1.y, z1));
                end_points.push(EndPoint::new(ep2_id, link_id, p2.x, p2.y, z2));

                let mut link = Link::new(link_id, ep1_id, ep2_id, length);
                link.is_feature_mapped = crosses_valid_data;
                link.crosses_dem_edge = crosses_valid_data && crosses_nodata;
                links.push(link);
            }

            progress = (100.0_f64 * (record_num + 1) as f64 / num_features as f64) as usize;
            if progress != old_progress {
                reporter.progress("Characterizing nodes (loop 1 of 2):", progress);
                old_progress = progress;
                if reporter.cancel_requested() {
                    return Err(Error::new(
                        ErrorKind::Interrupted,
                        "The operation was cancelled.",
                    ));
                }
            }
        }

        let network = StreamNetwork {
            end_points: end_points,
            links: links,
            nodes: vec![],
        };
        Ok((network, end_point_tree))
    }

    /// Groups endpoints into nodes by snap proximity. Endpoints are walked
    /// in id order; each unvisited endpoint either joins a lake's node (a
    /// lone endpoint within snap range of a lake vertex) or founds a node
    /// holding every endpoint returned by the radius query. Outlet seeding
    /// must run first, as lake attachment is refused to outflowing endpoints.
    pub fn form_nodes(
        &mut self,
        end_point_tree: &KdTree<f64, usize, [f64; 2]>,
        lakes: Option<&VectorLayer>,
        snap_dist_sq: f64,
        reporter: &mut dyn Reporter,
    ) -> Result<(), Error> {
        let lakes_used = lakes.is_some();
        let mut lakes_tree: KdTree<f64, usize, [f64; 2]> = KdTree::with_capacity(2, 64);
        let mut lakes_node_ids: Vec<isize> = vec![];
        if let Some(lakes) = lakes {
            lakes_node_ids = vec![-1isize; lakes.num_records()];
            for record_num in 0..lakes.num_records() {
                let record = lakes.get_record(record_num);
                for p in &record.points {
                    lakes_tree.add([p.x, p.y], record_num).unwrap();
                }
            }
        }

        let num_end_points = self.end_points.len();
        let mut visited = vec![false; num_end_points];
        let mut progress: usize;
        let mut old_progress: usize = 1;
        for i in 0..num_end_points {
            if !visited[i] && self.links[self.end_points[i].link_id].is_feature_mapped {
                let x = self.end_points[i].x;
                let y = self.end_points[i].y;
                let ret = end_point_tree
                    .within(&[x, y], snap_dist_sq, &squared_euclidean)
                    .unwrap();
                if !ret.is_empty() {
                    if ret.len() == 1 && lakes_used && !self.end_points[i].outflowing {
                        visited[i] = true;
                        let ret_lakes = lakes_tree
                            .within(&[x, y], snap_dist_sq, &squared_euclidean)
                            .unwrap();
                        if !ret_lakes.is_empty() {
                            // which lake is this stream endpoint connected to?
                            let lake_num = *ret_lakes[0].1;

                            // does this lake already have a node?
                            let node_num = lakes_node_ids[lake_num];
                            if node_num != -1 {
                                self.nodes[node_num as usize].add_point(i);
                                self.end_points[i].node_id = node_num;
                            } else {
                                let mut node = Node::default();
                                node.add_point(i);
                                self.end_points[i].node_id = self.nodes.len() as isize;
                                lakes_node_ids[lake_num] = self.nodes.len() as isize;
                                self.nodes.push(node);
                            }
                        } else {
                            let mut node = Node::default();
                            node.add_point(i);
                            self.end_points[i].node_id = self.nodes.len() as isize;
                            self.nodes.push(node);
                        }
                    } else {
                        let mut node = Node::default();
                        for j in 0..ret.len() {
                            let current_end_point = *ret[j].1;
                            node.add_point(current_end_point);
                            visited[current_end_point] = true;
                            self.end_points[current_end_point].node_id = self.nodes.len() as isize;
                        }
                        self.nodes.push(node);
                    }
                }
            }

            progress = (100.0_f64 * i as f64 / (num_end_points - 1) as f64) as usize;
            if progress != old_progress {
                reporter.progress("Characterizing nodes (loop 2 of 2):", progress);
                old_progress = progress;
                if reporter.cancel_requested() {
                    return Err(Error::new(
                        ErrorKind::Interrupted,
                        "The operation was cancelled.",
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::StreamNetwork;
    use crate::dem::{find_edge_cells, DemConfigs, DemGrid};
    use crate::reporter::RecordCollector;
    use crate::structures::Point2D;
    use crate::vector::{ShapeGeometry, ShapeType, VectorLayer};

    fn flat_dem() -> DemGrid {
        let configs = DemConfigs {
            rows: 16,
            columns: 16,
            nodata: -32768.0,
            north: 13.5,
            south: -2.5,
            east: 13.5,
            west: -2.5,
            resolution_x: 1.0,
            resolution_y: 1.0,
            xy_units: "metres".to_string(),
            ..Default::default()
        };
        DemGrid::from_data(configs, vec![10.0; 256]).unwrap()
    }

    fn polyline(points: &[Point2D]) -> ShapeGeometry {
        let mut sfg = ShapeGeometry::new(ShapeType::PolyLine);
        sfg.add_part(points);
        sfg
    }

    #[test]
    fn test_junction_node_formation() {
        let dem = flat_dem();
        let mut reporter = RecordCollector::new();
        let edge_cells = find_edge_cells(&dem, &mut reporter).unwrap();

        let mut streams = VectorLayer::new(ShapeType::PolyLine);
        streams.add_record(polyline(&[Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0)]));
        streams.add_record(polyline(&[Point2D::new(10.0, 0.0), Point2D::new(5.0, 5.0)]));
        streams.add_record(polyline(&[Point2D::new(5.0, 5.0), Point2D::new(5.0, 10.0)]));

        let (mut network, tree) =
            StreamNetwork::build(&streams, &dem, &edge_cells, 1.0, &mut reporter).unwrap();
        assert_eq!(network.links.len(), 3);
        assert_eq!(network.end_points.len(), 6);
        assert!((network.links[0].length - 50f64.sqrt()).abs() < 1e-9);

        network
            .form_nodes(&tree, None, 0.25, &mut reporter)
            .unwrap();

        // the three junction endpoints share one node; heads are singletons
        let junction_node = network.end_points[1].node_id;
        assert!(junction_node >= 0);
        assert_eq!(network.end_points[3].node_id, junction_node);
        assert_eq!(network.end_points[4].node_id, junction_node);
        assert_eq!(network.nodes[junction_node as usize].points.len(), 3);
        assert_ne!(network.end_points[0].node_id, junction_node);
        assert_ne!(network.end_points[2].node_id, junction_node);
        assert_eq!(network.nodes.len(), 4);
    }

    #[test]
    fn test_unmapped_link_excluded() {
        let dem = flat_dem();
        let mut reporter = RecordCollector::new();
        let edge_cells = find_edge_cells(&dem, &mut reporter).unwrap();

        let mut streams = VectorLayer::new(ShapeType::PolyLine);
        // entirely beyond the DEM extent
        streams.add_record(polyline(&[
            Point2D::new(100.0, 100.0),
            Point2D::new(105.0, 100.0),
        ]));
        streams.add_record(polyline(&[Point2D::new(0.0, 0.0), Point2D::new(5.0, 0.0)]));

        let (mut network, tree) =
            StreamNetwork::build(&streams, &dem, &edge_cells, 1.0, &mut reporter).unwrap();
        assert!(!network.links[0].is_feature_mapped);
        assert!(network.links[1].is_feature_mapped);

        network
            .form_nodes(&tree, None, 0.25, &mut reporter)
            .unwrap();
        assert_eq!(network.end_points[0].node_id, -1);
        assert_eq!(network.end_points[1].node_id, -1);
        assert!(network.end_points[2].node_id >= 0);
    }
}
