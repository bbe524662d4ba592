/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 24/06/2021
Last Modified: 23/03/2023
License: MIT
*/
use crate::network::StreamNetwork;
use crate::reporter::Reporter;
use std::io::{Error, ErrorKind};

/// Computes the network indices over the oriented graph in three
/// traversals: a descent from channel heads accumulating TUCL, fractional
/// Shreve magnitude, maximum upstream distance, and tributary ids; a second
/// descent deriving Strahler orders and the mainstem flag; and an ascent
/// from the outlets assigning Horton and Hack orders.
pub fn compute_indices(
    network: &mut StreamNetwork,
    reporter: &mut dyn Reporter,
) -> Result<(), Error> {
    let num_links = network.links.len();

    //////////////////////////////////////////////////////////////
    // Calculate the total upstream channel length (TUCL), Shreve
    // stream orders, and the tributary id by traversing the graph
    // from headwater channels towards their outlets.
    //////////////////////////////////////////////////////////////
    reporter.progress("Calculating downstream indices...", 0);
    if reporter.cancel_requested() {
        return Err(Error::new(
            ErrorKind::Interrupted,
            "The operation was cancelled.",
        ));
    }

    let mut num_inflowing = vec![0usize; num_links];
    for i in 0..num_links {
        for j in 0..network.links[i].outflowing_links.len() {
            let dsl = network.links[i].outflowing_links[j];
            num_inflowing[dsl] += 1;
            network.links[dsl].inflowing_links.push(i);
        }
    }

    let mut stack: Vec<usize> = Vec::with_capacity(num_links);
    let mut current_trib_num = 1usize;
    for i in 0..num_links {
        if num_inflowing[i] == 0 && network.links[i].is_feature_mapped {
            if network.links[i].outlet != -1 {
                stack.push(i);
                network.links[i].shreve_order = 1f64;
                network.links[i].trib_id = current_trib_num;
                current_trib_num += 1;
            }
        }
    }

    while let Some(current) = stack.pop() {
        let length = network.links[current].length;
        network.links[current].tucl += length;
        network.links[current].max_upstream_dist += length;
        let num_outflows = network.links[current].outflowing_links.len();
        for j in 0..num_outflows {
            let dsl = network.links[current].outflowing_links[j];
            let tucl = network.links[current].tucl;
            let shreve = network.links[current].shreve_order;
            let max_upstream_dist = network.links[current].max_upstream_dist;
            network.links[dsl].tucl += tucl / num_outflows as f64;
            network.links[dsl].shreve_order += shreve / num_outflows as f64;
            if max_upstream_dist > network.links[dsl].max_upstream_dist {
                network.links[dsl].max_upstream_dist = max_upstream_dist;
            }
            num_inflowing[dsl] -= 1;
            if num_inflowing[dsl] == 0 {
                stack.push(dsl);
                if network.links[dsl].inflowing_links.len() > 1 {
                    // the tributary of the furthest head carries on
                    let mut furthest_head = 0f64;
                    let mut trib_of_furthest_head = 0usize;
                    for k in 0..network.links[dsl].inflowing_links.len() {
                        let usl = network.links[dsl].inflowing_links[k];
                        if network.links[usl].max_upstream_dist > furthest_head {
                            furthest_head = network.links[usl].max_upstream_dist;
                            trib_of_furthest_head = network.links[usl].trib_id;
                        }
                    }
                    network.links[dsl].trib_id = trib_of_furthest_head;
                } else if network.links[dsl].inflowing_links.len() == 1 {
                    network.links[dsl].trib_id = network.links[current].trib_id;
                }
            }
        }
    }

    ///////////////////////////////////////////////////////////
    // Descend from channel heads to outlets a second time to
    // calculate the Strahler order and to flag the main stem.
    ///////////////////////////////////////////////////////////
    reporter.progress("Calculating Strahler stream orders...", 0);
    if reporter.cancel_requested() {
        return Err(Error::new(
            ErrorKind::Interrupted,
            "The operation was cancelled.",
        ));
    }

    for i in 0..num_links {
        num_inflowing[i] = 0;
    }
    for i in 0..num_links {
        for j in 0..network.links[i].outflowing_links.len() {
            let dsl = network.links[i].outflowing_links[j];
            num_inflowing[dsl] += 1;
        }
    }

    let mut stack: Vec<usize> = Vec::with_capacity(num_links);
    for i in 0..num_links {
        if num_inflowing[i] == 0 && network.links[i].is_feature_mapped {
            stack.push(i);
            network.links[i].strahler_order = 1;
        }
    }

    while let Some(current) = stack.pop() {
        if network.links[current].outlet != -1 {
            // a link sharing its outlet link's tributary is main stem
            let outlet_link_id = network.links[current].outlet_link_id as usize;
            if network.links[outlet_link_id].trib_id == network.links[current].trib_id {
                network.links[current].is_mainstem = true;
            }
        }
        for j in 0..network.links[current].outflowing_links.len() {
            let dsl = network.links[current].outflowing_links[j];
            num_inflowing[dsl] -= 1;
            if num_inflowing[dsl] == 0 {
                stack.push(dsl);
                if network.links[dsl].inflowing_links.len() > 1 {
                    let mut largest_order = 0usize;
                    let mut trib_id_largest_order = 0usize;
                    let mut second_largest_order = 0usize;
                    let mut trib_id_second_largest_order = 0usize;
                    for k in 0..network.links[dsl].inflowing_links.len() {
                        let usl = network.links[dsl].inflowing_links[k];
                        if network.links[usl].strahler_order >= largest_order {
                            second_largest_order = largest_order;
                            trib_id_second_largest_order = trib_id_largest_order;
                            largest_order = network.links[usl].strahler_order;
                            trib_id_largest_order = network.links[usl].trib_id;
                        }
                    }
                    if largest_order == second_largest_order
                        && trib_id_largest_order != trib_id_second_largest_order
                    {
                        network.links[dsl].strahler_order = largest_order + 1;
                    } else {
                        network.links[dsl].strahler_order = largest_order;
                    }
                } else if network.links[dsl].inflowing_links.len() == 1 {
                    network.links[dsl].strahler_order = network.links[current].strahler_order;
                }
            }
        }
    }

    ////////////////////////////////////////////////////////////////////
    // Traverse the graph upstream from outlets to their channel heads
    // to calculate the Horton and Hack stream orders.
    ////////////////////////////////////////////////////////////////////
    reporter.progress("Calculating upstream indices...", 0);
    if reporter.cancel_requested() {
        return Err(Error::new(
            ErrorKind::Interrupted,
            "The operation was cancelled.",
        ));
    }

    let mut stack: Vec<usize> = Vec::with_capacity(num_links);
    let mut visited = vec![false; num_links];
    for i in 0..num_links {
        if network.links[i].is_outlet_link {
            stack.push(i);
            network.links[i].horton_order = network.links[i].strahler_order;
            network.links[i].hack_order = 1;
            visited[i] = true;
        }
    }

    while let Some(current) = stack.pop() {
        let current_horton = network.links[current].horton_order;
        let current_hack = network.links[current].hack_order;
        let current_trib = network.links[current].trib_id;
        for k in 0..network.links[current].inflowing_links.len() {
            let usl = network.links[current].inflowing_links[k];
            if !visited[usl] {
                if network.links[usl].trib_id == current_trib {
                    network.links[usl].horton_order = current_horton;
                    network.links[usl].hack_order = current_hack;
                } else {
                    network.links[usl].horton_order = network.links[usl].strahler_order;
                    network.links[usl].hack_order = current_hack + 1;
                }
                stack.push(usl);
                visited[usl] = true;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::compute_indices;
    use crate::dem::{find_edge_cells, DemConfigs, DemGrid};
    use crate::flood::orient_network;
    use crate::network::StreamNetwork;
    use crate::outlets::detect_outlets;
    use crate::reporter::RecordCollector;
    use crate::structures::Point2D;
    use crate::vector::{ShapeGeometry, ShapeType, VectorLayer};

    fn polyline(points: &[Point2D]) -> ShapeGeometry {
        let mut sfg = ShapeGeometry::new(ShapeType::PolyLine);
        sfg.add_part(points);
        sfg
    }

    // 16 x 16 grid; the three northernmost rows are nodata, every other
    // cell slopes up to the south.
    fn north_outlet_dem() -> DemGrid {
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
        let mut data = vec![-32768.0; 256];
        for row in 3..16 {
            for col in 0..16 {
                data[row * 16 + col] = row as f64;
            }
        }
        DemGrid::from_data(configs, data).unwrap()
    }

    fn run_pipeline(
        streams: &VectorLayer,
        dem: &DemGrid,
    ) -> (StreamNetwork, Vec<crate::flood::NodePoint>) {
        let mut reporter = RecordCollector::new();
        let edge_cells = find_edge_cells(dem, &mut reporter).unwrap();
        let (mut network, tree) =
            StreamNetwork::build(streams, dem, &edge_cells, 1.0, &mut reporter).unwrap();
        let mut queue = detect_outlets(&mut network, dem, &edge_cells, &mut reporter).unwrap();
        network
            .form_nodes(&tree, None, 0.25, &mut reporter)
            .unwrap();
        let node_points = orient_network(&mut network, &mut queue, &mut reporter).unwrap();
        compute_indices(&mut network, &mut reporter).unwrap();
        (network, node_points)
    }

    /// A Y-junction: two headwaters joining into a trunk that crosses the
    /// DEM edge at its far end.
    #[test]
    fn test_y_junction_orders() {
        let dem = north_outlet_dem();
        let mut streams = VectorLayer::new(ShapeType::PolyLine);
        streams.add_record(polyline(&[Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0)]));
        streams.add_record(polyline(&[Point2D::new(10.0, 0.0), Point2D::new(5.0, 5.0)]));
        streams.add_record(polyline(&[Point2D::new(5.0, 5.0), Point2D::new(5.0, 10.0)]));
        let (network, node_points) = run_pipeline(&streams, &dem);

        let head_a = &network.links[0];
        let head_b = &network.links[1];
        let trunk = &network.links[2];

        assert!(trunk.is_outlet_link);
        assert_eq!(trunk.outlet, 1);
        assert_eq!(head_a.outlet, 1);
        assert_eq!(head_b.outlet, 1);

        assert_eq!(trunk.strahler_order, 2);
        assert_eq!(head_a.strahler_order, 1);
        assert_eq!(head_b.strahler_order, 1);
        assert_eq!(trunk.shreve_order, 2.0);
        assert_eq!(trunk.hack_order, 1);
        assert!(trunk.is_mainstem);

        // the furthest-head rule resolves the equal-length tie in favour of
        // the first inflow, so head A carries the trunk's tributary
        assert_eq!(trunk.trib_id, head_a.trib_id);
        assert!(head_a.is_mainstem);
        assert!(!head_b.is_mainstem);
        assert_eq!(head_a.hack_order, 1);
        assert_eq!(head_b.hack_order, 2);
        assert_eq!(head_a.horton_order, 2);
        assert_eq!(head_b.horton_order, 1);

        // conservation: the outlet link's TUCL equals the summed length
        let total_length: f64 = network.links.iter().map(|link| link.length).sum();
        assert!((trunk.tucl - total_length).abs() < 1e-9);

        // distance to mouth accumulates from the outlet link's own length
        assert!((trunk.dist_to_outlet - 5.0).abs() < 1e-9);
        assert!((head_a.dist_to_outlet - (5.0 + 50f64.sqrt())).abs() < 1e-9);
        assert_eq!(trunk.num_downstream_nodes, 0);
        assert_eq!(head_a.num_downstream_nodes, 1);

        assert_eq!(node_points.len(), 1); // the outlet alone
    }

    /// A fragment with no route to the DEM edge keeps default ids and
    /// orders, apart from Strahler seeds on its isolated heads.
    #[test]
    fn test_disconnected_fragment() {
        let dem = north_outlet_dem();
        let mut streams = VectorLayer::new(ShapeType::PolyLine);
        let mut sfg = ShapeGeometry::new(ShapeType::PolyLine);
        sfg.add_part(&[Point2D::new(2.0, 5.0), Point2D::new(5.0, 5.0)]);
        sfg.add_part(&[Point2D::new(5.0, 5.0), Point2D::new(8.0, 5.0)]);
        streams.add_record(sfg);
        let (network, node_points) = run_pipeline(&streams, &dem);

        assert!(node_points.is_empty());
        for link in &network.links {
            assert!(link.is_feature_mapped);
            assert_eq!(link.outlet, -1);
            assert_eq!(link.trib_id, 0);
            assert_eq!(link.horton_order, 0);
            assert_eq!(link.hack_order, 0);
            assert_eq!(link.strahler_order, 1);
            assert_eq!(link.shreve_order, 0.0);
            assert!(!link.is_mainstem);
        }
    }

    /// Horton order is constant along a tributary and Hack order increases
    /// away from the mainstem.
    #[test]
    fn test_horton_constant_along_tributary() {
        let dem = north_outlet_dem();
        let mut streams = VectorLayer::new(ShapeType::PolyLine);
        // mainstem chain of two links plus a short side tributary
        streams.add_record(polyline(&[Point2D::new(5.0, 0.0), Point2D::new(5.0, 5.0)]));
        streams.add_record(polyline(&[Point2D::new(5.0, 5.0), Point2D::new(5.0, 10.0)]));
        streams.add_record(polyline(&[Point2D::new(7.0, 4.0), Point2D::new(5.0, 5.0)]));
        let (network, _) = run_pipeline(&streams, &dem);

        let head = &network.links[0];
        let trunk = &network.links[1];
        let side = &network.links[2];
        assert!(trunk.is_outlet_link);
        assert_eq!(head.trib_id, trunk.trib_id);
        assert_eq!(head.horton_order, trunk.horton_order);
        assert_ne!(side.trib_id, trunk.trib_id);
        assert_eq!(side.hack_order, trunk.hack_order + 1);
        assert!(head.strahler_order <= head.horton_order);
        assert!(side.strahler_order <= side.horton_order);
    }
}
