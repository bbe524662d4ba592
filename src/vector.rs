/*
This code is part of the StreamNet vector hydrography analysis library.
Authors: Dr. John Lindsay
Created: 14/06/2021
Last Modified: 09/11/2022
License: MIT
*/
use crate::structures::Point2D;

/// Shape types of vector geometries, following the common shapefile
/// vocabulary. Measured (M) and 3-D (Z) variants reduce to their 2-D base
/// type for validation purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
}

impl ShapeType {
    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                ShapeType::PolyLine
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeType::MultiPoint
            }
        }
    }
}

/// A multi-part geometry. `parts` holds the index of each part's first
/// vertex within `points`.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeGeometry {
    pub shape_type: ShapeType,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
    pub num_parts: i32,
    pub num_points: i32,
}

impl ShapeGeometry {
    pub fn new(shape_type: ShapeType) -> ShapeGeometry {
        ShapeGeometry {
            shape_type: shape_type,
            parts: vec![],
            points: vec![],
            num_parts: 0i32,
            num_points: 0i32,
        }
    }

    pub fn add_part(&mut self, points: &[Point2D]) {
        self.parts.push(self.points.len() as i32);
        self.num_parts += 1;
        for p in points {
            self.points.push(*p);
        }
        self.num_points += points.len() as i32;
    }
}

/// A sequence of geometry records sharing one shape type.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorLayer {
    pub shape_type: ShapeType,
    pub records: Vec<ShapeGeometry>,
}

impl VectorLayer {
    pub fn new(shape_type: ShapeType) -> VectorLayer {
        VectorLayer {
            shape_type: shape_type,
            records: vec![],
        }
    }

    pub fn add_record(&mut self, geometry: ShapeGeometry) {
        self.records.push(geometry);
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn get_record(&self, index: usize) -> &ShapeGeometry {
        &self.records[index]
    }
}

#[cfg(test)]
mod test {
    use super::{ShapeGeometry, ShapeType, VectorLayer};
    use crate::structures::Point2D;

    #[test]
    fn test_base_shape_type() {
        assert_eq!(ShapeType::PolyLineZ.base_shape_type(), ShapeType::PolyLine);
        assert_eq!(ShapeType::PolygonM.base_shape_type(), ShapeType::Polygon);
        assert_eq!(ShapeType::Point.base_shape_type(), ShapeType::Point);
    }

    #[test]
    fn test_part_offsets() {
        let mut sfg = ShapeGeometry::new(ShapeType::PolyLine);
        sfg.add_part(&[Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        sfg.add_part(&[
            Point2D::new(1.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(3.0, 0.0),
        ]);
        assert_eq!(sfg.num_parts, 2);
        assert_eq!(sfg.num_points, 5);
        assert_eq!(sfg.parts, vec![0, 2]);

        let mut layer = VectorLayer::new(ShapeType::PolyLine);
        layer.add_record(sfg);
        assert_eq!(layer.num_records(), 1);
        assert_eq!(layer.get_record(0).num_parts, 2);
    }
}
