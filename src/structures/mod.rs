// private sub-modules defined in other files
mod array2d;
mod point2d;

// exports identifiers from private sub-modules in the current module namespace
pub use self::array2d::Array2D;
pub use self::point2d::Point2D;
