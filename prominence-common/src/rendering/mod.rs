// private sub-modules defined in other files
mod histogram;
mod html;

// exports identifiers from private sub-modules in the current module namespace
pub use self::histogram::Histogram;
pub use self::html::get_css;
