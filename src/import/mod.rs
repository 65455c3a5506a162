//! Element Providers
//!
//! Everything that produces elements for a layer implements
//! [`ElementSource`](crate::scene::ElementSource):
//! - `shapes`: the editor's free/circle/square/line tools
//! - `obj`: vertex clouds from OBJ meshes
//! - `pixel`: point clouds sampled from raster images

pub mod obj;
pub mod pixel;
pub mod shapes;

pub use obj::ObjImport;
pub use pixel::PixelImport;
pub use shapes::{CanvasFrame, Mirror, Shape, ShapeTool};
