pub mod coordinate_mapper;
pub mod extent;
pub mod scale;
pub mod series;
pub mod series_store;
pub mod types;
pub mod view_transform;

pub use coordinate_mapper::CoordinateMapper;
pub use extent::DataExtent;
pub use scale::LinearScale;
pub use series::{Series, SeriesId, Trace};
pub use series_store::{Membership, SeriesStore, StoreInsert};
pub use types::{DataPoint, PixelPoint, Viewport};
pub use view_transform::{ScaleExtent, ViewTransform};
