pub mod export;
pub mod geojson;
pub mod region_ingest;
pub mod rekey;
pub mod table;

pub use export::{ExportError, write_csv};
pub use geojson::{Feature, FeatureCollection, GeoJsonError, Geometry};
pub use region_ingest::{NAME_PROPERTY, regions_from_collection};
pub use rekey::rekey_header;
pub use table::{MergeError, Row, SourceFile, Table, merge, parse_number};
