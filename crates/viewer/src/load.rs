use formats::geojson::FeatureCollection;
use formats::region_ingest::regions_from_collection;
use formats::table::{SourceFile, Table, merge};
use scene::region::RegionSet;

use crate::error::ViewerError;

/// Proof that a load was started; handed back to finish or abort it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Allows one load at a time. A second trigger while a load is pending is
/// rejected rather than raced.
#[derive(Debug, Default)]
pub struct LoadGuard {
    issued: u64,
    in_flight: Option<u64>,
}

impl LoadGuard {
    pub fn begin(&mut self) -> Result<LoadTicket, ViewerError> {
        if self.in_flight.is_some() {
            return Err(ViewerError::LoadInFlight);
        }
        self.issued += 1;
        self.in_flight = Some(self.issued);
        Ok(LoadTicket(self.issued))
    }

    /// Releases the guard for `ticket`.
    pub fn finish(&mut self, ticket: LoadTicket) -> Result<(), ViewerError> {
        if self.in_flight != Some(ticket.0) {
            return Err(ViewerError::StaleLoad {
                expected: self.in_flight,
                got: ticket.0,
            });
        }
        self.in_flight = None;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Everything a load commits, built before any state is touched.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: Table,
    pub regions: RegionSet,
}

pub fn prepare(files: &[SourceFile], geo_json: &str, key: &str) -> Result<LoadedData, ViewerError> {
    if files.is_empty() {
        return Err(ViewerError::NoFilesQueued);
    }
    let fc = FeatureCollection::from_geojson_str(geo_json)?;
    let regions = regions_from_collection(&fc);
    let table = merge(files, key)?;
    Ok(LoadedData { table, regions })
}
