//! Common test fixtures for HDF-EOS tests.
//!
//! This module provides pre-built stub files shaped like the HDF-EOS
//! sample products: a two-swath HDF-EOS5 file, a UTM grid file, a zonal
//! average file and an HDF-EOS2 swath file.

use hdfeos_core::{Generation, GridInfo, ProjectionInfo};

use crate::generators::{create_sequence, create_test_cube, create_test_grid, create_test_grid_i32};
use crate::stub::{StubAttr, StubEntity, StubField, StubFile, StubGeometry, StubLibrary};

/// File names on the stub filesystem.
pub mod files {
    /// HDF-EOS5 swath file with `INDEX` and `SIMPLE` swaths.
    pub const SIMPLE_SWATH: &str = "SimpleSwath.h5";

    /// HDF-EOS5 grid file with a UTM grid and an empty polar grid.
    pub const GRID: &str = "Grid.h5";

    /// HDF-EOS5 zonal average file.
    pub const ZA: &str = "ZonalAverage.he5";

    /// HDF-EOS2 swath file.
    pub const SWATH219: &str = "Swath219.hdf";

    /// HDF-EOS2 grid file.
    pub const GRID4: &str = "Grid219.hdf";

    /// A path no stub library knows.
    pub const MISSING: &str = "does-not-exist.h5";
}

/// UTM grid geometry (zone 40, Clarke 1866).
pub const UTM_GEOMETRY: StubGeometry = StubGeometry {
    info: GridInfo {
        xdim: 5,
        ydim: 5,
        upper_left: [210584.50041, 3322395.95445],
        lower_right: [813931.10959, 2214162.53278],
    },
    projection: ProjectionInfo {
        proj_code: 1,
        zone_code: 40,
        sphere_code: 0,
        params: [0.0; 13],
    },
    origin: 0,
    pixel_registration: 0,
};

/// Length of the long character attribute in [`simple_swath_file`].
pub const LONG_TEXT_LEN: usize = 1500;

/// The `INDEX` and `SIMPLE` swaths.
///
/// `SIMPLE/Temperature` is 10x4 `f32` filled by
/// [`create_test_grid`](crate::create_test_grid)`(4, 10)`.
pub fn simple_swath_file() -> StubFile {
    let index = StubEntity::swath("INDEX")
        .dim("TrackDim", 8)
        .dim("XtrackDim", 8)
        .dim("GeoDim", 6)
        .dim("GeoXDim", 6)
        .field(StubField::geo(
            "Latitude",
            &["GeoDim", "GeoXDim"],
            &[6, 6],
            &create_test_grid(6, 6),
        ))
        .field(StubField::geo(
            "Longi",
            &["GeoDim", "GeoXDim"],
            &[6, 6],
            &create_test_grid(6, 6),
        ))
        .field(StubField::data(
            "Indexed_Data",
            &["TrackDim", "XtrackDim"],
            &[8, 8],
            &create_test_grid(8, 8),
        ));

    let temperature = StubField::data(
        "Temperature",
        &["DataTrack", "DataXtrack"],
        &[10, 4],
        &create_test_grid(4, 10),
    )
    .local_attr(StubAttr::text("Units", "K"))
    .local_attr(StubAttr::numeric("_FillValue", &[-9999.0f32]));

    let count = StubField::data("Count", &["Unlim"], &[0], &Vec::<i16>::new());

    let simple = StubEntity::swath("SIMPLE")
        .dim("GeoTrack", 5)
        .dim("GeoXtrack", 4)
        .dim("DataTrack", 10)
        .dim("DataXtrack", 4)
        .dim("Unlim", 0)
        .field(StubField::geo("Time", &["GeoTrack"], &[5], &create_sequence(5, 46353400.0, 1.0)))
        .field(StubField::geo(
            "Latitude",
            &["GeoTrack", "GeoXtrack"],
            &[5, 4],
            &create_test_grid(4, 5),
        ))
        .field(StubField::geo(
            "Longitude",
            &["GeoTrack", "GeoXtrack"],
            &[5, 4],
            &create_test_grid(4, 5),
        ))
        .field(temperature)
        .field(count)
        .field(StubField::data(
            "Conduction",
            &["DataTrack", "DataXtrack"],
            &[10, 4],
            &create_test_grid_i32(4, 10),
        ))
        .map("GeoTrack", "DataTrack", 0, 2)
        .map("GeoXtrack", "DataXtrack", 1, 1)
        .attr(StubAttr::text("History", "created for tests"))
        .attr(StubAttr::numeric("ScaleFactor", &[0.01f64]))
        .attr(StubAttr::text("Description", &crate::create_long_text(LONG_TEXT_LEN)))
        .group_attr(StubAttr::numeric("ValidRange", &[-100.0f32, 100.0]))
        .geo_group_attr(StubAttr::text("GeoUnits", "degrees"));

    StubFile::new(files::SIMPLE_SWATH).entity(index).entity(simple)
}

/// `UTMGrid` (5x5 `Pollution`, 5x5 `Vegetation`) and an empty `PolarGrid`.
///
/// `UTMGrid/Pollution` is filled by
/// [`create_test_grid`](crate::create_test_grid)`(5, 5)`.
pub fn grid_file(path: &str) -> StubFile {
    let utm = StubEntity::grid("UTMGrid")
        .dim("YDim", 5)
        .dim("XDim", 5)
        .field(
            StubField::data("Pollution", &["YDim", "XDim"], &[5, 5], &create_test_grid(5, 5))
                .local_attr(StubAttr::text("Units", "ppm")),
        )
        .field(StubField::data(
            "Vegetation",
            &["YDim", "XDim"],
            &[5, 5],
            &(0u8..25).collect::<Vec<_>>(),
        ))
        .attr(StubAttr::numeric("Drift", &[3i32]))
        .geometry(UTM_GEOMETRY);

    let polar = StubEntity::grid("PolarGrid").geometry(StubGeometry {
        origin: 2,
        pixel_registration: 1,
        ..UTM_GEOMETRY
    });

    StubFile::new(path).entity(utm).entity(polar)
}

/// Zonal average `ZA1` with a 3x4 `Spectra` cube slice.
pub fn za_file() -> StubFile {
    let za = StubEntity::za("ZA1")
        .dim("Bands", 3)
        .dim("Res", 4)
        .field(StubField::data(
            "Spectra",
            &["Bands", "Res"],
            &[3, 4],
            &create_test_cube(1, 3, 4),
        ))
        .attr(StubAttr::numeric("Version", &[5u16]))
        .group_attr(StubAttr::text("Source", "synthetic"));
    StubFile::new(files::ZA).entity(za)
}

/// HDF-EOS2 `Swath1`, modelled on the Swath219 test product.
pub fn swath219_file() -> StubFile {
    let swath = StubEntity::swath("Swath1")
        .dim("GeoTrack", 20)
        .dim("GeoXtrack", 10)
        .dim("Res2tr", 40)
        .dim("Res2xtr", 20)
        .dim("Bands", 15)
        .dim("IndxTrack", 12)
        .dim("Unlim", 0)
        .field(StubField::geo("Time", &["GeoTrack"], &[20], &create_sequence(20, 34574087.3, 1.0)))
        .field(StubField::geo(
            "Longitude",
            &["GeoTrack", "GeoXtrack"],
            &[20, 10],
            &create_test_grid(10, 20),
        ))
        .field(StubField::geo(
            "Latitude",
            &["GeoTrack", "GeoXtrack"],
            &[20, 10],
            &create_test_grid(10, 20),
        ))
        .field(StubField::data("Density", &["GeoTrack"], &[20], &vec![1.5f32; 20]))
        .field(StubField::data(
            "Temperature",
            &["GeoTrack", "GeoXtrack"],
            &[20, 10],
            &create_test_grid(10, 20),
        ))
        .field(StubField::data(
            "Temperature_3D",
            &["Bands", "GeoTrack", "GeoXtrack"],
            &[15, 20, 10],
            &create_test_cube(15, 20, 10),
        ))
        .field(StubField::data(
            "Pressure",
            &["Res2tr", "Res2xtr"],
            &[40, 20],
            &create_test_grid(20, 40),
        ))
        .field(StubField::data(
            "Spectra",
            &["Bands", "Res2tr", "Res2xtr"],
            &[15, 40, 20],
            &create_test_cube(15, 40, 20),
        ))
        .field(StubField::data("Count", &["IndxTrack"], &[12], &(0i32..12).collect::<Vec<_>>()))
        .map("GeoTrack", "Res2tr", 0, 2)
        .map("GeoXtrack", "Res2xtr", 1, 2)
        .attr(StubAttr::text("History", "HDF-EOS2 sample"));
    StubFile::new(files::SWATH219).entity(swath)
}

/// HDF-EOS5 stub with the swath, grid and zonal average files.
pub fn he5_library() -> StubLibrary {
    StubLibrary::new(Generation::Hdfeos5)
        .with_file(simple_swath_file())
        .with_file(grid_file(files::GRID))
        .with_file(za_file())
}

/// HDF-EOS2 stub with the Swath219 and grid files.
pub fn he2_library() -> StubLibrary {
    StubLibrary::new(Generation::Hdfeos2)
        .with_file(swath219_file())
        .with_file(grid_file(files::GRID4))
}
