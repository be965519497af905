//! Grid geometry queries: size, corners, projection, origin and pixel
//! registration.

use serde::Serialize;

use crate::api::{EntityKind, GridInfo, NativeApi, ProjectionInfo};
use crate::error::{ReadError, Result};
use crate::handle::EntityHandle;
use crate::status::check;

/// Corner of the grid that holds pixel (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Origin {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    Other(i32),
}

impl Origin {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::UpperLeft,
            1 => Self::UpperRight,
            2 => Self::LowerLeft,
            3 => Self::LowerRight,
            other => Self::Other(other),
        }
    }
}

/// Where within a pixel its coordinates refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelRegistration {
    Center,
    Corner,
    Other(i32),
}

impl PixelRegistration {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Center,
            1 => Self::Corner,
            other => Self::Other(other),
        }
    }
}

fn require_grid(entity: &EntityHandle, operation: &'static str) -> Result<()> {
    if entity.kind() == EntityKind::Grid {
        return Ok(());
    }
    Err(ReadError::WrongKind {
        operation,
        expected: EntityKind::Grid,
        actual: entity.kind(),
    })
}

/// Grid size and corner coordinates.
pub fn grid_info<A: NativeApi + ?Sized>(api: &A, grid: &EntityHandle) -> Result<GridInfo> {
    require_grid(grid, "grid_info")?;
    let mut info = GridInfo::default();
    check(api.grid_info(grid.id(), &mut info), "grid_info")?;
    Ok(info)
}

/// GCTP projection of a grid.
pub fn projection_info<A: NativeApi + ?Sized>(
    api: &A,
    grid: &EntityHandle,
) -> Result<ProjectionInfo> {
    require_grid(grid, "projection_info")?;
    let mut info = ProjectionInfo::default();
    check(api.projection_info(grid.id(), &mut info), "projection_info")?;
    Ok(info)
}

pub fn origin_info<A: NativeApi + ?Sized>(api: &A, grid: &EntityHandle) -> Result<Origin> {
    require_grid(grid, "origin_info")?;
    let mut code = 0i32;
    check(api.origin_info(grid.id(), &mut code), "origin_info")?;
    Ok(Origin::from_code(code))
}

pub fn pixel_registration_info<A: NativeApi + ?Sized>(
    api: &A,
    grid: &EntityHandle,
) -> Result<PixelRegistration> {
    require_grid(grid, "pixel_registration_info")?;
    let mut code = 0i32;
    check(api.pixel_registration_info(grid.id(), &mut code), "pixel_registration_info")?;
    Ok(PixelRegistration::from_code(code))
}
