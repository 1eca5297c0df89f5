//! Ungridded-to-grid colocation: every cell of a sample grid is a reference.
//!
//! Steps
//! -----------------
//! 1. Map each canonical axis (`latitude`, `longitude`, `altitude`, `air_pressure`, `time`) to
//!    the grid coordinate carrying that standard name. More than one coordinate for the same
//!    name is a [`ColocationError::CoordinateNotFound`] error; a mapped coordinate spanning
//!    more than one dimension is [`ColocationError::UnsupportedGeometry`].
//! 2. Give every mapped one-dimensional coordinate cell bounds, guessing them when absent.
//!    The guessing works on copies; the caller's grid is left untouched. A mapped scalar
//!    coordinate adds no dimension: with bounds, its single cell constrains every grid cell;
//!    without bounds, it constrains nothing.
//! 3. Iterate the index space of the mapped coordinates in C order, build one [`CellPoint`]
//!    per index tuple (unmapped axes unset), constrain the candidates with it and reduce them.
//! 4. Package the values with the mapped coordinates into one gridded product.
use tracing::info;

use crate::colocation_errors::ColocationError;
use crate::colocator::{candidate_points, fill_slots, prefilled, VariableOverrides};
use crate::constants::NUM_STANDARD_COORDS;
use crate::constraint::Constraint;
use crate::data::{ColocatedData, SourceData};
use crate::grid::{index_iterator, Coord, GriddedData};
use crate::hyperpoint::cell::CellPoint;
use crate::hyperpoint::Axis;
use crate::kernel::Kernel;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UngriddedGriddedColocator {
    pub overrides: VariableOverrides,
}

/// Grid coordinate of every canonical axis present on `grid`.
fn find_standard_coords(grid: &GriddedData) -> Result<Vec<(Axis, &Coord)>, ColocationError> {
    let mut mapped = Vec::with_capacity(NUM_STANDARD_COORDS);
    for axis in Axis::ALL {
        let coords = grid.coords_by_standard_name(axis.standard_name());
        match coords.as_slice() {
            [] => {}
            [(_, coord)] => mapped.push((axis, *coord)),
            many => {
                let names: Vec<&str> = many.iter().map(|(_, c)| c.name.as_str()).collect();
                return Err(ColocationError::CoordinateNotFound(format!(
                    "Expected to find exactly 1 coordinate, but found {}. They were: {}.",
                    many.len(),
                    names.join(", ")
                )));
            }
        }
    }
    Ok(mapped)
}

/// Coordinates of the output grid.
///
/// `dimensional` holds the mapped one-dimensional coordinates in data-dimension order,
/// renumbered as the output dimensions and carrying bounds. `scalar` holds the mapped
/// scalar coordinates; they add no output dimension and constrain every cell with their
/// single cell when they have bounds.
struct OutputCoords {
    dimensional: Vec<(Axis, Coord)>,
    scalar: Vec<(Axis, Coord)>,
}

fn output_coords(grid: &GriddedData) -> Result<OutputCoords, ColocationError> {
    let mut dimensional = Vec::with_capacity(NUM_STANDARD_COORDS);
    let mut scalar = Vec::new();
    for (axis, coord) in find_standard_coords(grid)? {
        match coord.dims() {
            [] => {
                if !coord.has_bounds() {
                    info!(
                        coord = coord.display_name(),
                        "scalar coordinate without bounds does not constrain the cells"
                    );
                }
                scalar.push((axis, coord.clone()));
            }
            [dim] => dimensional.push((*dim, axis, coord)),
            _ => {
                return Err(ColocationError::UnsupportedGeometry(format!(
                    "Co-location of data onto a grid with a coordinate of dimension greater than \
                     one is not supported (coordinate {})",
                    coord.display_name()
                )))
            }
        }
    }
    dimensional.sort_by_key(|(dim, _, _)| *dim);
    if let Some(pair) = dimensional.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(ColocationError::UnsupportedGeometry(format!(
            "coordinates '{}' and '{}' describe the same grid dimension",
            pair[0].2.display_name(),
            pair[1].2.display_name()
        )));
    }

    let dimensional = dimensional
        .into_iter()
        .enumerate()
        .map(|(dim, (_, axis, coord))| {
            let mut coord = coord.clone().on_dimension(dim)?;
            if !coord.has_bounds() {
                info!(coord = coord.display_name(), "creating guessed bounds as none exist");
                coord.guess_bounds()?;
            }
            Ok((axis, coord))
        })
        .collect::<Result<_, ColocationError>>()?;
    Ok(OutputCoords {
        dimensional,
        scalar,
    })
}

impl UngriddedGriddedColocator {
    pub fn new(overrides: VariableOverrides) -> Self {
        UngriddedGriddedColocator { overrides }
    }

    pub(crate) fn colocate(
        &self,
        points: &GriddedData,
        data: &SourceData,
        constraint: &Constraint,
        kernel: &Kernel,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        let OutputCoords {
            dimensional,
            scalar,
        } = output_coords(points)?;
        let shape: Vec<usize> = dimensional.iter().map(|(_, c)| c.len()).collect();
        let candidates = candidate_points(data, "ungridded_gridded")?;
        let fill_value = constraint.fill_value();

        let mut base = [None; NUM_STANDARD_COORDS];
        for (axis, coord) in &scalar {
            if coord.has_bounds() {
                base[axis.index()] = coord.cell(0);
            }
        }

        let n = shape.iter().product();
        let mut cells = Vec::new();
        cells.try_reserve_exact(n)?;
        cells.extend(index_iterator(&shape).map(|indices| {
            let mut cell = base;
            for ((axis, coord), &i) in dimensional.iter().zip(&indices) {
                cell[axis.index()] = coord.cell(i);
            }
            CellPoint::new(cell)
        }));

        info!(cells = n, "--> colocating...");
        let mut values = prefilled(n, fill_value)?;
        fill_slots(&cells, &mut values, |cell| {
            kernel.get_value(cell, &constraint.constrain_points(cell, &candidates))
        })?;

        let mut metadata = data.metadata().clone();
        self.overrides.apply(&mut metadata);
        metadata.missing_value = Some(fill_value);
        let grid = GriddedData::new(
            values,
            shape,
            dimensional
                .into_iter()
                .chain(scalar)
                .map(|(_, c)| c)
                .collect(),
            metadata,
        )?;
        Ok(vec![ColocatedData::Gridded(grid)])
    }
}

#[cfg(test)]
mod ungridded_gridded_test {
    use super::*;
    use crate::hyperpoint::HyperPoint;
    use crate::metadata::Metadata;

    fn sample_grid(coords: Vec<Coord>, shape: Vec<usize>) -> GriddedData {
        let n = shape.iter().product();
        GriddedData::new(vec![0.0; n], shape, coords, Metadata::new("sample")).unwrap()
    }

    fn source() -> SourceData {
        SourceData::Points {
            points: vec![
                HyperPoint::new(1.0, 1.0).with_value(2.0),
                HyperPoint::new(2.0, -2.0).with_value(4.0),
                HyperPoint::new(9.0, 12.0).with_value(10.0),
                HyperPoint::new(30.0, 30.0).with_value(100.0),
            ]
            .into(),
            metadata: Metadata::new("AOD").with_units("1"),
        }
    }

    #[test]
    fn test_cell_means() {
        let grid = sample_grid(
            vec![
                Coord::dim("lat", vec![0.0, 10.0], 0).with_standard_name("latitude"),
                Coord::dim("lon", vec![0.0, 10.0, 20.0], 1).with_standard_name("longitude"),
            ],
            vec![2, 3],
        );
        let out = UngriddedGriddedColocator::default()
            .colocate(&grid, &source(), &Constraint::cube_cell(), &Kernel::Mean)
            .unwrap();
        let result = out[0].as_gridded().unwrap();
        assert_eq!(result.shape(), &[2, 3]);
        assert_eq!(
            result.data(),
            &[3.0, -999.0, -999.0, -999.0, 10.0, -999.0]
        );
        assert_eq!(result.metadata().name, "AOD");
        assert_eq!(result.metadata().missing_value, Some(-999.0));
        assert!(result.coords().iter().all(Coord::has_bounds));

        // the sample grid keeps its bound-less coordinates
        assert!(!grid.coords()[0].has_bounds());
    }

    #[test]
    fn test_dimension_order_follows_the_grid() {
        let grid = sample_grid(
            vec![
                Coord::dim("lon", vec![0.0, 10.0, 20.0], 0).with_standard_name("longitude"),
                Coord::dim("lat", vec![0.0, 10.0], 1).with_standard_name("latitude"),
            ],
            vec![3, 2],
        );
        let out = UngriddedGriddedColocator::default()
            .colocate(&grid, &source(), &Constraint::cube_cell(), &Kernel::Mean)
            .unwrap();
        let result = out[0].as_gridded().unwrap();
        assert_eq!(result.shape(), &[3, 2]);
        assert_eq!(result.data()[0], 3.0);
        assert_eq!(result.data()[3], 10.0);
    }

    #[test]
    fn test_duplicate_standard_name() {
        let grid = sample_grid(
            vec![
                Coord::dim("lat", vec![0.0, 10.0], 0).with_standard_name("latitude"),
                Coord::dim("lat2", vec![0.0, 10.0], 0).with_standard_name("latitude"),
            ],
            vec![2],
        );
        assert!(matches!(
            UngriddedGriddedColocator::default().colocate(
                &grid,
                &source(),
                &Constraint::cube_cell(),
                &Kernel::Mean
            ),
            Err(ColocationError::CoordinateNotFound(_))
        ));
    }

    #[test]
    fn test_multi_dimensional_coordinate() {
        let lat2d = Coord::aux("lat", vec![0.0, 1.0, 2.0, 3.0], vec![2, 2], vec![0, 1])
            .unwrap()
            .with_standard_name("latitude");
        let grid = sample_grid(vec![lat2d], vec![2, 2]);
        assert!(matches!(
            UngriddedGriddedColocator::default().colocate(
                &grid,
                &source(),
                &Constraint::cube_cell(),
                &Kernel::Mean
            ),
            Err(ColocationError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn test_scalar_time_coordinate() {
        let lat = Coord::dim("lat", vec![0.0, 10.0], 0).with_standard_name("latitude");
        let lon = Coord::dim("lon", vec![0.0, 10.0], 1).with_standard_name("longitude");
        let time = Coord::aux("time", vec![58000.0], vec![], vec![])
            .unwrap()
            .with_standard_name("time");
        let source = SourceData::Points {
            points: vec![
                HyperPoint::new(1.0, 1.0).with_time(58000.2).with_value(2.0),
                HyperPoint::new(1.0, 1.0).with_time(58003.0).with_value(4.0),
                HyperPoint::new(9.0, 9.0).with_value(6.0),
            ]
            .into(),
            metadata: Metadata::new("AOD"),
        };

        // without bounds the time coordinate does not filter
        let grid = sample_grid(vec![lat.clone(), lon.clone(), time.clone()], vec![2, 2]);
        let out = UngriddedGriddedColocator::default()
            .colocate(&grid, &source, &Constraint::cube_cell(), &Kernel::Mean)
            .unwrap();
        let result = out[0].as_gridded().unwrap();
        assert_eq!(result.shape(), &[2, 2]);
        assert_eq!(result.data(), &[3.0, -999.0, -999.0, 6.0]);
        assert_eq!(result.coords().len(), 3);
        assert_eq!(result.coords()[2].dims(), &[] as &[usize]);

        // with bounds every cell is restricted to the time window
        let bounded = time.with_bounds(vec![(57999.5, 58000.5)]).unwrap();
        let grid = sample_grid(vec![lat, lon, bounded], vec![2, 2]);
        let out = UngriddedGriddedColocator::default()
            .colocate(&grid, &source, &Constraint::cube_cell(), &Kernel::Mean)
            .unwrap();
        assert_eq!(
            out[0].as_gridded().unwrap().data(),
            &[2.0, -999.0, -999.0, -999.0]
        );
    }

    #[test]
    fn test_single_point_axis_cannot_guess_bounds() {
        let grid = sample_grid(
            vec![Coord::dim("lat", vec![0.0], 0).with_standard_name("latitude")],
            vec![1],
        );
        assert!(matches!(
            UngriddedGriddedColocator::default().colocate(
                &grid,
                &source(),
                &Constraint::cube_cell(),
                &Kernel::Mean
            ),
            Err(ColocationError::BoundsGuessing(_))
        ));
    }
}
