//! ESRI ASCII grid (`.asc`) reader.

use geotools_domain::{DataSourceType, Datasource, DatasourceError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Georeferencing header of an ASCII grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridHeader {
    pub ncols: usize,
    pub nrows: usize,
    /// X of the lower-left corner of the lower-left cell
    pub xll: f64,
    /// Y of the lower-left corner of the lower-left cell
    pub yll: f64,
    pub cell_size: f64,
    pub nodata: Option<f64>,
}

impl GridHeader {
    /// `(min_x, min_y, max_x, max_y)`
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (
            self.xll,
            self.yll,
            self.xll + self.ncols as f64 * self.cell_size,
            self.yll + self.nrows as f64 * self.cell_size,
        )
    }
}

/// Summary statistics over the valid (non-nodata) cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid_cells: usize,
}

/// An opened single-band grid.
#[derive(Debug, Clone)]
pub struct GridLayer {
    path: PathBuf,
    header: GridHeader,
    stats: Option<BandStats>,
}

impl GridLayer {
    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    /// `None` when every cell is nodata.
    pub fn stats(&self) -> Option<BandStats> {
        self.stats
    }

    pub fn band_count(&self) -> usize {
        1
    }
}

impl Datasource for GridLayer {
    fn filename(&self) -> &Path {
        &self.path
    }

    fn source_type(&self) -> DataSourceType {
        DataSourceType::Raster
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Read the grid at `path`, parsing the header and summarizing cell values.
pub fn read_grid(path: &Path) -> Result<GridLayer, DatasourceError> {
    let text = std::fs::read_to_string(path).map_err(|e| DatasourceError::open(path, e))?;
    let (header, data) = parse_header(path, &text)?;

    let mut stats: Option<BandStats> = None;
    let mut sum = 0.0;
    let mut cells = 0usize;
    for token in data.split_whitespace() {
        let value: f64 = token
            .parse()
            .map_err(|_| DatasourceError::open(path, format!("invalid cell value '{}'", token)))?;
        cells += 1;
        if header.nodata == Some(value) {
            continue;
        }
        sum += value;
        stats = Some(match stats {
            None => BandStats {
                min: value,
                max: value,
                mean: 0.0,
                valid_cells: 1,
            },
            Some(s) => BandStats {
                min: s.min.min(value),
                max: s.max.max(value),
                mean: 0.0,
                valid_cells: s.valid_cells + 1,
            },
        });
    }

    let expected = header
        .ncols
        .checked_mul(header.nrows)
        .ok_or_else(|| DatasourceError::open(path, "invalid grid header: cell count overflows"))?;
    if cells != expected {
        return Err(DatasourceError::open(
            path,
            format!("expected {} cells, found {}", expected, cells),
        ));
    }

    let stats = stats.map(|s| BandStats {
        mean: sum / s.valid_cells as f64,
        ..s
    });

    debug!(path = %path.display(), ncols = header.ncols, nrows = header.nrows, "Opened ASCII grid");
    Ok(GridLayer {
        path: path.to_path_buf(),
        header,
        stats,
    })
}

/// Split the header lines off `text`; returns the header and the cell data.
fn parse_header<'t>(path: &Path, text: &'t str) -> Result<(GridHeader, &'t str), DatasourceError> {
    let mut ncols = None;
    let mut nrows = None;
    let mut xll = None;
    let mut yll = None;
    let mut center = false;
    let mut cell_size = None;
    let mut nodata = None;

    let mut rest = text;
    loop {
        let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        let line = rest[..line_end].trim();
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            break;
        };
        let key = key.to_ascii_lowercase();
        if key.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
            break;
        }

        let number = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| DatasourceError::open(path, format!("invalid header value for {}", key)))
        };
        // Dimensions must be whole, non-negative and representable as usize.
        let dimension = |v: &str| -> Result<usize, DatasourceError> {
            let n = number(v)?;
            if !n.is_finite() || n < 0.0 || n.fract() != 0.0 || n >= usize::MAX as f64 {
                return Err(DatasourceError::open(
                    path,
                    format!("invalid grid header: {} must be a whole number, got '{}'", key, v),
                ));
            }
            Ok(n as usize)
        };
        match key.as_str() {
            "ncols" => ncols = Some(dimension(value)?),
            "nrows" => nrows = Some(dimension(value)?),
            "xllcorner" => xll = Some(number(value)?),
            "yllcorner" => yll = Some(number(value)?),
            "xllcenter" => {
                xll = Some(number(value)?);
                center = true;
            }
            "yllcenter" => {
                yll = Some(number(value)?);
                center = true;
            }
            "cellsize" => cell_size = Some(number(value)?),
            "nodata_value" => nodata = Some(number(value)?),
            _ => {
                return Err(DatasourceError::open(
                    path,
                    format!("unknown header key '{}'", key),
                ));
            }
        }
        rest = &rest[line_end..];
    }

    let missing = |name: &str| DatasourceError::open(path, format!("missing header key '{}'", name));
    let ncols = ncols.ok_or_else(|| missing("ncols"))?;
    let nrows = nrows.ok_or_else(|| missing("nrows"))?;
    let cell_size = cell_size.ok_or_else(|| missing("cellsize"))?;
    let mut xll = xll.ok_or_else(|| missing("xllcorner"))?;
    let mut yll = yll.ok_or_else(|| missing("yllcorner"))?;

    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(DatasourceError::open(
            path,
            format!("invalid grid header: cellsize must be positive, got {}", cell_size),
        ));
    }
    if ncols == 0 || nrows == 0 {
        return Err(DatasourceError::NoLayersFound {
            path: path.to_path_buf(),
        });
    }
    if center {
        xll -= cell_size / 2.0;
        yll -= cell_size / 2.0;
    }

    Ok((
        GridHeader {
            ncols,
            nrows,
            xll,
            yll,
            cell_size,
            nodata,
        },
        rest,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEM: &str = "ncols 3\nnrows 2\nxllcorner 100.0\nyllcorner 200.0\ncellsize 10\nNODATA_value -9999\n1 2 3\n4 -9999 6\n";

    fn write(name: &str, text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn test_read_grid_header_and_stats() {
        let (_dir, path) = write("dem.asc", DEM);
        let grid = read_grid(&path).unwrap();

        assert_eq!(grid.source_type(), DataSourceType::Raster);
        assert!(grid.fields().is_empty());
        assert_eq!(grid.band_count(), 1);
        assert_eq!(grid.header().ncols, 3);
        assert_eq!(grid.header().nodata, Some(-9999.0));
        assert_eq!(grid.header().extent(), (100.0, 200.0, 130.0, 220.0));

        let stats = grid.stats().unwrap();
        assert_eq!(stats.valid_cells, 5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 6.0);
        assert!((stats.mean - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_center_registration_shifts_origin() {
        let (_dir, path) = write(
            "c.asc",
            "ncols 1\nnrows 1\nxllcenter 5\nyllcenter 5\ncellsize 10\n7\n",
        );
        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.header().xll, 0.0);
        assert!(grid.header().nodata.is_none());
    }

    #[test]
    fn test_cell_count_mismatch_fails() {
        let (_dir, path) = write(
            "short.asc",
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n",
        );
        assert!(matches!(read_grid(&path), Err(DatasourceError::Open { .. })));
    }

    fn assert_invalid_header(name: &str, text: &str) {
        let (_dir, path) = write(name, text);
        let err = read_grid(&path).unwrap_err();
        assert!(matches!(err, DatasourceError::Open { .. }), "{}: {:?}", name, err);
        assert!(err.to_string().contains("invalid grid header"), "{}: {}", name, err);
    }

    #[test]
    fn test_huge_dimensions_fail_without_overflow() {
        assert_invalid_header(
            "huge.asc",
            "ncols 1e19\nnrows 4\nxllcorner 0\nyllcorner 0\ncellsize 1\n1\n",
        );
    }

    #[test]
    fn test_fractional_dimension_rejected() {
        assert_invalid_header(
            "frac.asc",
            "ncols 2.7\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n",
        );
    }

    #[test]
    fn test_negative_dimension_rejected() {
        assert_invalid_header(
            "neg.asc",
            "ncols 2\nnrows -1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n",
        );
    }

    #[test]
    fn test_non_finite_dimension_rejected() {
        assert_invalid_header(
            "inf.asc",
            "ncols inf\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1\n",
        );
    }

    #[test]
    fn test_non_positive_cell_size_rejected() {
        assert_invalid_header(
            "cell.asc",
            "ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 0\n1\n",
        );
    }

    #[test]
    fn test_zero_dimension_has_no_layers() {
        let (_dir, path) = write(
            "empty.asc",
            "ncols 0\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n",
        );
        assert!(matches!(read_grid(&path), Err(DatasourceError::NoLayersFound { .. })));
    }

    #[test]
    fn test_missing_header_key_fails() {
        let (_dir, path) = write("bad.asc", "ncols 1\nnrows 1\n1\n");
        let err = read_grid(&path).unwrap_err();
        assert!(err.to_string().contains("cellsize"));
    }
}
