use osmbound_core::prelude::*;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn value_error(err: Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Assemble boundary polygons from an Overpass API response
///
/// Turns the flat ``elements`` array of an Overpass ``[out:json]`` response
/// into a GeoJSON FeatureCollection of closed polygons. Every tagged way
/// becomes one polygon; a tagged relation yields one polygon per ``outer``
/// member way, named after the relation.
///
/// Parameters
/// ----------
/// overpass_json : str
///     Raw JSON text returned by the Overpass interpreter
/// kind : str, default="neighborhood"
///     Boundary kind, ``"neighborhood"`` or ``"zipcode"``
///
/// Returns
/// -------
/// str
///     GeoJSON FeatureCollection
///
/// Raises
/// ------
/// ValueError
///     If the response is not a JSON object with an ``elements`` array or
///     ``kind`` is unknown
///
/// Example:
///
/// .. code-block:: python
///
///     geojson = assemble_boundaries(response.text, "zipcode")
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (overpass_json, kind = "neighborhood"))]
pub fn assemble_boundaries(overpass_json: &str, kind: &str) -> PyResult<String> {
    let kind: BoundaryKind = kind.parse().map_err(value_error)?;
    let collection = assemble_str(overpass_json, kind).map_err(value_error)?;
    to_geojson_string(&collection).map_err(value_error)
}

/// Build the Overpass QL query for boundaries of ``kind`` in a bounding box
///
/// Raises
/// ------
/// ValueError
///     If ``kind`` is unknown or the bounding box is invalid
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn overpass_query(
    kind: &str,
    min_lat: f64,
    min_lng: f64,
    max_lat: f64,
    max_lng: f64,
) -> PyResult<String> {
    let kind: BoundaryKind = kind.parse().map_err(value_error)?;
    let bbox = BoundingBox::new(min_lat, min_lng, max_lat, max_lng).map_err(value_error)?;
    Ok(osmbound_core::query::overpass_query(kind, &bbox))
}
