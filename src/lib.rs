use pyo3::prelude::*;

use boundaries::{assemble_boundaries, overpass_query};

pub mod boundaries;

/// A Python module implemented in Rust.
#[pymodule]
fn osmbound(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(assemble_boundaries, m)?)?;
    m.add_function(wrap_pyfunction!(overpass_query, m)?)?;
    Ok(())
}

#[cfg(feature = "stubgen")]
pyo3_stub_gen::define_stub_info_gatherer!(stub_info);
