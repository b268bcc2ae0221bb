/*
Purpose: Provide the Python embedding over the shared marshalling core.
Key Exports: config, string, file (module `minify_bridge`).
Role: Translate Python objects to the core's (string, error) surface.
Invariants: All failures raise ValueError; engine error text passes through
byte-exact.
Invariants: Teardown is registered with atexit once, at module import.
*/

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyInt, PyString};

use minify_bridge::core::config::ConfigSet;
use minify_bridge::core::engine::{self, Engine};
use minify_bridge::core::error::Error as CoreError;
use minify_bridge::core::value::ConfigValue;

fn host_error(err: CoreError) -> PyErr {
    PyValueError::new_err(err.message().to_string())
}

fn text_arg(value: &Bound<'_, PyAny>, message: &str) -> PyResult<String> {
    match value.downcast::<PyString>() {
        Ok(text) => Ok(text.to_cow()?.into_owned()),
        Err(_) => Err(PyValueError::new_err(message.to_string())),
    }
}

#[pyfunction]
fn config(input: &Bound<'_, PyAny>) -> PyResult<()> {
    let Ok(dict) = input.downcast::<PyDict>() else {
        return Err(PyValueError::new_err("config must be a dict[str,str|bool|int]"));
    };

    let mut set = ConfigSet::with_capacity(dict.len());
    for (key, value) in dict.iter() {
        let key = text_arg(&key, "config keys must be strings")?;
        // bool is an int subclass in Python; both take the host's own str().
        let value = if value.is_instance_of::<PyBool>() || value.is_instance_of::<PyInt>() {
            value.str()?.to_cow()?.into_owned()
        } else {
            text_arg(
                &value,
                "config values must be strings, integers, or booleans",
            )?
        };
        set.push(&key, ConfigValue::Str(value)).map_err(host_error)?;
    }

    engine::configure(&set).map_err(host_error)
}

#[pyfunction]
fn string(mediatype: &Bound<'_, PyAny>, input: &Bound<'_, PyAny>) -> PyResult<String> {
    let mediatype = text_arg(mediatype, "mediatype must be a string")?;
    let input = text_arg(input, "input must be a string")?;
    engine::minify_string(&mediatype, &input).map_err(host_error)
}

#[pyfunction]
fn file(
    mediatype: &Bound<'_, PyAny>,
    input: &Bound<'_, PyAny>,
    output: &Bound<'_, PyAny>,
) -> PyResult<()> {
    let mediatype = text_arg(mediatype, "mediatype must be a string")?;
    let input = text_arg(input, "input must be a string")?;
    let output = text_arg(output, "output must be a string")?;
    engine::minify_file(&mediatype, &input, &output).map_err(host_error)
}

#[pyfunction]
fn _shutdown() {
    engine::shutdown();
}

#[pymodule]
fn minify_bridge(py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(config, module)?)?;
    module.add_function(wrap_pyfunction!(string, module)?)?;
    module.add_function(wrap_pyfunction!(file, module)?)?;
    let shutdown = wrap_pyfunction!(_shutdown, module)?;
    module.add_function(shutdown.clone())?;

    engine::install(Engine::linked());
    py.import_bound("atexit")?
        .call_method1("register", (shutdown,))?;
    Ok(())
}
