//! Purpose: Marshal string and file minify requests across the engine ABI.
//! Exports: `Engine::minify_string`, `Engine::minify_file`.
//! Invariants: The output buffer is sized to the input; the engine-reported
//! length bounds every read, and a length outside `0..=input` is rejected.
//! Invariants: No partial output ever reaches the host on a failure path.

use std::os::raw::{c_char, c_longlong};

use crate::core::engine::{Engine, EngineMessage};
use crate::core::error::{Error, ErrorKind};
use crate::core::value::c_string;

impl Engine {
    /// Minifies `input` under the processor selected by `mediatype` and
    /// returns the minified text. Pure aside from reading the configuration
    /// the last configure call established.
    pub fn minify_string(&self, mediatype: &str, input: &str) -> Result<String, Error> {
        let mediatype = c_string(mediatype, "mediatype")?;
        let input_length = input.len();
        let input = c_string(input, "input")?;

        // Engine contract: minified output never exceeds its input. A
        // zero-length input stays a valid (dangling, never dereferenced)
        // zero-length buffer.
        let mut output = vec![0u8; input_length];
        let mut output_length: c_longlong = 0;

        let raw = unsafe {
            (self.api.minify_string)(
                mediatype.as_ptr() as *mut c_char,
                input.as_ptr() as *mut c_char,
                input_length as c_longlong,
                output.as_mut_ptr() as *mut c_char,
                &mut output_length,
            )
        };
        if let Some(message) = unsafe { EngineMessage::from_raw(raw) } {
            return Err(message.into_error());
        }

        if output_length < 0 || output_length as usize > input_length {
            return Err(Error::new(
                ErrorKind::Contract,
                format!(
                    "engine reported {output_length} output bytes for a {input_length}-byte input"
                ),
            ));
        }
        output.truncate(output_length as usize);

        String::from_utf8(output).map_err(|err| {
            Error::new(ErrorKind::Contract, "engine produced invalid UTF-8 output")
                .with_source(err)
        })
    }

    /// Minifies `input_path` into `output_path`. The engine performs the
    /// file I/O itself; the adapter only carries the three strings across.
    pub fn minify_file(
        &self,
        mediatype: &str,
        input_path: &str,
        output_path: &str,
    ) -> Result<(), Error> {
        let mediatype = c_string(mediatype, "mediatype")?;
        let input_path = c_string(input_path, "input path")?;
        let output_path = c_string(output_path, "output path")?;

        let raw = unsafe {
            (self.api.minify_file)(
                mediatype.as_ptr() as *mut c_char,
                input_path.as_ptr() as *mut c_char,
                output_path.as_ptr() as *mut c_char,
            )
        };
        match unsafe { EngineMessage::from_raw(raw) } {
            Some(message) => Err(message.into_error()),
            None => Ok(()),
        }
    }
}
