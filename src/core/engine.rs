//! Purpose: Reach the external minify engine through its fixed C ABI.
//! Exports: `EngineApi`, `Engine`, `EngineMessage`, process-global registry.
//! Role: Single owner of engine symbols, engine-owned memory, and teardown.
//! Invariants: ABI signatures match the engine exports byte-for-byte.
//! Invariants: Engine-owned error strings are released exactly once.
//! Invariants: Configuration is single-writer; minify calls may overlap.

use std::ffi::CStr;
use std::os::raw::{c_char, c_longlong};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::{PoisonError, RwLock};

use crate::core::config::ConfigSet;
use crate::core::error::{Error, ErrorKind};

/// `char *minifyConfig(char **keys, char **vals, long long count)`
pub type ConfigureFn =
    unsafe extern "C" fn(*mut *mut c_char, *mut *mut c_char, c_longlong) -> *mut c_char;

/// `char *minifyString(char *mediatype, char *input, long long input_length,
///                     char *output, long long *output_length)`
pub type MinifyStringFn = unsafe extern "C" fn(
    *mut c_char,
    *mut c_char,
    c_longlong,
    *mut c_char,
    *mut c_longlong,
) -> *mut c_char;

/// `char *minifyFile(char *mediatype, char *input_path, char *output_path)`
pub type MinifyFileFn =
    unsafe extern "C" fn(*mut c_char, *mut c_char, *mut c_char) -> *mut c_char;

/// `void minifyCleanup(void)`
pub type CleanupFn = unsafe extern "C" fn();

/// The four engine entry points. Plain function pointers so the table can be
/// resolved from a shared library, taken from link-time symbols, or injected
/// by tests.
#[derive(Clone, Copy)]
pub struct EngineApi {
    pub configure: ConfigureFn,
    pub minify_string: MinifyStringFn,
    pub minify_file: MinifyFileFn,
    pub cleanup: CleanupFn,
}

/// An error message returned by the engine. The engine allocates these with
/// the C allocator and hands ownership over; this wrapper is the single
/// release point, so the message can neither leak nor be freed twice.
pub struct EngineMessage {
    ptr: NonNull<c_char>,
}

// The wrapped pointer is an exclusive heap allocation, not shared state.
unsafe impl Send for EngineMessage {}

impl EngineMessage {
    /// Takes ownership of a raw engine return value; null means success.
    ///
    /// # Safety
    /// `ptr` must be null or a NUL-terminated string allocated by the C
    /// allocator, and must not be used by the caller afterwards.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Copies the message text. The engine promises UTF-8; anything else is
    /// replaced rather than dropped so the host still sees a message.
    pub fn text(&self) -> String {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    /// Converts into a host-facing error, consuming (and thereby freeing)
    /// the engine-owned buffer.
    pub fn into_error(self) -> Error {
        Error::engine(self.text())
    }
}

impl Drop for EngineMessage {
    fn drop(&mut self) {
        unsafe { libc::free(self.ptr.as_ptr().cast()) };
    }
}

/// A handle on one resolved engine. When runtime-loaded, the library handle
/// lives alongside the symbol table so the entry points stay valid.
pub struct Engine {
    pub(crate) api: EngineApi,
    _lib: Option<libloading::Library>,
}

impl Engine {
    /// Resolves the engine from a shared library on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let lib = unsafe { libloading::Library::new(path) }.map_err(|err| {
            Error::new(
                ErrorKind::Contract,
                format!("cannot load engine library {}", path.display()),
            )
            .with_source(err)
        })?;

        let api = EngineApi {
            configure: *resolve::<ConfigureFn>(&lib, "minifyConfig")?,
            minify_string: *resolve::<MinifyStringFn>(&lib, "minifyString")?,
            minify_file: *resolve::<MinifyFileFn>(&lib, "minifyFile")?,
            cleanup: *resolve::<CleanupFn>(&lib, "minifyCleanup")?,
        };

        tracing::debug!(path = %path.display(), "engine library loaded");
        Ok(Self {
            api,
            _lib: Some(lib),
        })
    }

    /// Wraps an already-resolved entry-point table. This is the injection
    /// seam used by tests and by embeddings with exotic linkage.
    pub fn from_api(api: EngineApi) -> Self {
        Self { api, _lib: None }
    }

    /// Wraps the entry points resolved by the linker. The final artifact
    /// must link against libminify.
    #[cfg(feature = "linked")]
    pub fn linked() -> Self {
        Self::from_api(EngineApi {
            configure: linked::configure,
            minify_string: linked::minify_string,
            minify_file: linked::minify_file,
            cleanup: linked::cleanup,
        })
    }

    /// Runs the engine's process-wide teardown, consuming the handle.
    pub fn cleanup(self) {
        tracing::debug!("running engine cleanup");
        unsafe { (self.api.cleanup)() };
    }
}

#[cfg(feature = "linked")]
mod linked {
    use std::os::raw::{c_char, c_longlong};

    unsafe extern "C" {
        #[link_name = "minifyConfig"]
        pub fn configure(
            keys: *mut *mut c_char,
            vals: *mut *mut c_char,
            count: c_longlong,
        ) -> *mut c_char;
        #[link_name = "minifyString"]
        pub fn minify_string(
            mediatype: *mut c_char,
            input: *mut c_char,
            input_length: c_longlong,
            output: *mut c_char,
            output_length: *mut c_longlong,
        ) -> *mut c_char;
        #[link_name = "minifyFile"]
        pub fn minify_file(
            mediatype: *mut c_char,
            input_path: *mut c_char,
            output_path: *mut c_char,
        ) -> *mut c_char;
        #[link_name = "minifyCleanup"]
        pub fn cleanup();
    }
}

fn resolve<'lib, T>(
    lib: &'lib libloading::Library,
    name: &str,
) -> Result<libloading::Symbol<'lib, T>, Error> {
    unsafe { lib.get(name.as_bytes()) }.map_err(|err| {
        Error::new(
            ErrorKind::Contract,
            format!("engine library is missing symbol {name}"),
        )
        .with_source(err)
    })
}

// Process-global engine slot shared by every embedding in this process.
// Configure and shutdown mutate engine-global state and take the write
// guard; minify calls only read configuration and may run concurrently.
static ENGINE: RwLock<Option<Engine>> = RwLock::new(None);

fn not_loaded() -> Error {
    Error::new(ErrorKind::Contract, "minify engine is not loaded")
}

/// Installs (or replaces) the process-global engine.
pub fn install(engine: Engine) {
    let mut slot = ENGINE.write().unwrap_or_else(PoisonError::into_inner);
    if slot.replace(engine).is_some() {
        tracing::warn!("replacing an already installed engine");
    }
}

pub fn installed() -> bool {
    ENGINE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Applies a configuration set to the global engine (single-writer).
pub fn configure(set: &ConfigSet) -> Result<(), Error> {
    let mut slot = ENGINE.write().unwrap_or_else(PoisonError::into_inner);
    match slot.as_mut() {
        Some(engine) => engine.configure(set),
        None => Err(not_loaded()),
    }
}

pub fn minify_string(mediatype: &str, input: &str) -> Result<String, Error> {
    let slot = ENGINE.read().unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
        Some(engine) => engine.minify_string(mediatype, input),
        None => Err(not_loaded()),
    }
}

pub fn minify_file(mediatype: &str, input_path: &str, output_path: &str) -> Result<(), Error> {
    let slot = ENGINE.read().unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
        Some(engine) => engine.minify_file(mediatype, input_path, output_path),
        None => Err(not_loaded()),
    }
}

/// Runs engine teardown if an engine is installed; later calls are no-ops.
/// Host runtimes invoke this from their module/process shutdown hook.
pub fn shutdown() {
    let engine = ENGINE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(engine) = engine {
        engine.cleanup();
    }
}
