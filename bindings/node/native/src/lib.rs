/*
Purpose: Provide the Node N-API embedding over the shared marshalling core.
Key Exports: config, string, file.
Role: Translate JS values to the core's (string, error) surface; nothing more.
Invariants: Validation errors carry the shared fixed texts; engine error text
passes through byte-exact.
Invariants: The teardown hook is registered once and delegates to the core.
*/

use napi::{
    Env, Error, JsObject, JsString, JsUnknown, KeyCollectionMode, KeyConversion, KeyFilter,
    Result, Status, ValueType,
};
use napi_derive::napi;
use std::sync::Once;

use minify_bridge::core::config::ConfigSet;
use minify_bridge::core::engine::{self, Engine};
use minify_bridge::core::error::{Error as CoreError, ErrorKind};
use minify_bridge::core::value::ConfigValue;

// The engine is linked into this addon; install it and hook module teardown
// the first time any entry point runs.
static INIT: Once = Once::new();

fn ensure_engine(env: &Env) -> Result<()> {
    let mut hook = Ok(());
    INIT.call_once(|| {
        engine::install(Engine::linked());
        hook = env
            .add_env_cleanup_hook((), |_| engine::shutdown())
            .map(|_| ());
    });
    hook
}

fn arity(message: &str) -> Error {
    Error::new(Status::InvalidArg, message)
}

fn host_error(err: CoreError) -> Error {
    let status = match err.kind() {
        ErrorKind::Arity | ErrorKind::Type | ErrorKind::Encoding => Status::InvalidArg,
        _ => Status::GenericFailure,
    };
    Error::new(status, err.message().to_string())
}

fn string_arg(value: JsUnknown, message: &str) -> Result<String> {
    if value.get_type()? != ValueType::String {
        return Err(arity(message));
    }
    value.coerce_to_string()?.into_utf8()?.into_owned()
}

#[napi]
pub fn config(env: Env, input: Option<JsUnknown>) -> Result<()> {
    ensure_engine(&env)?;
    let input = input.ok_or_else(|| arity("expected config argument"))?;
    if input.get_type()? != ValueType::Object {
        return Err(arity("config must be an object"));
    }
    let object: JsObject = input.coerce_to_object()?;
    let names = object.get_all_property_names(
        KeyCollectionMode::OwnOnly,
        KeyFilter::Enumerable,
        KeyConversion::NumbersToStrings,
    )?;
    let count = names.get_array_length()?;

    let mut set = ConfigSet::with_capacity(count as usize);
    for index in 0..count {
        let key = names.get_element::<JsUnknown>(index)?;
        if key.get_type()? != ValueType::String {
            return Err(arity("config keys must be strings"));
        }
        let key: JsString = key.coerce_to_string()?;
        let key = key.into_utf8()?.into_owned()?;

        let value = object.get_named_property::<JsUnknown>(&key)?;
        let value = match value.get_type()? {
            // The runtime's own ToString is the canonical form for this host.
            ValueType::String | ValueType::Boolean | ValueType::Number => {
                value.coerce_to_string()?.into_utf8()?.into_owned()?
            }
            _ => {
                return Err(arity(
                    "config values must be strings, integers, or booleans",
                ));
            }
        };
        set.push(&key, ConfigValue::Str(value)).map_err(host_error)?;
    }

    engine::configure(&set).map_err(host_error)
}

#[napi]
pub fn string(env: Env, mediatype: Option<JsUnknown>, input: Option<JsUnknown>) -> Result<String> {
    ensure_engine(&env)?;
    let (Some(mediatype), Some(input)) = (mediatype, input) else {
        return Err(arity("expected mediatype and input arguments"));
    };
    let mediatype = string_arg(mediatype, "mediatype must be a string")?;
    let input = string_arg(input, "input must be a string")?;
    engine::minify_string(&mediatype, &input).map_err(host_error)
}

#[napi]
pub fn file(
    env: Env,
    mediatype: Option<JsUnknown>,
    input: Option<JsUnknown>,
    output: Option<JsUnknown>,
) -> Result<()> {
    ensure_engine(&env)?;
    let (Some(mediatype), Some(input), Some(output)) = (mediatype, input, output) else {
        return Err(arity("expected mediatype, input, and output arguments"));
    };
    let mediatype = string_arg(mediatype, "mediatype must be a string")?;
    let input = string_arg(input, "input must be a string")?;
    let output = string_arg(output, "output must be a string")?;
    engine::minify_file(&mediatype, &input, &output).map_err(host_error)
}
