use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Error, Result};

/// HostValue is a script value crossing the binding boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
    ArrayBuffer(Bytes),
}

/// HostFunction is a synchronous function callable from script.
pub type HostFunction = Arc<dyn (Fn(&[HostValue]) -> Result<HostValue>) + Send + Sync>;

/// EngineContext is the script engine a module installs its bindings into.
pub trait EngineContext {
    /// set_global_object exposes `functions` as properties of a global
    /// object called `name`.
    fn set_global_object(
        &mut self,
        name: &str,
        functions: Vec<(&'static str, HostFunction)>,
    ) -> Result<()>;
}

pub(crate) fn arg_u32(function: &'static str, args: &[HostValue], index: usize) -> Result<u32> {
    match args.get(index) {
        Some(HostValue::Number(n))
            if n.is_finite() && n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 =>
        {
            Ok(*n as u32)
        }
        _ => Err(Error::ErrInvalidArgument {
            function,
            index,
            expected: "unsigned integer",
        }),
    }
}

pub(crate) fn arg_str<'a>(
    function: &'static str,
    args: &'a [HostValue],
    index: usize,
) -> Result<&'a str> {
    match args.get(index) {
        Some(HostValue::String(s)) => Ok(s.as_str()),
        _ => Err(Error::ErrInvalidArgument {
            function,
            index,
            expected: "string",
        }),
    }
}

pub(crate) fn arg_array_buffer(
    function: &'static str,
    args: &[HostValue],
    index: usize,
) -> Result<Bytes> {
    match args.get(index) {
        Some(HostValue::ArrayBuffer(data)) => Ok(data.clone()),
        _ => Err(Error::ErrInvalidArgument {
            function,
            index,
            expected: "ArrayBuffer",
        }),
    }
}
