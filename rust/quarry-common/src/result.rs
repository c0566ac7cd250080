use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::invalid_arg`] naming `$name` when `$cond` is false.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $cond:expr) => {
        $crate::result::check($cond, || {
            $crate::error::Error::invalid_arg(stringify!($name), stringify!($cond))
        })?
    };
}

/// Fails with [`Error::format_inconsistency`] on `$name` when `$cond` is false.
/// Used while opening index structures whose parts must agree with each other.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $cond:expr) => {
        $crate::result::check($cond, || {
            $crate::error::Error::format_inconsistency(stringify!($name), stringify!($cond))
        })?
    };
}

#[inline]
pub fn check(holds: bool, error: impl FnOnce() -> Error) -> Result<()> {
    if holds { Ok(()) } else { Err(failed(error)) }
}

#[cold]
fn failed(error: impl FnOnce() -> Error) -> Error {
    error()
}
