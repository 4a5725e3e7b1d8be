macro_rules! err {
    ($($arg:tt)*) => {
        Err(format!($($arg)*).into())
    };
}

pub(crate) use err;

mod helper;
mod htype;

pub use helper::*;
pub use htype::*;
