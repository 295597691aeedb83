use std::{ffi::CStr, mem::MaybeUninit, os::raw::c_char, ptr};
use winapi::um::{
    errhandlingapi::GetLastError,
    winbase::{
        FormatMessageA,
        LocalFree,
        FORMAT_MESSAGE_ALLOCATE_BUFFER,
        FORMAT_MESSAGE_FROM_SYSTEM,
        FORMAT_MESSAGE_IGNORE_INSERTS,
    },
};
use crate::error::OsError;

/// Captures `GetLastError` together with its system message.
pub fn last_os_error() -> OsError {
    let code = unsafe { GetLastError() };
    OsError { code, message: error_message(code) }
}

fn error_message(code: u32) -> String {
    let mut message_ptr = MaybeUninit::<*mut c_char>::uninit();
    let length = unsafe {
        FormatMessageA(
            FORMAT_MESSAGE_ALLOCATE_BUFFER
                | FORMAT_MESSAGE_FROM_SYSTEM
                | FORMAT_MESSAGE_IGNORE_INSERTS,
            ptr::null(),
            code,
            0,
            message_ptr.as_mut_ptr() as *mut _,
            0,
            ptr::null_mut(),
        )
    };
    if length == 0 {
        return format!("unknown error (FormatMessageA failed with {})", unsafe { GetLastError() });
    }

    let message_ptr = unsafe { message_ptr.assume_init() };
    let message = unsafe { CStr::from_ptr(message_ptr) }
        .to_string_lossy()
        .trim_end()
        .to_owned();
    unsafe { LocalFree(message_ptr as *mut _) };

    message
}

/// Calls a Win32 function that signals failure by returning zero.
///
/// On failure returns early with the error built by the optional `=> wrapper`
/// (defaults to `Error::Os` naming the call).
#[macro_export]
macro_rules! win_try_non_zero {
    (
        $fn_name:ident( $($arg:expr),* $(,)? ) => $wrap:expr
    ) => {
        {
            let result = unsafe { $fn_name($($arg),*) };
            if result == 0 {
                return Err($wrap($crate::debug::last_os_error()));
            }
            result
        }
    };

    (
        $fn_name:ident( $($arg:expr),* $(,)? ) $(;)?
    ) => {
        $crate::win_try_non_zero!(
            $fn_name($($arg),*) => |source| $crate::error::Error::os(stringify!($fn_name), source)
        )
    };
}

/// Same as [`win_try_non_zero`] for functions that return a null handle or pointer on failure.
#[macro_export]
macro_rules! win_try_non_null {
    (
        $fn_name:ident( $($arg:expr),* $(,)? ) => $wrap:expr
    ) => {
        {
            let result = unsafe { $fn_name($($arg),*) };
            if result.is_null() {
                return Err($wrap($crate::debug::last_os_error()));
            }
            result
        }
    };

    (
        $fn_name:ident( $($arg:expr),* $(,)? ) $(;)?
    ) => {
        $crate::win_try_non_null!(
            $fn_name($($arg),*) => |source| $crate::error::Error::os(stringify!($fn_name), source)
        )
    };
}
