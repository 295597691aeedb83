use std::{
    cell::RefCell,
    ffi::CString,
    mem::{self, size_of, MaybeUninit},
    ptr,
};
use tracing::{debug, info, trace, warn};
use winapi::{
    shared::{
        basetsd::LONG_PTR,
        minwindef::{self, HINSTANCE, LOWORD, HIWORD},
        windef::{self, HDC, HWND},
    },
    um::{
        wingdi::{self, BITMAPINFO},
        winuser,
    },
};
use crate::{
    app::{AppState, Notification, Response},
    config::Config,
    debug::last_os_error,
    error::Error,
    graphics::PixelBuffer,
    host::{Pump, WindowDimension, WindowHost},
};

/// Top level Win32 window presenting an [`AppState`]'s backbuffer.
///
/// The state is boxed so its address stays put; the window procedure reaches
/// it through `GWLP_USERDATA`.
pub struct Win32Window {
    handle: HWND,
    instance: HINSTANCE,
    class_name: CString,
    state: Box<RefCell<AppState>>,
}

impl Win32Window {
    pub fn create(config: &Config, state: AppState) -> Result<Self, Error> {
        use winapi::um::{
            libloaderapi::GetModuleHandleA,
            winuser::{WNDCLASSEXA, RegisterClassExA, UnregisterClassA, AdjustWindowRectEx, CreateWindowExA},
        };

        let class_name = c_string(&config.class_name)?;
        let title = c_string(&config.title)?;
        let instance = win_try_non_null!(GetModuleHandleA(ptr::null()) => Error::Registration);

        let class = WNDCLASSEXA {
            cbSize: size_of::<WNDCLASSEXA>() as u32,
            style: winuser::CS_HREDRAW | winuser::CS_VREDRAW,
            lpfnWndProc: Some(Self::window_class_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: instance,
            hIcon: ptr::null_mut(),
            hCursor: ptr::null_mut(),
            hbrBackground: ptr::null_mut(),
            lpszMenuName: ptr::null_mut(),
            lpszClassName: class_name.as_ptr(),
            hIconSm: ptr::null_mut(),
        };
        win_try_non_zero!(RegisterClassExA(&class) => Error::Registration);
        debug!(class = %config.class_name, "window class registered");

        let state = Box::new(RefCell::new(state));
        let window_style = winuser::WS_OVERLAPPEDWINDOW | winuser::WS_VISIBLE;
        let mut window_dim = windef::RECT {
            left: 0,
            top: 0,
            right: config.width,
            bottom: config.height,
        };
        let handle = unsafe {
            if AdjustWindowRectEx(&mut window_dim, window_style, 0, 0) == 0 {
                warn!(error = %last_os_error(), "AdjustWindowRectEx failed, sizing the frame to the client area");
            }
            CreateWindowExA(
                0,
                class_name.as_ptr(),
                title.as_ptr(),
                window_style,
                winuser::CW_USEDEFAULT,
                winuser::CW_USEDEFAULT,
                window_dim.right - window_dim.left,
                window_dim.bottom - window_dim.top,
                ptr::null_mut(),
                ptr::null_mut(),
                instance,
                &*state as *const RefCell<AppState> as *mut _,
            )
        };
        if handle.is_null() {
            let source = last_os_error();
            unsafe { UnregisterClassA(class_name.as_ptr(), instance) };
            return Err(Error::WindowCreation(source));
        }

        state.borrow_mut().on_created();
        info!(width = config.width, height = config.height, title = %config.title, "window created");

        Ok(Self {
            handle,
            instance,
            class_name,
            state,
        })
    }

    #[inline(always)] pub fn handle(&self) -> HWND { self.handle }

    fn client_dimension(window: HWND) -> Result<WindowDimension, Error> {
        use winapi::um::winuser::GetClientRect;

        let client_rect = {
            let mut client_rect = MaybeUninit::uninit();
            win_try_non_zero!(GetClientRect(window, client_rect.as_mut_ptr()));
            unsafe { client_rect.assume_init() }
        };

        Ok(WindowDimension {
            width: client_rect.right - client_rect.left,
            height: client_rect.bottom - client_rect.top,
        })
    }

    /// Stretches the full buffer over `(0, 0, target.width, target.height)` of `device_context`.
    fn stretch_buffer(device_context: HDC, buffer: &PixelBuffer, target: WindowDimension) -> Result<(), Error> {
        if buffer.is_empty() || target.is_empty() {
            trace!(buffer = ?buffer.dim(), ?target, "nothing to present");
            return Ok(());
        }
        let bitmap_info = bitmap_info(buffer);
        let blit_result = unsafe {
            wingdi::StretchDIBits(
                device_context,
                0,
                0,
                target.width,
                target.height,
                0,
                0,
                buffer.width(),
                buffer.height(),
                buffer.as_ptr() as *const _,
                &bitmap_info,
                wingdi::DIB_RGB_COLORS,
                wingdi::SRCCOPY,
            )
        };
        if blit_result == 0 {
            return Err(Error::os("StretchDIBits", last_os_error()));
        }

        Ok(())
    }

    unsafe fn paint(window: HWND, state: &RefCell<AppState>) {
        let mut paint = MaybeUninit::<winuser::PAINTSTRUCT>::uninit();
        let device_context = winuser::BeginPaint(window, paint.as_mut_ptr());
        if device_context.is_null() {
            warn!(error = %last_os_error(), "BeginPaint failed");
            return;
        }
        let presented = Self::client_dimension(window).and_then(|target| match state.try_borrow() {
            Ok(state) => Self::stretch_buffer(device_context, state.backbuffer(), target),
            Err(_) => Ok(()),
        });
        if let Err(e) = presented {
            warn!(error = %e, "WM_PAINT present failed");
        }
        winuser::EndPaint(window, paint.as_ptr());
    }

    fn translate(message: minwindef::UINT, w_param: minwindef::WPARAM, l_param: minwindef::LPARAM) -> Notification {
        match message {
            winuser::WM_SIZE => Notification::Resize {
                width: LOWORD(l_param as u32) as i32,
                height: HIWORD(l_param as u32) as i32,
            },
            winuser::WM_CLOSE => Notification::Close,
            winuser::WM_DESTROY => Notification::Destroy,
            winuser::WM_ACTIVATEAPP => Notification::ActivateApp { active: w_param != 0 },
            winuser::WM_PAINT => Notification::Paint,
            _ => Notification::Other,
        }
    }

    unsafe extern "system" fn window_class_proc(
        window_handle: HWND,
        message: minwindef::UINT,
        w_param: minwindef::WPARAM,
        l_param: minwindef::LPARAM,
    ) -> minwindef::LRESULT {
        use winapi::um::winuser::{DefWindowProcA, GetWindowLongPtrA, SetWindowLongPtrA, CREATESTRUCTA, GWLP_USERDATA};

        match message {
            winuser::WM_NCCREATE => {
                let create = &*(l_param as *const CREATESTRUCTA);
                SetWindowLongPtrA(window_handle, GWLP_USERDATA, create.lpCreateParams as LONG_PTR);
                return DefWindowProcA(window_handle, message, w_param, l_param);
            }
            winuser::WM_NCDESTROY => {
                SetWindowLongPtrA(window_handle, GWLP_USERDATA, 0);
                return DefWindowProcA(window_handle, message, w_param, l_param);
            }
            _ => (),
        }

        let state = GetWindowLongPtrA(window_handle, GWLP_USERDATA) as *const RefCell<AppState>;
        if state.is_null() {
            return DefWindowProcA(window_handle, message, w_param, l_param);
        }
        let state = &*state;

        let notification = Self::translate(message, w_param, l_param);
        // NOTE: the handler can be re-entered from DefWindowProcA, so the borrow ends here
        let response = match state.try_borrow_mut() {
            Ok(mut state) => state.handle(notification),
            Err(_) => {
                trace!(message, "state busy, using default handling");
                Response::PassThrough
            }
        };

        match response {
            Response::Handled => 0,
            Response::Paint => {
                Self::paint(window_handle, state);
                0
            }
            Response::PassThrough => DefWindowProcA(window_handle, message, w_param, l_param),
        }
    }
}

impl WindowHost for Win32Window {
    fn state(&self) -> &RefCell<AppState> {
        &self.state
    }

    /// Message dispatch loop. Dispatches all messages in queue.
    fn pump_messages(&self) -> Pump {
        use winuser::{PeekMessageA, TranslateMessage, DispatchMessageA};

        let mut pump = Pump::Drained;
        loop {
            let msg = unsafe {
                let mut msg = MaybeUninit::uninit();
                if PeekMessageA(msg.as_mut_ptr(), ptr::null_mut(), 0, 0, winuser::PM_REMOVE) != 0 {
                    Some(msg.assume_init())
                } else {
                    None
                }
            };

            match msg {
                None => break pump,
                Some(msg) if msg.message == winuser::WM_QUIT => pump = Pump::Quit,
                Some(msg) => unsafe {
                    TranslateMessage(&msg);
                    DispatchMessageA(&msg);
                },
            }
        }
    }

    fn window_dimension(&self) -> Result<WindowDimension, Error> {
        Self::client_dimension(self.handle)
    }

    fn present(&self, buffer: &PixelBuffer, target: WindowDimension) -> Result<(), Error> {
        use winapi::um::winuser::{GetDC, ReleaseDC};

        let device_context = win_try_non_null!(GetDC(self.handle));
        let result = Self::stretch_buffer(device_context, buffer, target);
        unsafe { ReleaseDC(self.handle, device_context) };
        result
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        use winapi::um::winuser::{DestroyWindow, IsWindow, UnregisterClassA};

        unsafe {
            if IsWindow(self.handle) != 0 && DestroyWindow(self.handle) == 0 {
                warn!(error = %last_os_error(), "DestroyWindow failed");
            }
            if UnregisterClassA(self.class_name.as_ptr(), self.instance) == 0 {
                warn!(error = %last_os_error(), "UnregisterClassA failed");
            }
        }
        debug!("window torn down");
    }
}

/// Header describing the buffer to GDI: 32-bit, uncompressed, top-down.
fn bitmap_info(buffer: &PixelBuffer) -> BITMAPINFO {
    BITMAPINFO {
        bmiHeader: wingdi::BITMAPINFOHEADER {
            biSize: size_of::<wingdi::BITMAPINFOHEADER>() as u32,
            biWidth: buffer.width(),
            biHeight: -buffer.height(), //NOTE: negative means that bitmap is top-down
            biPlanes: 1,
            biBitCount: (buffer.bytes_per_pixel() * 8) as u16,
            biCompression: wingdi::BI_RGB,
            ..unsafe { mem::zeroed() }
        },
        ..unsafe { mem::zeroed() }
    }
}

fn c_string(text: &str) -> Result<CString, Error> {
    CString::new(text).map_err(|_| Error::InvalidText(text.to_owned()))
}
