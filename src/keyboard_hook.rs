use anyhow::Result;

use crate::keys::KeyId;

/// Down/up edge of a physical key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Down,
    Up,
}

/// One decoded keyboard transition, as delivered by either input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyId,
    pub edge: KeyEdge,
}

impl KeyEvent {
    pub fn down(key: KeyId) -> Self {
        Self {
            key,
            edge: KeyEdge::Down,
        }
    }

    pub fn up(key: KeyId) -> Self {
        Self {
            key,
            edge: KeyEdge::Up,
        }
    }
}

/// Owned handle to the process-wide low-level keyboard hook.
///
/// `activate` installs the hook on a dedicated message-loop thread; the hook
/// callback only decodes the event and pushes it onto an in-order channel, so
/// it returns to the OS immediately. The UI thread pulls the backlog with
/// [`drain_events`] once per frame, which preserves the OS delivery order.
/// `deactivate` is idempotent and also runs on drop, so the hook is released
/// on every exit path. Activation failure is recoverable: the overlay keeps
/// running with focused-window capture only.
#[derive(Debug, Default)]
pub struct KeyboardHook {
    active: bool,
    #[cfg(windows)]
    backend: platform::KeyboardHookBackend,
}

impl KeyboardHook {
    pub fn activate(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }

        #[cfg(windows)]
        self.backend.install()?;

        self.active = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }

        #[cfg(windows)]
        if let Err(err) = self.backend.uninstall() {
            tracing::warn!(?err, "failed to uninstall global keyboard hook");
        }

        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        #[cfg(windows)]
        {
            self.active && self.backend.is_installed()
        }
        #[cfg(not(windows))]
        {
            self.active
        }
    }

    /// Pending key transitions in the order the OS reported them.
    pub fn drain_events(&self) -> Vec<KeyEvent> {
        #[cfg(windows)]
        {
            return self.backend.drain_events();
        }
        #[cfg(not(windows))]
        {
            Vec::new()
        }
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(windows)]
mod platform {
    use super::{KeyEdge, KeyEvent};
    use crate::keys::KeyId;
    use anyhow::{anyhow, Result};
    use once_cell::sync::Lazy;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;
    use std::thread::JoinHandle;
    use std::time::Duration;

    // The hook callback runs on the hook thread; this slot is how it reaches
    // the channel. FIFO sender, so OS delivery order survives the hand-off.
    static KEY_EVENT_SENDER: Lazy<Mutex<Option<Sender<KeyEvent>>>> = Lazy::new(|| Mutex::new(None));

    #[derive(Debug)]
    struct HookThread {
        thread_id: u32,
        join: JoinHandle<()>,
    }

    #[derive(Debug, Default)]
    pub struct KeyboardHookBackend {
        hook_thread: Option<HookThread>,
        receiver: Option<Receiver<KeyEvent>>,
    }

    unsafe impl Send for KeyboardHookBackend {}

    impl KeyboardHookBackend {
        pub fn install(&mut self) -> Result<()> {
            if self.hook_thread.is_some() {
                return Ok(());
            }

            let (event_tx, event_rx) = channel::<KeyEvent>();
            if let Ok(mut guard) = KEY_EVENT_SENDER.lock() {
                *guard = Some(event_tx);
            }

            use windows::Win32::System::LibraryLoader::GetModuleHandleW;
            use windows::Win32::System::Threading::GetCurrentThreadId;
            use windows::Win32::UI::WindowsAndMessaging::{
                DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
                UnhookWindowsHookEx, MSG, PM_NOREMOVE, WH_KEYBOARD_LL,
            };

            let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<u32>>(1);

            let worker = std::thread::spawn(move || {
                // PeekMessageW forces the queue into existence; without it a
                // WM_QUIT posted right after the ready signal could be lost.
                let mut msg = MSG::default();
                unsafe {
                    let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                }

                let thread_id = unsafe { GetCurrentThreadId() };
                let hmodule = match unsafe { GetModuleHandleW(None) } {
                    Ok(h) => h,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let keyboard_hook = match unsafe {
                    SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule, 0)
                } {
                    Ok(h) if !h.0.is_null() => h,
                    Ok(_) => {
                        let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                        return;
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let _ = ready_tx.send(Ok(thread_id));

                // Pump until WM_QUIT; low-level hooks need a message loop on
                // the installing thread. The unhook also happens here so it
                // runs on the thread that owns the hook.
                loop {
                    let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                    if status.0 <= 0 {
                        break;
                    }
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }

                unsafe {
                    let _ = UnhookWindowsHookEx(keyboard_hook);
                }
            });

            let thread_id = ready_rx
                .recv_timeout(Duration::from_secs(2))
                .map_err(|_| anyhow!("keyboard hook thread never reported ready"))??;

            self.receiver = Some(event_rx);
            self.hook_thread = Some(HookThread {
                thread_id,
                join: worker,
            });
            Ok(())
        }

        pub fn uninstall(&mut self) -> Result<()> {
            if let Ok(mut guard) = KEY_EVENT_SENDER.lock() {
                *guard = None;
            }

            if let Some(thread) = self.hook_thread.take() {
                use windows::Win32::Foundation::{LPARAM, WPARAM};
                use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
                unsafe {
                    let _ = PostThreadMessageW(thread.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
                }
                let _ = thread.join.join();
            }

            self.receiver = None;
            Ok(())
        }

        pub fn is_installed(&self) -> bool {
            self.hook_thread.is_some()
        }

        pub fn drain_events(&self) -> Vec<KeyEvent> {
            let mut events = Vec::new();
            if let Some(rx) = &self.receiver {
                while let Ok(event) = rx.try_recv() {
                    events.push(event);
                }
            }
            events
        }
    }

    unsafe extern "system" fn keyboard_hook_proc(
        n_code: i32,
        w_param: windows::Win32::Foundation::WPARAM,
        l_param: windows::Win32::Foundation::LPARAM,
    ) -> windows::Win32::Foundation::LRESULT {
        use windows::Win32::UI::WindowsAndMessaging::{
            CallNextHookEx, HC_ACTION, KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS, WM_KEYDOWN,
            WM_KEYUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
        };

        if n_code == HC_ACTION as i32 {
            let edge = match w_param.0 as u32 {
                WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyEdge::Down),
                WM_KEYUP | WM_SYSKEYUP => Some(KeyEdge::Up),
                _ => None,
            };
            if let Some(edge) = edge {
                let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
                let injected =
                    (info.flags & KBDLLHOOKSTRUCT_FLAGS(0x10)) != KBDLLHOOKSTRUCT_FLAGS(0);
                if !injected {
                    let event = KeyEvent {
                        key: KeyId::from_vk(info.vkCode),
                        edge,
                    };

                    // Decode and hand off only; anything slower here stalls
                    // the system-wide input pipeline.
                    if let Ok(guard) = KEY_EVENT_SENDER.lock() {
                        if let Some(sender) = guard.as_ref() {
                            let _ = sender.send(event);
                        }
                    }
                }
            }
        }

        // The overlay only observes; every event continues down the chain.
        CallNextHookEx(
            windows::Win32::UI::WindowsAndMessaging::HHOOK(std::ptr::null_mut()),
            n_code,
            w_param,
            l_param,
        )
    }
}
