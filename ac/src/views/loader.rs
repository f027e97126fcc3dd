//! Terminal rendition of the global loading indicator

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::lifecycle::LoadingState;

pub const LOADING_TEXT: &str = "Loading...";

/// Writes a "Loading..." line while any request is in flight
pub struct GlobalLoader {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl GlobalLoader {
    /// Attach to `state`; the line is drawn and cleared on busy transitions
    pub fn attach(state: &LoadingState, out: Box<dyn Write + Send>) -> Self {
        let out = Arc::new(Mutex::new(out));
        let sink = out.clone();
        state.on_busy_change(move |busy| {
            let mut out = sink.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = draw(&mut **out, busy) {
                warn!(error = %e, busy, "GlobalLoader: failed to draw loading line");
            }
        });
        Self { out }
    }

    pub fn stderr(state: &LoadingState) -> Self {
        Self::attach(state, Box::new(io::stderr()))
    }

    /// Flush whatever is buffered
    pub fn flush(&self) -> io::Result<()> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }
}

fn draw(out: &mut dyn Write, busy: bool) -> io::Result<()> {
    if busy {
        write!(out, "\r{}", LOADING_TEXT)?;
    } else {
        write!(out, "\r{}\r", " ".repeat(LOADING_TEXT.len()))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::RequestLifecycle;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_write_failure_does_not_stop_other_observers() {
        let lifecycle = RequestLifecycle::new();
        let broken = GlobalLoader::attach(lifecycle.state(), Box::new(BrokenPipe));
        let buffer = SharedBuffer::default();
        let _loader = GlobalLoader::attach(lifecycle.state(), Box::new(buffer.clone()));

        lifecycle.begin().settle();

        assert!(buffer.contents().starts_with("\rLoading..."));
        assert!(buffer.contents().ends_with("\r"));
        assert!(!lifecycle.is_busy());
        assert!(broken.flush().is_err());
    }

    #[test]
    fn test_draws_once_per_busy_period() {
        let lifecycle = RequestLifecycle::new();
        let buffer = SharedBuffer::default();
        let _loader = GlobalLoader::attach(lifecycle.state(), Box::new(buffer.clone()));

        let a = lifecycle.begin();
        let b = lifecycle.begin();
        assert_eq!(buffer.contents(), "\rLoading...");

        a.settle();
        assert_eq!(buffer.contents().matches(LOADING_TEXT).count(), 1);
        b.settle();

        let out = buffer.contents();
        assert!(out.starts_with("\rLoading..."));
        assert!(out.ends_with("\r"));
        assert_eq!(out.matches(LOADING_TEXT).count(), 1);
    }
}
