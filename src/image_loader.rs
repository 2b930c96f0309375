//! Asynchronous image decoding.
//!
//! A [`ThreadedImageProvider`] owns a background thread that decodes images
//! with the `image` crate. Every request is tagged with a [`LoadTicket`]; the
//! caller keeps the ticket of the image it currently cares about and drops
//! results carrying any other ticket, so a late decode for an image that is
//! no longer active is ignored.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::error::LoadError;

// ============================================================================
// Bitmap
// ============================================================================

/// A decoded RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixels: image::RgbaImage,
}

impl Bitmap {
    pub fn from_rgba(pixels: image::RgbaImage) -> Self {
        Self { pixels }
    }

    /// A fully transparent bitmap of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::from_rgba(image::RgbaImage::new(width, height))
    }

    /// Decode an encoded image (PNG, JPEG, ...) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    /// Decode an image file.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let img = image::open(path)?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }
}

// ============================================================================
// Provider interface
// ============================================================================

/// Identifies one decode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Outcome of one decode request.
pub type LoadResult = (LoadTicket, Result<Bitmap, LoadError>);

/// Source of decoded bitmaps, addressed by image URL.
pub trait ImageProvider {
    /// Start decoding `url`. Never blocks.
    fn request(&mut self, url: &str) -> LoadTicket;

    /// Take one finished result, if any. Never blocks.
    fn poll(&mut self) -> Option<LoadResult>;
}

// ============================================================================
// Threaded provider
// ============================================================================

/// Message sent to the decoder thread.
enum ThreadMessage {
    /// Decode the file at the path
    Decode(LoadTicket, PathBuf),
    /// Shutdown the thread
    Shutdown,
}

/// Decodes images from a base directory on a background thread.
///
/// URLs are resolved relative to the base directory. Remote URLs are
/// rejected with [`LoadError::UnsupportedUrl`].
pub struct ThreadedImageProvider {
    base_dir: PathBuf,
    request_tx: Sender<ThreadMessage>,
    result_rx: Receiver<LoadResult>,
    thread_handle: Option<JoinHandle<()>>,
    next_id: u64,
    /// Results produced without reaching the thread (e.g. unsupported URLs)
    immediate: VecDeque<LoadResult>,
}

impl ThreadedImageProvider {
    /// Spawn the decoder thread.
    pub fn spawn(base_dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<LoadResult>();

        let thread_handle = thread::Builder::new()
            .name("image-decoder".to_string())
            .spawn(move || {
                log::debug!("Image decoder thread started");
                Self::thread_loop(request_rx, result_tx);
                log::debug!("Image decoder thread exiting");
            })
            .map_err(LoadError::Spawn)?;

        Ok(Self {
            base_dir: base_dir.into(),
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            next_id: 0,
            immediate: VecDeque::new(),
        })
    }

    fn thread_loop(request_rx: Receiver<ThreadMessage>, result_tx: Sender<LoadResult>) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Decode(ticket, path)) => {
                    log::debug!("Decoding {:?} (ticket {})", path, ticket.id());
                    let result = Bitmap::open(&path);
                    if let Err(e) = &result {
                        log::debug!("Failed to decode {:?}: {}", path, e);
                    }
                    if result_tx.send((ticket, result)).is_err() {
                        log::warn!("Result channel closed, decoder thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) | Err(_) => break,
            }
        }
    }

    /// Resolve an image URL to a file path.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, LoadError> {
        if url.contains("://") {
            return Err(LoadError::UnsupportedUrl(url.to_string()));
        }
        Ok(self.base_dir.join(url.trim_start_matches('/')))
    }

    /// Block until a result is available. Used by batch front ends.
    pub fn wait(&mut self) -> Option<LoadResult> {
        if let Some(result) = self.immediate.pop_front() {
            return Some(result);
        }
        self.result_rx.recv().ok()
    }

    fn next_ticket(&mut self) -> LoadTicket {
        let ticket = LoadTicket(self.next_id);
        self.next_id += 1;
        ticket
    }
}

impl ImageProvider for ThreadedImageProvider {
    fn request(&mut self, url: &str) -> LoadTicket {
        let ticket = self.next_ticket();
        match self.resolve(url) {
            Ok(path) => {
                if self
                    .request_tx
                    .send(ThreadMessage::Decode(ticket, path))
                    .is_err()
                {
                    log::error!("Failed to send decode request: channel closed");
                    self.immediate.push_back((ticket, Err(LoadError::WorkerGone)));
                }
            }
            Err(e) => self.immediate.push_back((ticket, Err(e))),
        }
        ticket
    }

    fn poll(&mut self) -> Option<LoadResult> {
        if let Some(result) = self.immediate.pop_front() {
            return Some(result);
        }
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Decoder thread disconnected");
                None
            }
        }
    }
}

impl Drop for ThreadedImageProvider {
    fn drop(&mut self) {
        let _ = self.request_tx.send(ThreadMessage::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::warn!("Image decoder thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]));
        img.save(dir.join(name)).expect("write png");
    }

    #[test]
    fn test_decode_from_memory_rejects_garbage() {
        assert!(Bitmap::decode(b"not an image").is_err());
    }

    #[test]
    fn test_threaded_provider_decodes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "a.png", 7, 5);

        let mut provider = ThreadedImageProvider::spawn(dir.path()).expect("spawn");
        let ticket = provider.request("a.png");
        let (got, result) = provider.wait().expect("result");
        assert_eq!(got, ticket);
        let bitmap = result.expect("decoded");
        assert_eq!((bitmap.width(), bitmap.height()), (7, 5));
    }

    #[test]
    fn test_tickets_are_unique_and_ordered() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "a.png", 2, 2);
        let mut provider = ThreadedImageProvider::spawn(dir.path()).expect("spawn");
        let first = provider.request("a.png");
        let second = provider.request("/a.png");
        assert!(second > first);
        let (t1, _) = provider.wait().expect("first");
        let (t2, r2) = provider.wait().expect("second");
        assert_eq!((t1, t2), (first, second));
        assert!(r2.is_ok());
    }

    #[test]
    fn test_missing_file_reports_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut provider = ThreadedImageProvider::spawn(dir.path()).expect("spawn");
        let ticket = provider.request("missing.png");
        let (got, result) = provider.wait().expect("result");
        assert_eq!(got, ticket);
        assert!(result.is_err());
    }

    #[test]
    fn test_remote_url_rejected_without_thread() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut provider = ThreadedImageProvider::spawn(dir.path()).expect("spawn");
        let ticket = provider.request("https://example.com/a.png");
        let (got, result) = provider.poll().expect("immediate result");
        assert_eq!(got, ticket);
        assert!(matches!(result, Err(LoadError::UnsupportedUrl(_))));
    }

    #[test]
    fn test_immediate_results_in_ticket_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut provider = ThreadedImageProvider::spawn(dir.path()).expect("spawn");
        let first = provider.request("https://example.com/a.png");
        let second = provider.request("ftp://example.com/b.png");
        assert_eq!(provider.poll().map(|(t, _)| t), Some(first));
        assert_eq!(provider.wait().map(|(t, _)| t), Some(second));
    }
}
