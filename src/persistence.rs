//! Outbound persistence of box lists and the class list.
//!
//! Interaction code talks to a [`PersistenceSink`], which is fire-and-forget:
//! calls return immediately and never report failure to the caller. The
//! [`BackgroundSink`] forwards snapshots to a worker thread that writes them
//! through a [`StorageBackend`], in the order they were sent. Nothing is
//! retried or cancelled, so the last save initiated for an image is the one
//! that ends up on disk.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use web_time::Instant;

use crate::error::PersistError;
use crate::model::{BoxAnnotation, ClassDef};

/// Directory holding per-image annotation files, relative to the project root.
pub const ANNOTATIONS_DIR: &str = "annotations";
/// Class list file, relative to the project root.
pub const CLASSES_FILE: &str = "classes.json";

// ============================================================================
// Sink interface
// ============================================================================

/// Receiver of full-state snapshots.
///
/// Every call carries the complete current list; there is no diff protocol.
pub trait PersistenceSink {
    /// Save the full box list of one image.
    fn save_boxes(&self, image_name: &str, boxes: &[BoxAnnotation]);

    /// Save the full class list.
    fn save_classes(&self, classes: &[ClassDef]);

    /// Number of saves that have failed so far.
    fn failure_count(&self) -> usize {
        0
    }
}

// ============================================================================
// Storage backends
// ============================================================================

/// Synchronous writer used by the background worker.
pub trait StorageBackend: Send + 'static {
    fn write_boxes(&mut self, image_name: &str, boxes: &[BoxAnnotation])
    -> Result<(), PersistError>;

    fn write_classes(&mut self, classes: &[ClassDef]) -> Result<(), PersistError>;
}

/// Writes pretty-printed JSON files under a project directory.
///
/// Layout: `<root>/annotations/<image>.json` and `<root>/classes.json`.
#[derive(Debug, Clone)]
pub struct JsonDirBackend {
    root: PathBuf,
}

impl JsonDirBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the annotation file for an image.
    pub fn annotation_path(&self, image_name: &str) -> Result<PathBuf, PersistError> {
        if !is_plain_file_name(image_name) {
            return Err(PersistError::invalid_image_name(image_name));
        }
        Ok(self
            .root
            .join(ANNOTATIONS_DIR)
            .join(format!("{image_name}.json")))
    }

    pub fn classes_path(&self) -> PathBuf {
        self.root.join(CLASSES_FILE)
    }
}

/// A single path component with no separators or parent references.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl StorageBackend for JsonDirBackend {
    fn write_boxes(
        &mut self,
        image_name: &str,
        boxes: &[BoxAnnotation],
    ) -> Result<(), PersistError> {
        let path = self.annotation_path(image_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(boxes)?;
        fs::write(&path, json)?;
        log::debug!("Wrote {} boxes to {:?}", boxes.len(), path);
        Ok(())
    }

    fn write_classes(&mut self, classes: &[ClassDef]) -> Result<(), PersistError> {
        fs::create_dir_all(&self.root)?;
        let path = self.classes_path();
        let json = serde_json::to_string_pretty(classes)?;
        fs::write(&path, json)?;
        log::debug!("Wrote {} classes to {:?}", classes.len(), path);
        Ok(())
    }
}

// ============================================================================
// Background sink
// ============================================================================

/// Message sent to the persistence worker.
enum Job {
    /// Write one image's box list
    Boxes {
        image_name: String,
        boxes: Vec<BoxAnnotation>,
    },
    /// Write the class list
    Classes(Vec<ClassDef>),
    /// Reply once every earlier job has been processed
    Flush(Sender<()>),
    /// Shutdown the thread
    Shutdown,
}

/// Fire-and-forget sink that writes on a worker thread.
///
/// Dropping the sink flushes queued writes and joins the worker.
pub struct BackgroundSink {
    job_tx: Sender<Job>,
    thread_handle: Option<JoinHandle<()>>,
    failures: Arc<AtomicUsize>,
}

impl BackgroundSink {
    /// Spawn the worker thread.
    pub fn spawn<B: StorageBackend>(backend: B) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let failures = Arc::new(AtomicUsize::new(0));
        let worker_failures = Arc::clone(&failures);

        let thread_handle = thread::Builder::new()
            .name("persistence".to_string())
            .spawn(move || {
                log::debug!("Persistence worker started");
                Self::worker_loop(backend, job_rx, &worker_failures);
                log::debug!("Persistence worker exiting");
            })?;

        Ok(Self {
            job_tx,
            thread_handle: Some(thread_handle),
            failures,
        })
    }

    fn worker_loop<B: StorageBackend>(
        mut backend: B,
        job_rx: Receiver<Job>,
        failures: &AtomicUsize,
    ) {
        loop {
            match job_rx.recv() {
                Ok(Job::Boxes { image_name, boxes }) => {
                    let start = Instant::now();
                    match backend.write_boxes(&image_name, &boxes) {
                        Ok(()) => log::debug!(
                            "Saved {} boxes for '{}' in {:.1}ms",
                            boxes.len(),
                            image_name,
                            start.elapsed().as_secs_f64() * 1000.0
                        ),
                        Err(e) => {
                            failures.fetch_add(1, Ordering::Relaxed);
                            log::error!("Failed to save annotations for '{}': {}", image_name, e);
                        }
                    }
                }
                Ok(Job::Classes(classes)) => match backend.write_classes(&classes) {
                    Ok(()) => log::debug!("Saved {} classes", classes.len()),
                    Err(e) => {
                        failures.fetch_add(1, Ordering::Relaxed);
                        log::error!("Failed to save classes: {}", e);
                    }
                },
                Ok(Job::Flush(reply)) => {
                    let _ = reply.send(());
                }
                Ok(Job::Shutdown) | Err(_) => break,
            }
        }
    }

    fn send(&self, job: Job) {
        if self.job_tx.send(job).is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
            log::error!("Persistence worker is gone, dropping save");
        }
    }

    /// Block until every save sent so far has been written (or has failed).
    pub fn flush(&self) {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(Job::Flush(reply_tx));
        if reply_rx.recv().is_err() {
            log::warn!("Persistence worker exited before flush completed");
        }
    }
}

impl PersistenceSink for BackgroundSink {
    fn save_boxes(&self, image_name: &str, boxes: &[BoxAnnotation]) {
        self.send(Job::Boxes {
            image_name: image_name.to_string(),
            boxes: boxes.to_vec(),
        });
    }

    fn save_classes(&self, classes: &[ClassDef]) {
        self.send(Job::Classes(classes.to_vec()));
    }

    fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

impl Drop for BackgroundSink {
    fn drop(&mut self) {
        let _ = self.job_tx.send(Job::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::warn!("Persistence worker panicked");
            }
        }
    }
}

// ============================================================================
// Recording sink
// ============================================================================

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveCall {
    Boxes {
        image_name: String,
        boxes: Vec<BoxAnnotation>,
    },
    Classes(Vec<ClassDef>),
}

/// Sink that records calls in memory, for hosts that persist on their own
/// schedule and for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: RefCell<Vec<SaveCall>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<SaveCall> {
        self.calls.borrow().clone()
    }

    /// Take the recorded calls, leaving the sink empty.
    pub fn take_calls(&self) -> Vec<SaveCall> {
        self.calls.take()
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// The most recent box list saved for an image.
    pub fn last_boxes(&self, image_name: &str) -> Option<Vec<BoxAnnotation>> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            SaveCall::Boxes {
                image_name: name,
                boxes,
            } if name == image_name => Some(boxes.clone()),
            _ => None,
        })
    }
}

impl PersistenceSink for RecordingSink {
    fn save_boxes(&self, image_name: &str, boxes: &[BoxAnnotation]) {
        self.calls.borrow_mut().push(SaveCall::Boxes {
            image_name: image_name.to_string(),
            boxes: boxes.to_vec(),
        });
    }

    fn save_classes(&self, classes: &[ClassDef]) {
        self.calls
            .borrow_mut()
            .push(SaveCall::Classes(classes.to_vec()));
    }
}
