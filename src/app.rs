//! The editor: input dispatch, image loading and rendering for one project.
//!
//! [`Editor`] owns the workspace, the editing session, the interaction state
//! machine and the two outbound collaborators (image provider and persistence
//! sink). All state changes happen synchronously inside [`Editor::handle_event`]
//! and the other entry points; rendering reads state and mutates nothing.

use crate::config::AppConfig;
use crate::coords::{CanvasGeometry, ClientRect};
use crate::error::LoadError;
use crate::event::{InputEvent, Key, PointerButton};
use crate::image_loader::{Bitmap, ImageProvider, LoadTicket};
use crate::interaction::{Commit, Cursor, InteractionStateMachine};
use crate::keybindings::{KeyAction, KeyBindings};
use crate::model::ClassDef;
use crate::persistence::PersistenceSink;
use crate::project::ProjectData;
use crate::render::{BoxRenderer, Frame, Surface};
use crate::state::{EditorSession, Gesture, ImageSummary, InteractionMode, Workspace};

/// Status shown after a save has failed.
pub const SAVE_FAILED_MESSAGE: &str = "Save failed";

/// Selected box and its class, for a class-reassignment control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionInfo {
    pub index: usize,
    pub class_index: usize,
}

/// Interactive box editor over one project.
pub struct Editor<P: ImageProvider, S: PersistenceSink> {
    workspace: Workspace,
    session: EditorSession,
    machine: InteractionStateMachine,
    renderer: BoxRenderer,
    keybindings: KeyBindings,
    text_input_guard: bool,
    text_input_focused: bool,

    provider: P,
    sink: S,

    /// Display placement set by the host; `None` means 1:1 with the image
    display_bounds: Option<ClientRect>,
    canvas: CanvasGeometry,
    bitmap: Option<Bitmap>,
    /// Ticket of the decode the active image is waiting for
    pending: Option<LoadTicket>,

    cursor: Cursor,
    failures_seen: usize,
    status_message: Option<&'static str>,
}

impl<P: ImageProvider, S: PersistenceSink> Editor<P, S> {
    /// Create an editor with default settings. No image is selected.
    pub fn new(project: ProjectData, provider: P, sink: S) -> Self {
        Self {
            workspace: Workspace::from_project(project),
            session: EditorSession::new(),
            machine: InteractionStateMachine::default(),
            renderer: BoxRenderer::default(),
            keybindings: KeyBindings::default(),
            text_input_guard: true,
            text_input_focused: false,
            provider,
            sink,
            display_bounds: None,
            canvas: CanvasGeometry::default(),
            bitmap: None,
            pending: None,
            cursor: Cursor::Crosshair,
            failures_seen: 0,
            status_message: None,
        }
    }

    /// Apply preferences and keybindings from a config.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        let prefs = &config.preferences;
        self.machine = InteractionStateMachine::new(prefs.handle_size, prefs.min_box_size);
        self.renderer = BoxRenderer::new(prefs.handle_size);
        self.keybindings = config.keybindings.clone();
        self.text_input_guard = prefs.text_input_guard;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn canvas(&self) -> CanvasGeometry {
        self.canvas
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    /// Whether the active image has been decoded and can be rendered.
    pub fn is_ready(&self) -> bool {
        self.bitmap.is_some()
    }

    /// Whether a decode for the active image is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Cursor affordance for the last pointer position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn mode(&self) -> InteractionMode {
        self.session.mode()
    }

    pub fn classes(&self) -> &[ClassDef] {
        self.workspace.classes()
    }

    /// Set where the canvas is displayed. Pointer events are mapped from this
    /// rectangle onto the image.
    pub fn set_display_bounds(&mut self, bounds: ClientRect) {
        self.display_bounds = Some(bounds);
        self.canvas.bounds = bounds;
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Make image `index` active and start decoding it.
    ///
    /// The session is reset and the previous bitmap dropped. A decode still in
    /// flight for the previous image is ignored when it arrives.
    pub fn select_image(&mut self, index: usize) -> bool {
        if !self.workspace.set_current_image(index) {
            return false;
        }
        self.session.reset();
        self.bitmap = None;
        self.cursor = Cursor::Crosshair;

        let url = match self.workspace.current_image() {
            Some(image) => image.url.clone(),
            None => return false,
        };
        let ticket = self.provider.request(&url);
        self.pending = Some(ticket);
        log::info!(
            "Selected image {} '{}' (ticket {})",
            index,
            url,
            ticket.id()
        );
        true
    }

    /// Drain finished decodes. Returns true when the active image became
    /// ready.
    pub fn poll_images(&mut self) -> bool {
        let mut ready = false;
        while let Some((ticket, result)) = self.provider.poll() {
            ready |= self.accept_load(ticket, result);
        }
        ready
    }

    /// Handle one decode result. Results for anything but the active image
    /// are dropped.
    pub fn accept_load(&mut self, ticket: LoadTicket, result: Result<Bitmap, LoadError>) -> bool {
        if self.pending != Some(ticket) {
            log::debug!("Ignoring stale decode result (ticket {})", ticket.id());
            return false;
        }
        self.pending = None;

        match result {
            Ok(bitmap) => {
                let (width, height) = (bitmap.width(), bitmap.height());
                if let Some(image) = self.workspace.current_image_mut() {
                    image.width = width;
                    image.height = height;
                }
                self.canvas = match self.display_bounds {
                    Some(bounds) => CanvasGeometry {
                        bounds,
                        backing_width: width,
                        backing_height: height,
                    },
                    None => CanvasGeometry::identity(width, height),
                };
                self.bitmap = Some(bitmap);
                log::debug!("Image ready: {}x{}", width, height);
                true
            }
            Err(e) => {
                log::error!("Failed to load image: {}", e);
                false
            }
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Dispatch one input event. Returns true when a repaint is needed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        let redraw = match *event {
            InputEvent::PointerDown { x, y, button } => self.pointer_down(x, y, button),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp { x, y, button } => self.pointer_up(x, y, button),
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::TextInputFocus { focused } => {
                self.text_input_focused = focused;
                false
            }
            InputEvent::SelectImage { index } => self.select_image(index),
            InputEvent::SelectClass { index } => self.select_class(index),
            InputEvent::AddClass { ref name } => self.add_class(name).is_some(),
            InputEvent::DeleteClass { index } => self.delete_class(index),
            InputEvent::ReassignSelected { class_index } => {
                self.reassign_selected_class(class_index)
            }
        };
        self.refresh_status();
        redraw
    }

    fn pointer_down(&mut self, x: f32, y: f32, button: PointerButton) -> bool {
        if !self.is_ready() {
            log::trace!("Ignoring pointer down before image is ready");
            return false;
        }
        let point = self.canvas.to_image_space(x, y);
        self.machine.pointer_down(
            &mut self.session,
            self.workspace.current_boxes(),
            point,
            button,
        )
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        if !self.is_ready() {
            return false;
        }
        let point = self.canvas.to_image_space(x, y);
        let redraw = self.machine.pointer_move(&mut self.session, point);
        if let Some(cursor) =
            self.machine
                .hover(&self.session, self.workspace.current_boxes(), point)
        {
            self.cursor = cursor;
        }
        redraw
    }

    fn pointer_up(&mut self, x: f32, y: f32, button: PointerButton) -> bool {
        if !self.is_ready() {
            return false;
        }
        let point = self.canvas.to_image_space(x, y);
        let current_class = self.workspace.current_class();
        let Some(mut store) = self.workspace.store(&self.sink) else {
            self.session.reset();
            return false;
        };
        let was_active = !self.session.is_idle();
        let commit =
            self.machine
                .pointer_up(&mut self.session, &mut store, point, button, current_class);
        if let Some(commit) = commit {
            match commit {
                Commit::Created { index } => log::info!("Created box {}", index),
                Commit::Moved { index } => log::info!("Moved box {}", index),
                Commit::Resized { index } => log::info!("Resized box {}", index),
            }
        }
        was_active
    }

    fn key_down(&mut self, key: Key) -> bool {
        if self.text_input_guard && self.text_input_focused {
            log::trace!("Text input focused, ignoring {:?}", key);
            return false;
        }
        let Some(action) = self.keybindings.action_for_key(key) else {
            return false;
        };
        log::debug!("Key {:?} -> {}", key, action.description());
        match action {
            KeyAction::NextImage => self.step_image(1),
            KeyAction::PreviousImage => self.step_image(-1),
            KeyAction::DeleteSelected => self.delete_selected(),
        }
    }

    fn step_image(&mut self, delta: isize) -> bool {
        match self.workspace.step_target(delta) {
            Some(target) => self.select_image(target),
            None => false,
        }
    }

    // ========================================================================
    // Box and class operations
    // ========================================================================

    /// Delete the selected box and clear the selection.
    ///
    /// A gesture in progress is abandoned, since its index no longer refers
    /// to the same box.
    pub fn delete_selected(&mut self) -> bool {
        let Some(index) = self.session.selected else {
            return false;
        };
        self.session.selected = None;
        self.session.gesture = Gesture::Idle;
        let Some(mut store) = self.workspace.store(&self.sink) else {
            return false;
        };
        store.remove_box(index).is_some()
    }

    /// Change the class of the selected box.
    pub fn reassign_selected_class(&mut self, class_index: usize) -> bool {
        if class_index >= self.workspace.classes().len() {
            log::warn!("Ignoring reassignment to unknown class {}", class_index);
            return false;
        }
        let Some(index) = self.session.selected else {
            return false;
        };
        match self.workspace.store(&self.sink) {
            Some(mut store) => store.reassign_class(index, class_index),
            None => false,
        }
    }

    /// Add a class and make it current.
    pub fn add_class(&mut self, name: &str) -> Option<usize> {
        self.workspace.add_class(name, &self.sink)
    }

    pub fn select_class(&mut self, index: usize) -> bool {
        self.workspace.select_class(index)
    }

    /// Delete a class, cascading over every image.
    pub fn delete_class(&mut self, index: usize) -> bool {
        let selected = self.session.selected;
        match self.workspace.delete_class(index, selected, &self.sink) {
            Some(deletion) => {
                self.session.gesture = Gesture::Idle;
                self.session.selected = deletion.selected;
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Pick up background save failures reported by the sink. Called after
    /// every event; call it again after flushing the sink.
    pub fn refresh_status(&mut self) {
        let failures = self.sink.failure_count();
        if failures > self.failures_seen {
            log::warn!("{} save(s) failed", failures - self.failures_seen);
            self.failures_seen = failures;
            self.status_message = Some(SAVE_FAILED_MESSAGE);
        }
    }

    /// Generic message about background failures, if any occurred.
    pub fn status_message(&self) -> Option<&'static str> {
        self.status_message
    }

    /// One-line status for the active image.
    pub fn status_text(&self) -> String {
        self.workspace.status_text()
    }

    pub fn selection_info(&self) -> Option<SelectionInfo> {
        let boxes = self.workspace.current_boxes();
        let index = self.session.selected_within(boxes.len())?;
        Some(SelectionInfo {
            index,
            class_index: boxes[index].class_index,
        })
    }

    pub fn image_summaries(&self) -> Vec<ImageSummary> {
        self.workspace.image_summaries()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Repaint the active image. Returns false (drawing nothing) while the
    /// bitmap is not ready.
    pub fn render(&self, surface: &mut dyn Surface) -> bool {
        let Some(bitmap) = &self.bitmap else {
            return false;
        };
        let frame = Frame {
            bitmap,
            boxes: self.workspace.current_boxes(),
            classes: self.workspace.classes(),
            selected: self.session.selected,
            live_edit: self.session.live_edit(),
            preview: self
                .session
                .preview()
                .map(|rect| (rect, self.workspace.current_class())),
        };
        self.renderer.render(surface, &frame);
        true
    }
}
