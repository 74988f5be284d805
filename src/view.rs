//! The embeddable layout view
//!
//! [`NestingView`] ties the request session, the viewport, and pointer
//! interaction together behind one component. It draws a status panel
//! while a request is in flight or failed, and the composed layout scene
//! otherwise.

use crate::config::ViewerConfig;
use crate::error::ExportError;
use crate::layout::NestingLayout;
use crate::renderer::{
    compose, export, render_svg, ExportOptions, Interaction, PointerEvent, Scene, SceneInput,
    SceneStatus, Selection, ViewCommand, ViewEvent,
};
use crate::source::{
    LayoutRequest, LayoutResponse, LayoutSession, LayoutSource, RequestToken, Resolution,
    ViewStatus,
};
use crate::viewport::Viewport;

type ItemCallback = Box<dyn FnMut(i64)>;
type SelectionCallback = Box<dyn FnMut(Option<i64>)>;

pub struct NestingView {
    config: ViewerConfig,
    session: LayoutSession,
    viewport: Viewport,
    interaction: Interaction,
    on_item_click: Option<ItemCallback>,
    on_selection_change: Option<SelectionCallback>,
}

impl Default for NestingView {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl NestingView {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            session: LayoutSession::new(config.canvas.clone(), config.packer.clone()),
            viewport: Viewport::new(config.viewport),
            interaction: Interaction::new(),
            on_item_click: None,
            on_selection_change: None,
            config,
        }
    }

    /// Called with the item id on every click on a placement
    pub fn on_item_click(mut self, callback: impl FnMut(i64) + 'static) -> Self {
        self.on_item_click = Some(Box::new(callback));
        self
    }

    /// Called whenever the selected id changes
    pub fn on_selection_change(mut self, callback: impl FnMut(Option<i64>) + 'static) -> Self {
        self.on_selection_change = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn session(&self) -> &LayoutSession {
        &self.session
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selection(&self) -> &Selection {
        self.interaction.selection()
    }

    pub fn layout(&self) -> Option<&NestingLayout> {
        self.session.layout()
    }

    pub fn select(&mut self, id: Option<i64>) {
        self.interaction.select(id);
    }

    pub fn hover(&mut self, id: Option<i64>) {
        self.interaction.hover(id);
    }

    /// Display `layout` directly. `key` identifies it; a new key resets the view.
    pub fn set_layout(&mut self, layout: NestingLayout, key: &str) {
        self.session.replace(layout, key);
        self.observe_key();
    }

    fn observe_key(&mut self) {
        if let Some(key) = self.session.layout_key() {
            if self.viewport.observe_layout(key) {
                self.interaction.clear();
            }
        }
    }

    /// Start a request; the view shows the loading panel until it resolves
    pub fn request(&mut self, request: LayoutRequest) -> RequestToken {
        self.session.begin(request)
    }

    /// Apply a response. A new nesting or new parameters reset the view.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<LayoutResponse, crate::error::LoadError>,
    ) -> Resolution {
        let resolution = self.session.resolve(token, result);
        if resolution == Resolution::Applied && *self.session.status() == ViewStatus::Ready {
            self.observe_key();
        }
        resolution
    }

    pub fn load(&mut self, source: &dyn LayoutSource, request: LayoutRequest) -> Resolution {
        let token = self.request(request.clone());
        let result = source.fetch(&request);
        self.resolve(token, result)
    }

    /// Re-issue the last request
    pub fn retry(&mut self, source: &dyn LayoutSource) -> Option<Resolution> {
        let (token, request) = self.session.retry()?;
        let result = source.fetch(&request);
        Some(self.resolve(token, result))
    }

    /// Compose the current frame
    pub fn scene(&self) -> Scene {
        let (width, height) = (self.config.canvas.width, self.config.canvas.height);
        let stylesheet = &self.config.stylesheet;
        let status = match self.session.status() {
            ViewStatus::Idle => SceneStatus::Empty,
            ViewStatus::Loading => SceneStatus::Loading,
            ViewStatus::Failed { message, retryable } => SceneStatus::Error {
                message: message.clone(),
                retryable: *retryable,
            },
            ViewStatus::Ready => match self.session.layout() {
                Some(layout) => {
                    return compose(&SceneInput {
                        layout,
                        viewport: self.viewport.state(),
                        canvas: &self.config.canvas,
                        display: &self.config.display,
                        stylesheet,
                        selection: self.interaction.selection(),
                    })
                }
                None => SceneStatus::Empty,
            },
        };
        Scene::status_panel(status, width, height, stylesheet)
    }

    pub fn svg(&self) -> String {
        render_svg(&self.scene(), &self.config.svg)
    }

    /// Feed a pointer event; returns what changed
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<ViewEvent> {
        let scene = self.scene();
        let events = self.interaction.handle(event, &mut self.viewport, &scene);
        for event in &events {
            match event {
                ViewEvent::ItemClicked(id) => {
                    if let Some(callback) = self.on_item_click.as_mut() {
                        callback(*id);
                    }
                }
                ViewEvent::SelectionChanged(id) => {
                    if let Some(callback) = self.on_selection_change.as_mut() {
                        callback(*id);
                    }
                }
                _ => {}
            }
        }
        events
    }

    pub fn apply_command(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        let scene = self.scene();
        self.interaction.apply(command, &mut self.viewport, &scene)
    }

    /// Rasterize the current frame. Viewport state is not touched.
    pub fn export_png(&self, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
        export::export_png(&self.svg(), options)
    }

    pub fn export_png_data_uri(&self, options: &ExportOptions) -> Result<String, ExportError> {
        Ok(export::png_data_uri(&self.export_png(options)?))
    }
}
