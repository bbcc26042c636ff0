use facade_environment::{EnvironmentLoader, EnvironmentMap, LoadState};
use facade_input::{InputEvent, InteractionController};
use facade_render::{OrbitCamera, ViewerSettings};
use facade_render_wgpu::FrameContent;
use facade_scene::{Scene, build_facade};
use glam::Vec2;
use std::sync::Arc;

/// How far the one-shot environment load has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting on the environment; only the background is shown.
    Loading,
    /// Scene and environment are both available.
    Ready,
    /// No environment (disabled or failed); the scene renders without reflections.
    WithoutEnvironment,
}

/// Result of advancing the shell by one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    pub content: FrameContent,
    /// Set exactly once, on the frame the environment becomes ready.
    pub environment: Option<Arc<EnvironmentMap>>,
    pub camera_moved: bool,
}

/// Everything the viewer knows besides the GPU: the scene, the camera and
/// how input drives it, and the environment load.
pub struct ViewerState {
    scene: Scene,
    settings: ViewerSettings,
    camera: OrbitCamera,
    controller: InteractionController,
    loader: Option<EnvironmentLoader>,
    phase: Phase,
    viewport: Vec2,
}

impl ViewerState {
    /// Build the scene and start loading the configured environment.
    pub fn new(settings: ViewerSettings) -> Self {
        let loader = settings.environment.map(EnvironmentLoader::spawn);
        Self::with_loader(settings, loader)
    }

    pub fn with_loader(settings: ViewerSettings, loader: Option<EnvironmentLoader>) -> Self {
        let scene = build_facade();
        tracing::info!("{}", scene.summary());

        let camera = OrbitCamera::from_settings(&settings.camera);
        let controller = InteractionController::new(camera.constraints.modes());
        let phase = if loader.is_some() {
            Phase::Loading
        } else {
            Phase::WithoutEnvironment
        };
        let (width, height) = settings.window_size;

        let mut state = Self {
            scene,
            settings,
            camera,
            controller,
            loader,
            phase,
            viewport: Vec2::ONE,
        };
        state.set_viewport(width, height);
        state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Track the drawable size in physical pixels.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        self.camera.aspect = self.viewport.x / self.viewport.y;
    }

    /// Route one input event through the interaction state machine into the
    /// camera. Returns whether the camera moved.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match self.controller.handle(event) {
            Some(action) => {
                tracing::trace!(?action, "camera action");
                self.camera.apply(action, self.viewport)
            }
            None => false,
        }
    }

    /// The cursor left the window; the next move starts a fresh delta.
    pub fn pointer_left(&mut self) {
        self.controller.reset_pointer();
    }

    /// Poll the environment load and settle camera damping.
    pub fn tick(&mut self) -> FrameUpdate {
        let mut environment = None;
        if self.phase == Phase::Loading
            && let Some(loader) = &mut self.loader
        {
            match loader.poll() {
                LoadState::Loading => {}
                LoadState::Ready(map) => {
                    environment = Some(Arc::clone(map));
                    self.phase = Phase::Ready;
                    tracing::debug!("scene revealed");
                }
                LoadState::Failed(e) => {
                    tracing::warn!("rendering without environment: {e}");
                    self.phase = Phase::WithoutEnvironment;
                }
            }
        }

        let camera_moved = self.camera.update();
        let content = match self.phase {
            Phase::Loading => FrameContent::Background,
            Phase::Ready | Phase::WithoutEnvironment => FrameContent::Scene,
        };
        FrameUpdate {
            content,
            environment,
            camera_moved,
        }
    }

    /// A map could not be used after loading; keep rendering without it.
    pub fn environment_rejected(&mut self) {
        self.phase = Phase::WithoutEnvironment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facade_environment::EnvironmentPreset;
    use facade_input::{InteractionState, PointerButton};
    use std::time::{Duration, Instant};

    fn no_environment() -> ViewerState {
        let settings = ViewerSettings {
            environment: None,
            ..ViewerSettings::default()
        };
        ViewerState::new(settings)
    }

    #[test]
    fn starts_at_initial_view() {
        let state = no_environment();
        let eye = state.camera().position();
        assert!((eye - glam::Vec3::new(15.0, 5.0, 15.0)).length() < 1e-3);
        assert_eq!(state.camera().fov_degrees, 50.0);
        assert!((state.camera().aspect - 1280.0 / 720.0).abs() < 1e-6);
        assert_eq!(state.scene().primitives().len(), 29);
    }

    #[test]
    fn without_environment_scene_shows_immediately() {
        let mut state = no_environment();
        assert_eq!(state.phase(), Phase::WithoutEnvironment);
        let update = state.tick();
        assert_eq!(update.content, FrameContent::Scene);
        assert!(update.environment.is_none());
    }

    #[test]
    fn ready_environment_is_handed_over_once() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let loader = EnvironmentLoader::ready(map);
        let mut state = ViewerState::with_loader(ViewerSettings::default(), Some(loader));
        assert_eq!(state.phase(), Phase::Loading);

        let first = state.tick();
        assert_eq!(first.content, FrameContent::Scene);
        assert!(first.environment.is_some());
        assert_eq!(state.phase(), Phase::Ready);

        let second = state.tick();
        assert!(second.environment.is_none());
        assert_eq!(second.content, FrameContent::Scene);
    }

    #[test]
    fn background_only_while_loading() {
        let mut state = ViewerState::new(ViewerSettings::default());
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut saw_scene = false;
        while Instant::now() < deadline {
            let update = state.tick();
            match state.phase() {
                Phase::Loading => assert_eq!(update.content, FrameContent::Background),
                _ => {
                    assert_eq!(update.content, FrameContent::Scene);
                    saw_scene = true;
                    break;
                }
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(saw_scene);
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn rejected_environment_degrades() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let loader = EnvironmentLoader::ready(map);
        let mut state = ViewerState::with_loader(ViewerSettings::default(), Some(loader));
        state.tick();
        state.environment_rejected();
        assert_eq!(state.phase(), Phase::WithoutEnvironment);
        assert_eq!(state.tick().content, FrameContent::Scene);
    }

    #[test]
    fn drag_rotates_camera() {
        let mut state = no_environment();
        let azimuth = state.camera().azimuth();
        state.handle_input(InputEvent::PointerMoved(Vec2::new(100.0, 100.0)));
        state.handle_input(InputEvent::PointerPressed(PointerButton::Primary));
        let drag = InputEvent::PointerMoved(Vec2::new(160.0, 100.0));
        assert!(state.handle_input(drag));
        for _ in 0..400 {
            state.tick();
        }
        assert!((state.camera().azimuth() - azimuth).abs() > 0.1);
    }

    #[test]
    fn scroll_zooms_only_when_idle() {
        let mut state = no_environment();
        let distance = state.camera().distance();
        state.handle_input(InputEvent::PointerPressed(PointerButton::Secondary));
        assert!(!state.handle_input(InputEvent::Scrolled(3.0)));
        assert!((state.camera().distance() - distance).abs() < 1e-4);

        state.handle_input(InputEvent::PointerReleased(PointerButton::Secondary));
        assert!(state.handle_input(InputEvent::Scrolled(3.0)));
        assert!(state.camera().distance() < distance);
    }

    #[test]
    fn zoom_in_hard_stops_at_min_distance() {
        let mut state = no_environment();
        for _ in 0..200 {
            state.handle_input(InputEvent::Scrolled(5.0));
        }
        assert_eq!(state.camera().distance(), 5.0);
        assert_eq!(state.controller.state(), InteractionState::Idle);
    }

    #[test]
    fn pointer_left_forgets_last_position() {
        let mut state = no_environment();
        state.handle_input(InputEvent::PointerPressed(PointerButton::Primary));
        state.handle_input(InputEvent::PointerMoved(Vec2::new(0.0, 0.0)));
        state.pointer_left();
        // First move after re-entry has no previous point to diff against.
        let reentry = InputEvent::PointerMoved(Vec2::new(500.0, 0.0));
        assert!(!state.handle_input(reentry));
    }
}
