//! Embedded content view abstraction

/// How a content surface must be configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    /// Host this surface belongs to
    pub host_url: String,
    /// First url to load (last visited path or the host url)
    pub initial_url: String,
    /// Run content isolated from the shell's own script context
    pub isolated: bool,
    pub allow_popups: bool,
    /// Bridge script injected before content scripts run
    pub bridge_script: String,
    /// Lay the surface out for a visible sidebar
    pub sidebar_visible: bool,
}

/// One embedded browser view
///
/// All calls are fire-and-forget; the embedding runtime reports results
/// back through the shell's inbound hooks.
pub trait ContentSurface: Send + Sync {
    fn load_url(&self, url: &str);

    fn reload(&self);

    /// Show or hide the surface
    fn set_active(&self, active: bool);

    fn focus(&self);

    fn go_back(&self);

    fn go_forward(&self);

    /// Post a message to the hosted content on `channel`
    fn send(&self, channel: &str, payload: &serde_json::Value);

    /// Re-layout for a shown or hidden sidebar
    fn apply_sidebar_layout(&self, sidebar_visible: bool);

    fn destroy(&self);
}

/// Creates content surfaces
///
/// The landing surface (add-host screen) is owned by the factory's runtime;
/// the view manager only toggles it.
pub trait ContentSurfaceFactory: Send + Sync {
    /// Create a hidden surface already navigating to `spec.initial_url`
    fn create(&self, spec: &SurfaceSpec) -> Box<dyn ContentSurface>;

    fn set_landing_visible(&self, visible: bool);
}
