// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accelerated-surface state machine.
//!
//! [`SurfaceState`] tracks the negotiated geometry, fullscreen flag, configure
//! acknowledgment and the outstanding frame callback of the single on-screen
//! surface. Every side effect it needs from the compositor or the graphics
//! stack goes through [`SurfaceRequests`], so the state machine runs the same
//! against a live Wayland connection and against a recording fake.
//!
//! # States
//!
//! ```text
//!              start() / toggle_fullscreen()
//!   ┌──────────────┐ ──────────────────────► ┌──────────────┐
//!   │  Configured  │                         │ Unconfigured │
//!   └──────────────┘ ◄────────────────────── └──────────────┘
//!        │  ▲     last outstanding on_configure_sync()
//!        ▼  │
//!     redraw ◄── on_frame_done()
//! ```
//!
//! Fullscreen/windowed is an orthogonal flag. Requests for either are sent
//! immediately, but the resulting geometry is only applied from
//! [`SurfaceState::on_configure`], never speculatively.
//!
//! # Configure sequence
//!
//! ```text
//!   toplevel configure ──► on_toplevel_configure()   pending, last one wins
//!   surface configure  ──► on_ack()                  on_configure(pending)
//!   sync done          ──► on_configure_sync()       held until the first ack
//! ```
//!
//! A configure that arrives while a later request is still outstanding
//! answers a superseded toggle: it is acknowledged but its geometry is not
//! applied. Only configures that describe a windowed surface update the
//! remembered window size.
//!
//! # Frame pacing
//!
//! At most one frame callback is in flight. A redraw renders, updates the
//! opaque region, subscribes to the next frame callback and swaps. Further
//! redraws wait for that callback; a synchronization callback that lands while
//! a frame is in flight does not paint.

use alloc::vec::Vec;

use crate::geometry::Size;

/// Compositor and graphics requests issued by [`SurfaceState`].
///
/// Implementations translate each call into protocol requests (or EGL calls);
/// test doubles record them.
pub trait SurfaceRequests {
    /// Resizes the native accelerated drawable.
    fn resize_drawable(&mut self, size: Size);
    /// Asks the compositor to make the surface fullscreen.
    fn set_fullscreen(&mut self);
    /// Asks the compositor to make the surface a regular toplevel.
    fn set_windowed(&mut self);
    /// Requests a synchronization callback that completes once the compositor
    /// has processed every earlier request.
    fn request_configure_sync(&mut self);
    /// Invokes the caller's render callback.
    fn render(&mut self, frame: FrameInfo);
    /// Sets the opaque region to the full rectangle of `Some(size)`, or clears
    /// it with `None`.
    fn set_opaque_region(&mut self, region: Option<Size>);
    /// Subscribes to the next frame callback.
    fn request_frame(&mut self);
    /// Swaps the accelerated buffers, committing the surface.
    fn swap_buffers(&mut self);
}

/// Per-redraw information handed to the render callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameInfo {
    /// Current surface geometry.
    pub geometry: Size,
    /// Compositor timestamp, in milliseconds, of the callback that triggered
    /// this redraw. The base is undefined; only differences are meaningful.
    pub time_ms: u32,
    /// Number of redraws before this one.
    pub frame_index: u64,
}

/// A toplevel configuration proposed by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Configure {
    /// Proposed size; a zero dimension leaves the choice to the client.
    pub size: Size,
    /// Whether the compositor describes the surface as fullscreen.
    pub fullscreen: bool,
}

impl Configure {
    /// A configure for a regular toplevel.
    #[must_use]
    pub const fn windowed(size: Size) -> Self {
        Self {
            size,
            fullscreen: false,
        }
    }

    /// A configure carrying the fullscreen state.
    #[must_use]
    pub const fn fullscreen(size: Size) -> Self {
        Self {
            size,
            fullscreen: true,
        }
    }
}

/// Configuration state of the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A fullscreen/windowed request is awaiting compositor acknowledgment.
    Unconfigured,
    /// The last requested configuration has been acknowledged.
    Configured,
}

/// State of the single accelerated surface.
#[derive(Clone, Debug)]
pub struct SurfaceState {
    geometry: Size,
    window_size: Size,
    fullscreen: bool,
    opaque: bool,
    configured: bool,
    pending_syncs: u32,
    acknowledged: bool,
    pending_configure: Option<Configure>,
    held_syncs: Vec<u32>,
    frame_pending: bool,
    frame_index: u64,
}

impl SurfaceState {
    /// Creates the state for a freshly created drawable of `window_size`.
    ///
    /// The surface starts [`Phase::Unconfigured`]; call [`start`](Self::start)
    /// once the compositor objects exist.
    #[must_use]
    pub const fn new(window_size: Size, fullscreen: bool, opaque: bool) -> Self {
        Self {
            geometry: window_size,
            window_size,
            fullscreen,
            opaque,
            configured: false,
            pending_syncs: 0,
            acknowledged: false,
            pending_configure: None,
            held_syncs: Vec::new(),
            frame_pending: false,
            frame_index: 0,
        }
    }

    /// Current geometry of the drawable.
    #[must_use]
    pub const fn geometry(&self) -> Size {
        self.geometry
    }

    /// Geometry restored when leaving fullscreen.
    #[must_use]
    pub const fn window_size(&self) -> Size {
        self.window_size
    }

    /// Whether fullscreen is the requested state.
    #[must_use]
    pub const fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Whether the surface is marked opaque.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Whether the last requested configuration has been acknowledged.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.configured
    }

    /// Returns the current [`Phase`].
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.configured {
            Phase::Configured
        } else {
            Phase::Unconfigured
        }
    }

    /// Whether a frame callback is outstanding.
    #[must_use]
    pub const fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Number of redraws performed so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// Issues the initial fullscreen-to-current-state request.
    ///
    /// This forces a deterministic first configuration round-trip instead of
    /// waiting for an unsolicited one.
    pub fn start(&mut self, requests: &mut impl SurfaceRequests) {
        self.request_fullscreen(self.fullscreen, requests);
    }

    /// Flips between fullscreen and windowed.
    ///
    /// The request is issued even while unconfigured; only the configuration
    /// following the last outstanding request is applied.
    pub fn toggle_fullscreen(&mut self, requests: &mut impl SurfaceRequests) {
        self.request_fullscreen(!self.fullscreen, requests);
    }

    fn request_fullscreen(&mut self, fullscreen: bool, requests: &mut impl SurfaceRequests) {
        tracing::debug!(fullscreen, "requesting surface state");
        self.fullscreen = fullscreen;
        self.configured = false;
        if fullscreen {
            requests.set_fullscreen();
        } else {
            requests.set_windowed();
        }
        self.pending_syncs += 1;
        requests.request_configure_sync();
    }

    /// Records a toplevel configure until its surface configure arrives.
    ///
    /// Only the latest proposal is kept.
    pub fn on_toplevel_configure(&mut self, configure: Configure) {
        self.pending_configure = Some(configure);
    }

    /// Handles a surface configure once its serial has been acknowledged,
    /// applying the pending toplevel configure if there is one.
    pub fn on_ack(&mut self, requests: &mut impl SurfaceRequests) {
        match self.pending_configure.take() {
            Some(configure) => self.on_configure(configure, requests),
            None => self.acknowledge(requests),
        }
    }

    /// Applies a compositor configure event.
    ///
    /// A zero dimension lets the client choose: windowed configures fall back
    /// to the remembered window size, fullscreen ones keep the geometry.
    pub fn on_configure(&mut self, configure: Configure, requests: &mut impl SurfaceRequests) {
        if self.pending_syncs > 1 {
            tracing::debug!(?configure, "ignoring configure for a superseded request");
        } else {
            self.apply(configure, requests);
        }
        self.acknowledge(requests);
    }

    fn apply(&mut self, configure: Configure, requests: &mut impl SurfaceRequests) {
        let size = if !configure.size.is_empty() {
            configure.size
        } else if configure.fullscreen {
            self.geometry
        } else {
            self.window_size
        };

        if size != self.geometry {
            tracing::debug!(from = ?self.geometry, to = ?size, "resizing drawable");
            requests.resize_drawable(size);
        }
        self.geometry = size;

        if !configure.fullscreen {
            self.window_size = size;
        }
    }

    fn acknowledge(&mut self, requests: &mut impl SurfaceRequests) {
        if self.acknowledged {
            return;
        }
        self.acknowledged = true;
        for time_ms in core::mem::take(&mut self.held_syncs) {
            self.on_configure_sync(time_ms, requests);
        }
    }

    /// Handles completion of a synchronization callback.
    ///
    /// Returns `true` if the surface became configured. When no frame callback
    /// is outstanding this paints immediately, so every configuration change
    /// is drawn at least once. Syncs completing before any configure was
    /// acknowledged are held and replayed after it: nothing may be attached
    /// to the surface before then.
    pub fn on_configure_sync(&mut self, time_ms: u32, requests: &mut impl SurfaceRequests) -> bool {
        if !self.acknowledged {
            tracing::debug!("holding configure sync until the first configure");
            self.held_syncs.push(time_ms);
            return false;
        }
        self.pending_syncs = self.pending_syncs.saturating_sub(1);
        if self.pending_syncs > 0 {
            tracing::debug!(
                outstanding = self.pending_syncs,
                "ignoring superseded configure sync"
            );
            return false;
        }

        self.configured = true;
        if !self.frame_pending {
            self.redraw(time_ms, requests);
        }
        true
    }

    /// Handles a frame callback. Returns `true` if a redraw happened.
    pub fn on_frame_done(&mut self, time_ms: u32, requests: &mut impl SurfaceRequests) -> bool {
        if !self.frame_pending {
            tracing::debug!("ignoring stale frame callback");
            return false;
        }
        self.frame_pending = false;
        self.redraw(time_ms, requests)
    }

    fn redraw(&mut self, time_ms: u32, requests: &mut impl SurfaceRequests) -> bool {
        if !self.configured || self.frame_pending {
            return false;
        }

        requests.render(FrameInfo {
            geometry: self.geometry,
            time_ms,
            frame_index: self.frame_index,
        });
        self.frame_index += 1;

        let region = (self.opaque || self.fullscreen).then_some(self.geometry);
        requests.set_opaque_region(region);

        requests.request_frame();
        self.frame_pending = true;

        requests.swap_buffers();
        true
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{Configure, FrameInfo, Phase, SurfaceRequests, SurfaceState};
    use crate::geometry::Size;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Request {
        Resize(Size),
        Fullscreen,
        Windowed,
        Sync,
        Render(FrameInfo),
        Opaque(Option<Size>),
        Frame,
        Swap,
    }

    #[derive(Default)]
    struct Recorder {
        log: Vec<Request>,
    }

    impl Recorder {
        fn take(&mut self) -> Vec<Request> {
            core::mem::take(&mut self.log)
        }

        fn renders(&self) -> usize {
            self.log
                .iter()
                .filter(|r| matches!(r, Request::Render(_)))
                .count()
        }
    }

    impl SurfaceRequests for Recorder {
        fn resize_drawable(&mut self, size: Size) {
            self.log.push(Request::Resize(size));
        }
        fn set_fullscreen(&mut self) {
            self.log.push(Request::Fullscreen);
        }
        fn set_windowed(&mut self) {
            self.log.push(Request::Windowed);
        }
        fn request_configure_sync(&mut self) {
            self.log.push(Request::Sync);
        }
        fn render(&mut self, frame: FrameInfo) {
            self.log.push(Request::Render(frame));
        }
        fn set_opaque_region(&mut self, region: Option<Size>) {
            self.log.push(Request::Opaque(region));
        }
        fn request_frame(&mut self) {
            self.log.push(Request::Frame);
        }
        fn swap_buffers(&mut self) {
            self.log.push(Request::Swap);
        }
    }

    const EDGE: Size = Size::new(250, 250);

    fn started(fullscreen: bool) -> (SurfaceState, Recorder) {
        let mut surface = SurfaceState::new(EDGE, fullscreen, false);
        let mut rec = Recorder::default();
        surface.start(&mut rec);
        (surface, rec)
    }

    #[test]
    fn start_requests_current_state_and_sync() {
        let (surface, mut rec) = started(false);
        assert_eq!(rec.take(), [Request::Windowed, Request::Sync]);
        assert_eq!(surface.phase(), Phase::Unconfigured);

        let (surface, mut rec) = started(true);
        assert_eq!(rec.take(), [Request::Fullscreen, Request::Sync]);
        assert!(surface.is_fullscreen());
    }

    #[test]
    fn first_sync_configures_and_paints_once_before_next_frame() {
        let (mut surface, mut rec) = started(false);
        rec.take();

        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        assert!(surface.on_configure_sync(10, &mut rec));
        assert!(surface.is_configured());

        assert_eq!(
            rec.take(),
            [
                Request::Render(FrameInfo {
                    geometry: EDGE,
                    time_ms: 10,
                    frame_index: 0,
                }),
                Request::Opaque(None),
                Request::Frame,
                Request::Swap,
            ]
        );
    }

    #[test]
    fn configured_persists_across_configure_events() {
        let (mut surface, mut rec) = started(false);
        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        surface.on_configure_sync(0, &mut rec);

        for size in [Size::new(300, 200), Size::new(0, 0), Size::new(800, 600)] {
            surface.on_configure(Configure::windowed(size), &mut rec);
            assert!(surface.is_configured(), "configure must not unconfigure");
        }
    }

    #[test]
    fn at_most_one_frame_in_flight() {
        let (mut surface, mut rec) = started(false);
        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        assert!(surface.frame_pending());
        rec.take();

        // A toggle round-trip while a frame is in flight must not paint.
        surface.toggle_fullscreen(&mut rec);
        surface.on_configure(Configure::fullscreen(Size::new(1920, 1080)), &mut rec);
        assert!(surface.on_configure_sync(5, &mut rec));
        assert_eq!(rec.renders(), 0);

        // The outstanding frame callback resumes painting.
        assert!(surface.on_frame_done(16, &mut rec));
        assert_eq!(rec.renders(), 1);
        assert!(surface.frame_pending());

        let frames = rec.log.iter().filter(|r| **r == Request::Frame).count();
        assert_eq!(frames, 1);
    }

    #[test]
    fn frame_done_without_outstanding_callback_is_ignored() {
        let (mut surface, mut rec) = started(false);
        rec.take();

        assert!(!surface.on_frame_done(16, &mut rec));
        assert!(rec.take().is_empty());

        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        assert_eq!(rec.renders(), 1);
    }

    #[test]
    fn frame_done_while_unconfigured_stops_painting_until_sync() {
        let (mut surface, mut rec) = started(false);
        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        surface.toggle_fullscreen(&mut rec);
        rec.take();

        assert!(!surface.on_frame_done(16, &mut rec));
        assert!(rec.take().is_empty());
        assert!(!surface.frame_pending());

        surface.on_configure(Configure::fullscreen(Size::new(1280, 720)), &mut rec);
        surface.on_configure_sync(20, &mut rec);
        assert_eq!(rec.renders(), 1);
    }

    #[test]
    fn fullscreen_round_trip_restores_window_size() {
        let (mut surface, mut rec) = started(false);
        surface.on_configure(Configure::windowed(Size::new(400, 300)), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        assert_eq!(surface.window_size(), Size::new(400, 300));

        surface.toggle_fullscreen(&mut rec);
        surface.on_configure(Configure::fullscreen(Size::new(1920, 1080)), &mut rec);
        surface.on_configure_sync(1, &mut rec);
        assert_eq!(surface.geometry(), Size::new(1920, 1080));
        assert_eq!(surface.window_size(), Size::new(400, 300));

        surface.toggle_fullscreen(&mut rec);
        // xdg-shell commonly leaves the windowed size to the client.
        surface.on_configure(Configure::windowed(Size::new(0, 0)), &mut rec);
        surface.on_configure_sync(2, &mut rec);
        assert_eq!(surface.geometry(), Size::new(400, 300));
        assert!(!surface.is_fullscreen());
    }

    #[test]
    fn geometry_is_not_applied_before_configure() {
        let (mut surface, mut rec) = started(false);
        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        surface.on_configure_sync(0, &mut rec);

        surface.toggle_fullscreen(&mut rec);
        assert_eq!(surface.geometry(), EDGE);
        assert!(!rec.log.iter().any(|r| matches!(r, Request::Resize(_))));
    }

    #[test]
    fn repeated_toggles_while_unconfigured_apply_one_configuration() {
        let (mut surface, mut rec) = started(false);
        surface.toggle_fullscreen(&mut rec);
        surface.toggle_fullscreen(&mut rec);
        assert_eq!(
            rec.take(),
            [
                Request::Windowed,
                Request::Sync,
                Request::Fullscreen,
                Request::Sync,
                Request::Windowed,
                Request::Sync,
            ]
        );

        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        assert!(!surface.on_configure_sync(0, &mut rec));
        assert!(!surface.on_configure_sync(0, &mut rec));
        assert!(!surface.is_configured());
        assert_eq!(rec.renders(), 0);

        assert!(surface.on_configure_sync(0, &mut rec));
        assert!(surface.is_configured());
        assert_eq!(rec.renders(), 1);
    }

    #[test]
    fn resize_only_on_change() {
        let (mut surface, mut rec) = started(false);
        rec.take();
        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        assert!(rec.take().is_empty());

        surface.on_configure(Configure::windowed(Size::new(320, 240)), &mut rec);
        assert_eq!(rec.take(), [Request::Resize(Size::new(320, 240))]);
    }

    #[test]
    fn opaque_region_covers_fullscreen_and_opaque_surfaces() {
        let mut surface = SurfaceState::new(EDGE, false, true);
        let mut rec = Recorder::default();
        surface.start(&mut rec);
        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        assert!(rec.log.contains(&Request::Opaque(Some(EDGE))));

        let (mut surface, mut rec) = started(true);
        surface.on_configure(Configure::fullscreen(Size::new(1024, 768)), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        assert!(rec.log.contains(&Request::Opaque(Some(Size::new(1024, 768)))));
    }

    #[test]
    fn frame_index_counts_redraws() {
        let (mut surface, mut rec) = started(false);
        surface.on_configure(Configure::windowed(EDGE), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        surface.on_frame_done(16, &mut rec);
        surface.on_frame_done(33, &mut rec);
        assert_eq!(surface.frame_count(), 3);

        let last = rec.log.iter().rev().find_map(|r| match r {
            Request::Render(frame) => Some(*frame),
            _ => None,
        });
        assert_eq!(last.map(|f| (f.frame_index, f.time_ms)), Some((2, 33)));
    }

    #[test]
    fn quick_double_toggle_keeps_the_windowed_size() {
        let (mut surface, mut rec) = started(false);
        surface.on_configure(Configure::windowed(Size::new(400, 300)), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        rec.take();

        // F11 twice before the compositor answers either request.
        surface.toggle_fullscreen(&mut rec);
        surface.toggle_fullscreen(&mut rec);

        surface.on_configure(Configure::fullscreen(Size::new(1920, 1080)), &mut rec);
        assert!(!surface.on_configure_sync(1, &mut rec));
        surface.on_configure(Configure::windowed(Size::new(0, 0)), &mut rec);
        assert!(surface.on_configure_sync(2, &mut rec));

        assert_eq!(surface.window_size(), Size::new(400, 300));
        assert_eq!(surface.geometry(), Size::new(400, 300));
        assert!(!surface.is_fullscreen());
        assert!(
            !rec.log.iter().any(|r| matches!(r, Request::Resize(_))),
            "the superseded fullscreen configure must not resize"
        );
    }

    #[test]
    fn fullscreen_configure_never_becomes_the_window_size() {
        let (mut surface, mut rec) = started(true);
        surface.on_configure(Configure::fullscreen(Size::new(1920, 1080)), &mut rec);
        surface.on_configure_sync(0, &mut rec);
        assert_eq!(surface.window_size(), EDGE);

        surface.toggle_fullscreen(&mut rec);
        surface.on_configure(Configure::windowed(Size::new(0, 0)), &mut rec);
        surface.on_configure_sync(1, &mut rec);
        assert_eq!(surface.geometry(), EDGE);
    }

    #[test]
    fn toplevel_configure_waits_for_the_ack() {
        let (mut surface, mut rec) = started(false);
        rec.take();

        surface.on_toplevel_configure(Configure::windowed(Size::new(300, 200)));
        surface.on_toplevel_configure(Configure::windowed(Size::new(640, 480)));
        assert_eq!(surface.geometry(), EDGE);
        assert!(rec.take().is_empty());

        surface.on_ack(&mut rec);
        assert_eq!(rec.take(), [Request::Resize(Size::new(640, 480))]);
        assert_eq!(surface.window_size(), Size::new(640, 480));

        // A later ack without a new proposal changes nothing.
        surface.on_ack(&mut rec);
        assert!(rec.take().is_empty());
    }

    #[test]
    fn sync_before_first_ack_is_held_then_paints_once() {
        let (mut surface, mut rec) = started(false);
        rec.take();

        assert!(!surface.on_configure_sync(7, &mut rec));
        assert!(!surface.is_configured());
        assert_eq!(rec.renders(), 0);

        surface.on_toplevel_configure(Configure::windowed(Size::new(320, 240)));
        surface.on_ack(&mut rec);
        assert!(surface.is_configured());
        assert_eq!(
            rec.take(),
            [
                Request::Resize(Size::new(320, 240)),
                Request::Render(FrameInfo {
                    geometry: Size::new(320, 240),
                    time_ms: 7,
                    frame_index: 0,
                }),
                Request::Opaque(None),
                Request::Frame,
                Request::Swap,
            ]
        );

        // Later acks do not replay anything.
        surface.on_ack(&mut rec);
        assert_eq!(rec.renders(), 0);
    }
}
