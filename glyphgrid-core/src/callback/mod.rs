//! Producer side of the pipeline: user scene logic and its host loop.
//!
//! A [`Callback`] supplies `setup`/`update` hooks and registers event
//! handlers in an explicit table (category + attribute → function), built
//! once at host construction. The [`CallbackHost`] runs the callback on its
//! own thread, feeding it event batches and forwarding draw commands to the
//! consumer over the action queue.

use std::collections::HashMap;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use crate::foundation::error::GlyphgridResult;
use crate::protocol::{
    Action, DotRegistry, EventCategory, InputEvent, ProducerLink, encode_buffer, normalize_attr,
};
use crate::scene::buffer::Buffer;

/// An event handler: a free function over the callback type, so the table
/// can be built before any events flow.
pub type HandlerFn<C> = fn(&mut C, &InputEvent, &mut SceneCtx);

/// Explicit dispatch table from `(category, attribute)` to handler.
///
/// Dispatch tries the exact `(category, ATTR)` entry first (key name, mouse
/// button id), then falls back to the category-only entry registered with an
/// empty attribute. Events matching neither are dropped silently.
pub struct EventRouter<C> {
    handlers: HashMap<(EventCategory, String), HandlerFn<C>>,
}

impl<C> Default for EventRouter<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> EventRouter<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `(category, attr)`. An empty `attr` makes this
    /// the category-wide fallback. Attributes are normalized the same way
    /// event attributes are (uppercased, spaces to underscores).
    pub fn register(&mut self, category: EventCategory, attr: &str, handler: HandlerFn<C>) {
        self.handlers
            .insert((category, normalize_attr(attr.to_string())), handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Route one event. Returns whether any handler ran.
    pub fn dispatch(&self, callback: &mut C, event: &InputEvent, ctx: &mut SceneCtx) -> bool {
        let exact = (event.category, event.attr.clone());
        if let Some(handler) = self.handlers.get(&exact) {
            handler(callback, event, ctx);
            return true;
        }
        if !event.attr.is_empty() {
            if let Some(handler) = self.handlers.get(&(event.category, String::new())) {
                handler(callback, event, ctx);
                return true;
            }
        }
        false
    }
}

/// User scene logic: lifecycle hooks plus the event-handler table.
///
/// Hook errors are caught at the host boundary, logged, and do not tear down
/// the queue protocol; one bad frame cannot deadlock the pipeline.
pub trait Callback: Send {
    /// Populate the event dispatch table. Called once at host construction.
    fn register_events(_router: &mut EventRouter<Self>)
    where
        Self: Sized,
    {
    }

    /// Called once before the first tick.
    fn setup(&mut self, _ctx: &mut SceneCtx) -> GlyphgridResult<()> {
        Ok(())
    }

    /// Called once per tick, after event dispatch.
    fn update(&mut self, ctx: &mut SceneCtx) -> GlyphgridResult<()>;
}

/// The producer's view of the pipeline: draw/control commands plus tick
/// bookkeeping. Owns the registration seen-set; the consumer owns the cache.
pub struct SceneCtx {
    actions: crossbeam_channel::Sender<Action>,
    registry: DotRegistry,
    updates_count: u64,
    running: bool,
}

impl SceneCtx {
    fn new(actions: crossbeam_channel::Sender<Action>) -> Self {
        Self {
            actions,
            registry: DotRegistry::new(),
            updates_count: 0,
            running: true,
        }
    }

    /// Ticks completed so far.
    pub fn updates(&self) -> u64 {
        self.updates_count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn send(&mut self, action: Action) {
        // A closed action queue means the consumer is gone; treat it as a
        // quit signal rather than an error.
        if self.actions.send(action).is_err() {
            tracing::debug!("action queue closed, stopping producer");
            self.running = false;
        }
    }

    /// Encode `buffer` and queue it for rendering, registering any content
    /// keys the consumer has not seen yet.
    pub fn draw(&mut self, buffer: &Buffer) {
        let packet = encode_buffer(self.updates_count, buffer, &mut self.registry);
        self.send(Action::Frame(packet));
    }

    /// Queue a canvas blank.
    pub fn clear(&mut self) {
        self.send(Action::Clear);
    }

    /// Queue a present (frame boundary on the consumer side).
    pub fn present(&mut self) {
        self.send(Action::Present);
    }

    /// Queue a consumer shutdown and stop this producer's loop.
    pub fn quit(&mut self) {
        self.send(Action::Quit);
        self.running = false;
    }
}

/// Default wait for the next event batch before the producer concludes the
/// consumer has gone away.
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs a [`Callback`] against the pipeline queues.
pub struct CallbackHost<C: Callback> {
    callback: C,
    router: EventRouter<C>,
    ctx: SceneCtx,
    events: crossbeam_channel::Receiver<crate::protocol::EventBatch>,
    event_timeout: Duration,
}

impl<C: Callback + 'static> CallbackHost<C> {
    pub fn new(callback: C, link: ProducerLink) -> Self {
        let mut router = EventRouter::new();
        C::register_events(&mut router);
        Self {
            callback,
            router,
            ctx: SceneCtx::new(link.actions),
            events: link.events,
            event_timeout: DEFAULT_EVENT_TIMEOUT,
        }
    }

    pub fn with_event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout = timeout;
        self
    }

    /// Run the producer loop on the current thread: `setup` once, then
    /// block-receive an event batch, dispatch, `update`, repeat.
    ///
    /// A receive timeout or a closed event queue is the designed "no more
    /// work" signal and ends the loop gracefully.
    pub fn run(mut self) -> GlyphgridResult<()> {
        if let Err(e) = self.callback.setup(&mut self.ctx) {
            tracing::error!(error = %e, "callback setup failed, shutting down");
            self.ctx.quit();
            return Ok(());
        }

        while self.ctx.running {
            let batch = match self.events.recv_timeout(self.event_timeout) {
                Ok(batch) => batch,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::debug!("event wait timed out, stopping producer");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("event queue closed, stopping producer");
                    break;
                }
            };
            for event in &batch {
                self.router.dispatch(&mut self.callback, event, &mut self.ctx);
            }
            if !self.ctx.running {
                break;
            }
            if let Err(e) = self.callback.update(&mut self.ctx) {
                tracing::warn!(
                    tick = self.ctx.updates_count,
                    error = %e,
                    "callback update failed, frame skipped"
                );
            }
            self.ctx.updates_count += 1;
        }
        Ok(())
    }

    /// Run the producer loop on its own thread.
    pub fn spawn(self) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            if let Err(e) = self.run() {
                tracing::error!(error = %e, "producer loop failed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Rgba8;
    use crate::protocol::link;
    use crate::scene::dot::{Dot, FontRef};

    #[derive(Default)]
    struct Recording {
        keys: Vec<String>,
        any_mouse: u32,
        frames: u64,
    }

    impl Callback for Recording {
        fn register_events(router: &mut EventRouter<Self>) {
            router.register(EventCategory::KeyDown, "Q", |cb, event, ctx| {
                cb.keys.push(event.attr.clone());
                ctx.quit();
            });
            router.register(EventCategory::KeyDown, "", |cb, event, _ctx| {
                cb.keys.push(format!("fallback:{}", event.attr));
            });
            router.register(EventCategory::MouseButtonDown, "", |cb, _event, _ctx| {
                cb.any_mouse += 1;
            });
        }

        fn update(&mut self, ctx: &mut SceneCtx) -> GlyphgridResult<()> {
            self.frames += 1;
            let mut buffer = Buffer::new();
            buffer.put(Dot::new(
                (0, 0),
                'A',
                Rgba8::WHITE,
                FontRef::new("mono", 8),
            ));
            ctx.draw(&buffer);
            ctx.present();
            Ok(())
        }
    }

    #[test]
    fn dispatch_prefers_exact_then_category_fallback() {
        let (producer, _consumer) = link(4);
        let mut router = EventRouter::new();
        Recording::register_events(&mut router);
        let mut ctx = SceneCtx::new(producer.actions);
        let mut cb = Recording::default();

        assert!(router.dispatch(&mut cb, &InputEvent::key_down("a"), &mut ctx));
        assert!(router.dispatch(&mut cb, &InputEvent::key_down("q"), &mut ctx));
        assert!(router.dispatch(
            &mut cb,
            &InputEvent::mouse_button_down(3, (0, 0)),
            &mut ctx
        ));
        // No motion handler registered: dropped silently.
        assert!(!router.dispatch(&mut cb, &InputEvent::mouse_motion((1, 1)), &mut ctx));

        assert_eq!(cb.keys, vec!["fallback:A".to_string(), "Q".to_string()]);
        assert_eq!(cb.any_mouse, 1);
        assert!(!ctx.is_running(), "Q handler quits");
    }

    #[test]
    fn host_stops_gracefully_on_event_timeout() {
        let (producer, consumer) = link(4);
        let host = CallbackHost::new(Recording::default(), producer)
            .with_event_timeout(Duration::from_millis(10));

        // One empty batch lets one tick run, then the queue goes quiet.
        consumer.events.send(vec![]).unwrap();
        let handle = host.spawn();
        handle.join().unwrap();

        // One draw + one present from the single tick.
        let mut frames = 0;
        let mut presents = 0;
        while let Ok(action) = consumer.actions.try_recv() {
            match action {
                Action::Frame(_) => frames += 1,
                Action::Present => presents += 1,
                _ => {}
            }
        }
        assert_eq!((frames, presents), (1, 1));
    }

    struct FailingUpdate {
        attempts: u64,
    }

    impl Callback for FailingUpdate {
        fn update(&mut self, _ctx: &mut SceneCtx) -> GlyphgridResult<()> {
            self.attempts += 1;
            Err(crate::foundation::error::GlyphgridError::animation("boom"))
        }
    }

    #[test]
    fn failing_update_does_not_stop_the_loop() {
        let (producer, consumer) = link(4);
        let host = CallbackHost::new(FailingUpdate { attempts: 0 }, producer)
            .with_event_timeout(Duration::from_millis(10));

        consumer.events.send(vec![]).unwrap();
        consumer.events.send(vec![]).unwrap();
        host.run().unwrap();
        // Reaching here at all proves update errors are contained.
    }
}
