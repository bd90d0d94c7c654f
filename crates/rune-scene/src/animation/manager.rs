//! Tween registry.
//!
//! The [`TweenManager`] owns every live tween job and advances them once per
//! frame. Jobs are reached through cloneable [`TweenHandle`]s, and the
//! registry can be queried or cleared per target.
//!
//! Callbacks run while their own job is locked, and they may call back into
//! the registry. A job killing itself from its own callback is recorded and
//! applied as soon as that step finishes; a kill from any other thread waits
//! for the step and is in effect when `kill` returns.
//!
//! # Usage
//!
//! ```
//! use rune_config::AnimationConfig;
//! use rune_scene::animation::{TargetId, TweenManager, Tweener};
//!
//! let tweens = TweenManager::new(AnimationConfig::default());
//! let target = TargetId::new();
//! tweens.start(Tweener::to(0.0, 1.0, 0.5).with_target(target, None));
//!
//! tweens.advance(0.25);
//! assert!(tweens.is_tweening(target, None));
//! tweens.advance(0.25);
//! assert!(!tweens.is_tweening(target, None));
//! ```

use super::tweener::Tweener;
use super::types::{TargetId, TweenId, TweenProp, TweenValue};
use parking_lot::{Mutex, MutexGuard};
use rune_config::AnimationConfig;
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::{debug, trace};

const NO_KILL: u8 = 0;
const KILL_SILENT: u8 = 1;
const KILL_COMPLETE: u8 = 2;

thread_local! {
    /// Jobs whose callbacks may be running on this thread, innermost last.
    static STEPPING: RefCell<Vec<TweenId>> = const { RefCell::new(Vec::new()) };
}

/// Marks a job as locked by the current thread until dropped.
struct Stepping;

impl Stepping {
    fn enter(id: TweenId) -> Self {
        STEPPING.with(|stack| stack.borrow_mut().push(id));
        Self
    }

    fn is_active(id: TweenId) -> bool {
        STEPPING.with(|stack| stack.borrow().contains(&id))
    }
}

impl Drop for Stepping {
    fn drop(&mut self) {
        STEPPING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[derive(Debug)]
struct TweenSlot {
    id: TweenId,
    target: Option<TargetId>,
    prop: Option<TweenProp>,
    end_value: TweenValue,
    killed: AtomicBool,
    pending_kill: AtomicU8,
    tweener: Mutex<Tweener>,
}

/// Shared handle to a registered tween job.
#[derive(Debug, Clone)]
pub struct TweenHandle(Arc<TweenSlot>);

impl TweenHandle {
    fn new(tweener: Tweener) -> Self {
        Self(Arc::new(TweenSlot {
            id: tweener.id(),
            target: tweener.target(),
            prop: tweener.prop(),
            end_value: tweener.end_value(),
            killed: AtomicBool::new(tweener.is_killed()),
            pending_kill: AtomicU8::new(NO_KILL),
            tweener: Mutex::new(tweener),
        }))
    }

    pub fn id(&self) -> TweenId {
        self.0.id
    }

    pub fn target(&self) -> Option<TargetId> {
        self.0.target
    }

    pub fn prop(&self) -> Option<TweenProp> {
        self.0.prop
    }

    /// The value the job is heading for. Never blocks.
    pub fn end_value(&self) -> TweenValue {
        self.0.end_value
    }

    /// True once the job is killed or a kill is waiting to be applied.
    pub fn is_killed(&self) -> bool {
        self.0.killed.load(Ordering::Acquire)
            || self.0.pending_kill.load(Ordering::Acquire) != NO_KILL
    }

    /// Whether both handles point at the same job.
    pub fn ptr_eq(&self, other: &TweenHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Run `f` with the job locked.
    ///
    /// Must not be called from inside one of this job's own callbacks.
    pub fn with<R>(&self, f: impl FnOnce(&mut Tweener) -> R) -> R {
        let mut tweener = self.0.tweener.lock();
        let result = {
            let _stepping = Stepping::enter(self.0.id);
            f(&mut tweener)
        };
        self.settle(&mut tweener);
        result
    }

    pub fn value(&self) -> TweenValue {
        self.with(|t| t.value())
    }

    pub fn normalized_time(&self) -> f32 {
        self.with(|t| t.normalized_time())
    }

    pub fn completed(&self) -> bool {
        self.with(|t| t.completed())
    }

    pub fn set_paused(&self, paused: bool) {
        self.with(|t| t.set_paused(paused));
    }

    pub fn seek(&self, time: f32) {
        self.with(|t| t.seek(time));
    }

    /// Kill the job. Safe to call from any callback, including the job's own.
    ///
    /// From the job's own callback the kill is applied when the current
    /// step returns; from anywhere else it waits for the job lock and takes
    /// effect before this call returns.
    pub fn kill(&self, complete: bool) {
        if self.0.killed.load(Ordering::Acquire) {
            return;
        }
        if Stepping::is_active(self.0.id) {
            let request = if complete { KILL_COMPLETE } else { KILL_SILENT };
            self.0.pending_kill.fetch_max(request, Ordering::AcqRel);
            trace!(tween = self.0.id.0, complete, "deferred kill from own callback");
            return;
        }
        self.with(|tweener| tweener.kill(complete));
    }

    fn advance(&self, dt: f32) {
        if self.0.killed.load(Ordering::Acquire) {
            return;
        }
        let mut tweener = self.0.tweener.lock();
        self.settle(&mut tweener);
        if tweener.is_killed() {
            return;
        }
        if !tweener.is_paused() {
            let _stepping = Stepping::enter(self.0.id);
            tweener.advance(dt);
        }
        self.settle(&mut tweener);
    }

    /// Apply any deferred kill and publish the killed flag.
    fn settle(&self, tweener: &mut MutexGuard<'_, Tweener>) {
        match self.0.pending_kill.swap(NO_KILL, Ordering::AcqRel) {
            KILL_SILENT => tweener.kill(false),
            KILL_COMPLETE => tweener.kill(true),
            _ => {}
        }
        if tweener.is_killed() {
            self.0.killed.store(true, Ordering::Release);
        }
    }

    fn is_finished(&self) -> bool {
        self.0.killed.load(Ordering::Acquire)
    }

    fn matches(&self, target: TargetId, prop: Option<TweenProp>) -> bool {
        self.0.target == Some(target) && (prop.is_none() || self.0.prop == prop)
    }
}

/// Registry of live tween jobs.
#[derive(Debug)]
pub struct TweenManager {
    active: Mutex<Vec<TweenHandle>>,
    catch_callback_panics: bool,
}

impl Default for TweenManager {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl TweenManager {
    /// Create an empty registry.
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            active: Mutex::new(Vec::new()),
            catch_callback_panics: config.catch_callback_panics,
        }
    }

    /// Register a job and return its handle. It is advanced from the next
    /// [`advance`](Self::advance) on.
    pub fn start(&self, mut tweener: Tweener) -> TweenHandle {
        tweener.set_catch_panics(self.catch_callback_panics);
        let handle = TweenHandle::new(tweener);
        debug!(
            tween = handle.id().0,
            target = ?handle.target(),
            prop = ?handle.prop(),
            "tween started"
        );
        self.active.lock().push(handle.clone());
        handle
    }

    /// Step every live job by `dt` seconds and drop finished ones.
    pub fn advance(&self, dt: f32) {
        let snapshot: Vec<TweenHandle> = self.active.lock().clone();
        for handle in &snapshot {
            handle.advance(dt);
        }
        let mut active = self.active.lock();
        let before = active.len();
        active.retain(|handle| !handle.is_finished());
        if active.len() != before {
            trace!(removed = before - active.len(), live = active.len(), "tweens finished");
        }
    }

    /// Whether a live job exists for `target`. `None` matches any property.
    pub fn is_tweening(&self, target: TargetId, prop: Option<TweenProp>) -> bool {
        self.active
            .lock()
            .iter()
            .any(|handle| !handle.is_killed() && handle.matches(target, prop))
    }

    /// Kill every live job for `target`. Returns whether any was found.
    pub fn kill_tweens(&self, target: TargetId, complete: bool, prop: Option<TweenProp>) -> bool {
        let matched: Vec<TweenHandle> = self
            .active
            .lock()
            .iter()
            .filter(|handle| !handle.is_killed() && handle.matches(target, prop))
            .cloned()
            .collect();
        for handle in &matched {
            handle.kill(complete);
        }
        if !matched.is_empty() {
            debug!(target = target.0, count = matched.len(), complete, "killed tweens");
        }
        !matched.is_empty()
    }

    /// First live job for `target`, if any.
    pub fn get_tween(&self, target: TargetId, prop: Option<TweenProp>) -> Option<TweenHandle> {
        self.active
            .lock()
            .iter()
            .find(|handle| !handle.is_killed() && handle.matches(target, prop))
            .cloned()
    }

    /// Number of jobs still registered, including ones killed this frame.
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    /// Kill every job without completing it and empty the registry.
    pub fn clear(&self) {
        let drained: Vec<TweenHandle> = std::mem::take(&mut *self.active.lock());
        for handle in &drained {
            handle.kill(false);
        }
        debug!(count = drained.len(), "tween registry cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::EaseType;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn manager() -> TweenManager {
        TweenManager::new(AnimationConfig::default())
    }

    #[test]
    fn test_start_and_finish() {
        let tweens = manager();
        let target = TargetId::new();
        let handle = tweens.start(Tweener::to(0.0, 1.0, 1.0).with_target(target, None));
        assert_eq!(tweens.active_count(), 1);
        tweens.advance(0.5);
        assert!(tweens.is_tweening(target, None));
        tweens.advance(0.5);
        assert!(!tweens.is_tweening(target, None));
        assert!(handle.is_killed());
        assert_eq!(tweens.active_count(), 0);
    }

    #[test]
    fn test_prop_matching() {
        let tweens = manager();
        let target = TargetId::new();
        tweens.start(Tweener::to(0.0, 1.0, 1.0).with_target(target, Some(TweenProp::Alpha)));
        assert!(tweens.is_tweening(target, None));
        assert!(tweens.is_tweening(target, Some(TweenProp::Alpha)));
        assert!(!tweens.is_tweening(target, Some(TweenProp::X)));
        assert!(tweens.get_tween(target, Some(TweenProp::X)).is_none());
        assert!(tweens.get_tween(target, None).is_some());
    }

    #[test]
    fn test_kill_tweens_reports_matches() {
        let tweens = manager();
        let target = TargetId::new();
        assert!(!tweens.kill_tweens(target, false, None));

        tweens.start(Tweener::to(0.0, 1.0, 1.0).with_target(target, None));
        assert!(tweens.kill_tweens(target, false, None));
        assert!(!tweens.is_tweening(target, None));
        assert!(!tweens.kill_tweens(target, false, None));
    }

    #[test]
    fn test_paused_job_does_not_advance() {
        let tweens = manager();
        let handle = tweens.start(Tweener::to(0.0, 10.0, 1.0).with_ease(EaseType::Linear));
        handle.set_paused(true);
        tweens.advance(0.5);
        assert_eq!(handle.value().x, 0.0);
        handle.set_paused(false);
        tweens.advance(0.5);
        assert_eq!(handle.value().x, 5.0);
    }

    #[test]
    fn test_self_kill_from_callback_is_deferred() {
        let tweens = Arc::new(manager());
        let target = TargetId::new();
        let registry = Arc::clone(&tweens);
        tweens.start(
            Tweener::to(0.0, 1.0, 10.0)
                .with_target(target, None)
                .on_update(move |_| {
                    registry.kill_tweens(target, false, None);
                }),
        );
        tweens.advance(0.1);
        assert!(!tweens.is_tweening(target, None));
        assert_eq!(tweens.active_count(), 0);
    }

    #[test]
    fn test_kill_from_other_thread_waits_for_step() {
        let tweens = Arc::new(manager());
        let updates = Arc::new(AtomicUsize::new(0));
        let completes = Arc::new(AtomicUsize::new(0));
        let (entered, entered_rx) = mpsc::channel();
        let (u, c) = (Arc::clone(&updates), Arc::clone(&completes));
        let handle = tweens.start(
            Tweener::to(0.0, 1.0, 10.0)
                .on_update(move |_| {
                    u.fetch_add(1, Ordering::SeqCst);
                    let _ = entered.send(());
                    thread::sleep(Duration::from_millis(20));
                })
                .on_complete(move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                }),
        );

        let killer = {
            let handle = handle.clone();
            thread::spawn(move || {
                entered_rx.recv().unwrap();
                handle.kill(false);
                assert!(handle.is_killed());
            })
        };
        tweens.advance(0.1);
        killer.join().unwrap();

        tweens.advance(20.0);
        assert_eq!(updates.load(Ordering::SeqCst), 1);
        assert_eq!(completes.load(Ordering::SeqCst), 0);
        assert_eq!(tweens.active_count(), 0);
    }

    #[test]
    fn test_start_from_callback() {
        let tweens = Arc::new(manager());
        let registry = Arc::clone(&tweens);
        let follow_up = TargetId::new();
        tweens.start(Tweener::to(0.0, 1.0, 0.1).on_complete(move |_| {
            registry.start(Tweener::to(0.0, 1.0, 1.0).with_target(follow_up, None));
        }));
        tweens.advance(0.2);
        assert!(tweens.is_tweening(follow_up, None));
    }

    #[test]
    fn test_clear() {
        let tweens = manager();
        let handle = tweens.start(Tweener::to(0.0, 1.0, 1.0));
        tweens.start(Tweener::to(0.0, 1.0, 1.0));
        tweens.clear();
        assert_eq!(tweens.active_count(), 0);
        assert!(handle.is_killed());
    }
}
