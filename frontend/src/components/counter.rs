use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::error::SiteError;
use crate::utils::dom;

/// Quartic ease-out: fast start, slow finish.
pub fn ease_out_quart(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(4)
}

/// Value shown `elapsed` ms into a count-up towards `target`.
///
/// Returns the displayed value and whether this was the final frame.
pub fn counter_frame(target: i64, elapsed: f64, duration: f64) -> (i64, bool) {
    let progress = (elapsed / duration).clamp(0.0, 1.0);
    if progress >= 1.0 {
        return (target, true);
    }
    let value = (target as f64 * ease_out_quart(progress)).floor() as i64;
    (value, false)
}

pub struct CounterAnchors {
    pub counters: Vec<(Element, i64)>,
    pub stats_bar: Option<Element>,
}

impl CounterAnchors {
    pub fn locate(document: &Document) -> Result<Option<Self>, SiteError> {
        let counters: Vec<(Element, i64)> = dom::query_all(document, "[data-count]")?
            .into_iter()
            .filter_map(|element| {
                let raw = dom::data_attr(&element, "count")?;
                match raw.trim().parse::<i64>() {
                    Ok(target) => Some((element, target)),
                    Err(_) => {
                        log::warn!("Ignoring counter with non-numeric data-count {:?}", raw);
                        None
                    }
                }
            })
            .collect();
        if counters.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            counters,
            stats_bar: dom::query(document, ".stats-bar")?,
        }))
    }
}

/// When the count-up should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterTrigger {
    /// No visibility observer in this browser: count up right away.
    Immediate,
    /// Count up the first time the stats bar scrolls into view.
    OnVisible,
}

impl CounterTrigger {
    /// `None` when the counters can never start.
    pub fn select(has_observer: bool, has_stats_bar: bool) -> Option<Self> {
        match (has_observer, has_stats_bar) {
            (false, _) => Some(CounterTrigger::Immediate),
            (true, true) => Some(CounterTrigger::OnVisible),
            (true, false) => None,
        }
    }
}

/// Counts every `[data-count]` element up from zero the first time the
/// stats bar scrolls into view.
pub struct CounterAnimation {
    observer: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl CounterAnimation {
    pub fn new(
        window: Window,
        anchors: CounterAnchors,
        duration_ms: u32,
        threshold: f64,
    ) -> Result<Option<Self>, SiteError> {
        let duration = f64::from(duration_ms);
        let counters = Rc::new(anchors.counters);

        let has_observer =
            js_sys::Reflect::has(&window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false);
        let trigger = CounterTrigger::select(has_observer, anchors.stats_bar.is_some());
        let stats_bar = match (trigger, anchors.stats_bar) {
            (None, _) => return Ok(None),
            (Some(CounterTrigger::Immediate), _) => {
                log::debug!("IntersectionObserver unavailable, animating counters now");
                animate_all(&window, &counters, duration);
                return Ok(Some(Self { observer: None }));
            }
            (Some(CounterTrigger::OnVisible), Some(stats_bar)) => stats_bar,
            (Some(CounterTrigger::OnVisible), None) => return Ok(None),
        };

        let animated = Rc::new(Cell::new(false));
        let callback = Closure::wrap(Box::new({
            let window = window.clone();
            move |entries: js_sys::Array| {
                let visible = entries.iter().any(|entry| {
                    entry
                        .dyn_into::<IntersectionObserverEntry>()
                        .map(|entry| entry.is_intersecting())
                        .unwrap_or(false)
                });
                if visible && !animated.replace(true) {
                    animate_all(&window, &counters, duration);
                }
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        observer.observe(&stats_bar);

        Ok(Some(Self {
            observer: Some((observer, callback)),
        }))
    }
}

impl Drop for CounterAnimation {
    fn drop(&mut self) {
        if let Some((observer, _)) = &self.observer {
            observer.disconnect();
        }
    }
}

fn animate_all(window: &Window, counters: &[(Element, i64)], duration: f64) {
    for (element, target) in counters {
        if let Err(e) = animate_counter(window, element.clone(), *target, duration) {
            log::warn!("Counter animation failed: {}", e);
            element.set_text_content(Some(&target.to_string()));
        }
    }
}

fn animate_counter(window: &Window, element: Element, target: i64, duration: f64) -> Result<(), SiteError> {
    let started_at = window.performance().map(|p| p.now()).unwrap_or_else(js_sys::Date::now);

    // Self-rescheduling frame callback; it drops its own handle on the last frame.
    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next_frame = frame.clone();
    let frame_window = window.clone();
    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        let (value, done) = counter_frame(target, now - started_at, duration);
        element.set_text_content(Some(&value.to_string()));
        if done {
            let _ = next_frame.borrow_mut().take();
            return;
        }
        if let Some(callback) = next_frame.borrow().as_ref() {
            if let Err(e) = frame_window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                element.set_text_content(Some(&target.to_string()));
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let first = frame.borrow();
    if let Some(callback) = first.as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_out_quart(0.0), 0.0);
        assert_eq!(ease_out_quart(1.0), 1.0);
        assert!(ease_out_quart(0.5) > 0.5);
    }

    #[test]
    fn test_frame_matches_formula() {
        let target = 150;
        for step in 0..20 {
            let elapsed = step as f64 * 100.0;
            let progress = elapsed / 2000.0;
            let expected = (target as f64 * (1.0 - (1.0 - progress).powi(4))).floor() as i64;
            assert_eq!(counter_frame(target, elapsed, 2000.0), (expected, false));
        }
    }

    #[test]
    fn test_final_frame_snaps_to_target() {
        assert_eq!(counter_frame(98, 2000.0, 2000.0), (98, true));
        assert_eq!(counter_frame(98, 5000.0, 2000.0), (98, true));
        assert_eq!(counter_frame(7, 1999.9, 2000.0).1, false);
    }

    #[test]
    fn test_values_never_decrease() {
        for target in [1_i64, 9, 50, 320, 10_000] {
            let mut previous = 0;
            for step in 0..=400 {
                let (value, _) = counter_frame(target, step as f64 * 5.0, 2000.0);
                assert!(value >= previous, "target {} step {}", target, step);
                assert!(value <= target);
                previous = value;
            }
            assert_eq!(previous, target);
        }
    }

    #[test]
    fn test_trigger_selection() {
        assert_eq!(CounterTrigger::select(false, false), Some(CounterTrigger::Immediate));
        assert_eq!(CounterTrigger::select(false, true), Some(CounterTrigger::Immediate));
        assert_eq!(CounterTrigger::select(true, true), Some(CounterTrigger::OnVisible));
    }

    #[test]
    fn test_observer_without_stats_bar_never_starts() {
        assert_eq!(CounterTrigger::select(true, false), None);
    }

    #[test]
    fn test_negative_elapsed_clamps_to_zero() {
        assert_eq!(counter_frame(500, -16.0, 2000.0), (0, false));
    }
}
