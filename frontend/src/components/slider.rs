use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Interval;
use web_sys::{Document, Element};

use crate::error::SiteError;
use crate::utils::dom::{self, Listener};

/// 1-based position in a set of `total` slides. Moving past either end wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideCursor {
    current: usize,
    total: usize,
}

impl SlideCursor {
    /// `None` for an empty slide set.
    pub fn new(total: usize) -> Option<Self> {
        (total > 0).then_some(Self { current: 1, total })
    }

    pub fn current(self) -> usize {
        self.current
    }

    pub fn total(self) -> usize {
        self.total
    }

    pub fn advance(&mut self) -> usize {
        self.current = if self.current >= self.total { 1 } else { self.current + 1 };
        self.current
    }

    pub fn retreat(&mut self) -> usize {
        self.current = if self.current <= 1 { self.total } else { self.current - 1 };
        self.current
    }

    /// Jump to `slide`. Out-of-range positions are ignored.
    pub fn go_to(&mut self, slide: usize) -> bool {
        if (1..=self.total).contains(&slide) {
            self.current = slide;
            true
        } else {
            false
        }
    }
}

pub struct SliderAnchors {
    pub slides: Vec<Element>,
    pub dots: Vec<Element>,
    pub prev: Option<Element>,
    pub next: Option<Element>,
    pub container: Option<Element>,
}

impl SliderAnchors {
    pub fn locate(document: &Document) -> Result<Option<Self>, SiteError> {
        let slides = dom::query_all(document, ".slide")?;
        if slides.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            slides,
            dots: dom::query_all(document, ".dot")?,
            prev: dom::query(document, ".slider-arrow.prev")?,
            next: dom::query(document, ".slider-arrow.next")?,
            container: dom::query(document, ".slider-container")?,
        }))
    }
}

fn slide_number(element: &Element) -> Option<usize> {
    dom::data_attr(element, "slide")?.trim().parse().ok()
}

struct SlideView {
    slides: Vec<Element>,
    dots: Vec<Element>,
    cursor: Cell<SlideCursor>,
}

impl SlideView {
    fn show(&self, slide: usize) {
        for element in self.slides.iter().chain(self.dots.iter()) {
            dom::set_class(element, "active", slide_number(element) == Some(slide));
        }
    }

    fn go_to(&self, slide: usize) {
        let mut cursor = self.cursor.get();
        if cursor.go_to(slide) {
            self.cursor.set(cursor);
            self.show(slide);
        }
    }

    fn step(&self, forward: bool) {
        let mut cursor = self.cursor.get();
        let slide = if forward { cursor.advance() } else { cursor.retreat() };
        self.cursor.set(cursor);
        self.show(slide);
    }
}

/// Hero carousel with dot and arrow navigation and hover-paused autoplay.
pub struct HeroSlider {
    _autoplay: Rc<RefCell<Option<Interval>>>,
    _listeners: Vec<Listener>,
}

impl HeroSlider {
    pub fn new(anchors: SliderAnchors, interval_ms: u32) -> Result<Option<Self>, SiteError> {
        let Some(cursor) = SlideCursor::new(anchors.slides.len()) else {
            return Ok(None);
        };
        let view = Rc::new(SlideView {
            slides: anchors.slides,
            dots: anchors.dots,
            cursor: Cell::new(cursor),
        });
        let autoplay = Rc::new(RefCell::new(None));
        let mut listeners = Vec::new();

        for dot in &view.dots {
            let Some(slide) = slide_number(dot) else {
                log::warn!("Slider dot without a valid data-slide, skipping");
                continue;
            };
            listeners.push(Listener::new(dot, "click", {
                let view = view.clone();
                move |_| view.go_to(slide)
            })?);
        }

        for (arrow, forward) in [(anchors.prev, false), (anchors.next, true)] {
            if let Some(arrow) = arrow {
                listeners.push(Listener::new(&arrow, "click", {
                    let view = view.clone();
                    move |_| view.step(forward)
                })?);
            }
        }

        if let Some(container) = &anchors.container {
            listeners.push(Listener::new(container, "mouseenter", {
                let autoplay = autoplay.clone();
                move |_| stop_autoplay(&autoplay)
            })?);
            listeners.push(Listener::new(container, "mouseleave", {
                let autoplay = autoplay.clone();
                let view = view.clone();
                move |_| start_autoplay(&autoplay, &view, interval_ms)
            })?);
        }

        start_autoplay(&autoplay, &view, interval_ms);
        log::debug!("Hero slider bound with {} slides", cursor.total());

        Ok(Some(Self {
            _autoplay: autoplay,
            _listeners: listeners,
        }))
    }
}

fn start_autoplay(autoplay: &Rc<RefCell<Option<Interval>>>, view: &Rc<SlideView>, interval_ms: u32) {
    let view = view.clone();
    let interval = Interval::new(interval_ms, move || view.step(true));
    // Replacing the handle cancels any interval already running.
    *autoplay.borrow_mut() = Some(interval);
}

fn stop_autoplay(autoplay: &Rc<RefCell<Option<Interval>>>) {
    autoplay.borrow_mut().take();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_has_no_cursor() {
        assert!(SlideCursor::new(0).is_none());
    }

    #[test]
    fn test_next_wraps_from_last_to_first() {
        for total in 1..=8 {
            let mut cursor = SlideCursor::new(total).unwrap();
            assert!(cursor.go_to(total));
            assert_eq!(cursor.advance(), 1, "total {}", total);
        }
    }

    #[test]
    fn test_prev_wraps_from_first_to_last() {
        for total in 1..=8 {
            let mut cursor = SlideCursor::new(total).unwrap();
            assert_eq!(cursor.retreat(), total, "total {}", total);
        }
    }

    #[test]
    fn test_intermediate_steps_move_by_one() {
        let total = 5;
        for start in 2..total {
            let mut cursor = SlideCursor::new(total).unwrap();
            cursor.go_to(start);
            assert_eq!(cursor.advance(), start + 1);
            cursor.go_to(start);
            assert_eq!(cursor.retreat(), start - 1);
        }
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        let mut cursor = SlideCursor::new(3).unwrap();
        let visited: Vec<usize> = (0..6).map(|_| cursor.advance()).collect();
        assert_eq!(visited, vec![2, 3, 1, 2, 3, 1]);
    }

    #[test]
    fn test_go_to_ignores_out_of_range() {
        let mut cursor = SlideCursor::new(3).unwrap();
        assert!(!cursor.go_to(0));
        assert!(!cursor.go_to(4));
        assert_eq!(cursor.current(), 1);
        assert!(cursor.go_to(3));
        assert_eq!(cursor.current(), 3);
    }
}
