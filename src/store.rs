//! Per-document annotation storage.

use serde::Serialize;

use crate::annotation::{Annotation, Point};

/// Ordered list of annotations for one document.
///
/// Entries only grow by appending; the last entry may be mutated while a drag
/// is in progress, and erasing filters entries out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    /// Set when annotations change; cleared by whoever rebuilds the overlay.
    #[serde(skip)]
    dirty: bool,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
            dirty: true,
        }
    }

    /// Check if the store has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Append an annotation and return its index.
    pub fn add(&mut self, annotation: Annotation) -> usize {
        self.annotations.push(annotation);
        self.mark_dirty();
        self.annotations.len() - 1
    }

    /// Apply `f` to the most recently added annotation.
    ///
    /// Returns false when the store is empty.
    pub fn mutate_last(&mut self, f: impl FnOnce(&mut Annotation)) -> bool {
        let Some(last) = self.annotations.last_mut() else {
            return false;
        };
        f(last);
        self.mark_dirty();
        true
    }

    pub fn last(&self) -> Option<&Annotation> {
        self.annotations.last()
    }

    /// Remove every annotation on `page` hit by `point`; returns how many.
    pub fn erase_at(&mut self, page: u32, point: Point, tolerance: f32) -> usize {
        let before = self.annotations.len();
        self.annotations
            .retain(|a| a.page != page || !a.hit_test(&point, tolerance));
        let removed = before - self.annotations.len();
        if removed > 0 {
            self.mark_dirty();
        }
        removed
    }

    /// Annotations on `page`, in insertion order.
    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.page == page)
    }

    pub fn all(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Pretty-printed JSON array of all annotations.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, BoundingBox};
    use crate::color::Color;

    fn underline(x: f32, y: f32, page: u32) -> Annotation {
        Annotation::boxed(
            AnnotationKind::Underline,
            BoundingBox::new(x, y, 100.0, 2.0),
            Color::default(),
            page,
        )
    }

    #[test]
    fn test_add_and_page_filter() {
        let mut store = AnnotationStore::new();
        store.add(underline(0.0, 0.0, 1));
        store.add(underline(0.0, 10.0, 2));
        store.add(underline(0.0, 20.0, 1));

        assert_eq!(store.len(), 3);
        let ys: Vec<f32> = store.on_page(1).map(|a| a.y).collect();
        assert_eq!(ys, vec![0.0, 20.0]);
        assert_eq!(store.on_page(3).count(), 0);
    }

    #[test]
    fn test_mutate_last_only_touches_last() {
        let mut store = AnnotationStore::new();
        assert!(!store.mutate_last(|a| a.width = 1.0));

        store.add(underline(0.0, 0.0, 1));
        store.add(underline(5.0, 5.0, 1));
        store.clear_dirty();
        assert!(store.mutate_last(|a| a.width = -5.0));

        assert!(store.is_dirty());
        assert_eq!(store.all()[0].width, 100.0);
        assert_eq!(store.all()[1].width, -5.0);
    }

    #[test]
    fn test_erase_is_scoped_to_page() {
        let mut store = AnnotationStore::new();
        store.add(underline(0.0, 0.0, 1));
        store.add(underline(0.0, 0.0, 2));
        store.add(underline(300.0, 300.0, 1));

        assert_eq!(store.erase_at(1, Point::new(50.0, 1.0), 5.0), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.on_page(2).count(), 1);
        assert_eq!(store.erase_at(1, Point::new(900.0, 900.0), 5.0), 0);
    }

    #[test]
    fn test_to_json_is_array() {
        let mut store = AnnotationStore::new();
        store.add(underline(1.0, 2.0, 1));
        let value: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["type"], "underline");
    }
}
