use crate::point::PointId;

/// Outcome of a selection transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<PointId>,
    pub current: Option<PointId>,
}

impl SelectionChange {
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }

    /// Ids whose highlight state flipped
    pub fn affected(&self) -> impl Iterator<Item = &PointId> {
        let flipped = !self.is_noop();
        self.previous
            .iter()
            .chain(self.current.iter())
            .filter(move |_| flipped)
    }
}

/// Tracks at most one selected point id
#[derive(Clone, Debug, Default)]
pub struct SelectionController {
    selected: Option<PointId>,
}

impl SelectionController {
    pub fn selected(&self) -> Option<&PointId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &PointId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Select `id`, or clear the selection if `id` is already selected
    pub fn toggle(&mut self, id: &PointId) -> SelectionChange {
        let next = if self.is_selected(id) {
            None
        } else {
            Some(id.clone())
        };
        self.set(next)
    }

    /// Apply an externally-driven selection
    pub fn set(&mut self, id: Option<PointId>) -> SelectionChange {
        let previous = std::mem::replace(&mut self.selected, id);
        SelectionChange {
            previous,
            current: self.selected.clone(),
        }
    }

    pub fn clear(&mut self) -> SelectionChange {
        self.set(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_clears() {
        let mut sel = SelectionController::default();
        let x = PointId::from(1);

        let change = sel.toggle(&x);
        assert_eq!(change.current, Some(x.clone()));
        assert!(sel.is_selected(&x));

        let change = sel.toggle(&x);
        assert_eq!(change.previous, Some(x.clone()));
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn test_toggle_other_moves_selection() {
        let mut sel = SelectionController::default();
        let x = PointId::from(1);
        let y = PointId::from(2);

        sel.toggle(&x);
        let change = sel.toggle(&y);
        assert_eq!(sel.selected(), Some(&y));
        assert!(!sel.is_selected(&x));

        let affected: Vec<_> = change.affected().cloned().collect();
        assert_eq!(affected, vec![x, y]);
    }

    #[test]
    fn test_setting_same_value_affects_nothing() {
        let mut sel = SelectionController::default();
        sel.set(Some(PointId::from("a")));
        let change = sel.set(Some(PointId::from("a")));
        assert!(change.is_noop());
        assert_eq!(change.affected().count(), 0);
    }
}
