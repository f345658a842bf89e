use pixelring_core::ComponentId;
use pixelring_pcb::BoardDocument;

use crate::error::LayoutError;

/// A component handed out by [`ComponentSupply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyItem {
    pub id: ComponentId,
    pub reference: String,
}

/// The ordered components `<prefix>1, <prefix>2, …` that placement consumes.
///
/// Resolution stops at the first missing index; `next` returning `None` is the
/// normal end of a run.
#[derive(Debug, Clone)]
pub struct ComponentSupply {
    items: Vec<SupplyItem>,
    cursor: usize,
}

impl ComponentSupply {
    pub fn resolve(doc: &dyn BoardDocument, prefix: &str) -> Result<Self, LayoutError> {
        let items: Vec<SupplyItem> = (1..)
            .map(|i| format!("{prefix}{i}"))
            .map_while(|reference| {
                doc.get_component_by_reference(&reference)
                    .map(|id| SupplyItem { id, reference })
            })
            .collect();
        if items.is_empty() {
            return Err(LayoutError::EmptySupply {
                prefix: prefix.to_string(),
            });
        }
        tracing::debug!(count = items.len(), prefix, "resolved component supply");
        Ok(Self { items, cursor: 0 })
    }

    #[must_use]
    pub fn from_items(items: Vec<SupplyItem>) -> Self {
        Self { items, cursor: 0 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.items.iter().map(|item| item.id)
    }
}

impl Iterator for ComponentSupply {
    type Item = SupplyItem;

    fn next(&mut self) -> Option<SupplyItem> {
        let item = self.items.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelring_core::Point;
    use pixelring_pcb::MemoryBoard;

    #[test]
    fn stops_at_first_gap_and_hands_out_in_order() {
        let mut board = MemoryBoard::new();
        for reference in ["D2", "R1", "D1", "D3", "D5"] {
            board.add_component(reference, Point::default(), 0.0, vec![]);
        }
        let mut supply = ComponentSupply::resolve(&board, "D").unwrap();
        assert_eq!(supply.len(), 3);
        let refs: Vec<String> = supply.by_ref().map(|item| item.reference).collect();
        assert_eq!(refs, ["D1", "D2", "D3"]);
        assert_eq!(supply.remaining(), 0);
        assert!(supply.next().is_none());
    }

    #[test]
    fn missing_first_component_is_an_error() {
        let board = MemoryBoard::new();
        let err = ComponentSupply::resolve(&board, "D").unwrap_err();
        assert!(matches!(err, LayoutError::EmptySupply { .. }));
    }
}
