//! Style pool for encode-time deduplication

use super::Style;
use ahash::AHashMap;

/// Deduplicating table of styles, keyed by value
///
/// Cells never hold pool indices. A writer builds a pool while encoding a
/// workbook, interning each cell's owned style to get the shared record id
/// the container format wants. Index 0 is always the default style.
#[derive(Debug, Clone)]
pub struct StylePool {
    styles: Vec<Style>,
    index_map: AHashMap<Style, u32>,
}

impl StylePool {
    /// Create a new style pool with the default style at index 0
    pub fn new() -> Self {
        let mut pool = Self {
            styles: Vec::with_capacity(64),
            index_map: AHashMap::with_capacity(64),
        };
        pool.intern(&Style::default());
        pool
    }

    /// Get the index of an equal style, adding a copy if none exists yet
    pub fn intern(&mut self, style: &Style) -> u32 {
        if let Some(&idx) = self.index_map.get(style) {
            return idx;
        }

        let idx = self.styles.len() as u32;
        self.index_map.insert(style.clone(), idx);
        self.styles.push(style.clone());
        idx
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of distinct styles, including the default
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if the pool holds nothing but the default style
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Iterate over all styles with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        self.styles.iter().enumerate().map(|(i, s)| (i as u32, s))
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_default_style() {
        let pool = StylePool::new();
        assert_eq!(pool.len(), 1);
        assert!(pool.is_empty());
        assert_eq!(pool.get(0), Some(&Style::default()));
    }

    #[test]
    fn test_deduplication() {
        let mut pool = StylePool::new();

        let idx1 = pool.intern(&Style::new().bold(true));
        let idx2 = pool.intern(&Style::new().bold(true));
        let idx3 = pool.intern(&Style::new().italic(true));

        assert_eq!(idx1, idx2);
        assert_ne!(idx1, idx3);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.intern(&Style::default()), 0);
    }

    #[test]
    fn test_pool_holds_copies() {
        let mut pool = StylePool::new();
        let mut style = Style::new().fill_color(Color::RED).font_size(14.0);

        let idx = pool.intern(&style);
        style.font.size = 8.0;

        assert_eq!(pool.get(idx).map(|s| s.font.size), Some(14.0));
        assert_ne!(pool.intern(&style), idx);
    }
}
